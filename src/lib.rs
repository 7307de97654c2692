//! Local HTTP server for game asset folders: case-insensitive path
//! resolution, memoized lookups, server-side save persistence, and
//! version-keyed `main.js` patching.

pub mod cache;
pub mod fs;
pub mod patch;
pub mod server;
