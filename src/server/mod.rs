//! HTTP serving layer: accept loop, request service, and routing.
//!
//! Routes:
//! - `POST /gameden/save`: persist the posted save blob
//! - `POST /gameden/load`: return the persisted blob, or `null`
//! - `GET /gameden/status`: server introspection
//! - `GET /*`: static assets via case-insensitive resolution, with an
//!   `index.html` fallback for directory-ish requests

pub mod response;
pub mod saves;

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use log::{debug, error, info};
use tokio::net::TcpListener;

use crate::cache::PathCache;
use crate::fs::Resolver;
use crate::patch::PatchSet;
use response::{
    HttpResponse, ServeError, ServeResult, empty_response, file_response, json_response,
    script_response, text_response,
};
use saves::SaveStore;

/// The file name the patch registry intercepts.
const PATCH_TARGET: &str = "main.js";

/// Per-process serving state, shared by every connection task.
pub struct AppState {
    resolver: Resolver,
    cache: PathCache,
    patches: PatchSet,
    saves: SaveStore,
}

impl AppState {
    /// State for serving `root`, with the bundled patches. `root` should
    /// already be canonicalized so the escape check below compares real
    /// paths.
    pub fn new(root: PathBuf) -> Self {
        let saves = SaveStore::new(&root);
        AppState {
            resolver: Resolver::new(root),
            cache: PathCache::new(),
            patches: PatchSet::builtin(),
            saves,
        }
    }

    /// Assemble state from parts (useful for testing).
    pub fn from_components(
        resolver: Resolver,
        cache: PathCache,
        patches: PatchSet,
        saves: SaveStore,
    ) -> Self {
        AppState {
            resolver,
            cache,
            patches,
            saves,
        }
    }

    pub fn cache(&self) -> &PathCache {
        &self.cache
    }

    /// Map a URL path onto the game directory, keeping any percent
    /// encoding intact: the string is the cache key, and the resolver
    /// does its own decoding.
    fn request_target(&self, url_path: &str) -> String {
        self.resolver
            .base()
            .join(url_path.trim_start_matches('/'))
            .to_string_lossy()
            .into_owned()
    }
}

/// Bind `addr` and serve requests until the process is stopped.
pub async fn listen(addr: SocketAddr, state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on http://{addr}");

    loop {
        let (stream, remote) = listener.accept().await?;
        let state = Arc::clone(&state);

        tokio::task::spawn(async move {
            let io = TokioIo::new(stream);
            let service = RequestService { state };
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                debug!("connection error from {remote}: {err:?}");
            }
        });
    }
}

struct RequestService {
    state: Arc<AppState>,
}

impl Service<Request<Incoming>> for RequestService {
    type Response = HttpResponse;
    type Error = ServeError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let state = Arc::clone(&self.state);

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let body = body.collect().await?.to_bytes();
            let path = parts.uri.path().to_string();

            let response = match respond(&state, &parts.method, &path, body).await {
                Ok(response) => response,
                Err(err) => {
                    error!("error serving {} {}: {}", parts.method, path, err);
                    text_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")?
                }
            };
            debug!("{} {} -> {}", parts.method, path, response.status());
            Ok(response)
        })
    }
}

/// Route a request. Split out from the hyper service so tests can drive
/// the router without a socket.
pub async fn respond(
    state: &AppState,
    method: &Method,
    path: &str,
    body: Bytes,
) -> ServeResult {
    match (method, path) {
        (&Method::POST, "/gameden/save") => handle_save(state, body).await,
        (&Method::POST, "/gameden/load") => handle_load(state).await,
        (&Method::GET, "/gameden/status") => handle_status(state),
        (&Method::GET, _) => serve_static(state, path).await,
        _ => text_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed"),
    }
}

async fn handle_save(state: &AppState, body: Bytes) -> ServeResult {
    if !body.is_empty() {
        state.saves.save(&body).await?;
    }
    empty_response(StatusCode::NO_CONTENT)
}

async fn handle_load(state: &AppState) -> ServeResult {
    match state.saves.load().await? {
        Some(data) => json_response(data),
        None => json_response("null"),
    }
}

fn handle_status(state: &AppState) -> ServeResult {
    let status = serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "root": state.resolver.base().display().to_string(),
        "cached_paths": state.cache.len(),
    });
    json_response(status.to_string())
}

async fn serve_static(state: &AppState, url_path: &str) -> ServeResult {
    let target = state.request_target(url_path);

    if let Some(found) = state.resolver.lookup(&state.cache, &target).await {
        return send_file(state, &found).await;
    }

    // Directory-ish request: fall back to its index.html. Also a cached
    // file lookup, so directories themselves never enter the cache.
    let index_target = format!(
        "{}{}index.html",
        target,
        std::path::MAIN_SEPARATOR
    );
    if let Some(found) = state.resolver.lookup(&state.cache, &index_target).await {
        return send_file(state, &found).await;
    }

    text_response(StatusCode::NOT_FOUND, "not found")
}

async fn send_file(state: &AppState, found: &std::path::Path) -> ServeResult {
    // A ".."-laden request can resolve to a real file outside the game
    // directory; refuse those.
    if !found.starts_with(state.resolver.base()) {
        debug!("refusing path outside game directory: {}", found.display());
        return text_response(StatusCode::NOT_FOUND, "not found");
    }

    let content = match tokio::fs::read(found).await {
        Ok(content) => content,
        Err(err) => {
            // Resolved a moment ago but unreadable now; treat as gone.
            debug!("cannot read {}: {}", found.display(), err);
            return text_response(StatusCode::NOT_FOUND, "not found");
        }
    };

    if found.file_name().is_some_and(|name| name == PATCH_TARGET) {
        if let Some(script) = state.patches.for_content(&content) {
            debug!("serving patched {}", found.display());
            return script_response(script);
        }
    }

    file_response(found, Bytes::from(content))
}
