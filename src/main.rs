use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::*;
use env_logger::Env;

use gameden::fs::is_existing_file;
use gameden::server::AppState;

/// Serve a local game folder over HTTP, tolerating case-mismatched
/// asset paths.
#[derive(Parser)]
#[command(name = "gameden", version, about)]
struct Args {
    /// Game directory to serve (must contain index.html)
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Enable debug logging (RUST_LOG overrides this)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let root = match tokio::fs::canonicalize(&args.dir).await {
        Ok(root) => root,
        Err(e) => {
            eprintln!(
                "{} Cannot open game directory {}: {}",
                "Error:".red().bold(),
                args.dir.display(),
                e
            );
            std::process::exit(1);
        }
    };

    if !is_existing_file(root.join("index.html")).await {
        eprintln!(
            "{} No index.html in {} — run gameden in the game folder.",
            "Error:".red().bold(),
            root.display()
        );
        std::process::exit(1);
    }

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    println!("{}", "=".repeat(60).cyan());
    println!("{}", "  gameden - local game server".bold().cyan());
    println!("{}", format!("  Serving {}", root.display()).cyan());
    println!("{}", "=".repeat(60).cyan());
    println!();
    println!("Listening on http://{addr}");
    println!();

    let state = Arc::new(AppState::new(root));
    gameden::server::listen(addr, state).await
}
