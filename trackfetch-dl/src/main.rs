//! trackfetch-dl - FLAC fetch-and-tag service
//!
//! Serves an upload form on `/`, accepts CSV manifests on `POST /dataset`,
//! downloads each listed FLAC into the download directory and writes
//! title/artist/album tags. With `--manifest` it processes one file and
//! prints the report instead of serving.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use trackfetch_common::config::{DownloadDirInitializer, DownloadDirResolver, TomlConfig};
use trackfetch_common::logging::init_tracing;
use trackfetch_dl::config::ServiceConfig;
use trackfetch_dl::services::run_http_batch;
use trackfetch_dl::{build_router, ApiError, AppState};

/// Command-line arguments for trackfetch-dl
#[derive(Parser, Debug)]
#[command(name = "trackfetch-dl")]
#[command(about = "Download and tag FLAC files listed in a CSV manifest")]
#[command(version)]
struct Args {
    /// TOML config file (defaults to the platform config location)
    #[arg(short, long, env = "TRACKFETCH_CONFIG")]
    config: Option<PathBuf>,

    /// Destination directory, overrides environment and config file
    #[arg(short, long)]
    download_dir: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:5000
    #[arg(short, long)]
    bind: Option<String>,

    /// Process this manifest once, print the report and exit
    #[arg(short, long)]
    manifest: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = TomlConfig::load_or_default(args.config.as_deref());
    init_tracing(&toml_config.logging)?;

    info!(
        "Starting trackfetch-dl v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let download_dir = DownloadDirResolver::new()
        .with_cli_arg(args.download_dir.clone())
        .with_toml(&toml_config)
        .resolve();

    let initializer = DownloadDirInitializer::new(download_dir);
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize download directory")?;
    info!("Download directory: {}", initializer.download_dir().display());

    let service_config = ServiceConfig::resolve(
        &toml_config,
        initializer.download_dir().to_path_buf(),
        args.bind.clone(),
    )?;

    match args.manifest {
        Some(path) => run_once(service_config, path).await,
        None => serve(service_config).await,
    }
}

/// One-shot mode: row failures still exit 0, request-level failures do not
async fn run_once(config: ServiceConfig, path: PathBuf) -> Result<()> {
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;

    let downloader = config.downloader;
    let report = tokio::task::spawn_blocking(move || run_http_batch(&downloader, &bytes))
        .await
        .context("Batch task failed")?
        .map_err(ApiError::from)?;

    print!("{}", report.render_text());
    Ok(())
}

async fn serve(config: ServiceConfig) -> Result<()> {
    let addr = config.bind_address;
    let state = AppState::from_service_config(config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
