//! trackfetch-dl library interface
//!
//! The service binary and the integration tests both build on this crate.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::trace::TraceLayer;

use crate::config::{DownloaderConfig, ServiceConfig};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Settings handed to every batch
    pub downloader: Arc<DownloaderConfig>,
    /// Upload size limit for POST /dataset
    pub max_upload_bytes: usize,
    /// Held for the duration of a batch so concurrent uploads run one after another
    pub batch_lock: Arc<Mutex<()>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last request-level failure, for diagnostics
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(downloader: DownloaderConfig, max_upload_bytes: usize) -> Self {
        Self {
            downloader: Arc::new(downloader),
            max_upload_bytes,
            batch_lock: Arc::new(Mutex::new(())),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    pub fn from_service_config(config: ServiceConfig) -> Self {
        Self::new(config.downloader, config.max_upload_bytes)
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .merge(api::ui_routes())
        .merge(api::dataset_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
