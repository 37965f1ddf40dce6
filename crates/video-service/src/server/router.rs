use std::future::Future;
use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use object_store::{memory::InMemory, ObjectStore};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::handlers::{add_video, download_data, health_check, list_videos, upload_data};
use crate::config::Config;
use crate::gateway::DataGateway;
use crate::registry::VideoRegistry;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<VideoRegistry>,
    pub gateway: DataGateway,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(VideoRegistry::new()),
            gateway: DataGateway::new(store),
        }
    }

    /// State backed by a fresh in-process content store
    pub fn in_memory(config: Config) -> Self {
        Self::new(config, Arc::new(InMemory::new()))
    }
}

/// Create the Axum router with all routes
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/video", get(list_videos).post(add_video))
        .route("/video/:id/data", get(download_data).post(upload_data))
        .route("/videos", get(list_videos).post(add_video))
        .route("/videos/:id/data", get(download_data).post(upload_data))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
