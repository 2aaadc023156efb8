pub mod handlers;

use std::path::Path;
use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::Config;
use crate::orchestrator::PromptOrchestrator;
use crate::provider::ImageProvider;
use crate::storage::ImageStore;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<PromptOrchestrator>,
    pub uploads: Arc<ImageStore>,
    pub generated: Arc<ImageStore>,
}

impl AppState {
    pub fn new(
        orchestrator: PromptOrchestrator,
        uploads: ImageStore,
        generated: ImageStore,
    ) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            uploads: Arc::new(uploads),
            generated: Arc::new(generated),
        }
    }

    pub fn from_config(config: &Config, provider: Arc<dyn ImageProvider>) -> Self {
        let uploads = ImageStore::new(config.upload_dir(), "uploads");
        let generated = ImageStore::new(config.generated_dir(), "generated");
        let orchestrator = PromptOrchestrator::from_config(config, provider, generated.clone());
        Self::new(orchestrator, uploads, generated)
    }
}

pub fn build_router(state: AppState, static_dir: &Path, max_upload_bytes: usize) -> Router {
    let api = Router::new()
        .route("/api/images", get(handlers::list_images))
        .route("/api/upload", post(handlers::upload_image))
        .route("/api/generate", post(handlers::generate))
        .layer(DefaultBodyLimit::max(max_upload_bytes));

    Router::new()
        .route("/", get(handlers::index_page))
        .merge(api)
        .nest_service("/generated", ServeDir::new(state.generated.base_dir()))
        .nest_service("/uploads", ServeDir::new(state.uploads.base_dir()))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
