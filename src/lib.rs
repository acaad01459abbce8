pub mod api;
pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::classifier::ImageClassifier;
use crate::services::scratch::ScratchStore;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::classify::classify_image,
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::Prediction,
            handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "classify", description = "Image classification endpoint"),
        (name = "system", description = "Service health and diagnostics")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub scratch: Arc<ScratchStore>,
    pub classifier: Arc<dyn ImageClassifier>,
    pub config: AppConfig,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/classify", post(handlers::classify::classify_image))
        .route("/health", get(handlers::health::health_check))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(axum::extract::DefaultBodyLimit::max(
            // Headroom for multipart framing around the file itself.
            state.config.max_upload_size + 1024 * 1024,
        ))
        .with_state(state)
}
