use std::path::Path;

use axum::{Router, http::Uri, middleware, routing::get};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::debug;

use super::auth;
use super::health;
use super::middleware::logging_middleware;
use super::models;
use super::state::AppState;
use super::types::ApiError;

/// Create the full router: JSON API under `/api`, static viewer assets everywhere else
pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    let api = Router::new()
        .nest("/auth", auth::create_auth_router())
        .nest(
            "/models",
            models::create_models_router(state.max_upload_size()),
        )
        .fallback(api_not_found);

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api)
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

async fn api_not_found(uri: Uri) -> ApiError {
    debug!(uri = %uri, "Unknown API endpoint");
    ApiError::not_found("API endpoint not found")
}
