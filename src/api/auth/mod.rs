//! Viewer token endpoint
//!
//! Hands the browser a short-lived, read-only token for the viewer runtime.

use axum::{Json, Router, extract::State, routing::get};
use tracing::{debug, error};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::{DomainError, TokenResponse};

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new().route("/token", get(get_viewer_token))
}

/// GET /api/auth/token
pub async fn get_viewer_token(
    State(state): State<AppState>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.token_provider.public_token().await.map_err(|e| {
        error!(
            provider = state.token_provider.provider_name(),
            error = %e,
            "Failed to obtain viewer token"
        );

        let e = match e {
            DomainError::Authentication { .. } => e,
            other => DomainError::authentication(other.to_string()),
        };
        ApiError::from_domain(e, state.environment)
    })?;

    debug!(expires_in = token.remaining_secs(), "Issued viewer token");

    Ok(Json(token.to_response()))
}
