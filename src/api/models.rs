//! Model endpoints: list, status and upload

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, Path, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    routing::get,
};
use bytes::Bytes;
use tracing::{debug, error, info, warn};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::model::UploadValidationError;
use crate::domain::{DomainError, ModelRef, ModelStatus};
use crate::infrastructure::services::UploadModelRequest;

/// Multipart field holding the design file
pub const FILE_FIELD: &str = "model-file";
/// Multipart field holding the archive entry point
pub const ENTRY_POINT_FIELD: &str = "model-zip-entrypoint";

/// Headroom above the file ceiling for multipart framing and text fields
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create the models router
pub fn create_models_router(max_upload_size: u64) -> Router<AppState> {
    let body_limit = usize::try_from(max_upload_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route(
            "/",
            get(list_models)
                .post(upload_model)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/{urn}/status", get(get_model_status))
}

/// GET /api/models
pub async fn list_models(State(state): State<AppState>) -> Result<Json<Vec<ModelRef>>, ApiError> {
    debug!("Listing models");

    let models = state.model_service.list().await.map_err(|e| {
        error!(error = %e, "Failed to list models");
        ApiError::from_domain(e, state.environment)
    })?;

    Ok(Json(models))
}

/// GET /api/models/{urn}/status
pub async fn get_model_status(
    State(state): State<AppState>,
    Path(urn): Path<String>,
) -> Result<Json<ModelStatus>, ApiError> {
    debug!(urn = %urn, "Getting model status");

    let status = state.model_service.status(&urn).await.map_err(|e| {
        if !e.is_client_error() {
            error!(urn = %urn, error = %e, "Failed to get model status");
        }
        ApiError::from_domain(e, state.environment)
    })?;

    Ok(Json(status))
}

/// POST /api/models
pub async fn upload_model(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ModelRef>), ApiError> {
    let multipart = multipart.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Upload is not a multipart form");
        ApiError::from_domain(
            DomainError::validation(rejection.body_text()),
            state.environment,
        )
    })?;

    let max = state.max_upload_size();
    let request = read_upload_form(multipart, max)
        .await
        .map_err(|e| ApiError::from_domain(e, state.environment))?;

    info!(
        file_name = %request.file_name,
        size = request.size(),
        entry_point = request.entry_point.as_deref().unwrap_or(""),
        "Received model upload"
    );

    let model = state.model_service.upload(request).await.map_err(|e| {
        if e.is_client_error() {
            warn!(error = %e, "Model upload rejected");
        } else {
            error!(error = %e, "Model upload failed");
        }
        ApiError::from_domain(e, state.environment)
    })?;

    Ok((StatusCode::CREATED, Json(model)))
}

async fn read_upload_form(
    mut multipart: Multipart,
    max_upload_size: u64,
) -> Result<UploadModelRequest, DomainError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut entry_point: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_upload_size))?
    {
        match field.name() {
            Some(FILE_FIELD) => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, max_upload_size))?;
                file = Some((file_name, content));
            }
            Some(ENTRY_POINT_FIELD) => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, max_upload_size))?;
                entry_point = Some(text);
            }
            _ => {}
        }
    }

    match file {
        Some((file_name, content)) if !file_name.is_empty() => {
            Ok(UploadModelRequest::new(file_name, content).with_entry_point(entry_point))
        }
        _ => Err(UploadValidationError::MissingFile.into()),
    }
}

fn multipart_error(err: MultipartError, max_upload_size: u64) -> DomainError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return UploadValidationError::TooLarge {
            size: max_upload_size.saturating_add(1),
            max: max_upload_size,
        }
        .into();
    }

    DomainError::validation(err.body_text())
}
