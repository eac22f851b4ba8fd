//! Upload flow: validate locally, submit, then refresh and select the new model

use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use tracing::{info, warn};

use super::controls::Controls;
use super::error::ClientError;
use super::selection::SelectionController;
use crate::domain::ModelRef;
pub use crate::domain::model::format_file_size;
use crate::domain::model::{
    MAX_UPLOAD_SIZE, UploadValidationError, is_archive, normalize_entry_point, validate_extension,
    validate_size,
};

/// Pause before the list is refreshed after a successful upload
pub const REFRESH_DELAY: Duration = Duration::from_secs(2);

/// A design file picked by the user
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub content: Bytes,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content: Bytes) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ClientError::validation(format!("Invalid file path: {}", path.display())))?
            .to_string();

        let content = tokio::fs::read(path).await.map_err(|e| {
            ClientError::validation(format!("Could not read {}: {}", path.display(), e))
        })?;

        Ok(Self::new(name, Bytes::from(content)))
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

#[derive(Clone)]
pub struct UploadController {
    selection: SelectionController,
    max_size: u64,
    refresh_delay: Duration,
}

impl UploadController {
    pub fn new(selection: SelectionController) -> Self {
        Self {
            selection,
            max_size: MAX_UPLOAD_SIZE,
            refresh_delay: REFRESH_DELAY,
        }
    }

    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_refresh_delay(mut self, refresh_delay: Duration) -> Self {
        self.refresh_delay = refresh_delay;
        self
    }

    pub fn controls(&self) -> &Controls {
        self.selection.controls()
    }

    /// Check a file the way the server will, before anything is sent
    pub fn check(&self, file: &UploadFile) -> Result<(), UploadValidationError> {
        validate_size(file.size(), self.max_size)?;
        validate_extension(&file.name)
    }

    /// Upload `file`; an archive is refused unless `entry_point` names its root design
    pub async fn upload(
        &self,
        file: UploadFile,
        entry_point: Option<String>,
    ) -> Result<ModelRef, ClientError> {
        if let Err(e) = self.check(&file) {
            warn!(file_name = %file.name, size = file.size(), error = %e, "Upload refused");
            return Err(ClientError::validation(e.to_string()));
        }

        let entry_point = normalize_entry_point(entry_point.as_deref());
        if is_archive(&file.name) && entry_point.is_none() {
            return Err(ClientError::validation(
                UploadValidationError::EmptyEntryPoint.to_string(),
            ));
        }

        let guard = self
            .controls()
            .disable()
            .ok_or_else(|| ClientError::validation("An upload is already in progress"))?;

        info!(
            file_name = %file.name,
            size = %format_file_size(file.size()),
            "Uploading model"
        );

        let result = self
            .selection
            .api()
            .upload_model(&file.name, file.content, entry_point.as_deref())
            .await;
        drop(guard);

        let model = result.inspect_err(|e| warn!(file_name = %file.name, error = %e, "Upload failed"))?;

        info!(name = %model.name, urn = %model.urn, "Upload successful, translation started");

        tokio::time::sleep(self.refresh_delay).await;
        if let Err(e) = self.selection.refresh(Some(&model.urn)).await {
            warn!(error = %e, "Could not refresh models after upload");
        }

        Ok(model)
    }
}
