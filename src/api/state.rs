//! Application state for shared services

use std::sync::Arc;

use crate::config::Environment;
use crate::domain::model::MAX_UPLOAD_SIZE;
use crate::domain::{DomainError, ModelRef, ModelStatus, TokenProvider};
use crate::infrastructure::services::{ModelService, UploadModelRequest};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub model_service: Arc<dyn ModelServiceTrait>,
    pub token_provider: Arc<dyn TokenProvider>,
    pub environment: Environment,
}

impl AppState {
    pub fn new(
        model_service: Arc<dyn ModelServiceTrait>,
        token_provider: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            model_service,
            token_provider,
            environment: Environment::default(),
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn max_upload_size(&self) -> u64 {
        self.model_service.max_upload_size()
    }
}

/// Trait for model service operations
#[async_trait::async_trait]
pub trait ModelServiceTrait: Send + Sync {
    async fn list(&self) -> Result<Vec<ModelRef>, DomainError>;
    async fn status(&self, urn: &str) -> Result<ModelStatus, DomainError>;
    async fn upload(&self, request: UploadModelRequest) -> Result<ModelRef, DomainError>;

    fn max_upload_size(&self) -> u64 {
        MAX_UPLOAD_SIZE
    }
}

#[async_trait::async_trait]
impl ModelServiceTrait for ModelService {
    async fn list(&self) -> Result<Vec<ModelRef>, DomainError> {
        self.list_models().await
    }

    async fn status(&self, urn: &str) -> Result<ModelStatus, DomainError> {
        self.get_status(urn).await
    }

    async fn upload(&self, request: UploadModelRequest) -> Result<ModelRef, DomainError> {
        self.upload_model(request).await
    }

    fn max_upload_size(&self) -> u64 {
        ModelService::max_upload_size(self)
    }
}
