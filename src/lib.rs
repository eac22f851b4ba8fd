//! APS Model Viewer
//!
//! Upload CAD/BIM designs to Autodesk Platform Services, translate them for
//! the web viewer and follow their translation status:
//! - OSS bucket storage with signed S3 uploads
//! - Model Derivative translation jobs and manifests
//! - Cached client-credentials tokens
//! - A browser page and a CLI client driving the same selection flow

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::TokenProvider;
use infrastructure::aps::{
    ApsAuthClient, ApsHttpClient, CachedTokenProvider, DerivativeClient, OssClient,
};
use infrastructure::services::ModelService;
use tracing::info;

/// Create the application state with default configuration
pub fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default())
}

/// Create the application state with custom configuration
pub fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let aps = &config.aps;
    let http = ApsHttpClient::with_timeout(aps.base_url.clone(), aps.request_timeout())?;

    let tokens: Arc<dyn TokenProvider> = Arc::new(CachedTokenProvider::new(ApsAuthClient::new(
        http.clone(),
        aps.client_id.clone(),
        aps.client_secret.clone(),
    )));

    let bucket_key = aps.bucket_key();
    let store = OssClient::new(http.clone(), tokens.clone(), bucket_key.clone())
        .with_region(aps.region.clone());
    let translator = DerivativeClient::new(http, tokens.clone());

    let model_service = ModelService::new(Arc::new(store), Arc::new(translator))
        .with_max_upload_size(config.upload.max_size_bytes)
        .with_poll_policy(config.translation.poll_policy());

    info!(
        base_url = %aps.base_url,
        bucket = %bucket_key,
        region = %aps.region,
        max_upload_size = config.upload.max_size_bytes,
        "Application state initialized"
    );

    Ok(AppState::new(Arc::new(model_service), tokens).with_environment(config.server.environment))
}
