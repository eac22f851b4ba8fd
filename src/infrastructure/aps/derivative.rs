//! Model Derivative service client

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::info;

use super::http_client::{ApsHttpClient, is_not_found, parse_json, status_error};
use crate::domain::{DomainError, Manifest, TokenProvider, TranslationJob, TranslationService};

const SERVICE: &str = "derivative";
const DESIGN_DATA_PATH: &str = "/modelderivative/v2/designdata";
const JOB_PATH: &str = "/modelderivative/v2/designdata/job";

#[derive(Debug, Clone)]
pub struct DerivativeClient {
    http: ApsHttpClient,
    tokens: Arc<dyn TokenProvider>,
}

impl DerivativeClient {
    pub fn new(http: ApsHttpClient, tokens: Arc<dyn TokenProvider>) -> Self {
        Self { http, tokens }
    }

    async fn bearer(&self) -> Result<String, DomainError> {
        self.tokens
            .internal_token()
            .await
            .map(|t| t.access_token().to_string())
            .map_err(|e| DomainError::upstream("auth", e.to_string()))
    }

    fn manifest_url(&self, urn: &str) -> Result<reqwest::Url, DomainError> {
        self.http.url_with_segments(DESIGN_DATA_PATH, &[urn, "manifest"])
    }
}

/// Request body for a translation job
pub fn job_payload(job: &TranslationJob) -> Value {
    let mut input = json!({ "urn": job.urn });

    if let Some(root) = &job.root_filename {
        input["compressedUrn"] = json!(true);
        input["rootFilename"] = json!(root);
    }

    json!({
        "input": input,
        "output": { "formats": job.formats },
    })
}

#[async_trait]
impl TranslationService for DerivativeClient {
    async fn start_translation(&self, job: &TranslationJob) -> Result<(), DomainError> {
        let token = self.bearer().await?;

        let request = self
            .http
            .client()
            .post(self.http.url(JOB_PATH))
            .bearer_auth(&token)
            .header("x-ads-force", "true")
            .json(&job_payload(job));

        self.http.send_checked(request, SERVICE).await?;

        info!(
            urn = %job.urn,
            root_filename = job.root_filename.as_deref().unwrap_or(""),
            "Submitted translation job"
        );

        Ok(())
    }

    async fn get_manifest(&self, urn: &str) -> Result<Option<Manifest>, DomainError> {
        let url = self.manifest_url(urn)?;
        let token = self.bearer().await?;

        let request = self.http.client().get(url).bearer_auth(&token);

        let response = self.http.send(request, SERVICE).await?;

        if is_not_found(response.status()) {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(status_error(response, SERVICE).await);
        }

        parse_json(response, SERVICE).await.map(Some)
    }
}
