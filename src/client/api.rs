//! Typed HTTP client for the viewer backend

use bytes::Bytes;
use reqwest::{Response, multipart};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::ClientError;
use crate::api::models::{ENTRY_POINT_FIELD, FILE_FIELD};
use crate::api::types::ApiErrorResponse;
use crate::domain::{ModelRef, ModelStatus, TokenResponse};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Page address that reopens `urn`; the selection lives in the fragment
    pub fn viewer_url(&self, urn: &str) -> String {
        format!("{}/#{}", self.base_url, urn)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_token(&self) -> Result<TokenResponse, ClientError> {
        let response = self.http.get(self.url("/api/auth/token")).send().await?;
        parse(response).await
    }

    pub async fn list_models(&self) -> Result<Vec<ModelRef>, ClientError> {
        let response = self.http.get(self.url("/api/models")).send().await?;
        parse(response).await
    }

    pub async fn get_status(&self, urn: &str) -> Result<ModelStatus, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/api/models/{}/status", urn)))
            .send()
            .await?;
        parse(response).await
    }

    pub async fn upload_model(
        &self,
        file_name: &str,
        content: Bytes,
        entry_point: Option<&str>,
    ) -> Result<ModelRef, ClientError> {
        let mime = mime_guess::from_path(file_name).first_or_octet_stream();
        let part = multipart::Part::bytes(content.to_vec())
            .file_name(file_name.to_string())
            .mime_str(mime.essence_str())?;

        let mut form = multipart::Form::new().part(FILE_FIELD, part);
        if let Some(entry_point) = entry_point {
            form = form.text(ENTRY_POINT_FIELD, entry_point.to_string());
        }

        debug!(file_name = %file_name, size = content.len(), "Uploading model");

        let response = self
            .http
            .post(self.url("/api/models"))
            .multipart(form)
            .send()
            .await?;
        parse(response).await
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(error) => error.error.message,
        Err(_) if body.is_empty() => format!("HTTP {}", status.as_u16()),
        Err(_) => body,
    };

    Err(ClientError::status(status.as_u16(), message))
}
