use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::domain::DomainError;

/// Shared reqwest client bound to the APS base URL
#[derive(Debug, Clone)]
pub struct ApsHttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApsHttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: normalize_base_url(base_url.into()),
        }
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DomainError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url.into()),
        })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Absolute URL for `path` followed by `segments`, each percent-encoded
    /// as a single path segment
    pub fn url_with_segments(&self, path: &str, segments: &[&str]) -> Result<Url, DomainError> {
        let mut url = Url::parse(&self.url(path))
            .map_err(|e| DomainError::configuration(format!("Invalid APS base URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| DomainError::configuration("APS base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    /// Send a request, mapping transport failures to upstream errors
    pub async fn send(&self, request: RequestBuilder, service: &str) -> Result<Response, DomainError> {
        request
            .send()
            .await
            .map_err(|e| DomainError::upstream(service, format!("Request failed: {}", e)))
    }

    /// Send a request and require a 2xx status
    pub async fn send_checked(
        &self,
        request: RequestBuilder,
        service: &str,
    ) -> Result<Response, DomainError> {
        let response = self.send(request, service).await?;
        ensure_success(response, service).await
    }

    /// Send a request, require a 2xx status and parse the JSON body
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        service: &str,
    ) -> Result<T, DomainError> {
        let response = self.send_checked(request, service).await?;
        parse_json(response, service).await
    }
}

fn normalize_base_url(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Turn a non-2xx response into an upstream error carrying status and body
pub async fn ensure_success(response: Response, service: &str) -> Result<Response, DomainError> {
    if response.status().is_success() {
        return Ok(response);
    }

    Err(status_error(response, service).await)
}

pub async fn status_error(response: Response, service: &str) -> DomainError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    DomainError::upstream(service, format!("HTTP {}: {}", status, body))
}

pub async fn parse_json<T: DeserializeOwned>(
    response: Response,
    service: &str,
) -> Result<T, DomainError> {
    response
        .json()
        .await
        .map_err(|e| DomainError::upstream(service, format!("Failed to parse response: {}", e)))
}

pub fn is_conflict(status: StatusCode) -> bool {
    status == StatusCode::CONFLICT
}

pub fn is_not_found(status: StatusCode) -> bool {
    status == StatusCode::NOT_FOUND
}
