//! Client-credentials token provider for the APS authentication API

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::http_client::{ApsHttpClient, parse_json, status_error};
use crate::domain::{AccessToken, DomainError, TokenProvider, TokenScope};

const TOKEN_PATH: &str = "/authentication/v2/token";

#[derive(Debug, Deserialize)]
struct TokenPayload {
    access_token: String,
    expires_in: u64,
}

/// Requests two-legged tokens with the configured client credentials
#[derive(Debug, Clone)]
pub struct ApsAuthClient {
    http: ApsHttpClient,
    client_id: String,
    client_secret: String,
}

impl ApsAuthClient {
    pub fn new(
        http: ApsHttpClient,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    async fn request_token(&self, scope: TokenScope) -> Result<AccessToken, DomainError> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(DomainError::configuration(
                "APS client id and secret are not configured",
            ));
        }

        let request = self
            .http
            .client()
            .post(self.http.url(TOKEN_PATH))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", "client_credentials".to_string()),
                ("scope", scope.scope_param()),
            ]);

        let response = self.http.send(request, "auth").await?;

        if !response.status().is_success() {
            return Err(status_error(response, "auth").await);
        }

        let payload: TokenPayload = parse_json(response, "auth").await?;
        debug!(scope = %scope, expires_in = payload.expires_in, "Issued access token");

        Ok(AccessToken::new(payload.access_token, payload.expires_in))
    }
}

#[async_trait]
impl TokenProvider for ApsAuthClient {
    async fn get_token(&self, scope: TokenScope) -> Result<AccessToken, DomainError> {
        self.request_token(scope)
            .await
            .map_err(|e| DomainError::authentication(format!("Could not obtain {} token: {}", scope, e)))
    }

    fn provider_name(&self) -> &'static str {
        "aps"
    }
}
