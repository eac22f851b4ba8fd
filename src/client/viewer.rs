//! Viewer widget abstraction
//!
//! Initialization is a single async step that yields a ready handle; loading
//! a model reuses that handle.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use super::api::ApiClient;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewerError {
    #[error("Could not initialize viewer: {0}")]
    Initialization(String),

    #[error("Failed to load model {urn}: {message}")]
    Load { urn: String, message: String },
}

/// A ready-to-use viewer session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerHandle {
    pub access_token: String,
    pub expires_in: u64,
}

/// Document id the viewer runtime expects for a model urn
pub fn document_id(urn: &str) -> String {
    format!("urn:{}", urn)
}

#[async_trait]
pub trait Viewer: Send + Sync {
    async fn init(&self) -> Result<ViewerHandle, ViewerError>;

    async fn load(&self, handle: &ViewerHandle, urn: &str) -> Result<(), ViewerError>;
}

/// Viewer for terminals: reports where the model can be opened
#[derive(Debug, Clone)]
pub struct ConsoleViewer {
    api: ApiClient,
}

impl ConsoleViewer {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Viewer for ConsoleViewer {
    async fn init(&self) -> Result<ViewerHandle, ViewerError> {
        let token = self
            .api
            .get_token()
            .await
            .map_err(|e| ViewerError::Initialization(e.to_string()))?;

        if token.access_token.is_empty() {
            return Err(ViewerError::Initialization(
                "server returned an empty access token".to_string(),
            ));
        }

        Ok(ViewerHandle {
            access_token: token.access_token,
            expires_in: token.expires_in,
        })
    }

    async fn load(&self, _handle: &ViewerHandle, urn: &str) -> Result<(), ViewerError> {
        if urn.trim().is_empty() {
            return Err(ViewerError::Load {
                urn: urn.to_string(),
                message: "empty urn".to_string(),
            });
        }

        info!(
            document_id = %document_id(urn),
            url = %self.api.viewer_url(urn),
            "Model ready for viewing"
        );

        Ok(())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Viewer that records loaded urns
    #[derive(Debug, Default)]
    pub struct RecordingViewer {
        loaded: Mutex<Vec<String>>,
        fail_init: bool,
        fail_load: bool,
    }

    impl RecordingViewer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_init() -> Self {
            Self {
                fail_init: true,
                ..Self::default()
            }
        }

        pub fn failing_load() -> Self {
            Self {
                fail_load: true,
                ..Self::default()
            }
        }

        pub fn loaded(&self) -> Vec<String> {
            self.loaded.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Viewer for RecordingViewer {
        async fn init(&self) -> Result<ViewerHandle, ViewerError> {
            if self.fail_init {
                return Err(ViewerError::Initialization(
                    "unsupported rendering context".to_string(),
                ));
            }

            Ok(ViewerHandle {
                access_token: "viewer-token".to_string(),
                expires_in: 3600,
            })
        }

        async fn load(&self, _handle: &ViewerHandle, urn: &str) -> Result<(), ViewerError> {
            if self.fail_load {
                return Err(ViewerError::Load {
                    urn: urn.to_string(),
                    message: "document could not be loaded".to_string(),
                });
            }

            self.loaded.lock().unwrap().push(urn.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_document_id() {
        assert_eq!(document_id("dXJu"), "urn:dXJu");
    }

    #[tokio::test]
    async fn test_console_viewer_init_uses_viewer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "abc", "expires_in": 3599})),
            )
            .mount(&server)
            .await;

        let handle = ConsoleViewer::new(ApiClient::new(server.uri()))
            .init()
            .await
            .unwrap();
        assert_eq!(handle.access_token, "abc");
        assert_eq!(handle.expires_in, 3599);
    }

    #[tokio::test]
    async fn test_console_viewer_init_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/token"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"error": {"message": "Unable to obtain an access token"}})),
            )
            .mount(&server)
            .await;

        let err = ConsoleViewer::new(ApiClient::new(server.uri()))
            .init()
            .await
            .unwrap_err();
        assert!(matches!(err, ViewerError::Initialization(_)));
    }
}
