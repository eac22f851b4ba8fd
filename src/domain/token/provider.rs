use async_trait::async_trait;
use std::fmt::Debug;

use super::{AccessToken, TokenScope};
use crate::domain::DomainError;

/// Source of bearer tokens for the vendor APIs
#[async_trait]
pub trait TokenProvider: Send + Sync + Debug {
    /// Get a token for the given scope set
    async fn get_token(&self, scope: TokenScope) -> Result<AccessToken, DomainError>;

    /// Token used by the server for storage and translation calls
    async fn internal_token(&self) -> Result<AccessToken, DomainError> {
        self.get_token(TokenScope::Internal).await
    }

    /// Token handed to the browser viewer
    async fn public_token(&self) -> Result<AccessToken, DomainError> {
        self.get_token(TokenScope::Public).await
    }

    /// Get provider name for logging/debugging
    fn provider_name(&self) -> &'static str;
}
