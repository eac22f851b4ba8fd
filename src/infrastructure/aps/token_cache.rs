use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{AccessToken, DomainError, TokenProvider, TokenScope};

/// Upper bound on how long any token stays cached
const MAX_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Token provider wrapper that reuses tokens until they expire
#[derive(Debug)]
pub struct CachedTokenProvider<P: TokenProvider> {
    inner: P,
    cache: Cache<TokenScope, Arc<AccessToken>>,
}

impl<P: TokenProvider> CachedTokenProvider<P> {
    pub fn new(inner: P) -> Self {
        Self::with_ttl(inner, MAX_TOKEN_TTL)
    }

    pub fn with_ttl(inner: P, ttl: Duration) -> Self {
        let cache = Cache::builder().time_to_live(ttl).max_capacity(4).build();

        Self { inner, cache }
    }

    /// Drop a cached token so the next call requests a new one
    pub async fn invalidate(&self, scope: TokenScope) {
        self.cache.invalidate(&scope).await;
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: TokenProvider> TokenProvider for CachedTokenProvider<P> {
    async fn get_token(&self, scope: TokenScope) -> Result<AccessToken, DomainError> {
        if let Some(cached) = self.cache.get(&scope).await {
            if !cached.is_expired() {
                tracing::debug!(
                    provider = self.inner.provider_name(),
                    scope = %scope,
                    "Cache hit for access token"
                );
                return Ok((*cached).clone());
            }

            self.cache.invalidate(&scope).await;
        }

        tracing::debug!(
            provider = self.inner.provider_name(),
            scope = %scope,
            "Cache miss, requesting access token"
        );

        let token = self.inner.get_token(scope).await?;

        if !token.is_expired() {
            self.cache.insert(scope, Arc::new(token.clone())).await;
        }

        Ok(token)
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}
