use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Tokens are considered stale this long before the vendor expiry
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Which set of scopes a token is requested with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenScope {
    /// Bucket and data scopes, used server-side only
    Internal,
    /// Read-only viewable access, handed to the browser viewer
    Public,
}

impl TokenScope {
    pub fn scopes(&self) -> &'static [&'static str] {
        match self {
            Self::Internal => &[
                "bucket:create",
                "bucket:read",
                "data:read",
                "data:create",
                "data:write",
            ],
            Self::Public => &["viewables:read"],
        }
    }

    /// Space separated scope string as sent to the token endpoint
    pub fn scope_param(&self) -> String {
        self.scopes().join(" ")
    }
}

impl std::fmt::Display for TokenScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Internal => write!(f, "internal"),
            Self::Public => write!(f, "public"),
        }
    }
}

/// Short-lived bearer credential issued by the authentication service
#[derive(Debug, Clone)]
pub struct AccessToken {
    access_token: String,
    expires_in: u64,
    fetched_at: Instant,
}

impl AccessToken {
    pub fn new(access_token: impl Into<String>, expires_in: u64) -> Self {
        Self {
            access_token: access_token.into(),
            expires_in,
            fetched_at: Instant::now(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Validity window in seconds as reported by the vendor
    pub fn expires_in(&self) -> u64 {
        self.expires_in
    }

    /// Seconds of validity left, counted from when the token was fetched
    pub fn remaining_secs(&self) -> u64 {
        self.expires_in
            .saturating_sub(self.fetched_at.elapsed().as_secs())
    }

    /// How long the token may be reused before a new one must be requested
    pub fn reusable_for(&self) -> Duration {
        Duration::from_secs(self.expires_in)
            .saturating_sub(EXPIRY_MARGIN)
            .saturating_sub(self.fetched_at.elapsed())
    }

    pub fn is_expired(&self) -> bool {
        self.reusable_for().is_zero()
    }

    /// Body returned to browser callers
    pub fn to_response(&self) -> TokenResponse {
        TokenResponse {
            access_token: self.access_token.clone(),
            expires_in: self.remaining_secs(),
        }
    }
}

/// `{access_token, expires_in}` as exchanged over HTTP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}
