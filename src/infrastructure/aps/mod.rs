//! Autodesk Platform Services clients

mod auth;
mod derivative;
mod http_client;
mod oss;
mod token_cache;

pub use auth::ApsAuthClient;
pub use derivative::{DerivativeClient, job_payload};
pub use http_client::ApsHttpClient;
pub use oss::OssClient;
pub use token_cache::CachedTokenProvider;
