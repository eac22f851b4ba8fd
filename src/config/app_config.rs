use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::PollPolicy;
use crate::domain::model::MAX_UPLOAD_SIZE;

pub const DEFAULT_APS_BASE_URL: &str = "https://developer.api.autodesk.com";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub aps: ApsConfig,
    pub upload: UploadConfig,
    pub translation: TranslationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Document root for the browser frontend
    pub static_dir: PathBuf,
    pub environment: Environment,
}

/// Deployment environment; controls how much error detail reaches clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub to_console: bool,
    pub to_file: bool,
    /// Directory for the date-partitioned log files
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Autodesk Platform Services client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApsConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Bucket for uploaded designs; derived from the client id when unset
    pub bucket: Option<String>,
    pub base_url: String,
    pub region: String,
    /// Timeout for individual API calls, in seconds
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_size_bytes: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub poll_interval_secs: u64,
    pub max_poll_attempts: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            static_dir: PathBuf::from("wwwroot"),
            environment: Environment::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            to_console: true,
            to_file: true,
            directory: PathBuf::from("logs"),
        }
    }
}

impl Default for ApsConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            bucket: None,
            base_url: DEFAULT_APS_BASE_URL.to_string(),
            region: "US".to_string(),
            request_timeout_secs: 120,
        }
    }
}

impl ApsConfig {
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    /// Bucket key, falling back to `<client id>-basic-app`
    pub fn bucket_key(&self) -> String {
        match self.bucket.as_deref().map(str::trim) {
            Some(bucket) if !bucket.is_empty() => bucket.to_lowercase(),
            _ if self.client_id.is_empty() => "aps-model-viewer-basic-app".to_string(),
            _ => format!("{}-basic-app", self.client_id.to_lowercase()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: MAX_UPLOAD_SIZE,
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        let policy = PollPolicy::default();
        Self {
            poll_interval_secs: policy.interval.as_secs(),
            max_poll_attempts: policy.max_attempts,
        }
    }
}

impl TranslationConfig {
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            Duration::from_secs(self.poll_interval_secs),
            self.max_poll_attempts,
        )
    }
}

impl AppConfig {
    /// Load from `config/default`, `config/local`, `APP__*` variables and the
    /// conventional `APS_CLIENT_ID` / `APS_CLIENT_SECRET` / `APS_BUCKET` / `PORT`
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("aps.client_id", std::env::var("APS_CLIENT_ID").ok())?
            .set_override_option("aps.client_secret", std::env::var("APS_CLIENT_SECRET").ok())?
            .set_override_option("aps.bucket", std::env::var("APS_BUCKET").ok())?
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .build()?;

        config.try_deserialize()
    }

    /// Parse a TOML document on top of the defaults
    pub fn from_toml(source: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
