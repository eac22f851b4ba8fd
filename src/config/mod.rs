//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, ApsConfig, DEFAULT_APS_BASE_URL, Environment, LogFormat, LoggingConfig,
    ServerConfig, TranslationConfig, UploadConfig,
};
