use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Authentication error: {message}")]
    Authentication { message: String },

    #[error("Upstream error: {service} - {message}")]
    Upstream { service: String, message: String },

    #[error("Translation failed for {urn}: {message}")]
    TranslationFailed { urn: String, message: String },

    #[error("Translation of {urn} did not finish after {attempts} attempts")]
    Timeout { urn: String, attempts: u32 },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn translation_failed(urn: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TranslationFailed {
            urn: urn.into(),
            message: message.into(),
        }
    }

    pub fn timeout(urn: impl Into<String>, attempts: u32) -> Self {
        Self::Timeout {
            urn: urn.into(),
            attempts,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for errors caused by the caller's input rather than by the server
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Authentication { .. })
    }
}
