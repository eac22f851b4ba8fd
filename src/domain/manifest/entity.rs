//! Manifest entity as returned by the derivative service

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Overall translation status reported by a manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestStatus {
    Pending,
    InProgress,
    Success,
    Failed,
    Timeout,
    Unknown,
}

impl ManifestStatus {
    /// Interpret a raw status string; unrecognised values are `Unknown`
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "inprogress" | "in-progress" | "in_progress" => Self::InProgress,
            "success" => Self::Success,
            "failed" => Self::Failed,
            "timeout" => Self::Timeout,
            _ => Self::Unknown,
        }
    }

    /// Terminal states stop polling
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed | Self::Timeout)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "inprogress",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Timeout => "timeout",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ManifestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Child node of a derivative
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DerivativeChild {
    #[serde(default)]
    pub messages: Vec<Value>,
}

/// One output of a translation job
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Derivative {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub messages: Vec<Value>,
    #[serde(default)]
    pub children: Vec<DerivativeChild>,
}

/// Manifest document describing translation progress and outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urn: Option<String>,
    /// Status exactly as the derivative service reported it
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<String>,
    #[serde(default)]
    pub derivatives: Vec<Derivative>,
}

impl Manifest {
    pub fn new(status: ManifestStatus) -> Self {
        Self::with_status(status.as_str())
    }

    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            urn: None,
            status: status.into(),
            progress: None,
            derivatives: Vec::new(),
        }
    }

    pub fn state(&self) -> ManifestStatus {
        ManifestStatus::parse(&self.status)
    }

    pub fn with_progress(mut self, progress: impl Into<String>) -> Self {
        self.progress = Some(progress.into());
        self
    }

    pub fn with_derivative(mut self, derivative: Derivative) -> Self {
        self.derivatives.push(derivative);
        self
    }

    /// Diagnostic messages of every derivative followed by those of its
    /// children, in encounter order
    pub fn collect_messages(&self) -> Vec<Value> {
        let mut messages = Vec::new();

        for derivative in &self.derivatives {
            messages.extend(derivative.messages.iter().cloned());

            for child in &derivative.children {
                messages.extend(child.messages.iter().cloned());
            }
        }

        messages
    }
}

/// Status summary exposed by the status endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Value>>,
}

impl ModelStatus {
    pub const NOT_AVAILABLE: &'static str = "n/a";

    /// Status reported while no manifest exists for a URN
    pub fn not_available() -> Self {
        Self {
            status: Self::NOT_AVAILABLE.to_string(),
            progress: None,
            messages: None,
        }
    }

    pub fn from_manifest(manifest: &Manifest) -> Self {
        Self {
            status: manifest.status.clone(),
            progress: manifest.progress.clone(),
            messages: Some(manifest.collect_messages()),
        }
    }

    pub fn is_not_available(&self) -> bool {
        self.status == Self::NOT_AVAILABLE
    }
}
