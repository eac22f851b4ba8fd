//! Model selection state machine
//!
//! Selecting a model spawns one tracking task that polls the status endpoint
//! until the translation settles and then hands the model to the viewer.
//! Selecting again aborts that task and starts a new one.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::api::ApiClient;
use super::controls::Controls;
use super::error::ClientError;
use super::viewer::{Viewer, ViewerHandle};
use crate::domain::{ManifestStatus, ModelRef, ModelStatus};

/// Delay between status checks while a translation is running
pub const STATUS_POLL_INTERVAL: Duration = Duration::from_secs(5);

static PROGRESS_PERCENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)%").expect("progress pattern is a valid regex"));

/// First percentage found in a progress text such as `"45% complete"`
pub fn progress_percent(progress: &str) -> Option<u8> {
    PROGRESS_PERCENT
        .captures(progress)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u8>().ok())
}

/// The requested model when listed, else the first one
pub fn choose_model(models: &[ModelRef], preferred: Option<&str>) -> Option<String> {
    preferred
        .and_then(|urn| models.iter().find(|m| m.urn == urn))
        .or_else(|| models.first())
        .map(|m| m.urn.clone())
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionState {
    Idle,
    Listing,
    Selected {
        urn: String,
    },
    PollingStatus {
        urn: String,
    },
    NotTranslated {
        urn: String,
    },
    InProgress {
        urn: String,
        progress: Option<String>,
        percent: Option<u8>,
    },
    Failed {
        urn: String,
        messages: Vec<Value>,
    },
    LoadingViewer {
        urn: String,
    },
    Ready {
        urn: String,
    },
    Error {
        message: String,
    },
}

impl SelectionState {
    /// No further transition happens without user action
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            Self::NotTranslated { .. } | Self::Failed { .. } | Self::Ready { .. } | Self::Error { .. }
        )
    }

    pub fn urn(&self) -> Option<&str> {
        match self {
            Self::Selected { urn }
            | Self::PollingStatus { urn }
            | Self::NotTranslated { urn }
            | Self::InProgress { urn, .. }
            | Self::Failed { urn, .. }
            | Self::LoadingViewer { urn }
            | Self::Ready { urn } => Some(urn),
            Self::Idle | Self::Listing | Self::Error { .. } => None,
        }
    }
}

impl fmt::Display for SelectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Listing => write!(f, "Listing models"),
            Self::Selected { urn } => write!(f, "Selected {}", urn),
            Self::PollingStatus { .. } => write!(f, "Checking translation status"),
            Self::NotTranslated { .. } => write!(
                f,
                "Model not translated: it has not been processed yet"
            ),
            Self::InProgress {
                progress, percent, ..
            } => {
                write!(
                    f,
                    "Translating model: {}",
                    progress.as_deref().unwrap_or("Processing...")
                )?;
                if let Some(percent) = percent {
                    write!(f, " [{}%]", percent)?;
                }
                Ok(())
            }
            Self::Failed { messages, .. } => {
                if messages.is_empty() {
                    return write!(f, "Translation failed: no specific error details available");
                }
                let details: Vec<String> = messages.iter().map(describe_message).collect();
                write!(f, "Translation failed: {}", details.join("; "))
            }
            Self::LoadingViewer { .. } => write!(f, "Loading model..."),
            Self::Ready { urn } => write!(f, "Model {} loaded", urn),
            Self::Error { message } => write!(f, "Error: {}", message),
        }
    }
}

fn describe_message(message: &Value) -> String {
    match message {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

enum StatusKind {
    NotAvailable,
    InProgress,
    Failed,
    Viewable,
}

fn status_kind(status: &ModelStatus) -> StatusKind {
    if status.is_not_available() {
        return StatusKind::NotAvailable;
    }

    match ManifestStatus::parse(&status.status) {
        ManifestStatus::Pending | ManifestStatus::InProgress => StatusKind::InProgress,
        ManifestStatus::Failed | ManifestStatus::Timeout => StatusKind::Failed,
        ManifestStatus::Success | ManifestStatus::Unknown => StatusKind::Viewable,
    }
}

#[derive(Clone)]
pub struct SelectionController {
    api: ApiClient,
    viewer: Arc<dyn Viewer>,
    controls: Controls,
    state: Arc<watch::Sender<SelectionState>>,
    generation: Arc<AtomicU64>,
    tracking: Arc<Mutex<Option<JoinHandle<()>>>>,
    viewer_handle: Arc<tokio::sync::Mutex<Option<ViewerHandle>>>,
    poll_interval: Duration,
}

impl SelectionController {
    pub fn new(api: ApiClient, viewer: Arc<dyn Viewer>) -> Self {
        let (state, _) = watch::channel(SelectionState::Idle);

        Self {
            api,
            viewer,
            controls: Controls::default(),
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            tracking: Arc::new(Mutex::new(None)),
            viewer_handle: Arc::new(tokio::sync::Mutex::new(None)),
            poll_interval: STATUS_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Inputs that an upload disables; selections are ignored meanwhile
    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn state(&self) -> SelectionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SelectionState> {
        self.state.subscribe()
    }

    /// Initialize the viewer once; later calls reuse the handle
    pub async fn init_viewer(&self) -> Result<ViewerHandle, ClientError> {
        let mut slot = self.viewer_handle.lock().await;

        if let Some(handle) = slot.as_ref() {
            return Ok(handle.clone());
        }

        let handle = self.viewer.init().await?;
        *slot = Some(handle.clone());

        Ok(handle)
    }

    /// Fetch the model list and select `preferred`, or the first model
    pub async fn refresh(&self, preferred: Option<&str>) -> Result<Vec<ModelRef>, ClientError> {
        let generation = self.cancel();
        self.publish(generation, SelectionState::Listing);

        let models = match self.api.list_models().await {
            Ok(models) => models,
            Err(e) => {
                warn!(error = %e, "Could not list models");
                self.publish(
                    generation,
                    SelectionState::Error {
                        message: format!("Could not list models: {}", e),
                    },
                );
                return Err(e);
            }
        };

        debug!(count = models.len(), "Listed models");

        match choose_model(&models, preferred) {
            Some(urn) => {
                self.select(&urn);
            }
            None => {
                self.publish(generation, SelectionState::Idle);
            }
        }

        Ok(models)
    }

    /// Replace the current selection with `urn`; returns false while the
    /// controls are disabled
    pub fn select(&self, urn: &str) -> bool {
        if !self.controls.is_enabled() {
            debug!(urn = %urn, "Selection ignored while an upload is running");
            return false;
        }

        let generation = self.cancel();
        let urn = urn.trim().to_string();

        if urn.is_empty() {
            self.publish(generation, SelectionState::Idle);
            return true;
        }

        info!(urn = %urn, "Model selected");
        self.publish(generation, SelectionState::Selected { urn: urn.clone() });

        let controller = self.clone();
        let task = tokio::spawn(async move { controller.track(generation, urn).await });

        *self.tracking.lock().unwrap_or_else(|e| e.into_inner()) = Some(task);
        true
    }

    /// Abort the tracking task; returns the generation of the next selection
    pub fn cancel(&self) -> u64 {
        if let Some(task) = self
            .tracking
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            task.abort();
        }

        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publish `next` unless a newer selection has started
    fn publish(&self, generation: u64, next: SelectionState) -> bool {
        self.state.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *current = next;
            true
        })
    }

    async fn track(&self, generation: u64, urn: String) {
        loop {
            self.publish(generation, SelectionState::PollingStatus { urn: urn.clone() });

            let status = match self.api.get_status(&urn).await {
                Ok(status) => status,
                Err(e) => {
                    warn!(urn = %urn, error = %e, "Could not get model status");
                    self.publish(
                        generation,
                        SelectionState::Error {
                            message: e.to_string(),
                        },
                    );
                    return;
                }
            };

            match status_kind(&status) {
                StatusKind::NotAvailable => {
                    self.publish(generation, SelectionState::NotTranslated { urn });
                    return;
                }
                StatusKind::InProgress => {
                    let percent = status.progress.as_deref().and_then(progress_percent);
                    self.publish(
                        generation,
                        SelectionState::InProgress {
                            urn: urn.clone(),
                            progress: status.progress,
                            percent,
                        },
                    );
                    tokio::time::sleep(self.poll_interval).await;
                }
                StatusKind::Failed => {
                    self.publish(
                        generation,
                        SelectionState::Failed {
                            urn,
                            messages: status.messages.unwrap_or_default(),
                        },
                    );
                    return;
                }
                StatusKind::Viewable => {
                    self.show(generation, urn).await;
                    return;
                }
            }
        }
    }

    async fn show(&self, generation: u64, urn: String) {
        self.publish(generation, SelectionState::LoadingViewer { urn: urn.clone() });

        let result = match self.init_viewer().await {
            Ok(handle) => self.viewer.load(&handle, &urn).await.map_err(ClientError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                info!(urn = %urn, "Model loaded in viewer");
                self.publish(generation, SelectionState::Ready { urn });
            }
            Err(e) => {
                warn!(urn = %urn, error = %e, "Failed to load model");
                self.publish(
                    generation,
                    SelectionState::Error {
                        message: e.to_string(),
                    },
                );
            }
        }
    }
}
