use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::DomainError;
use crate::domain::manifest::Manifest;

/// Output format requested from the derivative service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFormat {
    #[serde(rename = "type")]
    pub format_type: String,
    pub views: Vec<String>,
}

impl OutputFormat {
    /// 2D and 3D viewables for the browser viewer
    pub fn viewables() -> Self {
        Self {
            format_type: "svf2".to_string(),
            views: vec!["2d".to_string(), "3d".to_string()],
        }
    }
}

/// Translation job for a single source object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationJob {
    pub urn: String,
    /// Root design file when the source is a zip archive
    pub root_filename: Option<String>,
    pub formats: Vec<OutputFormat>,
}

impl TranslationJob {
    pub fn new(urn: impl Into<String>) -> Self {
        Self {
            urn: urn.into(),
            root_filename: None,
            formats: vec![OutputFormat::viewables()],
        }
    }

    pub fn with_root_filename(mut self, root_filename: Option<String>) -> Self {
        self.root_filename = root_filename;
        self
    }

    pub fn is_compressed(&self) -> bool {
        self.root_filename.is_some()
    }
}

/// Derivative (translation) service operations
#[async_trait]
pub trait TranslationService: Send + Sync + Debug {
    /// Submit a translation job
    async fn start_translation(&self, job: &TranslationJob) -> Result<(), DomainError>;

    /// Fetch the manifest for `urn`; `None` when no manifest exists yet
    async fn get_manifest(&self, urn: &str) -> Result<Option<Manifest>, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Translation service replaying a scripted sequence of manifests
    #[derive(Debug, Default)]
    pub struct MockTranslationService {
        manifests: Mutex<VecDeque<Option<Manifest>>>,
        jobs: Mutex<Vec<TranslationJob>>,
        fail_start: bool,
        fail_manifest: bool,
        manifest_calls: AtomicUsize,
    }

    impl MockTranslationService {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a manifest; the last queued manifest repeats forever
        pub fn with_manifest(self, manifest: Option<Manifest>) -> Self {
            self.manifests.lock().unwrap().push_back(manifest);
            self
        }

        pub fn failing_start(mut self) -> Self {
            self.fail_start = true;
            self
        }

        pub fn failing_manifest(mut self) -> Self {
            self.fail_manifest = true;
            self
        }

        pub fn jobs(&self) -> Vec<TranslationJob> {
            self.jobs.lock().unwrap().clone()
        }

        pub fn manifest_calls(&self) -> usize {
            self.manifest_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TranslationService for MockTranslationService {
        async fn start_translation(&self, job: &TranslationJob) -> Result<(), DomainError> {
            if self.fail_start {
                return Err(DomainError::upstream("derivative", "job rejected"));
            }

            self.jobs.lock().unwrap().push(job.clone());
            Ok(())
        }

        async fn get_manifest(&self, _urn: &str) -> Result<Option<Manifest>, DomainError> {
            self.manifest_calls.fetch_add(1, Ordering::SeqCst);

            if self.fail_manifest {
                return Err(DomainError::upstream("derivative", "HTTP 503"));
            }

            let mut manifests = self.manifests.lock().unwrap();

            if manifests.len() > 1 {
                Ok(manifests.pop_front().flatten())
            } else {
                Ok(manifests.front().cloned().flatten())
            }
        }
    }
}
