//! Bounded polling of a translation manifest

use std::time::Duration;

use tracing::debug;

use super::TranslationService;
use crate::domain::DomainError;
use crate::domain::manifest::{Manifest, ManifestStatus};

/// Fixed-interval, bounded-attempt polling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 30,
        }
    }
}

/// Poll the manifest of `urn` until the translation succeeds, fails or the
/// attempts run out
pub async fn wait_for_translation<T>(
    service: &T,
    urn: &str,
    policy: PollPolicy,
) -> Result<Manifest, DomainError>
where
    T: TranslationService + ?Sized,
{
    for attempt in 1..=policy.max_attempts {
        if let Some(manifest) = service.get_manifest(urn).await? {
            debug!(
                urn = %urn,
                attempt,
                status = %manifest.status,
                progress = manifest.progress.as_deref().unwrap_or(""),
                "Polled translation manifest"
            );

            match manifest.state() {
                ManifestStatus::Success => return Ok(manifest),
                ManifestStatus::Failed | ManifestStatus::Timeout => {
                    let detail = manifest
                        .collect_messages()
                        .iter()
                        .filter_map(|m| m.get("message").and_then(|v| v.as_str()))
                        .collect::<Vec<_>>()
                        .join("; ");

                    return Err(DomainError::translation_failed(
                        urn,
                        if detail.is_empty() {
                            format!("manifest status {}", manifest.status)
                        } else {
                            detail
                        },
                    ));
                }
                _ => {}
            }
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    Err(DomainError::timeout(urn, policy.max_attempts))
}
