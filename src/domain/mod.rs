//! Domain layer - Core workflow types and vendor service contracts

pub mod error;
pub mod manifest;
pub mod model;
pub mod storage;
pub mod token;
pub mod translation;

pub use error::DomainError;
pub use manifest::{Manifest, ManifestStatus, ModelStatus};
pub use model::{ModelRef, UploadValidationError};
pub use storage::{ObjectStore, StoredObject};
pub use token::{AccessToken, TokenProvider, TokenResponse, TokenScope};
pub use translation::{PollPolicy, TranslationJob, TranslationService, wait_for_translation};
