//! Translation manifest domain

mod entity;

pub use entity::{Derivative, DerivativeChild, Manifest, ManifestStatus, ModelStatus};
