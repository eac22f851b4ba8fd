//! Infrastructure services

mod model_service;

pub use model_service::{ModelService, UploadModelRequest};
