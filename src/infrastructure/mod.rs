//! Infrastructure layer - External service implementations

pub mod aps;
pub mod logging;
pub mod services;
