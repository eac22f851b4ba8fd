//! Translation (model derivative) domain

mod poll;
mod service;

pub use poll::{PollPolicy, wait_for_translation};
pub use service::{OutputFormat, TranslationJob, TranslationService};

#[cfg(test)]
pub use service::mock;
