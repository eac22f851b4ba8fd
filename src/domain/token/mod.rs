//! Access token domain

mod provider;
#[allow(clippy::module_inception)]
mod token;

pub use provider::TokenProvider;
pub use token::{AccessToken, TokenResponse, TokenScope};

#[cfg(test)]
pub use provider::mock;
