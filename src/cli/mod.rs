//! CLI module for the APS model viewer
//!
//! Provides subcommands:
//! - `serve`: API + static viewer page (default)
//! - `watch`: follow a model's translation against a running server
//! - `upload`: upload a design file to a running server and follow it

pub mod serve;
pub mod upload;
pub mod watch;

use clap::{Parser, Subcommand};

use crate::client::{ApiClient, SelectionController, SelectionState};
use crate::config::{LogFormat, LoggingConfig};
use crate::infrastructure::logging::{LoggingGuard, init_logging};

/// APS Model Viewer - upload, translate and view design files
#[derive(Parser)]
#[command(name = "aps-model-viewer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API and serve the viewer page (default mode)
    Serve,

    /// Follow the translation of a model and load it once ready
    Watch(watch::WatchArgs),

    /// Upload a design file and follow its translation
    Upload(upload::UploadArgs),
}

/// Console-only logging for the client commands
fn init_client_logging() -> anyhow::Result<LoggingGuard> {
    let config = LoggingConfig {
        level: "warn".to_string(),
        format: LogFormat::Pretty,
        to_console: true,
        to_file: false,
        ..LoggingConfig::default()
    };

    Ok(init_logging(&config)?)
}

/// Print every selection state until the flow settles
async fn follow(selection: &SelectionController, api: &ApiClient) -> anyhow::Result<SelectionState> {
    let mut rx = selection.subscribe();

    loop {
        let state = rx.borrow_and_update().clone();

        match &state {
            SelectionState::Idle => return Ok(state),
            SelectionState::Ready { urn } => {
                println!("{}", state);
                println!("Open {} to view it", api.viewer_url(urn));
                return Ok(state);
            }
            SelectionState::Error { message } => {
                anyhow::bail!("{}", message);
            }
            other => {
                println!("{}", other);
                if other.is_settled() {
                    return Ok(state);
                }
            }
        }

        rx.changed().await?;
    }
}
