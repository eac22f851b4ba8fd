//! Viewer client: typed API access plus the selection and upload flows
//! that the browser page runs, usable from the command line.

mod api;
mod controls;
mod error;
mod selection;
mod upload;
pub mod viewer;

pub use api::{ApiClient, DEFAULT_SERVER_URL};
pub use controls::{Controls, ControlsGuard};
pub use error::ClientError;
pub use selection::{
    STATUS_POLL_INTERVAL, SelectionController, SelectionState, choose_model, progress_percent,
};
pub use upload::{REFRESH_DELAY, UploadController, UploadFile, format_file_size};
pub use viewer::{ConsoleViewer, Viewer, ViewerError, ViewerHandle, document_id};
