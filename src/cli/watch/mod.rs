//! Watch command - select a model and follow it until it can be viewed

use std::sync::Arc;

use clap::Args;

use crate::client::{ApiClient, ConsoleViewer, DEFAULT_SERVER_URL, SelectionController};

/// Arguments for the watch command
#[derive(Args, Clone)]
pub struct WatchArgs {
    /// Model urn to select; defaults to the first listed model
    pub urn: Option<String>,

    /// Base URL of a running viewer server
    #[arg(long, default_value = DEFAULT_SERVER_URL)]
    pub server: String,
}

/// Run the watch command
pub async fn run(args: WatchArgs) -> anyhow::Result<()> {
    let _logging = super::init_client_logging()?;

    let api = ApiClient::new(&args.server);
    let selection = SelectionController::new(api.clone(), Arc::new(ConsoleViewer::new(api.clone())));

    selection.init_viewer().await?;

    let models = selection.refresh(args.urn.as_deref()).await?;
    if models.is_empty() {
        println!("No models available");
        return Ok(());
    }

    super::follow(&selection, &api).await?;

    Ok(())
}
