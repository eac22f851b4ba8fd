//! Upload command - upload a design file and follow its translation

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use crate::client::{
    ApiClient, ConsoleViewer, DEFAULT_SERVER_URL, SelectionController, UploadController,
    UploadFile, format_file_size,
};

/// Arguments for the upload command
#[derive(Args, Clone)]
pub struct UploadArgs {
    /// Design file to upload
    pub path: PathBuf,

    /// Root design inside a zip archive, e.g. `model.rvt`
    #[arg(long)]
    pub entrypoint: Option<String>,

    /// Base URL of a running viewer server
    #[arg(long, default_value = DEFAULT_SERVER_URL)]
    pub server: String,

    /// Return once the upload is accepted instead of following the translation
    #[arg(long)]
    pub no_follow: bool,
}

/// Run the upload command
pub async fn run(args: UploadArgs) -> anyhow::Result<()> {
    let _logging = super::init_client_logging()?;

    let api = ApiClient::new(&args.server);
    let selection = SelectionController::new(api.clone(), Arc::new(ConsoleViewer::new(api.clone())));
    let uploads = UploadController::new(selection.clone());

    let file = UploadFile::from_path(&args.path).await?;
    println!("Uploading {} ({})", file.name, format_file_size(file.size()));

    let model = uploads.upload(file, args.entrypoint).await?;
    println!("Upload successful: {} has been uploaded and translation started", model.name);
    println!("urn: {}", model.urn);

    if args.no_follow {
        selection.cancel();
        return Ok(());
    }

    super::follow(&selection, &api).await?;

    Ok(())
}
