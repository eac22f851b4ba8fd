use aps_model_viewer::cli::{self, Cli, Command};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => cli::serve::run().await,
        Command::Watch(args) => cli::watch::run(args).await,
        Command::Upload(args) => cli::upload::run(args).await,
    }
}
