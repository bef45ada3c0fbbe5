//! Tempo CLI Application
//!
//! Command-line interface for normalizing session plans, computing
//! achievements and managing locally stored session documents.

mod args;
mod cli;
mod input;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use renderer::TerminalRenderer;
use tempo_core::StoreBuilder;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        no_color,
        command,
    } = Args::parse();

    let cli = Cli::new(TerminalRenderer::new(!no_color));

    info!("Tempo started");

    match command {
        Normalize(args) => cli.normalize(args),
        Achievements(args) => cli.achievements(args),
        Session { command } => {
            let store = StoreBuilder::new()
                .with_database_path(database_file)
                .build()
                .await
                .context("Failed to initialize session store")?;
            cli.handle_session_command(&store, command).await
        }
    }
}
