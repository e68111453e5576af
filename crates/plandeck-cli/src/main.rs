//! Plandeck CLI Application
//!
//! Command-line client for plans shared through a Plandeck server.

mod args;
mod cli;
mod handlers;
mod renderer;

use std::time::Duration;

use anyhow::{Context, Result};
use args::Args;
use clap::Parser;
use handlers::Cli;
use log::info;
use plandeck_core::{PlannerBuilder, PlannerError};
use renderer::TerminalRenderer;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        server,
        refresh_interval,
        no_color,
        command,
    } = Args::parse();

    let mut builder =
        PlannerBuilder::new().with_refresh_interval(Duration::from_secs(refresh_interval));
    if let Some(path) = database_file {
        builder = builder.with_database_path(path);
    }
    if let Some(url) = server {
        builder = builder.with_server_url(url);
    }
    let planner = builder
        .build()
        .await
        .context("Failed to initialize planner")?;

    info!("Plandeck started");

    let cli = Cli::new(planner.clone(), TerminalRenderer::new(!no_color));
    let result = cli.run(command).await;
    planner.flush().await;

    match result {
        // Local state already reflects the attempt; report and carry on
        Err(e) if is_recoverable(&e) => {
            cli.renderer().warn(format!("{e:#}"));
            Ok(())
        }
        other => other,
    }
}

fn is_recoverable(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<PlannerError>()
        .is_some_and(PlannerError::is_recoverable)
}
