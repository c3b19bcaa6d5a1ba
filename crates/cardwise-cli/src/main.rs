//! Cardwise CLI - developer harness for the insights engine
//!
//! Usage:
//!   cardwise insights --transactions tx.json --cards cards.json
//!   cardwise catalog              List catalog services and stores
//!   cardwise prompts show         Show the enrichment prompt
//!   cardwise ai test              Check the configured AI backend

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Insights {
            transactions,
            cards,
            config,
            catalog,
            no_ai,
            json,
        } => {
            let options = commands::InsightsOptions {
                transactions,
                cards,
                config,
                catalog,
                no_ai,
            };
            commands::cmd_insights(&options, json).await
        }
        Commands::Catalog { catalog } => commands::cmd_catalog(catalog.as_deref()),
        Commands::Prompts { action } => match action {
            PromptsAction::Show { prompt_id } => commands::cmd_prompts_show(&prompt_id),
            PromptsAction::Path => commands::cmd_prompts_path(),
        },
        Commands::Ai { action } => match action {
            AiAction::Test => commands::cmd_ai_test().await,
        },
    }
}
