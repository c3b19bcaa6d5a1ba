//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Cardwise - Spending insights for virtual cards
#[derive(Parser)]
#[command(name = "cardwise")]
#[command(about = "Run the cardwise insights engine over transaction fixtures", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a transaction list and print insights
    Insights {
        /// JSON file holding the transaction list
        #[arg(short, long)]
        transactions: PathBuf,

        /// JSON file holding the cards ([{id, closed, paused}])
        #[arg(short, long)]
        cards: Option<PathBuf>,

        /// Engine config (defaults to the data-dir override or built-in config)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Catalog file (defaults to the data-dir override or built-in catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Skip AI enrichment even if a backend is configured
        #[arg(long)]
        no_ai: bool,

        /// Print the payload as JSON
        #[arg(long)]
        json: bool,
    },

    /// List subscription services and stores in the catalog
    Catalog {
        /// Catalog file (defaults to the data-dir override or built-in catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Manage the enrichment prompt
    Prompts {
        #[command(subcommand)]
        action: PromptsAction,
    },

    /// Check the configured AI backend
    Ai {
        #[command(subcommand)]
        action: AiAction,
    },
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// Show the effective content of a prompt
    Show {
        /// Prompt ID
        #[arg(default_value = "spending_insights")]
        prompt_id: String,
    },

    /// Show the path where prompt overrides should be placed
    Path,
}

#[derive(Subcommand)]
pub enum AiAction {
    /// Health-check the backend selected by AI_BACKEND
    Test,
}
