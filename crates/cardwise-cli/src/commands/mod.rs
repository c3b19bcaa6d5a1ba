//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `ai` - Generative-text backend checks
//! - `catalog` - Catalog listing
//! - `insights` - Running the engine over fixture files
//! - `prompts` - Prompt library commands

pub mod ai;
pub mod catalog;
pub mod insights;
pub mod prompts;

// Re-export command functions for main.rs
pub use ai::*;
pub use catalog::*;
pub use insights::*;
pub use prompts::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
