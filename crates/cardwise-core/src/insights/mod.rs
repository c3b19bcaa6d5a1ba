//! Insights - deterministic baseline plus optional AI enrichment
//!
//! Generating insights is a two-phase pipeline:
//!
//! 1. `InsightsEngine::compute_baseline` turns an analysis into a payload
//!    with no external calls. This is the floor every request gets.
//! 2. `InsightsEngine::try_enrich` asks a generative-text backend for
//!    narrative insights. Failure here only changes the `enrichment` status.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cardwise_core::insights::InsightsEngine;
//!
//! let engine = InsightsEngine::new(Arc::new(catalog), config).with_ai(client);
//! let payload = engine.generate_insights(&source, &cards).await?;
//! ```

pub mod engine;
pub mod synthesizer;
pub mod types;

pub use engine::{apply_response, InsightsEngine, InsightsSession, RequestTicket, AI_ITEM_TITLE};
pub use synthesizer::{format_money, synthesize};
pub use types::{EnrichmentStatus, InsightItem, InsightsPayload};
