//! Cardwise Core Library
//!
//! Transaction analytics and insights for virtual payment cards:
//! - Transaction classification and spend aggregation
//! - Subscription catalog matching and tier downgrade detection
//! - Store spending from embedded purchase metadata
//! - Chart series for any rendering layer
//! - Deterministic insights with optional AI enrichment
//! - Pluggable generative-text backends (Ollama, OpenAI-compatible)
//! - Prompt library for customizable AI prompts

pub mod ai;
pub mod analysis;
pub mod catalog;
pub mod charts;
pub mod config;
pub mod error;
pub mod insights;
pub mod matcher;
pub mod models;
pub mod prompts;
pub mod sources;

/// Test utilities including mock generative-text server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    AIBackend, AIClient, AiInsights, InsightsEnricher, MockBackend, OllamaBackend,
    OpenAICompatibleBackend,
};
pub use analysis::{AnalysisResult, Analyzer, Classified};
pub use catalog::{Catalog, Store, SubscriptionService, Tier};
pub use charts::{ChartData, ChartPoint, RecurringPoint};
pub use config::{AiConfig, AiContentPolicy, AnalysisConfig, EngineConfig};
pub use error::{Error, Result};
pub use insights::{
    EnrichmentStatus, InsightItem, InsightsEngine, InsightsPayload, InsightsSession, RequestTicket,
};
pub use matcher::{ContainmentMatcher, ExactMatcher, MerchantMatcher};
pub use models::{Card, PurchaseItem, PurchaseMetadata, StatusFamily, Transaction};
pub use prompts::{Prompt, PromptId, PromptLibrary};
pub use sources::{CardDirectory, InMemoryCards, StaticTransactions, TransactionSource};
