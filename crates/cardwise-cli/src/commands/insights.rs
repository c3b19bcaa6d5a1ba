//! Insights command implementation

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use cardwise_core::ai::AIBackend;
use cardwise_core::{
    AIClient, Card, Catalog, EngineConfig, InMemoryCards, InsightItem, InsightsEngine,
    InsightsPayload, StaticTransactions,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Inputs of one insights run
#[derive(Debug, Clone)]
pub struct InsightsOptions {
    pub transactions: PathBuf,
    pub cards: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub no_ai: bool,
}

/// Read the transaction fixture as raw JSON (validated by the engine)
pub fn load_transactions(path: &Path) -> Result<serde_json::Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read transactions from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Read the cards fixture; no file means no known cards
pub fn load_cards(path: Option<&Path>) -> Result<InMemoryCards> {
    let Some(path) = path else {
        return Ok(InMemoryCards::default());
    };

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read cards from {}", path.display()))?;
    let cards: Vec<Card> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON list of cards", path.display()))?;
    Ok(InMemoryCards::new(cards))
}

/// Build the engine and run the full pipeline over the fixture files
pub async fn run_insights(options: &InsightsOptions) -> Result<InsightsPayload> {
    let config = EngineConfig::load(options.config.as_deref()).context("Failed to load config")?;
    let catalog = Catalog::load(options.catalog.as_deref()).context("Failed to load catalog")?;

    let mut engine = InsightsEngine::new(Arc::new(catalog), config);
    if !options.no_ai {
        match AIClient::from_env() {
            Some(client) => {
                tracing::debug!(model = client.model(), host = client.host(), "AI enrichment enabled");
                engine = engine.with_ai(client);
            }
            None => tracing::debug!("No AI backend configured, skipping enrichment"),
        }
    }

    let source = StaticTransactions(load_transactions(&options.transactions)?);
    let cards = load_cards(options.cards.as_deref())?;

    let payload = engine
        .generate_insights(&source, &cards)
        .await
        .context("Failed to generate insights")?;
    Ok(payload)
}

/// Run the engine and print the payload
pub async fn cmd_insights(options: &InsightsOptions, json: bool) -> Result<()> {
    let payload = run_insights(options).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print!("{}", render_payload(&payload));
    }

    Ok(())
}

/// Human-readable rendering of a payload
pub fn render_payload(payload: &InsightsPayload) -> String {
    let mut out = String::new();

    render_section(&mut out, "Overview", &payload.overview);
    render_section(&mut out, "Savings", &payload.savings);
    render_section(&mut out, "Subscriptions", &payload.subscription_advice);

    let charts = &payload.chart_data;

    if !charts.category_breakdown.is_empty() {
        out.push_str("Spending by category\n");
        for point in &charts.category_breakdown {
            out.push_str(&format!("  {:<20} {:>6}%\n", point.label, point.value));
        }
        out.push('\n');
    }

    out.push_str("Spending by weekday\n");
    let max = charts
        .weekly_spending
        .iter()
        .map(|p| p.value)
        .max()
        .unwrap_or(Decimal::ZERO);
    for point in &charts.weekly_spending {
        out.push_str(&format!(
            "  {}  {:>10}  {}\n",
            point.label,
            point.value,
            bar(point.value, max, 30)
        ));
    }
    out.push('\n');

    if !charts.recurring_spending.is_empty() {
        out.push_str("Top recurring charges\n");
        for point in &charts.recurring_spending {
            let tier = point
                .subscription_data
                .as_ref()
                .map(|s| format!(" ({} tier)", s.current_tier))
                .unwrap_or_default();
            out.push_str(&format!("  {:<20} {:>10}{}\n", point.label, point.value, tier));
        }
        out.push('\n');
    }

    out.push_str(&format!("AI enrichment: {}\n", payload.enrichment));
    out
}

fn render_section(out: &mut String, heading: &str, items: &[InsightItem]) {
    out.push_str(heading);
    out.push('\n');
    for item in items {
        out.push_str(&format!("  {}: {}\n", item.title, item.value));
        if let Some(subtitle) = &item.subtitle {
            out.push_str(&format!("    {}\n", subtitle));
        }
    }
    out.push('\n');
}

/// Proportional bar of `#` characters
fn bar(value: Decimal, max: Decimal, width: usize) -> String {
    if max <= Decimal::ZERO || value <= Decimal::ZERO {
        return String::new();
    }
    let len = (value / max * Decimal::from(width))
        .round()
        .to_usize()
        .unwrap_or(0)
        .max(1);
    "#".repeat(len.min(width))
}
