//! CLI command tests

use std::io::Write;
use std::path::PathBuf;

use cardwise_core::{Catalog, EnrichmentStatus};
use tempfile::NamedTempFile;

use crate::commands::{self, truncate, InsightsOptions};

fn write_fixture(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

const TRANSACTIONS: &str = r#"[
  {"id": "1", "cardId": "card_a", "merchant": "Netflix", "amount": 15.49, "status": "approved",
   "createdAt": "2024-03-04T09:00:00Z", "recurring": true, "category": "Entertainment"},
  {"id": "2", "cardId": "card_b", "merchant": "Spotify", "amount": 10.99, "status": "settled",
   "createdAt": "2024-03-05T09:00:00Z", "recurring": true},
  {"id": "3", "cardId": "card_a", "merchant": "Whole Foods", "amount": 82.10, "status": "COMPLETED",
   "createdAt": "2024-03-09T17:00:00Z", "category": "Groceries"},
  {"id": "4", "cardId": "card_a", "merchant": "Target", "amount": 30.00, "status": "declined",
   "createdAt": "2024-03-09T18:00:00Z", "category": "Shopping"}
]"#;

const CARDS: &str = r#"[
  {"id": "card_a", "closed": false, "paused": false},
  {"id": "card_b", "closed": false, "paused": true}
]"#;

fn options(transactions: PathBuf, cards: Option<PathBuf>) -> InsightsOptions {
    InsightsOptions {
        transactions,
        cards,
        config: None,
        catalog: None,
        no_ai: true,
    }
}

// ========== Insights Command Tests ==========

#[tokio::test]
async fn test_run_insights_from_fixtures() {
    let tx = write_fixture(TRANSACTIONS);
    let cards = write_fixture(CARDS);

    let payload = commands::run_insights(&options(
        tx.path().to_path_buf(),
        Some(cards.path().to_path_buf()),
    ))
    .await
    .unwrap();

    assert_eq!(payload.enrichment, EnrichmentStatus::Skipped);
    assert_eq!(payload.overview[1].value, "Groceries");
    assert_eq!(payload.overview[2].value, "$15.49");
    assert_eq!(payload.subscription_advice[0].value, "1 of 2");
    assert_eq!(payload.chart_data.weekly_spending.len(), 7);
}

#[tokio::test]
async fn test_run_insights_without_cards_drops_recurring() {
    let tx = write_fixture(TRANSACTIONS);
    let payload = commands::run_insights(&options(tx.path().to_path_buf(), None))
        .await
        .unwrap();

    assert_eq!(payload.overview[2].value, "$0.00");
    assert_eq!(payload.subscription_advice[0].value, "0 of 2");
}

#[tokio::test]
async fn test_run_insights_rejects_non_list() {
    let tx = write_fixture(r#"{"transactions": []}"#);
    let err = commands::run_insights(&options(tx.path().to_path_buf(), None))
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("Invalid input"));
}

#[tokio::test]
async fn test_run_insights_missing_file() {
    let err = commands::run_insights(&options(PathBuf::from("/nonexistent/tx.json"), None))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to read transactions"));
}

#[tokio::test]
async fn test_run_insights_with_custom_config() {
    let tx = write_fixture(TRANSACTIONS);
    let cards = write_fixture(CARDS);
    let config = write_fixture("[analysis]\nbase_savings_rate = 0.5\n\n[ai]\nenabled = false\n");

    let mut opts = options(tx.path().to_path_buf(), Some(cards.path().to_path_buf()));
    opts.config = Some(config.path().to_path_buf());
    opts.no_ai = false;

    let payload = commands::run_insights(&opts).await.unwrap();
    // 50% of 15.49 plus the Standard -> Standard with ads saving of 8.50
    assert_eq!(payload.savings[0].value, "$16.25");
    assert_eq!(payload.enrichment, EnrichmentStatus::Skipped);
}

#[test]
fn test_load_cards_rejects_bad_json() {
    let cards = write_fixture("not json");
    assert!(commands::load_cards(Some(cards.path())).is_err());
    assert!(commands::load_cards(None).unwrap().is_empty());
}

#[tokio::test]
async fn test_render_payload() {
    let tx = write_fixture(TRANSACTIONS);
    let cards = write_fixture(CARDS);
    let payload = commands::run_insights(&options(
        tx.path().to_path_buf(),
        Some(cards.path().to_path_buf()),
    ))
    .await
    .unwrap();

    let text = commands::render_payload(&payload);
    assert!(text.contains("Overview"));
    assert!(text.contains("Most Used Merchant: Netflix"));
    assert!(text.contains("Sat"));
    assert!(text.contains("Netflix") && text.contains("(Standard tier)"));
    assert!(text.contains("AI enrichment: skipped"));
}

// ========== Catalog Command Tests ==========

#[test]
fn test_render_catalog() {
    let catalog = Catalog::embedded().unwrap();
    let text = commands::render_catalog(&catalog);

    assert!(text.contains("Netflix"));
    assert!(text.contains("Standard with ads"));
    assert!(text.contains("(cheapest)"));
    assert!(text.contains("Whole Foods"));
}

#[test]
fn test_cmd_catalog_bad_path() {
    assert!(commands::cmd_catalog(Some(std::path::Path::new("/nonexistent/catalog.toml"))).is_err());
}

// ========== Prompts Command Tests ==========

#[test]
fn test_cmd_prompts_show_unknown() {
    let err = commands::cmd_prompts_show("nope").unwrap_err();
    assert!(err.to_string().contains("spending_insights"));
}

#[test]
fn test_cmd_prompts_path() {
    assert!(commands::cmd_prompts_path().is_ok());
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a longer sentence", 10), "a longe...");
    assert_eq!(truncate("café au lait", 7), "café...");
}
