//! Deterministic transaction analysis
//!
//! # Pipeline
//!
//! 1. `classify`: raw JSON list to approved / approved-recurring transactions
//! 2. `aggregate`: merchant, category, weekday and hour groupings
//! 3. `subscriptions`: card-state filtering, catalog matching, best downgrade
//! 4. `stores`: spend per catalog store
//! 5. `ChartData::from_analysis`: generic series for rendering
//!
//! Only step 3 suspends (card lookups). Catalogs are borrowed read-only.

pub mod aggregate;
pub mod classify;
mod ordered;
pub mod stores;
pub mod subscriptions;
mod types;

pub use classify::{classify, classify_raw, parse_transactions, Classified};
pub use ordered::OrderedMap;
pub use types::*;

use tracing::debug;

use crate::catalog::Catalog;
use crate::charts::ChartData;
use crate::config::AnalysisConfig;
use crate::matcher::MerchantMatcher;
use crate::sources::CardDirectory;

/// Runs the analysis stages against shared reference data
pub struct Analyzer<'a> {
    catalog: &'a Catalog,
    matcher: &'a dyn MerchantMatcher,
    config: &'a AnalysisConfig,
}

impl<'a> Analyzer<'a> {
    pub fn new(
        catalog: &'a Catalog,
        matcher: &'a dyn MerchantMatcher,
        config: &'a AnalysisConfig,
    ) -> Self {
        Self {
            catalog,
            matcher,
            config,
        }
    }

    /// Analyze already-classified transactions
    pub async fn analyze(&self, classified: &Classified, cards: &dyn CardDirectory) -> AnalysisResult {
        let aggregates = aggregate::aggregate(&classified.approved, self.config.utc_offset_minutes);

        let active = subscriptions::active_recurring(&classified.recurring, cards).await;
        let enriched = subscriptions::enrich(
            active,
            self.catalog,
            self.matcher,
            self.config.tier_match_tolerance,
        );
        let (recurring_transactions, total_recurring_spend, recurring_overflow) =
            subscriptions::bounded_total(enriched);
        let recurring_by_merchant = subscriptions::group_by_merchant(&recurring_transactions);
        let potential_downgrade = subscriptions::best_downgrade(&recurring_transactions);

        let store_spending =
            stores::store_spending(&classified.approved, self.catalog, self.matcher);

        let mut result = AnalysisResult {
            merchant_frequency: aggregates.merchant_frequency,
            category_spending: aggregates.category_spending,
            category_total: aggregates.category_total,
            most_used_merchant: aggregates.most_used_merchant,
            highest_spending_category: aggregates.highest_spending_category,
            approved_count: classified.approved.len(),
            recurring_transactions,
            total_recurring_spend,
            all_recurring_count: classified.recurring.len(),
            recurring_by_merchant,
            date_analysis: aggregates.date_analysis,
            potential_downgrade,
            store_spending,
            skipped_records: classified.skipped + aggregates.skipped + recurring_overflow,
            chart_data: ChartData::default(),
        };
        result.chart_data = ChartData::from_analysis(&result, self.config.top_n);

        debug!(
            approved = result.approved_count,
            active_recurring = result.recurring_transactions.len(),
            all_recurring = result.all_recurring_count,
            stores = result.store_spending.len(),
            skipped = result.skipped_records,
            "Analysis complete"
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::ContainmentMatcher;
    use crate::models::{Card, Transaction};
    use crate::sources::InMemoryCards;
    use crate::test_utils::{active_card, dec, TransactionBuilder};
    use rust_decimal::Decimal;

    fn classified(txs: Vec<Transaction>) -> Classified {
        classify(txs)
    }

    async fn run(txs: Vec<Transaction>, cards: InMemoryCards) -> AnalysisResult {
        let catalog = Catalog::embedded().unwrap();
        let config = AnalysisConfig::default();
        Analyzer::new(&catalog, &ContainmentMatcher, &config)
            .analyze(&classified(txs), &cards)
            .await
    }

    #[tokio::test]
    async fn test_recurring_totals_only_cover_active_cards() {
        let cards = InMemoryCards::new(vec![
            active_card("card_1"),
            Card {
                id: "card_2".into(),
                closed: false,
                paused: true,
            },
        ]);
        let txs = vec![
            TransactionBuilder::new("1", "Netflix", dec("15.49")).recurring().build(),
            TransactionBuilder::new("2", "Spotify", dec("11.99")).card("card_2").recurring().build(),
            TransactionBuilder::new("3", "Starbucks", dec("6.20")).category("Dining").build(),
        ];

        let result = run(txs, cards).await;

        assert_eq!(result.approved_count, 3);
        assert_eq!(result.recurring_transactions.len(), 1);
        assert_eq!(result.all_recurring_count, 2);
        assert_eq!(result.inactive_recurring_count(), 1);
        assert_eq!(result.total_recurring_spend, dec("15.49"));
        assert!(result.recurring_by_merchant.contains_key("Netflix"));
        assert!(!result.recurring_by_merchant.contains_key("Spotify"));
        // charges on inactive cards still count as approved spend
        assert_eq!(result.merchant_frequency.get("Spotify"), Some(&1));
    }

    #[tokio::test]
    async fn test_category_breakdown_uses_full_total() {
        let categories = ["A", "B", "C", "D", "E", "F"];
        let txs = categories
            .iter()
            .enumerate()
            .map(|(i, c)| {
                TransactionBuilder::new(&i.to_string(), "Shop", dec("10"))
                    .category(c)
                    .build()
            })
            .collect();

        let result = run(txs, InMemoryCards::default()).await;
        let breakdown = &result.chart_data.category_breakdown;

        assert_eq!(breakdown.len(), 5);
        assert!(breakdown.iter().all(|p| p.value == dec("16.7")));
        let visible: Decimal = breakdown.iter().map(|p| p.value).sum();
        assert!(visible < Decimal::ONE_HUNDRED);
        // equal spend keeps insertion order
        let labels: Vec<&str> = breakdown.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "C", "D", "E"]);
    }

    #[tokio::test]
    async fn test_weekly_spending_has_all_days() {
        let txs = vec![
            TransactionBuilder::new("1", "Shop", dec("10.04")).at("2024-03-10T10:00:00Z").build(),
            TransactionBuilder::new("2", "Shop", dec("2.55")).at("2024-03-16T10:00:00Z").build(),
        ];
        let result = run(txs, InMemoryCards::default()).await;
        let weekly = &result.chart_data.weekly_spending;

        assert_eq!(weekly.len(), 7);
        assert_eq!(weekly[0].label, "Sun");
        assert_eq!(weekly[0].value, dec("10.0"));
        assert_eq!(weekly[6].label, "Sat");
        assert_eq!(weekly[6].value, dec("2.6"));
        assert_eq!(weekly[3].value, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_recurring_spending_top_merchants() {
        let txs = vec![
            TransactionBuilder::new("1", "Spotify", dec("11.99")).recurring().build(),
            TransactionBuilder::new("2", "Netflix", dec("22.99")).recurring().build(),
            TransactionBuilder::new("3", "Local Gym", dec("30")).recurring().build(),
        ];
        let result = run(txs, InMemoryCards::new(vec![active_card("card_1")])).await;
        let bars = &result.chart_data.recurring_spending;

        let labels: Vec<&str> = bars.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Local Gym", "Netflix", "Spotify"]);
        assert!(bars[0].subscription_data.is_none());
        assert_eq!(
            bars[1].subscription_data.as_ref().unwrap().current_tier,
            "Premium"
        );

        let downgrade = result.potential_downgrade.unwrap();
        assert_eq!(downgrade.merchant, "Netflix");
        assert_eq!(downgrade.potential_saving, dec("16.00"));
    }
}
