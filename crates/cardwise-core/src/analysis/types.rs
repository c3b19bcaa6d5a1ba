//! Intermediate analysis types

use rust_decimal::Decimal;
use serde::Serialize;

use crate::charts::ChartData;
use crate::models::Transaction;

use super::ordered::OrderedMap;

/// Sentinel used for most-used merchant / top category when there is no data
pub const NONE_SENTINEL: &str = "None";

/// Tier used when no catalog tier is priced close to the charged amount
pub const UNKNOWN_TIER: &str = "Unknown";

/// Everything derived from one transaction history
///
/// Recomputed per request and never shared between requests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub merchant_frequency: OrderedMap<u32>,
    pub category_spending: OrderedMap<Decimal>,
    /// Sum over every category (not only the charted top N)
    pub category_total: Decimal,
    pub most_used_merchant: String,
    pub highest_spending_category: String,
    pub approved_count: usize,
    /// Approved recurring transactions on active cards, enriched
    pub recurring_transactions: Vec<RecurringCharge>,
    pub total_recurring_spend: Decimal,
    /// Approved recurring transactions regardless of card state
    pub all_recurring_count: usize,
    pub recurring_by_merchant: OrderedMap<RecurringMerchant>,
    pub date_analysis: DateAnalysis,
    pub potential_downgrade: Option<DowngradeOpportunity>,
    pub store_spending: OrderedMap<StoreSpending>,
    /// Records left out as malformed, including amounts that overflow totals
    pub skipped_records: usize,
    pub chart_data: ChartData,
}

impl AnalysisResult {
    /// Recurring transactions dropped because their card is paused, closed or unknown
    pub fn inactive_recurring_count(&self) -> usize {
        self.all_recurring_count
            .saturating_sub(self.recurring_transactions.len())
    }
}

/// Spend bucketed by local weekday (0 = Sunday) and hour (0 = midnight)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateAnalysis {
    pub by_day_of_week: [Decimal; 7],
    pub by_hour: [Decimal; 24],
}

impl Default for DateAnalysis {
    fn default() -> Self {
        Self {
            by_day_of_week: [Decimal::ZERO; 7],
            by_hour: [Decimal::ZERO; 24],
        }
    }
}

/// Catalog comparison attached to a recurring transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionMatch {
    pub service: String,
    /// Tier priced within tolerance of the charge, or "Unknown"
    pub current_tier: String,
    pub lowest_tier: String,
    pub lowest_price: Decimal,
    /// Charged amount minus the cheapest tier; may be zero or negative
    pub potential_savings: Decimal,
}

/// Store catalog details for a merchant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantData {
    pub name: String,
    pub category: String,
    pub average_item_price: Decimal,
}

/// A recurring transaction with its catalog matches
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringCharge {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub subscription_data: Option<SubscriptionMatch>,
    pub merchant_data: Option<MerchantData>,
}

/// Recurring spend grouped by merchant string
///
/// Catalog data is whatever the last-processed transaction of the merchant
/// carried, so it can disagree with `potential_downgrade`, which scans every
/// recurring transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringMerchant {
    pub total: Decimal,
    pub count: u32,
    pub category: Option<String>,
    pub subscription_data: Option<SubscriptionMatch>,
    pub merchant_data: Option<MerchantData>,
}

/// The single best tier downgrade found among recurring transactions
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DowngradeOpportunity {
    pub transaction_id: String,
    pub merchant: String,
    pub service: String,
    pub current_tier: String,
    pub current_amount: Decimal,
    pub lowest_tier: String,
    pub lowest_price: Decimal,
    pub potential_saving: Decimal,
}

/// Spend at a catalog store
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSpending {
    pub total: Decimal,
    pub count: u32,
    pub category: String,
    pub average_item_price: Decimal,
}
