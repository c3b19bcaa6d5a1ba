//! Chart data adapter
//!
//! Reshapes an analysis into generic `(label, value)` series. Nothing here
//! knows how the series get drawn.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::analysis::{AnalysisResult, MerchantData, SubscriptionMatch};

/// Day labels indexed like `DateAnalysis::by_day_of_week`
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: Decimal,
}

/// A recurring-spend bar with the catalog data needed to annotate it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringPoint {
    pub label: String,
    pub value: Decimal,
    pub subscription_data: Option<SubscriptionMatch>,
    pub merchant_data: Option<MerchantData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    /// Top categories as a percentage of spend across all categories
    pub category_breakdown: Vec<ChartPoint>,
    /// Sun..Sat totals
    pub weekly_spending: Vec<ChartPoint>,
    /// Top recurring merchants by total
    pub recurring_spending: Vec<RecurringPoint>,
}

impl ChartData {
    /// Build every series from an analysis, keeping `top_n` entries where ranked
    pub fn from_analysis(analysis: &AnalysisResult, top_n: usize) -> Self {
        let total = analysis.category_total;

        let category_breakdown = analysis
            .category_spending
            .ranked_by(|v| *v)
            .into_iter()
            .take(top_n)
            .map(|(label, amount)| ChartPoint {
                label: label.to_string(),
                value: percentage(*amount, total),
            })
            .collect();

        let weekly_spending = WEEKDAY_LABELS
            .iter()
            .zip(analysis.date_analysis.by_day_of_week.iter())
            .map(|(label, amount)| ChartPoint {
                label: label.to_string(),
                value: one_decimal(*amount),
            })
            .collect();

        let recurring_spending = analysis
            .recurring_by_merchant
            .ranked_by(|m| m.total)
            .into_iter()
            .take(top_n)
            .map(|(label, merchant)| RecurringPoint {
                label: label.to_string(),
                value: merchant.total,
                subscription_data: merchant.subscription_data.clone(),
                merchant_data: merchant.merchant_data.clone(),
            })
            .collect();

        Self {
            category_breakdown,
            weekly_spending,
            recurring_spending,
        }
    }
}

fn percentage(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    one_decimal(part / total * Decimal::ONE_HUNDRED)
}

fn one_decimal(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}
