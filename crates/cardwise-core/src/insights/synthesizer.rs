//! Insight synthesizer
//!
//! Builds the baseline payload from an analysis. No I/O, no clock: the same
//! analysis always yields the same payload.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::analysis::AnalysisResult;

use super::types::{EnrichmentStatus, InsightItem, InsightsPayload};

/// Format an amount as dollars with two decimals
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${:.2}", rounded.abs())
    } else {
        format!("${:.2}", rounded.abs())
    }
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

/// Deterministic payload for an analysis
pub fn synthesize(analysis: &AnalysisResult, base_savings_rate: Decimal) -> InsightsPayload {
    InsightsPayload {
        overview: overview(analysis),
        savings: savings(analysis, base_savings_rate),
        subscription_advice: subscription_advice(analysis),
        chart_data: analysis.chart_data.clone(),
        enrichment: EnrichmentStatus::Skipped,
    }
}

fn overview(analysis: &AnalysisResult) -> Vec<InsightItem> {
    let mut merchant = InsightItem::new("Most Used Merchant", &analysis.most_used_merchant);
    if let Some(count) = analysis
        .merchant_frequency
        .get(&analysis.most_used_merchant)
    {
        merchant = merchant.with_subtitle(plural(*count as usize, "transaction", "transactions"));
    }

    let mut category =
        InsightItem::new("Top Spending Category", &analysis.highest_spending_category);
    if let Some(total) = analysis
        .category_spending
        .get(&analysis.highest_spending_category)
    {
        category = category.with_subtitle(format!("{} spent", format_money(*total)));
    }

    let active = analysis.recurring_transactions.len();
    let recurring = InsightItem::new(
        "Recurring Spend",
        format_money(analysis.total_recurring_spend),
    )
    .with_subtitle(format!("{} on active cards", plural(active, "charge", "charges")));

    vec![merchant, category, recurring]
}

fn savings(analysis: &AnalysisResult, base_savings_rate: Decimal) -> Vec<InsightItem> {
    let subscription = analysis
        .potential_downgrade
        .as_ref()
        .map(|d| d.potential_saving)
        .unwrap_or(Decimal::ZERO);
    let estimate = savings_estimate(analysis.total_recurring_spend, base_savings_rate, subscription);

    let subtitle = match &analysis.potential_downgrade {
        Some(d) => format!(
            "Switch {} from {} to {} ({}) to save {}",
            d.service,
            d.current_tier,
            d.lowest_tier,
            format_money(d.lowest_price),
            format_money(d.potential_saving)
        ),
        None => format!(
            "Estimated from {}",
            plural(
                analysis.recurring_transactions.len(),
                "active subscription",
                "active subscriptions"
            )
        ),
    };

    vec![InsightItem::new("Potential Monthly Savings", format_money(estimate))
        .with_subtitle(subtitle)]
}

/// Share of recurring spend plus the downgrade saving, capped at `Decimal::MAX`
fn savings_estimate(total_recurring: Decimal, rate: Decimal, downgrade: Decimal) -> Decimal {
    total_recurring.saturating_mul(rate).saturating_add(downgrade)
}

fn subscription_advice(analysis: &AnalysisResult) -> Vec<InsightItem> {
    let active = analysis.recurring_transactions.len();
    let all = analysis.all_recurring_count;
    let inactive = analysis.inactive_recurring_count();

    vec![
        InsightItem::new("Active Subscriptions", format!("{} of {}", active, all))
            .with_subtitle(format!("{} paused or closed", inactive)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(d("30")), "$30.00");
        assert_eq!(format_money(d("4.005")), "$4.01");
        assert_eq!(format_money(d("1234.5")), "$1234.50");
        assert_eq!(format_money(d("-1.99")), "-$1.99");
        assert_eq!(format_money(Decimal::ZERO), "$0.00");
    }

    #[test]
    fn test_savings_estimate() {
        assert_eq!(savings_estimate(d("30"), d("0.10"), d("8.50")), d("11.50"));
        assert_eq!(savings_estimate(Decimal::MAX, d("2"), d("1")), Decimal::MAX);
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "charge", "charges"), "1 charge");
        assert_eq!(plural(0, "charge", "charges"), "0 charges");
    }
}
