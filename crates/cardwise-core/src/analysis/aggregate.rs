//! Frequency and sum groupings over approved transactions

use chrono::{Datelike, FixedOffset, Offset, Timelike, Utc};
use rust_decimal::Decimal;
use tracing::warn;

use crate::models::Transaction;

use super::ordered::OrderedMap;
use super::types::{DateAnalysis, NONE_SENTINEL};

/// Merchant, category and time-of-spend groupings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregates {
    pub merchant_frequency: OrderedMap<u32>,
    pub category_spending: OrderedMap<Decimal>,
    pub category_total: Decimal,
    pub most_used_merchant: String,
    pub highest_spending_category: String,
    pub date_analysis: DateAnalysis,
    /// Transactions left out because a running sum would overflow
    pub skipped: usize,
}

/// Running sums after adding one transaction, computed before any is applied
struct Step {
    merchant_count: Option<u32>,
    category: Option<(Decimal, Decimal)>,
    day: Decimal,
    hour: Decimal,
}

/// Aggregate approved transactions
///
/// Merchant strings are counted verbatim (no normalization); empty merchants
/// are not counted. Transactions without a category are left out of
/// `category_spending` but still land in the date buckets. A transaction
/// that would overflow any running sum is skipped as a whole.
pub fn aggregate(approved: &[Transaction], utc_offset_minutes: i32) -> Aggregates {
    let offset = utc_offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix());

    let mut agg = Aggregates::default();

    for tx in approved {
        let local = tx.created_at.with_timezone(&offset);
        let day = local.weekday().num_days_from_sunday() as usize;
        let hour = local.hour() as usize;

        let Some(step) = next_step(&agg, tx, day, hour) else {
            agg.skipped += 1;
            warn!(id = %tx.id, amount = %tx.amount, "Skipping transaction that overflows spend totals");
            continue;
        };

        if let Some(count) = step.merchant_count {
            *agg.merchant_frequency.entry(&tx.merchant) = count;
        }
        if let (Some(category), Some((sum, total))) = (tx.category(), step.category) {
            *agg.category_spending.entry(category) = sum;
            agg.category_total = total;
        }
        agg.date_analysis.by_day_of_week[day] = step.day;
        agg.date_analysis.by_hour[hour] = step.hour;
    }

    agg.most_used_merchant = top_or_none(&agg.merchant_frequency);
    agg.highest_spending_category = top_or_none(&agg.category_spending);
    agg
}

fn next_step(agg: &Aggregates, tx: &Transaction, day: usize, hour: usize) -> Option<Step> {
    let merchant_count = if tx.merchant.is_empty() {
        None
    } else {
        let current = agg.merchant_frequency.get(&tx.merchant).copied().unwrap_or(0);
        Some(current.checked_add(1)?)
    };

    let category = match tx.category() {
        Some(category) => {
            let current = agg
                .category_spending
                .get(category)
                .copied()
                .unwrap_or_default();
            Some((
                current.checked_add(tx.amount)?,
                agg.category_total.checked_add(tx.amount)?,
            ))
        }
        None => None,
    };

    Some(Step {
        merchant_count,
        category,
        day: agg.date_analysis.by_day_of_week[day].checked_add(tx.amount)?,
        hour: agg.date_analysis.by_hour[hour].checked_add(tx.amount)?,
    })
}

fn top_or_none<V: PartialOrd + Copy>(map: &OrderedMap<V>) -> String {
    map.top_key_by(|v| *v)
        .unwrap_or(NONE_SENTINEL)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{dec, TransactionBuilder};

    #[test]
    fn test_merchant_frequency_is_exact_string_match() {
        let txs = vec![
            TransactionBuilder::new("1", "Netflix", dec("15")).build(),
            TransactionBuilder::new("2", "NETFLIX", dec("15")).build(),
            TransactionBuilder::new("3", "Netflix", dec("15")).build(),
        ];

        let agg = aggregate(&txs, 0);
        assert_eq!(agg.merchant_frequency.get("Netflix"), Some(&2));
        assert_eq!(agg.merchant_frequency.get("NETFLIX"), Some(&1));
        assert_eq!(agg.most_used_merchant, "Netflix");
    }

    #[test]
    fn test_ties_resolved_by_first_inserted() {
        let txs = vec![
            TransactionBuilder::new("1", "Cafe", dec("5")).category("Dining").build(),
            TransactionBuilder::new("2", "Market", dec("5")).category("Groceries").build(),
        ];

        let agg = aggregate(&txs, 0);
        assert_eq!(agg.most_used_merchant, "Cafe");
        assert_eq!(agg.highest_spending_category, "Dining");
    }

    #[test]
    fn test_missing_category_excluded_but_bucketed() {
        let txs = vec![
            TransactionBuilder::new("1", "Store X", dec("40"))
                .category("Food")
                .at("2024-03-10T12:00:00Z")
                .build(),
            TransactionBuilder::new("2", "Mystery", dec("10"))
                .at("2024-03-11T08:15:00Z")
                .build(),
        ];

        let agg = aggregate(&txs, 0);
        assert_eq!(agg.category_spending.len(), 1);
        assert_eq!(agg.category_spending.get("Food"), Some(&dec("40")));
        assert_eq!(agg.category_total, dec("40"));

        // 2024-03-10 is a Sunday
        assert_eq!(agg.date_analysis.by_day_of_week[0], dec("40"));
        assert_eq!(agg.date_analysis.by_day_of_week[1], dec("10"));
        assert_eq!(agg.date_analysis.by_hour[12], dec("40"));
        assert_eq!(agg.date_analysis.by_hour[8], dec("10"));
    }

    #[test]
    fn test_empty_input_uses_sentinel() {
        let agg = aggregate(&[], 0);
        assert_eq!(agg.most_used_merchant, NONE_SENTINEL);
        assert_eq!(agg.highest_spending_category, NONE_SENTINEL);
        assert_eq!(agg.date_analysis, DateAnalysis::default());
        assert_eq!(agg.category_total, Decimal::ZERO);
    }

    #[test]
    fn test_empty_merchant_not_counted() {
        let txs = vec![TransactionBuilder::new("1", "", dec("3")).build()];
        let agg = aggregate(&txs, 0);
        assert!(agg.merchant_frequency.is_empty());
        assert_eq!(agg.most_used_merchant, NONE_SENTINEL);
    }

    #[test]
    fn test_offset_shifts_day_and_hour() {
        // Sunday 02:00 UTC is Saturday 21:00 at UTC-5
        let txs = vec![TransactionBuilder::new("1", "Late", dec("7"))
            .at("2024-03-10T02:00:00Z")
            .build()];

        let agg = aggregate(&txs, -300);
        assert_eq!(agg.date_analysis.by_day_of_week[6], dec("7"));
        assert_eq!(agg.date_analysis.by_hour[21], dec("7"));
    }

    #[test]
    fn test_overflowing_transaction_is_skipped_whole() {
        let txs = vec![
            TransactionBuilder::new("1", "Vault", Decimal::MAX)
                .category("Savings")
                .at("2024-03-10T12:00:00Z")
                .build(),
            TransactionBuilder::new("2", "Corner Shop", dec("1"))
                .category("Groceries")
                .at("2024-03-10T12:30:00Z")
                .build(),
            TransactionBuilder::new("3", "Cafe", dec("4"))
                .at("2024-03-11T09:00:00Z")
                .build(),
        ];

        let agg = aggregate(&txs, 0);
        assert_eq!(agg.skipped, 1);
        assert_eq!(agg.merchant_frequency.get("Corner Shop"), None);
        assert_eq!(agg.category_spending.get("Groceries"), None);
        assert_eq!(agg.category_total, Decimal::MAX);
        assert_eq!(agg.date_analysis.by_day_of_week[0], Decimal::MAX);
        assert_eq!(agg.date_analysis.by_hour[12], Decimal::MAX);

        // Uncategorized spend on another day still fits
        assert_eq!(agg.merchant_frequency.get("Cafe"), Some(&1));
        assert_eq!(agg.date_analysis.by_day_of_week[1], dec("4"));
        assert_eq!(agg.most_used_merchant, "Vault");
    }
}
