//! Spend at catalog stores

use rust_decimal::Decimal;
use tracing::warn;

use crate::catalog::Catalog;
use crate::matcher::MerchantMatcher;
use crate::models::{PurchaseMetadata, Transaction};

use super::ordered::OrderedMap;
use super::types::StoreSpending;

#[derive(Default)]
struct ItemTally {
    spend: Decimal,
    quantity: u64,
}

/// Accumulate approved spend per matched catalog store
///
/// The store name comes from embedded purchase metadata when present, else
/// the merchant. `average_item_price` prefers the prices of purchased items
/// and falls back to the catalog's representative prices. Metadata whose
/// item sums overflow is ignored, and a transaction that would overflow its
/// store total is left out.
pub fn store_spending(
    approved: &[Transaction],
    catalog: &Catalog,
    matcher: &dyn MerchantMatcher,
) -> OrderedMap<StoreSpending> {
    let mut spending: OrderedMap<StoreSpending> = OrderedMap::new();
    let mut items: OrderedMap<ItemTally> = OrderedMap::new();

    for tx in approved {
        let metadata = usable_metadata(tx);
        let name = metadata
            .as_ref()
            .and_then(|(m, _)| m.store.as_deref())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(tx.merchant.as_str());

        let Some(store) = catalog.find_store(name, matcher) else {
            continue;
        };

        let current = spending.get(&store.name).map(|s| s.total).unwrap_or_default();
        let Some(total) = current.checked_add(tx.amount) else {
            warn!(id = %tx.id, store = %store.name, "Store total overflow, transaction left out");
            continue;
        };

        let entry = spending.entry(&store.name);
        entry.total = total;
        entry.count += 1;
        entry.category = store.category.clone();

        let tally = items.entry(&store.name);
        if let Some((_, (spend, quantity))) = metadata {
            match (tally.spend.checked_add(spend), tally.quantity.checked_add(quantity)) {
                (Some(spend), Some(quantity)) => {
                    tally.spend = spend;
                    tally.quantity = quantity;
                }
                _ => warn!(id = %tx.id, store = %store.name, "Item tally overflow, metadata ignored"),
            }
        }
    }

    let mut result: OrderedMap<StoreSpending> = OrderedMap::new();
    for (name, entry) in spending.iter() {
        let average_item_price = match items.get(name) {
            Some(tally) if tally.quantity > 0 => {
                (tally.spend / Decimal::from(tally.quantity)).round_dp(2)
            }
            _ => catalog
                .stores
                .iter()
                .find(|s| s.name == name)
                .map(|s| s.average_item_price())
                .unwrap_or(Decimal::ZERO),
        };

        *result.entry(name) = StoreSpending {
            average_item_price,
            ..entry.clone()
        };
    }

    result
}

/// Purchase metadata with its item sums, dropped whole when the sums overflow
fn usable_metadata(tx: &Transaction) -> Option<(PurchaseMetadata, (Decimal, u64))> {
    let metadata = tx.purchase_metadata()?;
    match metadata.item_totals() {
        Some(totals) => Some((metadata, totals)),
        None => {
            warn!(id = %tx.id, "Purchase metadata item sums overflow, ignoring metadata");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::ContainmentMatcher;
    use crate::test_utils::{dec, TransactionBuilder};

    fn catalog() -> Catalog {
        Catalog::from_toml(
            r#"
[[stores]]
name = "Whole Foods"
category = "Groceries"
item_prices = [2.0, 4.0, 9.0]

[[stores]]
name = "Starbucks"
category = "Dining"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_catalog_average_when_no_metadata() {
        let txs = vec![
            TransactionBuilder::new("1", "WHOLE FOODS MKT", dec("30")).build(),
            TransactionBuilder::new("2", "Whole Foods", dec("12.50")).build(),
            TransactionBuilder::new("3", "Corner Shop", dec("3")).build(),
        ];

        let spending = store_spending(&txs, &catalog(), &ContainmentMatcher);
        assert_eq!(spending.len(), 1);

        let wf = spending.get("Whole Foods").unwrap();
        assert_eq!(wf.total, dec("42.50"));
        assert_eq!(wf.count, 2);
        assert_eq!(wf.category, "Groceries");
        assert_eq!(wf.average_item_price, dec("5"));
    }

    #[test]
    fn test_metadata_store_and_items_win() {
        let txs = vec![TransactionBuilder::new("1", "SQ *PAYMENT", dec("10"))
            .description(
                r#"Receipt {"store": "Starbucks", "items": [{"name": "Latte", "price": 4.5, "quantity": 2}, {"name": "Cookie", "price": 1}]}"#,
            )
            .build()];

        let spending = store_spending(&txs, &catalog(), &ContainmentMatcher);
        let sb = spending.get("Starbucks").unwrap();
        assert_eq!(sb.count, 1);
        assert_eq!(sb.category, "Dining");
        // (4.5 * 2 + 1) / 3
        assert_eq!(sb.average_item_price, dec("3.33"));
    }

    #[test]
    fn test_store_without_prices_averages_zero() {
        let txs = vec![TransactionBuilder::new("1", "Starbucks", dec("6")).build()];
        let spending = store_spending(&txs, &catalog(), &ContainmentMatcher);
        assert_eq!(spending.get("Starbucks").unwrap().average_item_price, Decimal::ZERO);
    }

    #[test]
    fn test_large_quantities_accumulate_in_u64() {
        let txs = vec![TransactionBuilder::new("1", "Starbucks", dec("6"))
            .description(
                r#"{"items": [{"price": 1, "quantity": 4294967295}, {"price": 1, "quantity": 1}]}"#,
            )
            .build()];

        let spending = store_spending(&txs, &catalog(), &ContainmentMatcher);
        let sb = spending.get("Starbucks").unwrap();
        assert_eq!(sb.count, 1);
        assert_eq!(sb.total, dec("6"));
        assert_eq!(sb.average_item_price, dec("1"));
    }

    #[test]
    fn test_price_overflow_falls_back_to_catalog() {
        let txs = vec![TransactionBuilder::new("1", "Whole Foods", dec("20"))
            .description(
                r#"{"store": "Starbucks", "items": [{"price": "70000000000000000000000000000", "quantity": 4000000000}]}"#,
            )
            .build()];

        let spending = store_spending(&txs, &catalog(), &ContainmentMatcher);
        assert!(spending.get("Starbucks").is_none());

        let wf = spending.get("Whole Foods").unwrap();
        assert_eq!(wf.total, dec("20"));
        assert_eq!(wf.average_item_price, dec("5"));
    }

    #[test]
    fn test_store_total_overflow_leaves_transaction_out() {
        let txs = vec![
            TransactionBuilder::new("1", "Starbucks", Decimal::MAX).build(),
            TransactionBuilder::new("2", "Starbucks", dec("1")).build(),
        ];

        let spending = store_spending(&txs, &catalog(), &ContainmentMatcher);
        let sb = spending.get("Starbucks").unwrap();
        assert_eq!(sb.total, Decimal::MAX);
        assert_eq!(sb.count, 1);
    }
}
