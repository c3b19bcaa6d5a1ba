//! Subscription matcher
//!
//! Filters recurring charges down to those on active cards, compares each
//! against the subscription catalog and finds the best tier downgrade.

use std::collections::HashMap;

use futures::future::join_all;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::matcher::MerchantMatcher;
use crate::models::Transaction;
use crate::sources::CardDirectory;

use super::ordered::OrderedMap;
use super::types::{
    DowngradeOpportunity, MerchantData, RecurringCharge, RecurringMerchant, SubscriptionMatch,
    UNKNOWN_TIER,
};

/// Keep only recurring transactions whose card resolves to an active card
///
/// Each distinct card id is looked up once, all lookups concurrently. Lookup
/// failures drop the transaction exactly like a closed or paused card.
pub async fn active_recurring(
    recurring: &[Transaction],
    cards: &dyn CardDirectory,
) -> Vec<Transaction> {
    let mut card_ids: Vec<&str> = Vec::new();
    for tx in recurring {
        if !card_ids.contains(&tx.card_id.as_str()) {
            card_ids.push(&tx.card_id);
        }
    }

    let lookups = card_ids.iter().map(|id| cards.get_card_by_id(id));
    let results = join_all(lookups).await;

    let mut active: HashMap<&str, bool> = HashMap::with_capacity(card_ids.len());
    for (id, result) in card_ids.iter().zip(results) {
        let is_active = match result {
            Ok(card) => {
                if !card.is_active() {
                    debug!(card_id = %id, closed = card.closed, paused = card.paused, "Card inactive");
                }
                card.is_active()
            }
            Err(e) => {
                warn!(card_id = %id, error = %e, "Card lookup failed, dropping its recurring charges");
                false
            }
        };
        active.insert(*id, is_active);
    }

    recurring
        .iter()
        .filter(|tx| active.get(tx.card_id.as_str()).copied().unwrap_or(false))
        .cloned()
        .collect()
}

/// Compare one charge against the subscription catalog
pub fn match_subscription(
    tx: &Transaction,
    catalog: &Catalog,
    matcher: &dyn MerchantMatcher,
    tolerance: Decimal,
) -> Option<SubscriptionMatch> {
    let service = catalog.find_subscription(&tx.merchant, matcher)?;
    let lowest = service.lowest_tier()?;

    let current_tier = service
        .tier_for_amount(tx.amount, tolerance)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| UNKNOWN_TIER.to_string());

    Some(SubscriptionMatch {
        service: service.name.clone(),
        current_tier,
        lowest_tier: lowest.name.clone(),
        lowest_price: lowest.price,
        potential_savings: tx.amount - lowest.price,
    })
}

/// Store catalog details for a merchant
pub fn match_merchant(
    merchant: &str,
    catalog: &Catalog,
    matcher: &dyn MerchantMatcher,
) -> Option<MerchantData> {
    catalog.find_store(merchant, matcher).map(|store| MerchantData {
        name: store.name.clone(),
        category: store.category.clone(),
        average_item_price: store.average_item_price(),
    })
}

/// Attach catalog data to every active recurring transaction
pub fn enrich(
    active: Vec<Transaction>,
    catalog: &Catalog,
    matcher: &dyn MerchantMatcher,
    tolerance: Decimal,
) -> Vec<RecurringCharge> {
    active
        .into_iter()
        .map(|tx| {
            let subscription_data = match_subscription(&tx, catalog, matcher, tolerance);
            let merchant_data = match_merchant(&tx.merchant, catalog, matcher);
            RecurringCharge {
                transaction: tx,
                subscription_data,
                merchant_data,
            }
        })
        .collect()
}

/// Keep charges while their running total fits, returning kept charges,
/// their total and how many were left out
pub fn bounded_total(charges: Vec<RecurringCharge>) -> (Vec<RecurringCharge>, Decimal, usize) {
    let mut total = Decimal::ZERO;
    let mut kept = Vec::with_capacity(charges.len());
    let mut overflowed = 0;

    for charge in charges {
        match total.checked_add(charge.transaction.amount) {
            Some(sum) => {
                total = sum;
                kept.push(charge);
            }
            None => {
                overflowed += 1;
                warn!(id = %charge.transaction.id, "Recurring total overflow, charge left out");
            }
        }
    }

    (kept, total, overflowed)
}

/// Group recurring charges by merchant string
///
/// Catalog data and category are overwritten by each later charge of the
/// same merchant, so the last-processed one survives. A charge with no
/// category does not erase an earlier one.
pub fn group_by_merchant(charges: &[RecurringCharge]) -> OrderedMap<RecurringMerchant> {
    let mut grouped: OrderedMap<RecurringMerchant> = OrderedMap::new();

    for charge in charges {
        let tx = &charge.transaction;
        let current = grouped.get(&tx.merchant).map(|m| m.total).unwrap_or_default();
        let Some(total) = current.checked_add(tx.amount) else {
            warn!(id = %tx.id, merchant = %tx.merchant, "Merchant total overflow, charge left out");
            continue;
        };

        let entry = grouped.entry(&tx.merchant);
        entry.total = total;
        entry.count += 1;
        if let Some(category) = tx.category() {
            entry.category = Some(category.to_string());
        }
        entry.subscription_data = charge.subscription_data.clone();
        entry.merchant_data = charge.merchant_data.clone();
    }

    grouped
}

/// The charge with the largest strictly positive saving
///
/// Scans the flat list, so it may name a charge whose merchant group in
/// `group_by_merchant` carries different catalog data. First wins on ties.
pub fn best_downgrade(charges: &[RecurringCharge]) -> Option<DowngradeOpportunity> {
    let mut best: Option<(&RecurringCharge, &SubscriptionMatch)> = None;

    for charge in charges {
        let Some(sub) = charge.subscription_data.as_ref() else {
            continue;
        };
        if sub.potential_savings <= Decimal::ZERO {
            continue;
        }
        let better = match best {
            Some((_, current)) => sub.potential_savings > current.potential_savings,
            None => true,
        };
        if better {
            best = Some((charge, sub));
        }
    }

    best.map(|(charge, sub)| DowngradeOpportunity {
        transaction_id: charge.transaction.id.clone(),
        merchant: charge.transaction.merchant.clone(),
        service: sub.service.clone(),
        current_tier: sub.current_tier.clone(),
        current_amount: charge.transaction.amount,
        lowest_tier: sub.lowest_tier.clone(),
        lowest_price: sub.lowest_price,
        potential_saving: sub.potential_savings,
    })
}
