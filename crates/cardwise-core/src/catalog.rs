//! Static reference catalogs
//!
//! Known subscription services (with pricing tiers) and stores (with
//! category and representative item prices). Loaded once at startup and
//! shared read-only by every request; the same two-layer resolution as the
//! engine config applies (`catalog.toml`).

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::read_layered;
use crate::error::{Error, Result};
use crate::matcher::MerchantMatcher;

/// Embedded default catalog (compiled into binary)
const DEFAULT_CATALOG: &str = include_str!("../../../config/catalog.toml");

/// A named pricing level of a subscription service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub name: String,
    pub price: Decimal,
}

/// A subscription service and its tiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionService {
    pub name: String,
    #[serde(default)]
    pub tiers: Vec<Tier>,
}

impl SubscriptionService {
    /// Cheapest tier (first one wins on equal prices)
    pub fn lowest_tier(&self) -> Option<&Tier> {
        self.tiers.iter().reduce(|best, tier| {
            if tier.price < best.price {
                tier
            } else {
                best
            }
        })
    }

    /// First tier priced within `tolerance` of the charged amount
    pub fn tier_for_amount(&self, amount: Decimal, tolerance: Decimal) -> Option<&Tier> {
        self.tiers
            .iter()
            .find(|tier| (tier.price - amount).abs() < tolerance)
    }
}

/// A store with its category and representative item prices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub item_prices: Vec<Decimal>,
}

impl Store {
    /// Mean catalog item price, zero when no prices are listed
    pub fn average_item_price(&self) -> Decimal {
        match self.item_price_total() {
            Some(total) if !self.item_prices.is_empty() => {
                (total / Decimal::from(self.item_prices.len())).round_dp(2)
            }
            _ => Decimal::ZERO,
        }
    }

    fn item_price_total(&self) -> Option<Decimal> {
        self.item_prices
            .iter()
            .try_fold(Decimal::ZERO, |sum, price| sum.checked_add(*price))
    }
}

/// Both reference catalogs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionService>,
    #[serde(default)]
    pub stores: Vec<Store>,
}

impl Catalog {
    /// Load the catalog (explicit path or override first, then default)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = read_layered(path, "catalog.toml", DEFAULT_CATALOG)?;
        Self::from_toml(&content)
    }

    /// Embedded catalog only, ignoring any override file
    pub fn embedded() -> Result<Self> {
        Self::from_toml(DEFAULT_CATALOG)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let catalog: Catalog = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid catalog TOML: {}", e)))?;

        for service in &catalog.subscriptions {
            if service.tiers.iter().any(|t| t.price < Decimal::ZERO) {
                return Err(Error::Config(format!(
                    "Negative tier price for {}",
                    service.name
                )));
            }
        }

        for store in &catalog.stores {
            if store.item_prices.iter().any(|p| *p < Decimal::ZERO) {
                return Err(Error::Config(format!("Negative item price for {}", store.name)));
            }
            if store.item_price_total().is_none() {
                return Err(Error::Config(format!("Item prices overflow for {}", store.name)));
            }
        }

        Ok(catalog)
    }

    /// First subscription service matching the merchant (catalog order)
    pub fn find_subscription(
        &self,
        merchant: &str,
        matcher: &dyn MerchantMatcher,
    ) -> Option<&SubscriptionService> {
        self.subscriptions
            .iter()
            .find(|service| matcher.matches(&service.name, merchant))
    }

    /// First store matching the name (catalog order)
    pub fn find_store(&self, name: &str, matcher: &dyn MerchantMatcher) -> Option<&Store> {
        self.stores
            .iter()
            .find(|store| matcher.matches(&store.name, name))
    }
}
