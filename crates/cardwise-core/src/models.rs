//! Domain models for Cardwise

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ai::parsing::find_json_object;

/// A card transaction as supplied by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub card_id: String,
    #[serde(default)]
    pub merchant: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Always non-negative; records with negative amounts are rejected by the classifier
    pub amount: Decimal,
    /// Raw status as reported upstream (e.g. "APPROVED", "settled", "declined")
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub recurring: bool,
    /// Free text; may embed purchase metadata as a JSON object
    #[serde(default)]
    pub description: Option<String>,
}

impl Transaction {
    pub fn status_family(&self) -> StatusFamily {
        StatusFamily::from_status(&self.status)
    }

    pub fn is_approved(&self) -> bool {
        self.status_family() == StatusFamily::Approved
    }

    /// Category with blank values treated as missing
    pub fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Purchase metadata embedded in the description, if any parses
    pub fn purchase_metadata(&self) -> Option<PurchaseMetadata> {
        let description = self.description.as_deref()?;
        let json = find_json_object(description)?;
        serde_json::from_str(json).ok()
    }
}

/// Status families used to decide whether a transaction counts as spend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFamily {
    /// approved / settled / completed
    Approved,
    /// declined / failed / rejected
    Declined,
    Other,
}

impl StatusFamily {
    /// Classify a raw status string (case-insensitive)
    pub fn from_status(status: &str) -> Self {
        match status.trim().to_lowercase().as_str() {
            "approved" | "settled" | "completed" => Self::Approved,
            "declined" | "failed" | "rejected" => Self::Declined,
            _ => Self::Other,
        }
    }
}

/// A virtual card, as far as the engine cares about it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub paused: bool,
}

impl Card {
    pub fn is_active(&self) -> bool {
        !self.closed && !self.paused
    }
}

/// Structured purchase details some merchants embed in the description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseMetadata {
    #[serde(default)]
    pub store: Option<String>,
    #[serde(default)]
    pub items: Vec<PurchaseItem>,
}

impl PurchaseMetadata {
    /// Spend (price × quantity) and quantity summed over the listed items
    ///
    /// `None` when either sum overflows.
    pub fn item_totals(&self) -> Option<(Decimal, u64)> {
        self.items
            .iter()
            .try_fold((Decimal::ZERO, 0u64), |(spend, quantity), item| {
                let line = item.price.checked_mul(Decimal::from(item.quantity))?;
                Some((
                    spend.checked_add(line)?,
                    quantity.checked_add(u64::from(item.quantity))?,
                ))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseItem {
    #[serde(default)]
    pub name: Option<String>,
    pub price: Decimal,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}
