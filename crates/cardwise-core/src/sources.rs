//! Collaborator interfaces
//!
//! The engine does not own transaction or card storage. Callers hand it a
//! `TransactionSource` (the user's raw history) and a `CardDirectory` (card
//! state lookups); in-memory implementations are provided for tests and the
//! CLI harness.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::Card;

/// Supplies the raw transaction history of the current user
///
/// Returned as untyped JSON: validating its shape is the classifier's job.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn fetch_transactions(&self) -> Result<serde_json::Value>;
}

/// Resolves card state by id
#[async_trait]
pub trait CardDirectory: Send + Sync {
    /// Fails with `Error::NotFound` for unknown cards
    async fn get_card_by_id(&self, card_id: &str) -> Result<Card>;
}

/// A fixed transaction list
#[derive(Debug, Clone)]
pub struct StaticTransactions(pub serde_json::Value);

#[async_trait]
impl TransactionSource for StaticTransactions {
    async fn fetch_transactions(&self) -> Result<serde_json::Value> {
        Ok(self.0.clone())
    }
}

/// Cards held in memory, keyed by id
#[derive(Debug, Clone, Default)]
pub struct InMemoryCards {
    cards: HashMap<String, Card>,
}

impl InMemoryCards {
    pub fn new(cards: impl IntoIterator<Item = Card>) -> Self {
        Self {
            cards: cards.into_iter().map(|c| (c.id.clone(), c)).collect(),
        }
    }
}

#[async_trait]
impl CardDirectory for InMemoryCards {
    async fn get_card_by_id(&self, card_id: &str) -> Result<Card> {
        self.cards
            .get(card_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("card {}", card_id)))
    }
}
