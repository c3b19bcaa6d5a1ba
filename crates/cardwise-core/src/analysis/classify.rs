//! Transaction classifier
//!
//! Turns the raw transaction list into typed records and splits out the
//! approved and approved-recurring subsequences. Individual bad records are
//! skipped; only a structurally unusable list is an error.

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::Transaction;

/// Output of the classifier, preserving input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classified {
    /// Transactions whose status is in the approved family
    pub approved: Vec<Transaction>,
    /// Approved transactions flagged recurring
    pub recurring: Vec<Transaction>,
    /// Records dropped as malformed
    ///
    /// Negative amounts are checked both while parsing raw records and again
    /// in [`classify`] for typed input; a record is only ever counted once,
    /// by whichever path rejects it first. Approved records whose amount would
    /// overflow the running approved total are counted here too.
    pub skipped: usize,
}

/// Parse the raw list, skipping malformed records
///
/// Fails when the input is missing, is not a list, or is a non-empty list
/// in which no element is an object carrying a `status` field.
pub fn parse_transactions(raw: &Value) -> Result<(Vec<Transaction>, usize)> {
    let records = match raw {
        Value::Null => return Err(Error::MissingTransactions),
        Value::Array(records) => records,
        other => {
            return Err(Error::InvalidInput(format!(
                "expected a list of transactions, got {}",
                json_kind(other)
            )))
        }
    };

    let has_status = |record: &Value| record.get("status").is_some_and(|s| !s.is_null());
    if !records.is_empty() && !records.iter().any(has_status) {
        return Err(Error::InvalidInput(
            "no record in the transaction list has a status field".into(),
        ));
    }

    let mut transactions = Vec::with_capacity(records.len());
    let mut skipped = 0;

    for (position, record) in records.iter().enumerate() {
        match parse_record(record) {
            Ok(tx) => transactions.push(tx),
            Err(reason) => {
                skipped += 1;
                warn!(position, reason = %reason, "Skipping malformed transaction record");
            }
        }
    }

    Ok((transactions, skipped))
}

fn parse_record(record: &Value) -> std::result::Result<Transaction, String> {
    if !record.is_object() {
        return Err(format!("expected an object, got {}", json_kind(record)));
    }

    let tx: Transaction = serde_json::from_value(record.clone()).map_err(|e| e.to_string())?;

    if tx.amount < Decimal::ZERO {
        return Err(format!("negative amount {}", tx.amount));
    }

    Ok(tx)
}

/// Split typed transactions into approved and approved-recurring
///
/// The approved amounts always sum without overflow, so every grouping
/// computed over them downstream fits in a `Decimal`.
pub fn classify(transactions: Vec<Transaction>) -> Classified {
    let mut classified = Classified::default();
    let mut approved_total = Decimal::ZERO;

    for tx in transactions {
        if tx.amount < Decimal::ZERO {
            classified.skipped += 1;
            warn!(id = %tx.id, "Skipping transaction with negative amount");
            continue;
        }
        if !tx.is_approved() {
            continue;
        }
        match approved_total.checked_add(tx.amount) {
            Some(total) => approved_total = total,
            None => {
                classified.skipped += 1;
                warn!(id = %tx.id, amount = %tx.amount, "Skipping transaction that overflows approved spend");
                continue;
            }
        }
        if tx.recurring {
            classified.recurring.push(tx.clone());
        }
        classified.approved.push(tx);
    }

    debug!(
        approved = classified.approved.len(),
        recurring = classified.recurring.len(),
        "Classified transactions"
    );

    classified
}

/// Parse and classify in one step
pub fn classify_raw(raw: &Value) -> Result<Classified> {
    let (transactions, skipped) = parse_transactions(raw)?;
    let mut classified = classify(transactions);
    classified.skipped += skipped;
    Ok(classified)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
