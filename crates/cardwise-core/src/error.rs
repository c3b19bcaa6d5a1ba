//! Error types for Cardwise

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The transaction input is structurally unusable (not a list of records)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No transaction list was supplied")]
    MissingTransactions,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("AI service error: {0}")]
    Ai(String),

    #[error("AI service timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
