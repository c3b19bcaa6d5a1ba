//! Mock backend for testing
//!
//! Returns a configurable reply without any network access. Useful for unit
//! tests and for running the CLI without a model server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::AIBackend;

const DEFAULT_REPLY: &str = r#"{"overview": ["Your spending is concentrated in a few merchants."], "savings": ["Review recurring charges for cheaper tiers."], "subscriptionAdvice": ["Cancel subscriptions on cards you no longer use."]}"#;

#[derive(Clone, Debug)]
enum Reply {
    Text(String),
    Fail(String),
}

/// Mock AI backend for testing
///
/// Counts calls and remembers the last prompt so tests can assert on both.
#[derive(Clone)]
pub struct MockBackend {
    reply: Reply,
    delay: Option<Duration>,
    /// Whether health_check should return true
    pub healthy: bool,
    calls: Arc<AtomicUsize>,
    last_prompt: Arc<Mutex<Option<String>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a mock backend that answers with well-formed insights JSON
    pub fn new() -> Self {
        Self::replying(DEFAULT_REPLY)
    }

    /// Create a mock backend that answers with the given text
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Reply::Text(text.into()),
            delay: None,
            healthy: true,
            calls: Arc::new(AtomicUsize::new(0)),
            last_prompt: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a mock backend whose calls always fail
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Reply::Fail(message.into()),
            healthy: false,
            ..Self::new()
        }
    }

    /// Delay every reply (for timeout and cancellation tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of generate calls made so far (shared between clones)
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent prompt received
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.to_string());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail(message) => Err(Error::Ai(message.clone())),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://local"
    }
}
