//! Test utilities for cardwise-core
//!
//! Provides a mock generative-text server speaking both the Ollama and the
//! OpenAI chat-completions shapes, plus small builders for transactions.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::models::{Card, Transaction};

#[derive(Default)]
struct ServerState {
    /// None makes every generate call answer with HTTP 500
    reply: Option<String>,
    last_prompt: Mutex<Option<String>>,
    last_authorization: Mutex<Option<String>>,
}

/// Mock generative-text server for testing HTTP backends
pub struct MockGenerativeServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockGenerativeServer {
    /// Start a server that answers every prompt with `reply`
    pub async fn start_with_reply(reply: &str) -> Self {
        Self::start(Some(reply.to_string())).await
    }

    /// Start a server whose generate endpoints fail with HTTP 500
    pub async fn start_failing() -> Self {
        Self::start(None).await
    }

    async fn start(reply: Option<String>) -> Self {
        let state = Arc::new(ServerState {
            reply,
            ..Default::default()
        });

        let app = Router::new()
            .route("/api/tags", get(handle_health))
            .route("/api/generate", post(handle_generate))
            .route("/v1/models", get(handle_health))
            .route("/v1/chat/completions", post(handle_chat))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// The last prompt received on either generate endpoint
    pub fn last_prompt(&self) -> Option<String> {
        self.state.last_prompt.lock().unwrap().clone()
    }

    /// The Authorization header of the last chat completion request
    pub fn last_authorization(&self) -> Option<String> {
        self.state.last_authorization.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockGenerativeServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "models": [{ "name": "mock:latest" }] }))
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}

async fn handle_generate(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, StatusCode> {
    *state.last_prompt.lock().unwrap() = Some(request.prompt);

    let reply = state
        .reply
        .clone()
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(GenerateResponse {
        model: request.model,
        response: reply,
        done: true,
    }))
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

async fn handle_chat(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    *state.last_prompt.lock().unwrap() = request.messages.into_iter().last().map(|m| m.content);
    *state.last_authorization.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let reply = state
        .reply
        .clone()
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": reply } }]
    })))
}

/// Builder for test transactions with sensible defaults
pub struct TransactionBuilder {
    tx: Transaction,
}

impl TransactionBuilder {
    pub fn new(id: &str, merchant: &str, amount: Decimal) -> Self {
        Self {
            tx: Transaction {
                id: id.to_string(),
                card_id: "card_1".to_string(),
                merchant: merchant.to_string(),
                category: None,
                amount,
                status: "approved".to_string(),
                created_at: "2024-03-10T18:30:00Z".parse().unwrap(),
                recurring: false,
                description: None,
            },
        }
    }

    pub fn card(mut self, card_id: &str) -> Self {
        self.tx.card_id = card_id.to_string();
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.tx.category = Some(category.to_string());
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.tx.status = status.to_string();
        self
    }

    pub fn recurring(mut self) -> Self {
        self.tx.recurring = true;
        self
    }

    pub fn at(mut self, timestamp: &str) -> Self {
        self.tx.created_at = timestamp.parse::<DateTime<Utc>>().unwrap();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.tx.description = Some(description.to_string());
        self
    }

    pub fn build(self) -> Transaction {
        self.tx
    }
}

/// Shorthand for `Decimal` literals in tests: `dec("15.49")`
pub fn dec(value: &str) -> Decimal {
    value.parse().unwrap()
}

pub fn active_card(id: &str) -> Card {
    Card {
        id: id.to_string(),
        closed: false,
        paused: false,
    }
}
