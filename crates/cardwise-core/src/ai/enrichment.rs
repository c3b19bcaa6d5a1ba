//! AI enrichment of a finished analysis
//!
//! One request per analysis, a single attempt under a timeout. Transport
//! errors and timeouts are returned to the caller; a reply that is not valid
//! JSON is not an error and yields the fixed fallback insights instead.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::analysis::AnalysisResult;
use crate::charts::WEEKDAY_LABELS;
use crate::error::{Error, Result};
use crate::insights::format_money;
use crate::prompts::{PromptId, PromptLibrary};

use super::parsing::parse_insights_response;
use super::{AIBackend, AIClient, AiInsights, AiResponse, ResponseQuality};

/// Default timeout for one enrichment call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends an analysis summary to a generative-text backend
#[derive(Clone)]
pub struct InsightsEnricher {
    client: AIClient,
    prompts: PromptLibrary,
    timeout: Duration,
}

impl InsightsEnricher {
    pub fn new(client: AIClient) -> Self {
        Self {
            client,
            prompts: PromptLibrary::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn client(&self) -> &AIClient {
        &self.client
    }

    /// Render the enrichment prompt for an analysis
    pub fn build_prompt(&self, analysis: &AnalysisResult) -> Result<String> {
        let prompt = self.prompts.get(PromptId::SpendingInsights)?;
        Ok(prompt.render_completion(&prompt_vars(analysis)))
    }

    /// Request narrative insights for an analysis
    pub async fn request(&self, analysis: &AnalysisResult) -> Result<AiResponse> {
        let prompt = self.build_prompt(analysis)?;

        debug!(
            model = self.client.model(),
            host = self.client.host(),
            prompt_len = prompt.len(),
            "Requesting AI insights"
        );

        let text = match timeout(self.timeout, self.client.generate(&prompt)).await {
            Ok(result) => result?,
            Err(_) => return Err(Error::Timeout(self.timeout)),
        };

        match parse_insights_response(&text) {
            Ok(insights) => Ok(AiResponse {
                insights,
                quality: ResponseQuality::Parsed,
            }),
            Err(e) => {
                warn!(error = %e, "AI insights reply was not usable JSON, using fallback");
                Ok(AiResponse {
                    insights: AiInsights::fallback(),
                    quality: ResponseQuality::Malformed,
                })
            }
        }
    }
}

/// Template variables for the spending insights prompt
pub fn prompt_vars(analysis: &AnalysisResult) -> HashMap<&'static str, String> {
    let subscriptions: Vec<String> = analysis
        .recurring_transactions
        .iter()
        .filter_map(|charge| {
            let sub = charge.subscription_data.as_ref()?;
            Some(format!(
                "- {}: {} on the {} tier; cheapest is {} at {} (saving {})",
                charge.transaction.merchant,
                format_money(charge.transaction.amount),
                sub.current_tier,
                sub.lowest_tier,
                format_money(sub.lowest_price),
                format_money(sub.potential_savings)
            ))
        })
        .collect();

    let weekly: Vec<String> = WEEKDAY_LABELS
        .iter()
        .zip(analysis.date_analysis.by_day_of_week.iter())
        .map(|(day, amount)| format!("{} {}", day, format_money(*amount)))
        .collect();

    let categories: Vec<String> = analysis
        .category_spending
        .ranked_by(|v| *v)
        .into_iter()
        .map(|(name, amount)| format!("- {}: {}", name, format_money(*amount)))
        .collect();

    let mut vars = HashMap::new();
    vars.insert("most_used_merchant", analysis.most_used_merchant.clone());
    vars.insert("highest_category", analysis.highest_spending_category.clone());
    vars.insert("total_recurring", format_money(analysis.total_recurring_spend));
    vars.insert(
        "recurring_count",
        analysis.recurring_transactions.len().to_string(),
    );
    vars.insert("subscriptions", subscriptions.join("\n"));
    vars.insert("weekly", weekly.join(", "));
    vars.insert("categories", categories.join("\n"));
    vars
}
