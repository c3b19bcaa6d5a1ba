//! Insights engine - orchestrates analysis, baseline and enrichment

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::ai::{AIClient, AiResponse, InsightsEnricher, ResponseQuality};
use crate::analysis::{classify_raw, AnalysisResult, Analyzer};
use crate::catalog::Catalog;
use crate::config::{AiContentPolicy, EngineConfig};
use crate::error::Result;
use crate::matcher::{ContainmentMatcher, MerchantMatcher};
use crate::sources::{CardDirectory, TransactionSource};

use super::synthesizer::synthesize;
use super::types::{EnrichmentStatus, InsightItem, InsightsPayload};

/// Title given to items produced from AI text
pub const AI_ITEM_TITLE: &str = "AI Insight";

/// Hands out request tickets; only the newest ticket is current
///
/// One session per consumer (a screen, a user). Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InsightsSession {
    latest: Arc<AtomicU64>,
}

impl InsightsSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier ticket
    pub fn begin(&self) -> RequestTicket {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        RequestTicket {
            id,
            latest: Arc::clone(&self.latest),
        }
    }
}

/// Identity of one insights request within a session
#[derive(Debug, Clone)]
pub struct RequestTicket {
    id: u64,
    latest: Arc<AtomicU64>,
}

impl RequestTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// False once a newer request has begun in the same session
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.id
    }
}

/// Produces insights payloads from raw transaction histories
///
/// Catalogs and matcher are shared read-only across requests; every call
/// owns its own analysis and payload.
pub struct InsightsEngine {
    catalog: Arc<Catalog>,
    matcher: Arc<dyn MerchantMatcher>,
    config: EngineConfig,
    enricher: Option<InsightsEnricher>,
}

impl InsightsEngine {
    /// Engine with the containment matcher and no AI backend
    pub fn new(catalog: Arc<Catalog>, config: EngineConfig) -> Self {
        Self {
            catalog,
            matcher: Arc::new(ContainmentMatcher),
            config,
            enricher: None,
        }
    }

    pub fn with_matcher(mut self, matcher: Arc<dyn MerchantMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Enable enrichment through `client`, using the configured timeout
    pub fn with_ai(self, client: AIClient) -> Self {
        let enricher = InsightsEnricher::new(client).with_timeout(self.config.ai.timeout);
        self.with_enricher(enricher)
    }

    pub fn with_enricher(mut self, enricher: InsightsEnricher) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Classify and analyze a raw transaction list
    ///
    /// Fails only when the list itself is missing or unusable.
    pub async fn analyze(&self, raw: &Value, cards: &dyn CardDirectory) -> Result<AnalysisResult> {
        let classified = classify_raw(raw)?;

        let analyzer = Analyzer::new(&self.catalog, self.matcher.as_ref(), &self.config.analysis);
        let analysis = analyzer.analyze(&classified, cards).await;
        if analysis.skipped_records > 0 {
            warn!(skipped = analysis.skipped_records, "Some transaction records were skipped");
        }
        Ok(analysis)
    }

    /// Deterministic payload; always available
    pub fn compute_baseline(&self, analysis: &AnalysisResult) -> InsightsPayload {
        synthesize(analysis, self.config.analysis.base_savings_rate)
    }

    /// Best-effort enrichment of a baseline
    ///
    /// Returns `Ok(None)` when AI is disabled or not configured, and `Err`
    /// when the service call fails or times out. The baseline itself is
    /// never modified.
    pub async fn try_enrich(
        &self,
        analysis: &AnalysisResult,
        baseline: &InsightsPayload,
    ) -> Result<Option<InsightsPayload>> {
        let Some(enricher) = self.enricher.as_ref().filter(|_| self.config.ai.enabled) else {
            return Ok(None);
        };

        let response = enricher.request(analysis).await?;
        Ok(Some(apply_response(
            baseline,
            response,
            self.config.ai.content_policy,
        )))
    }

    /// Full pipeline under a fresh, always-current ticket
    pub async fn generate_insights(
        &self,
        source: &dyn TransactionSource,
        cards: &dyn CardDirectory,
    ) -> Result<InsightsPayload> {
        let ticket = InsightsSession::new().begin();
        self.generate_insights_for(&ticket, source, cards).await
    }

    /// Full pipeline for one request of a session
    ///
    /// If a newer request begins before the AI step completes, its outcome
    /// is dropped and this request's baseline is returned as `discarded`.
    pub async fn generate_insights_for(
        &self,
        ticket: &RequestTicket,
        source: &dyn TransactionSource,
        cards: &dyn CardDirectory,
    ) -> Result<InsightsPayload> {
        let raw = source.fetch_transactions().await?;
        let analysis = self.analyze(&raw, cards).await?;
        let baseline = self.compute_baseline(&analysis);

        let payload = if !ticket.is_current() {
            debug!(request = ticket.id(), "Request superseded before enrichment");
            discarded(baseline)
        } else {
            match self.try_enrich(&analysis, &baseline).await {
                _ if !ticket.is_current() => {
                    debug!(request = ticket.id(), "Request superseded, dropping AI outcome");
                    discarded(baseline)
                }
                Ok(Some(enriched)) => enriched,
                Ok(None) => baseline,
                Err(e) => {
                    warn!(error = %e, "AI enrichment failed, returning baseline insights");
                    InsightsPayload {
                        enrichment: EnrichmentStatus::Failed,
                        ..baseline
                    }
                }
            }
        };

        info!(
            request = ticket.id(),
            approved = analysis.approved_count,
            recurring = analysis.recurring_transactions.len(),
            enrichment = %payload.enrichment,
            "Insights generated"
        );

        Ok(payload)
    }
}

fn discarded(baseline: InsightsPayload) -> InsightsPayload {
    InsightsPayload {
        enrichment: EnrichmentStatus::Discarded,
        ..baseline
    }
}

/// Merge an AI response into a copy of the baseline according to `policy`
pub fn apply_response(
    baseline: &InsightsPayload,
    response: AiResponse,
    policy: AiContentPolicy,
) -> InsightsPayload {
    let mut payload = baseline.clone();

    match response.quality {
        ResponseQuality::Malformed => {
            payload.enrichment = EnrichmentStatus::Malformed;
        }
        ResponseQuality::Parsed => {
            payload.enrichment = EnrichmentStatus::Applied;
            if policy == AiContentPolicy::UseAiText {
                let insights = response.insights;
                replace_if_present(&mut payload.overview, insights.overview);
                replace_if_present(&mut payload.savings, insights.savings);
                replace_if_present(&mut payload.subscription_advice, insights.subscription_advice);
            }
        }
    }

    payload
}

fn replace_if_present(section: &mut Vec<InsightItem>, lines: Vec<String>) {
    let items: Vec<InsightItem> = lines
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .map(|l| InsightItem::new(AI_ITEM_TITLE, l))
        .collect();

    if !items.is_empty() {
        *section = items;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiInsights, MockBackend};
    use crate::charts::ChartData;

    fn baseline() -> InsightsPayload {
        InsightsPayload {
            overview: vec![InsightItem::new("Most Used Merchant", "Netflix")],
            savings: vec![InsightItem::new("Potential Monthly Savings", "$3.00")],
            subscription_advice: vec![InsightItem::new("Active Subscriptions", "1 of 1")],
            chart_data: ChartData::default(),
            enrichment: EnrichmentStatus::Skipped,
        }
    }

    fn parsed(overview: &[&str], savings: &[&str]) -> AiResponse {
        AiResponse {
            insights: AiInsights {
                overview: overview.iter().map(|s| s.to_string()).collect(),
                savings: savings.iter().map(|s| s.to_string()).collect(),
                subscription_advice: vec![],
            },
            quality: ResponseQuality::Parsed,
        }
    }

    #[test]
    fn test_session_tickets() {
        let session = InsightsSession::new();
        let first = session.begin();
        assert!(first.is_current());

        let second = session.clone().begin();
        assert!(!first.is_current());
        assert!(second.is_current());
        assert!(second.id() > first.id());
    }

    #[test]
    fn test_regenerate_keeps_deterministic_sections() {
        let base = baseline();
        let payload = apply_response(
            &base,
            parsed(&["AI says hi"], &["AI savings"]),
            AiContentPolicy::Regenerate,
        );

        assert!(payload.same_sections(&base));
        assert_eq!(payload.enrichment, EnrichmentStatus::Applied);
    }

    #[test]
    fn test_use_ai_text_replaces_non_empty_sections() {
        let base = baseline();
        let payload = apply_response(
            &base,
            parsed(&["You dine out a lot", "  "], &[]),
            AiContentPolicy::UseAiText,
        );

        assert_eq!(
            payload.overview,
            vec![InsightItem::new(AI_ITEM_TITLE, "You dine out a lot")]
        );
        assert_eq!(payload.savings, base.savings);
        assert_eq!(payload.subscription_advice, base.subscription_advice);
    }

    #[test]
    fn test_malformed_never_uses_ai_text() {
        let base = baseline();
        let payload = apply_response(
            &base,
            AiResponse {
                insights: AiInsights::fallback(),
                quality: ResponseQuality::Malformed,
            },
            AiContentPolicy::UseAiText,
        );

        assert!(payload.same_sections(&base));
        assert_eq!(payload.enrichment, EnrichmentStatus::Malformed);
    }

    #[tokio::test]
    async fn test_try_enrich_disabled_is_none() {
        let mut config = EngineConfig::default();
        config.ai.enabled = false;
        let engine = InsightsEngine::new(Arc::new(Catalog::default()), config)
            .with_ai(AIClient::Mock(MockBackend::new()));

        let analysis = engine
            .analyze(&serde_json::json!([]), &crate::sources::InMemoryCards::default())
            .await
            .unwrap();
        let base = engine.compute_baseline(&analysis);
        assert!(engine.try_enrich(&analysis, &base).await.unwrap().is_none());
    }
}
