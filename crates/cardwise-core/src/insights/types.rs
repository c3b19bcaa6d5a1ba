//! Insights payload types

use serde::Serialize;
use std::fmt;

use crate::charts::ChartData;

/// One labelled figure in an insights section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsightItem {
    pub title: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

impl InsightItem {
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            subtitle: None,
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }
}

/// What happened to the optional AI step of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentStatus {
    /// No AI client configured, or enrichment disabled
    #[default]
    Skipped,
    /// The call errored or timed out; baseline returned
    Failed,
    /// The reply was not valid JSON; the fixed fallback was used
    Malformed,
    /// The reply parsed and the content policy was applied
    Applied,
    /// A newer request superseded this one before the AI step finished
    Discarded,
}

impl EnrichmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Failed => "failed",
            Self::Malformed => "malformed",
            Self::Applied => "applied",
            Self::Discarded => "discarded",
        }
    }
}

impl fmt::Display for EnrichmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The only object handed back to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsPayload {
    pub overview: Vec<InsightItem>,
    pub savings: Vec<InsightItem>,
    pub subscription_advice: Vec<InsightItem>,
    pub chart_data: ChartData,
    pub enrichment: EnrichmentStatus,
}

impl InsightsPayload {
    /// True when the three item sections match, ignoring charts and enrichment status
    pub fn same_sections(&self, other: &InsightsPayload) -> bool {
        self.overview == other.overview
            && self.savings == other.savings
            && self.subscription_advice == other.subscription_advice
    }
}
