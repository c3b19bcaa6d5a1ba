//! AI backend response types
//!
//! These types are backend-agnostic and used across all AI implementations.

use serde::{Deserialize, Serialize};

/// Statement returned when the AI answered but its JSON could not be parsed
pub const FALLBACK_OVERVIEW: &str =
    "We couldn't generate personalised insights right now, but your spending summary is ready.";

/// Narrative insights as requested from the generative-text service
///
/// Plain string arrays, unlike the labelled items of the deterministic payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiInsights {
    #[serde(default)]
    pub overview: Vec<String>,
    #[serde(default)]
    pub savings: Vec<String>,
    #[serde(default, rename = "subscriptionAdvice")]
    pub subscription_advice: Vec<String>,
}

impl AiInsights {
    /// Minimal fixed payload used when the response is not valid JSON
    pub fn fallback() -> Self {
        Self {
            overview: vec![FALLBACK_OVERVIEW.to_string()],
            savings: vec![],
            subscription_advice: vec![],
        }
    }
}

/// Whether an AI reply parsed or had to be replaced by the fixed fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseQuality {
    Parsed,
    Malformed,
}

/// A completed AI call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiResponse {
    pub insights: AiInsights,
    pub quality: ResponseQuality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_shape() {
        let fallback = AiInsights::fallback();
        assert_eq!(fallback.overview, vec![FALLBACK_OVERVIEW.to_string()]);
        assert!(fallback.savings.is_empty());
        assert!(fallback.subscription_advice.is_empty());
    }

    #[test]
    fn test_serializes_with_camel_case_advice() {
        let json = serde_json::to_value(AiInsights::fallback()).unwrap();
        assert!(json.get("subscriptionAdvice").is_some());
    }
}
