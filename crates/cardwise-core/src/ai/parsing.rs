//! JSON parsing helpers for AI backend responses
//!
//! Generative models often wrap the JSON payload in prose ("Here are your
//! insights: {...} Hope this helps!"). These helpers cut the outermost object
//! out of the text before handing it to serde.

use crate::error::{Error, Result};

use super::types::AiInsights;

/// Locate the outermost JSON object in free text (first `{` to last `}`)
pub fn find_json_object(text: &str) -> Option<&str> {
    let text = text.trim();
    let start = text.find('{');
    let end = text.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => Some(&text[s..=e]),
        _ => None,
    }
}

/// Parse the insights response from the AI service
pub fn parse_insights_response(response: &str) -> Result<AiInsights> {
    match find_json_object(response) {
        Some(json_str) => serde_json::from_str(json_str).map_err(|e| {
            Error::Ai(format!(
                "Invalid insights JSON from AI: {} | Raw: {}",
                e,
                truncate(json_str, 200)
            ))
        }),
        None => Err(Error::Ai(format!(
            "No JSON found in AI insights response | Raw: {}",
            truncate(response.trim(), 200)
        ))),
    }
}

/// Truncate long responses for error messages (char-boundary safe)
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
