//! Engine configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/cardwise/config/insights.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Keys missing from an override keep their default values.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/insights.toml");

/// What to do with the text of a successfully parsed AI response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiContentPolicy {
    /// A successful call only confirms availability; the deterministic
    /// sections are re-emitted unchanged
    #[default]
    Regenerate,
    /// Non-empty AI sections replace the deterministic ones
    UseAiText,
}

/// Settings for the deterministic analysis
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Share of recurring spend assumed saveable (0.10 = 10%)
    pub base_savings_rate: Decimal,
    /// Maximum distance between amount and tier price for a tier match
    pub tier_match_tolerance: Decimal,
    /// Number of entries in the top-N charts
    pub top_n: usize,
    /// Offset from UTC used for weekday/hour buckets
    pub utc_offset_minutes: i32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            base_savings_rate: Decimal::new(10, 2),
            tier_match_tolerance: Decimal::new(5, 1),
            top_n: 5,
            utc_offset_minutes: 0,
        }
    }
}

/// Settings for the optional AI enrichment step
#[derive(Debug, Clone, PartialEq)]
pub struct AiConfig {
    pub enabled: bool,
    pub timeout: Duration,
    pub content_policy: AiContentPolicy,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout: Duration::from_secs(30),
            content_policy: AiContentPolicy::Regenerate,
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub analysis: AnalysisConfig,
    pub ai: AiConfig,
}

impl EngineConfig {
    /// Load configuration (explicit path or override first, then default)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = read_layered(path, "insights.toml", DEFAULT_CONFIG)?;
        parse_config(&content)
    }

    /// Embedded defaults only, ignoring any override file
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }
}

/// Directory holding config overrides (~/.local/share/cardwise/config)
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("cardwise").join("config"))
}

/// Read a config file using the two-layer resolution
///
/// An explicit path must exist; the data-dir override is optional.
pub(crate) fn read_layered(
    explicit: Option<&Path>,
    file_name: &str,
    embedded: &'static str,
) -> Result<String> {
    if let Some(path) = explicit {
        return fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        });
    }

    if let Some(override_path) = default_config_dir().map(|d| d.join(file_name)) {
        if override_path.exists() {
            tracing::debug!(path = %override_path.display(), "Using config override");
            return fs::read_to_string(&override_path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", override_path.display(), e))
            });
        }
    }

    Ok(embedded.to_string())
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    analysis: Option<RawAnalysis>,
    ai: Option<RawAi>,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    base_savings_rate: Option<Decimal>,
    tier_match_tolerance: Option<Decimal>,
    top_n: Option<usize>,
    utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct RawAi {
    enabled: Option<bool>,
    timeout_secs: Option<u64>,
    content_policy: Option<AiContentPolicy>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<EngineConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = EngineConfig::default();

    if let Some(analysis) = raw.analysis {
        if let Some(rate) = analysis.base_savings_rate {
            if rate < Decimal::ZERO {
                return Err(Error::Config("base_savings_rate must not be negative".into()));
            }
            config.analysis.base_savings_rate = rate;
        }
        if let Some(tolerance) = analysis.tier_match_tolerance {
            config.analysis.tier_match_tolerance = tolerance;
        }
        if let Some(top_n) = analysis.top_n {
            config.analysis.top_n = top_n;
        }
        if let Some(offset) = analysis.utc_offset_minutes {
            // chrono::FixedOffset accepts strictly less than 24h either way
            if offset.unsigned_abs() >= 24 * 60 {
                return Err(Error::Config(format!(
                    "utc_offset_minutes out of range: {}",
                    offset
                )));
            }
            config.analysis.utc_offset_minutes = offset;
        }
    }

    if let Some(ai) = raw.ai {
        if let Some(enabled) = ai.enabled {
            config.ai.enabled = enabled;
        }
        if let Some(timeout) = ai.timeout_secs {
            config.ai.timeout = Duration::from_secs(timeout);
        }
        if let Some(policy) = ai.content_policy {
            config.ai.content_policy = policy;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_default_config() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = parse_config(
            r#"
[ai]
timeout_secs = 5
content_policy = "use_ai_text"
"#,
        )
        .unwrap();

        assert_eq!(config.ai.timeout, Duration::from_secs(5));
        assert_eq!(config.ai.content_policy, AiContentPolicy::UseAiText);
        assert!(config.ai.enabled);
        assert_eq!(config.analysis, AnalysisConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = parse_config("[analysis\ntop_n = 5").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let err = parse_config("[ai]\ncontent_policy = \"shout\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_offset_out_of_range() {
        let err = parse_config("[analysis]\nutc_offset_minutes = 1440").unwrap_err();
        assert!(err.to_string().contains("utc_offset_minutes"));

        let err = parse_config("[analysis]\nutc_offset_minutes = -2147483648").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analysis]\ntop_n = 3\nutc_offset_minutes = -300").unwrap();

        let config = EngineConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.analysis.top_n, 3);
        assert_eq!(config.analysis.utc_offset_minutes, -300);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let err = EngineConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
