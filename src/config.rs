/// Configuration management using figment
///
/// Loads configuration with this precedence (highest wins):
/// 1. Defaults (hardcoded)
/// 2. TOML file: issuescope.toml (in working directory)
/// 3. Environment variables: prefixed ISSUESCOPE_, nested keys split on "__"
///    (e.g., ISSUESCOPE_RANKING__DEBUG_SCORING=true)

use figment::{
    Figment,
    providers::{Env, Format, Toml, Serialized},
};
use serde::{Deserialize, Serialize};
use crate::errors::IssueScopeError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub ranking: RankingConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub similarity: SimilarityConfig,
}

/// Relevance ranker tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Maximum number of ranked issues returned per analysis
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Open issues updated within this many days get the recency bonus
    #[serde(default = "default_recency_window_days")]
    pub recency_window_days: i64,

    /// Populate per-component score breakdowns (logged at debug level)
    #[serde(default)]
    pub debug_scoring: bool,
}

/// Analysis request handling: caching and page sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// How long a cached analysis stays valid, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: i64,

    /// Page size used when the request omits `limit`
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Upper bound for a requested page size
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

/// Fingerprint similarity search defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityConfig {
    /// Minimum cosine similarity for a match
    #[serde(default = "default_similarity_threshold")]
    pub threshold: f64,

    #[serde(default = "default_similarity_max_results")]
    pub max_results: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_results() -> usize {
    100
}

fn default_recency_window_days() -> i64 {
    30
}

fn default_cache_ttl_secs() -> i64 {
    60 * 60
}

fn default_limit() -> usize {
    10
}

fn default_max_limit() -> usize {
    50
}

fn default_similarity_threshold() -> f64 {
    0.5
}

fn default_similarity_max_results() -> usize {
    10
}

impl Default for RankingConfig {
    fn default() -> Self {
        RankingConfig {
            max_results: default_max_results(),
            recency_window_days: default_recency_window_days(),
            debug_scoring: false,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            cache_ttl_secs: default_cache_ttl_secs(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        SimilarityConfig {
            threshold: default_similarity_threshold(),
            max_results: default_similarity_max_results(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: default_log_level(),
            ranking: RankingConfig::default(),
            analysis: AnalysisConfig::default(),
            similarity: SimilarityConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, TOML file, and environment variables
    ///
    /// Environment variables override TOML file values.
    /// Example: ISSUESCOPE_LOG_LEVEL=debug overrides log_level in issuescope.toml
    pub fn load() -> Result<Config, IssueScopeError> {
        Self::figment()
            .extract()
            .map_err(|e| IssueScopeError::Config(format!("Failed to load config: {}", e)))
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file("issuescope.toml"))
            .merge(Env::prefixed("ISSUESCOPE_").split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.ranking.max_results, 100);
        assert_eq!(config.ranking.recency_window_days, 30);
        assert!(!config.ranking.debug_scoring);
        assert_eq!(config.analysis.cache_ttl_secs, 3600);
        assert_eq!(config.analysis.default_limit, 10);
        assert_eq!(config.analysis.max_limit, 50);
    }

    #[test]
    fn test_partial_toml_keeps_section_defaults() {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string("[ranking]\ndebug_scoring = true\n"))
            .extract()
            .unwrap();
        assert!(config.ranking.debug_scoring);
        assert_eq!(config.ranking.max_results, 100);
        assert_eq!(config.similarity.max_results, 10);
    }
}
