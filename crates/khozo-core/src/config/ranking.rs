//! Related-content and trending configuration.

use serde::{Deserialize, Serialize};

/// Related-content scorer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedConfig {
    /// Number of results returned when the caller gives no limit.
    #[serde(default = "default_related_limit")]
    pub default_limit: usize,
    /// Minimum similarity applied when the caller gives none.
    #[serde(default = "default_min_similarity")]
    pub default_min_similarity: f64,
    /// Maximum number of candidate records scored per request.
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,
    /// How long a ranked list stays cached, in seconds.
    #[serde(default = "default_related_ttl")]
    pub cache_ttl_seconds: u64,
}

impl Default for RelatedConfig {
    fn default() -> Self {
        Self {
            default_limit: default_related_limit(),
            default_min_similarity: default_min_similarity(),
            candidate_limit: default_candidate_limit(),
            cache_ttl_seconds: default_related_ttl(),
        }
    }
}

/// Trending aggregator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingConfig {
    /// Number of results returned when the caller gives no limit.
    #[serde(default = "default_trending_limit")]
    pub default_limit: usize,
    /// Upper bound accepted for a trending limit.
    #[serde(default = "default_trending_max")]
    pub max_limit: usize,
    /// How long a trending list stays cached, in seconds.
    #[serde(default = "default_trending_ttl")]
    pub cache_ttl_seconds: u64,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            default_limit: default_trending_limit(),
            max_limit: default_trending_max(),
            cache_ttl_seconds: default_trending_ttl(),
        }
    }
}

fn default_related_limit() -> usize {
    5
}

fn default_min_similarity() -> f64 {
    0.3
}

fn default_candidate_limit() -> usize {
    200
}

fn default_related_ttl() -> u64 {
    600
}

fn default_trending_limit() -> usize {
    10
}

fn default_trending_max() -> usize {
    50
}

fn default_trending_ttl() -> u64 {
    300
}
