/// Analysis result cache
///
/// The cache is a capability handed to the analysis service, not a global.
/// It only stores timestamped entries; deciding whether an entry is still
/// fresh is the caller's job, using its own clock and TTL.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::analysis::AnalysisResult;

/// A cached analysis and when it was computed.
#[derive(Debug, Clone)]
pub struct CachedAnalysis {
    pub result: AnalysisResult,
    pub stored_at: DateTime<Utc>,
}

impl CachedAnalysis {
    /// True while `now - stored_at` is strictly below `ttl`.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.stored_at) < ttl
    }
}

/// Cache key for a repository/prompt pair: `analysis:{repo}:{base64(prompt)}`.
pub fn cache_key(repo: &str, prompt: &str) -> String {
    format!("analysis:{}:{}", repo, STANDARD.encode(prompt.as_bytes()))
}

#[async_trait]
pub trait AnalysisCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<CachedAnalysis>;

    async fn put(&self, key: String, entry: CachedAnalysis);
}

/// Process-local cache. Entries are never evicted, only overwritten.
#[derive(Default)]
pub struct InMemoryAnalysisCache {
    entries: Mutex<HashMap<String, CachedAnalysis>>,
}

impl InMemoryAnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AnalysisCache for InMemoryAnalysisCache {
    async fn get(&self, key: &str) -> Option<CachedAnalysis> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    async fn put(&self, key: String, entry: CachedAnalysis) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::analysis::AnalysisSummary;
    use crate::store::RepositoryInfo;

    fn result(stored_at: DateTime<Utc>) -> AnalysisResult {
        AnalysisResult {
            analysis: String::new(),
            analysis_timestamp: stored_at,
            prompt: "fix bugs".to_string(),
            repository: RepositoryInfo::from_full_name("acme/widgets", stored_at),
            summary: AnalysisSummary::default(),
            ranked_issues: vec![],
        }
    }

    #[test]
    fn test_cache_key_base64_prompt() {
        assert_eq!(cache_key("acme/widgets", "fix bugs"), "analysis:acme/widgets:Zml4IGJ1Z3M=");
    }

    #[test]
    fn test_freshness_boundary() {
        let stored_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let entry = CachedAnalysis {
            result: result(stored_at),
            stored_at,
        };
        let ttl = Duration::hours(1);
        assert!(entry.is_fresh(stored_at + Duration::minutes(59), ttl));
        assert!(!entry.is_fresh(stored_at + Duration::hours(1), ttl));
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = InMemoryAnalysisCache::new();
        assert!(cache.get("k").await.is_none());
        let stored_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        cache
            .put(
                "k".to_string(),
                CachedAnalysis {
                    result: result(stored_at),
                    stored_at,
                },
            )
            .await;
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k").await.unwrap().stored_at, stored_at);
    }
}
