/// Analysis request handling
///
/// Validates a `{repo, prompt, page, limit}` request, serves it from the
/// injected cache when a fresh entry exists, and otherwise ranks the
/// repository's stored issues, builds the summary and report, and caches the
/// result. Pagination is applied after the cache, so every page of one prompt
/// shares a single ranking.

pub mod pagination;
pub mod report;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::cache::{AnalysisCache, CachedAnalysis, cache_key};
use crate::clock::Clock;
use crate::config::{AnalysisConfig, RankingConfig};
use crate::errors::IssueScopeError;
use crate::search::RelevanceRanker;
use crate::store::{IssueRecord, IssueStatus, IssueStore, RepositoryInfo};

pub use pagination::{Pagination, paginate};
pub use report::generate_report;

/// "owner/name" with exactly one slash.
pub const REPO_PATTERN: &str = r"^[^/]+/[^/]+$";

/// Check that `repo` looks like "owner/name".
pub fn validate_repo(repo: &str) -> Result<(), IssueScopeError> {
    let re = Regex::new(REPO_PATTERN).map_err(|e| IssueScopeError::Internal(e.to_string()))?;
    if !re.is_match(repo) {
        return Err(IssueScopeError::validation(
            "repo",
            "Repository must be in format \"owner/repository-name\"",
        ));
    }
    Ok(())
}

/// Counts over every issue of a repository, plus the ranked list length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_issues: usize,
    pub relevant_issues: usize,
    pub open_issues: usize,
    pub closed_issues: usize,
    /// High and critical together
    pub high_priority_issues: usize,
}

impl AnalysisSummary {
    pub fn from_issues(issues: &[IssueRecord], relevant_issues: usize) -> Self {
        AnalysisSummary {
            total_issues: issues.len(),
            relevant_issues,
            open_issues: issues.iter().filter(|i| i.status == IssueStatus::Open).count(),
            closed_issues: issues.iter().filter(|i| i.status == IssueStatus::Closed).count(),
            high_priority_issues: issues.iter().filter(|i| i.priority.is_high_or_above()).count(),
        }
    }
}

/// Everything computed for one (repository, prompt) pair. This is what gets cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Markdown report
    pub analysis: String,
    pub analysis_timestamp: DateTime<Utc>,
    pub prompt: String,
    pub repository: RepositoryInfo,
    pub summary: AnalysisSummary,
    /// Full ranked list (capped by ranking.max_results), embeddings stripped
    pub ranked_issues: Vec<IssueRecord>,
}

/// An incoming analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub repo: String,
    pub prompt: String,
    /// 1-based page (default 1)
    pub page: Option<i64>,
    /// Page size (default from config, clamped to 1..=max_limit)
    pub limit: Option<i64>,
}

/// One page of an analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub analysis: String,
    pub analysis_timestamp: DateTime<Utc>,
    pub prompt: String,
    pub repository: RepositoryInfo,
    pub summary: AnalysisSummary,
    pub relevant_issues: Vec<IssueRecord>,
    pub pagination: Pagination,
    /// True when served from the cache
    pub cached: bool,
}

/// Runs analyses against an issue store, with caching and an injected clock.
pub struct Analyzer {
    store: Arc<dyn IssueStore>,
    cache: Arc<dyn AnalysisCache>,
    clock: Arc<dyn Clock>,
    ranking: RankingConfig,
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(
        store: Arc<dyn IssueStore>,
        cache: Arc<dyn AnalysisCache>,
        clock: Arc<dyn Clock>,
        ranking: RankingConfig,
        config: AnalysisConfig,
    ) -> Self {
        Analyzer {
            store,
            cache,
            clock,
            ranking,
            config,
        }
    }

    /// Resolve page and limit from the request, applying defaults and bounds.
    fn page_params(&self, request: &AnalysisRequest) -> (usize, usize) {
        let page = request.page.unwrap_or(1).max(1) as usize;
        let max_limit = self.config.max_limit.max(1) as i64;
        let limit = request
            .limit
            .unwrap_or(self.config.default_limit as i64)
            .clamp(1, max_limit) as usize;
        (page, limit)
    }

    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResponse, IssueScopeError> {
        if request.repo.trim().is_empty() {
            return Err(IssueScopeError::validation(
                "repo",
                "Both repo and prompt parameters are required",
            ));
        }
        if request.prompt.trim().is_empty() {
            return Err(IssueScopeError::validation(
                "prompt",
                "Both repo and prompt parameters are required",
            ));
        }
        validate_repo(&request.repo)?;

        let (page, limit) = self.page_params(&request);
        let now = self.clock.now();
        let ttl = Duration::seconds(self.config.cache_ttl_secs);
        let key = cache_key(&request.repo, &request.prompt);

        let fresh = match self.cache.get(&key).await {
            Some(entry) if entry.is_fresh(now, ttl) => {
                tracing::info!(
                    repo = %request.repo,
                    age_secs = now.signed_duration_since(entry.stored_at).num_seconds(),
                    "Analysis cache hit"
                );
                Some(entry.result)
            }
            _ => None,
        };

        let cached = fresh.is_some();
        let result = match fresh {
            Some(result) => result,
            None => {
                let result = self.compute(&request.repo, &request.prompt, now).await?;
                self.cache
                    .put(
                        key,
                        CachedAnalysis {
                            result: result.clone(),
                            stored_at: now,
                        },
                    )
                    .await;
                tracing::info!(
                    repo = %request.repo,
                    ranked = result.ranked_issues.len(),
                    "Analysis computed and cached"
                );
                result
            }
        };

        let (slice, pagination) = paginate(&result.ranked_issues, page, limit);
        let relevant_issues = slice.to_vec();

        Ok(AnalysisResponse {
            analysis: result.analysis,
            analysis_timestamp: now,
            prompt: result.prompt,
            repository: result.repository,
            summary: result.summary,
            relevant_issues,
            pagination,
            cached,
        })
    }

    async fn compute(&self, repo: &str, prompt: &str, now: DateTime<Utc>) -> Result<AnalysisResult, IssueScopeError> {
        let repository = self.store.find_repository(repo).await?.ok_or_else(|| {
            IssueScopeError::not_found(format!(
                "Repository {} not found. Please scan the repository first.",
                repo
            ))
        })?;

        let issues = self.store.list_issues(repo).await?;
        if issues.is_empty() {
            return Err(IssueScopeError::not_found(format!(
                "No issues found for repository {}. Please scan the repository first.",
                repo
            )));
        }

        let ranked = RelevanceRanker::new(&self.ranking).rank(&issues, prompt, now);
        let summary = AnalysisSummary::from_issues(&issues, ranked.len());
        tracing::debug!(
            repo = %repo,
            total = summary.total_issues,
            open = summary.open_issues,
            high_priority = summary.high_priority_issues,
            "Issue distribution"
        );
        let analysis = generate_report(&repository, &issues, &ranked, prompt);

        let ranked_issues = ranked
            .into_iter()
            .map(|issue| IssueRecord {
                embedding: None,
                ..issue.clone()
            })
            .collect();

        Ok(AnalysisResult {
            analysis,
            analysis_timestamp: now,
            prompt: prompt.to_string(),
            repository,
            summary,
            ranked_issues,
        })
    }
}
