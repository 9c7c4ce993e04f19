use rmcp::{
    ServerHandler,
    tool,
    model::{ServerCapabilities, Implementation, ProtocolVersion, CallToolResult},
    handler::server::wrapper::Parameters,
    ErrorData as McpError,
};
use serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

use crate::analysis::{AnalysisRequest, Analyzer, validate_repo};
use crate::cache::{AnalysisCache, InMemoryAnalysisCache};
use crate::clock::{Clock, SystemClock};
use crate::config::{Config, SimilarityConfig};
use crate::embedding::{EmbeddingProvider, FingerprintEmbeddingProvider, cosine_similarity};
use crate::errors::IssueScopeError;
use crate::ingest::{IngestPipeline, RawIssue};
use crate::search::find_similar;
use crate::store::{IssueStore, RepositoryInfo};
use crate::store::memory::InMemoryIssueStore;

pub struct IssueScopeService {
    store: Arc<dyn IssueStore>,
    provider: Arc<dyn EmbeddingProvider>,
    clock: Arc<dyn Clock>,
    analyzer: Analyzer,
    ingest: IngestPipeline,
    similarity: SimilarityConfig,
    start_time: Instant,
}

impl IssueScopeService {
    pub fn new(
        store: Arc<dyn IssueStore>,
        cache: Arc<dyn AnalysisCache>,
        clock: Arc<dyn Clock>,
        config: &Config,
    ) -> Self {
        let provider: Arc<dyn EmbeddingProvider> = Arc::new(FingerprintEmbeddingProvider::new());
        Self {
            analyzer: Analyzer::new(
                store.clone(),
                cache,
                clock.clone(),
                config.ranking.clone(),
                config.analysis.clone(),
            ),
            ingest: IngestPipeline::new(provider.clone(), store.clone()),
            store,
            provider,
            clock,
            similarity: config.similarity.clone(),
            start_time: Instant::now(),
        }
    }

    /// Service backed by the in-memory store and cache, reading the system clock.
    pub fn in_memory(config: &Config) -> Self {
        Self::new(
            Arc::new(InMemoryIssueStore::new()),
            Arc::new(InMemoryAnalysisCache::new()),
            Arc::new(SystemClock),
            config,
        )
    }

    fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

// Parameter structs

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct IngestIssuesParams {
    /// Repository in "owner/name" form (required)
    pub repo: String,
    /// Raw issues as returned by the GitHub issues API; pull requests are skipped
    pub issues: Vec<RawIssue>,
    /// Repository description (optional)
    pub description: Option<String>,
    /// Primary language (optional)
    pub language: Option<String>,
    /// Stargazer count (optional)
    pub stars: Option<u64>,
    /// Fork count (optional)
    pub forks: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct AnalyzeIssuesParams {
    /// Repository in "owner/name" form (required)
    pub repo: String,
    /// What to look for, e.g. "fix open bugs" (required)
    pub prompt: String,
    /// 1-based page number (default: 1)
    pub page: Option<i64>,
    /// Issues per page (1-50, default: 10)
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct FindSimilarIssuesParams {
    /// Repository in "owner/name" form (required)
    pub repo: String,
    /// Text to compare against stored issue fingerprints (required)
    pub text: String,
    /// Minimum cosine similarity (default from config: 0.5)
    pub threshold: Option<f64>,
    /// Maximum results (default from config: 10)
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct FingerprintSimilarityParams {
    /// First text
    pub a: String,
    /// Second text
    pub b: String,
}

// Helper: convert IssueScopeError to CallToolResult with isError: true
fn error_to_result(err: IssueScopeError) -> CallToolResult {
    match err {
        IssueScopeError::NotFound { resource } => {
            CallToolResult::structured_error(json!({
                "isError": true,
                "error": resource,
                "hint": "Use ingest_issues to load the repository's issues first"
            }))
        }
        IssueScopeError::Validation { message, field } => {
            let mut obj = json!({
                "isError": true,
                "error": message,
            });
            if let Some(f) = field {
                obj["field"] = json!(f);
            }
            CallToolResult::structured_error(obj)
        }
        other => {
            CallToolResult::structured_error(json!({
                "isError": true,
                "error": other.to_string()
            }))
        }
    }
}

// Tool implementations

#[rmcp::tool_router]
impl IssueScopeService {
    #[tool(description = "Ingest raw GitHub issues for a repository. Pull requests are filtered out, each issue is fingerprinted and stored. Returns a scan summary.")]
    async fn ingest_issues(
        &self,
        Parameters(params): Parameters<IngestIssuesParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            tool = "ingest_issues",
            repo = %params.repo,
            count = params.issues.len(),
            "Tool called"
        );

        if let Err(e) = validate_repo(&params.repo) {
            return Ok(error_to_result(e));
        }

        let now = self.clock.now();
        let existing = match self.store.find_repository(&params.repo).await {
            Ok(existing) => existing,
            Err(e) => return Ok(error_to_result(e)),
        };
        let mut repository = existing.unwrap_or_else(|| RepositoryInfo::from_full_name(&params.repo, now));
        repository.updated_at = now;
        if params.description.is_some() {
            repository.description = params.description;
        }
        if params.language.is_some() {
            repository.language = params.language;
        }
        if let Some(stars) = params.stars {
            repository.stars = stars;
        }
        if let Some(forks) = params.forks {
            repository.forks = forks;
        }

        match self.ingest.ingest(repository, &params.issues, now).await {
            Ok(summary) => Ok(CallToolResult::structured(json!({
                "repository": params.repo,
                "total_issues": summary.total_issues,
                "open_issues": summary.open_issues,
                "closed_issues": summary.closed_issues,
                "total_api_issues": summary.total_api_issues,
                "filtered_pull_requests": summary.filtered_pull_requests,
                "scanned_at": summary.scanned_at.to_rfc3339(),
                "hint": "Use analyze_issues with a prompt to rank these issues"
            }))),
            Err(e) => Ok(error_to_result(e)),
        }
    }

    #[tool(description = "Rank a repository's ingested issues against a natural language prompt. Returns a markdown report, summary counts and one page of relevant issues.")]
    async fn analyze_issues(
        &self,
        Parameters(params): Parameters<AnalyzeIssuesParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            tool = "analyze_issues",
            repo = %params.repo,
            page = ?params.page,
            limit = ?params.limit,
            "Tool called"
        );

        let request = AnalysisRequest {
            repo: params.repo,
            prompt: params.prompt,
            page: params.page,
            limit: params.limit,
        };
        match self.analyzer.analyze(request).await {
            Ok(response) => match serde_json::to_value(&response) {
                Ok(value) => Ok(CallToolResult::structured(value)),
                Err(e) => Ok(error_to_result(IssueScopeError::Internal(e.to_string()))),
            },
            Err(e) => Ok(error_to_result(e)),
        }
    }

    #[tool(description = "Find ingested issues whose text fingerprint is similar to the given text. Useful for spotting duplicates before filing a new issue.")]
    async fn find_similar_issues(
        &self,
        Parameters(params): Parameters<FindSimilarIssuesParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            tool = "find_similar_issues",
            repo = %params.repo,
            threshold = ?params.threshold,
            limit = ?params.limit,
            "Tool called"
        );

        if let Err(e) = validate_repo(&params.repo) {
            return Ok(error_to_result(e));
        }
        if params.text.trim().is_empty() {
            return Ok(CallToolResult::structured_error(json!({
                "isError": true,
                "error": "Field 'text' is required and cannot be empty",
                "field": "text"
            })));
        }

        let threshold = params.threshold.unwrap_or(self.similarity.threshold);
        let limit = params.limit.map(|l| l.max(1) as usize).unwrap_or(self.similarity.max_results);

        let query = match self.provider.embed(&params.text).await {
            Ok(v) => v,
            Err(e) => return Ok(error_to_result(e.into())),
        };
        let issues = match self.store.list_issues(&params.repo).await {
            Ok(issues) => issues,
            Err(e) => return Ok(error_to_result(e)),
        };

        match find_similar(&issues, &query, threshold, limit) {
            Ok(matches) => {
                let results: Vec<serde_json::Value> = matches
                    .iter()
                    .map(|m| {
                        json!({
                            "issue_number": m.issue.issue_number,
                            "title": m.issue.title,
                            "status": m.issue.status,
                            "url": m.issue.url,
                            "similarity": m.similarity,
                        })
                    })
                    .collect();
                let count = results.len();
                Ok(CallToolResult::structured(json!({
                    "results": results,
                    "count": count,
                    "threshold": threshold,
                    "model": self.provider.model_name(),
                })))
            }
            Err(e) => Ok(error_to_result(e.into())),
        }
    }

    #[tool(description = "Compute the cosine similarity between the fingerprints of two texts.")]
    async fn fingerprint_similarity(
        &self,
        Parameters(params): Parameters<FingerprintSimilarityParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(tool = "fingerprint_similarity", "Tool called");

        let a = match self.provider.embed(&params.a).await {
            Ok(v) => v,
            Err(e) => return Ok(error_to_result(e.into())),
        };
        let b = match self.provider.embed(&params.b).await {
            Ok(v) => v,
            Err(e) => return Ok(error_to_result(e.into())),
        };
        match cosine_similarity(&a, &b) {
            Ok(similarity) => Ok(CallToolResult::structured(json!({
                "similarity": similarity,
                "dimension": self.provider.dimension(),
                "model": self.provider.model_name(),
            }))),
            Err(e) => Ok(error_to_result(e.into())),
        }
    }

    #[tool(description = "Check server health and status")]
    async fn health_check(
        &self,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(tool = "health_check", "Tool called");
        let response = json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "uptime_seconds": self.uptime_seconds(),
            "embedding_model": self.provider.model_name(),
        });
        Ok(CallToolResult::structured(response))
    }
}

// ServerHandler implementation

#[rmcp::tool_handler(router = Self::tool_router())]
impl ServerHandler for IssueScopeService {
    fn get_info(&self) -> rmcp::model::InitializeResult {
        rmcp::model::InitializeResult {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: Implementation {
                name: "issuescope".to_string(),
                title: None,
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: Some("Prompt-driven GitHub issue relevance ranking over MCP".to_string()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Issue analysis server. Call ingest_issues with raw GitHub issues first, then analyze_issues with a prompt. Other tools: find_similar_issues, fingerprint_similarity, health_check.".to_string()
            ),
        }
    }
}
