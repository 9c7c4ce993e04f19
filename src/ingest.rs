/// Issue ingestion
///
/// Converts raw GitHub issue payloads into stored `IssueRecord`s: pull
/// requests are dropped, each issue gets a fingerprint of its title, body and
/// label names, and a scan summary is returned. Fetching the payloads is the
/// caller's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::embedding::{EmbeddingProvider, build_embedding_text};
use crate::errors::IssueScopeError;
use crate::store::{IssuePriority, IssueRecord, IssueStatus, IssueStore, RepositoryInfo};

/// A label as returned by the GitHub issues API.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RawLabel {
    pub name: String,
}

/// Issue author as returned by the GitHub issues API.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RawUser {
    pub login: String,
    pub html_url: Option<String>,
}

/// One issue (or pull request) from `GET /repos/{owner}/{repo}/issues`.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RawIssue {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    /// "open" or "closed"
    pub state: String,
    #[serde(default)]
    pub labels: Vec<RawLabel>,
    pub user: Option<RawUser>,
    pub html_url: String,
    /// ISO-8601 timestamp
    pub created_at: String,
    /// ISO-8601 timestamp
    pub updated_at: String,
}

impl RawIssue {
    /// The issues endpoint also lists pull requests; they link to `/pull/`.
    pub fn is_pull_request(&self) -> bool {
        self.html_url.contains("/pull/")
    }

    pub fn label_names(&self) -> Vec<String> {
        self.labels.iter().map(|l| l.name.clone()).collect()
    }
}

/// Counts reported after an ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Issues stored (pull requests excluded)
    pub total_issues: usize,
    pub open_issues: usize,
    pub closed_issues: usize,
    /// Items received, pull requests included
    pub total_api_issues: usize,
    pub filtered_pull_requests: usize,
    pub scanned_at: DateTime<Utc>,
}

fn parse_timestamp(value: &str, field: &str) -> Result<DateTime<Utc>, IssueScopeError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            IssueScopeError::validation(
                field,
                &format!("Invalid datetime '{}': expected ISO-8601 (e.g. 2024-01-01T00:00:00Z)", value),
            )
        })
}

/// Turns raw payloads into fingerprinted records and stores them.
pub struct IngestPipeline {
    provider: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn IssueStore>,
}

impl IngestPipeline {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, store: Arc<dyn IssueStore>) -> Self {
        IngestPipeline { provider, store }
    }

    /// Build one record. Priority starts at medium; nothing in the payload sets it.
    pub async fn to_record(&self, repository: &str, raw: &RawIssue) -> Result<IssueRecord, IssueScopeError> {
        let status: IssueStatus = raw
            .state
            .parse()
            .map_err(|e: String| IssueScopeError::validation("state", &e))?;
        let labels = raw.label_names();
        let text = build_embedding_text(&raw.title, raw.body.as_deref(), &labels);
        let embedding = self.provider.embed(&text).await?;

        Ok(IssueRecord {
            repository: repository.to_string(),
            issue_number: raw.number,
            title: raw.title.clone(),
            description: raw.body.clone(),
            status,
            priority: IssuePriority::default(),
            labels,
            author: raw.user.as_ref().map(|u| u.login.clone()).unwrap_or_default(),
            author_url: raw.user.as_ref().and_then(|u| u.html_url.clone()),
            url: raw.html_url.clone(),
            created_at: parse_timestamp(&raw.created_at, "created_at")?,
            updated_at: parse_timestamp(&raw.updated_at, "updated_at")?,
            embedding: Some(embedding),
        })
    }

    /// Ingest a batch for `repository`, creating the repository record if needed.
    ///
    /// The whole batch is validated before anything is written.
    pub async fn ingest(
        &self,
        repository: RepositoryInfo,
        raw_issues: &[RawIssue],
        now: DateTime<Utc>,
    ) -> Result<ScanSummary, IssueScopeError> {
        let full_name = repository.full_name.clone();
        let issues_only: Vec<&RawIssue> = raw_issues.iter().filter(|r| !r.is_pull_request()).collect();

        let mut records = Vec::with_capacity(issues_only.len());
        for raw in &issues_only {
            records.push(self.to_record(&full_name, raw).await?);
        }

        let open_issues = records.iter().filter(|r| r.status == IssueStatus::Open).count();
        let closed_issues = records.len() - open_issues;

        self.store.upsert_repository(repository).await?;
        let stored = self.store.upsert_issues(records).await?;

        let summary = ScanSummary {
            total_issues: stored,
            open_issues,
            closed_issues,
            total_api_issues: raw_issues.len(),
            filtered_pull_requests: raw_issues.len() - issues_only.len(),
            scanned_at: now,
        };

        tracing::info!(
            repo = %full_name,
            model = self.provider.model_name(),
            stored = summary.total_issues,
            pull_requests = summary.filtered_pull_requests,
            "Ingested issues"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{FingerprintEmbeddingProvider, generate};
    use crate::store::memory::InMemoryIssueStore;
    use chrono::TimeZone;

    fn raw(number: u64, title: &str, state: &str, path: &str) -> RawIssue {
        RawIssue {
            number,
            title: title.to_string(),
            body: Some("Steps to reproduce".to_string()),
            state: state.to_string(),
            labels: vec![RawLabel { name: "bug".to_string() }, RawLabel { name: "P1".to_string() }],
            user: Some(RawUser {
                login: "octocat".to_string(),
                html_url: Some("https://github.com/octocat".to_string()),
            }),
            html_url: format!("https://github.com/acme/widgets/{}/{}", path, number),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-02T00:00:00Z".to_string(),
        }
    }

    fn pipeline(store: Arc<InMemoryIssueStore>) -> IngestPipeline {
        IngestPipeline::new(Arc::new(FingerprintEmbeddingProvider::new()), store)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_record_fields_and_fingerprint() {
        let store = Arc::new(InMemoryIssueStore::new());
        let record = pipeline(store).to_record("acme/widgets", &raw(7, "Crash", "OPEN", "issues")).await.unwrap();

        assert_eq!(record.issue_number, 7);
        assert_eq!(record.status, IssueStatus::Open);
        assert_eq!(record.priority, IssuePriority::Medium);
        assert_eq!(record.labels, vec!["bug", "P1"]);
        assert_eq!(record.author, "octocat");
        assert_eq!(record.updated_at, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
        assert_eq!(record.embedding, Some(generate("Crash Steps to reproduce bug P1")));
    }

    #[tokio::test]
    async fn test_ingest_filters_pull_requests() {
        let store = Arc::new(InMemoryIssueStore::new());
        let batch = vec![
            raw(1, "Crash", "open", "issues"),
            raw(2, "Old crash", "closed", "issues"),
            raw(3, "Refactor parser", "open", "pull"),
        ];
        let summary = pipeline(store.clone())
            .ingest(RepositoryInfo::from_full_name("acme/widgets", now()), &batch, now())
            .await
            .unwrap();

        assert_eq!(summary.total_issues, 2);
        assert_eq!(summary.open_issues, 1);
        assert_eq!(summary.closed_issues, 1);
        assert_eq!(summary.total_api_issues, 3);
        assert_eq!(summary.filtered_pull_requests, 1);
        assert_eq!(store.list_issues("acme/widgets").await.unwrap().len(), 2);
        assert!(store.find_repository("acme/widgets").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalid_payload_writes_nothing() {
        let store = Arc::new(InMemoryIssueStore::new());
        let mut bad = raw(2, "Bad", "open", "issues");
        bad.updated_at = "yesterday".to_string();
        let batch = vec![raw(1, "Good", "open", "issues"), bad];

        let err = pipeline(store.clone())
            .ingest(RepositoryInfo::from_full_name("acme/widgets", now()), &batch, now())
            .await
            .unwrap_err();
        assert!(matches!(err, IssueScopeError::Validation { ref field, .. } if field.as_deref() == Some("updated_at")));
        assert!(store.list_issues("acme/widgets").await.unwrap().is_empty());

        let mut unknown_state = raw(3, "Odd", "merged", "issues");
        unknown_state.body = None;
        assert!(pipeline(store).to_record("acme/widgets", &unknown_state).await.is_err());
    }
}
