/// Issue store abstraction layer
///
/// Provides the IssueStore trait and the issue/repository records the ranking
/// core reads. The only backend is in-memory; durable storage is left to
/// whoever embeds the crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::embedding::Vector;
use crate::errors::IssueScopeError;

pub mod memory;

/// Lifecycle state of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    Open,
    Closed,
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueStatus::Open => write!(f, "open"),
            IssueStatus::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for IssueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(IssueStatus::Open),
            "closed" => Ok(IssueStatus::Closed),
            other => Err(format!("Unknown issue status: {}", other)),
        }
    }
}

/// Triage priority of an issue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssuePriority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl IssuePriority {
    /// High and critical issues count toward the "high priority" summary.
    pub fn is_high_or_above(self) -> bool {
        matches!(self, IssuePriority::Critical | IssuePriority::High)
    }
}

impl fmt::Display for IssuePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssuePriority::Critical => write!(f, "critical"),
            IssuePriority::High => write!(f, "high"),
            IssuePriority::Medium => write!(f, "medium"),
            IssuePriority::Low => write!(f, "low"),
        }
    }
}

impl FromStr for IssuePriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(IssuePriority::Critical),
            "high" => Ok(IssuePriority::High),
            "medium" => Ok(IssuePriority::Medium),
            "low" => Ok(IssuePriority::Low),
            other => Err(format!("Unknown issue priority: {}", other)),
        }
    }
}

/// A collected issue. The ranking core reads these and never writes them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    /// Owning repository as "owner/name"
    pub repository: String,
    /// Issue number within the repository
    pub issue_number: u64,
    pub title: String,
    /// Issue body; `None` when the issue has no description
    pub description: Option<String>,
    pub status: IssueStatus,
    pub priority: IssuePriority,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub author: String,
    pub author_url: Option<String>,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Text fingerprint, attached at ingestion time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vector>,
}

/// Repository metadata shown in analysis reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    /// "owner/name"
    pub full_name: String,
    pub owner: String,
    pub name: String,
    pub description: Option<String>,
    pub url: String,
    pub language: Option<String>,
    #[serde(default)]
    pub stars: u64,
    #[serde(default)]
    pub forks: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RepositoryInfo {
    /// Minimal repository record derived from a validated "owner/name" string.
    pub fn from_full_name(full_name: &str, now: DateTime<Utc>) -> Self {
        let (owner, name) = full_name.split_once('/').unwrap_or((full_name, ""));
        RepositoryInfo {
            full_name: full_name.to_string(),
            owner: owner.to_string(),
            name: name.to_string(),
            description: None,
            url: format!("https://github.com/{}", full_name),
            language: None,
            stars: 0,
            forks: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Core abstraction for issue persistence operations.
///
/// All implementations must be Send + Sync to support concurrent access.
#[async_trait]
pub trait IssueStore: Send + Sync {
    /// Insert or replace repository metadata, keyed by full name.
    async fn upsert_repository(&self, repository: RepositoryInfo) -> Result<RepositoryInfo, IssueScopeError>;

    /// Look up a repository by "owner/name".
    async fn find_repository(&self, full_name: &str) -> Result<Option<RepositoryInfo>, IssueScopeError>;

    /// Insert or replace issues, keyed by (repository, issue_number).
    ///
    /// Returns the number of issues written.
    async fn upsert_issues(&self, issues: Vec<IssueRecord>) -> Result<usize, IssueScopeError>;

    /// All issues of a repository, newest first by created_at.
    async fn list_issues(&self, full_name: &str) -> Result<Vec<IssueRecord>, IssueScopeError>;
}
