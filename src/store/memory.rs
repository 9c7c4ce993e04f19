/// In-memory implementation of IssueStore
///
/// Repositories and issues live in hash maps behind a tokio RwLock. Contents
/// are lost on restart; callers re-ingest on startup.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::errors::IssueScopeError;
use crate::store::{IssueRecord, IssueStore, RepositoryInfo};

#[derive(Default)]
struct Inner {
    repositories: HashMap<String, RepositoryInfo>,
    /// repository full name -> issue number -> record
    issues: HashMap<String, HashMap<u64, IssueRecord>>,
}

/// Issue store held entirely in process memory.
#[derive(Default)]
pub struct InMemoryIssueStore {
    inner: RwLock<Inner>,
}

impl InMemoryIssueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IssueStore for InMemoryIssueStore {
    async fn upsert_repository(&self, repository: RepositoryInfo) -> Result<RepositoryInfo, IssueScopeError> {
        let mut inner = self.inner.write().await;
        inner
            .repositories
            .insert(repository.full_name.clone(), repository.clone());
        Ok(repository)
    }

    async fn find_repository(&self, full_name: &str) -> Result<Option<RepositoryInfo>, IssueScopeError> {
        let inner = self.inner.read().await;
        Ok(inner.repositories.get(full_name).cloned())
    }

    async fn upsert_issues(&self, issues: Vec<IssueRecord>) -> Result<usize, IssueScopeError> {
        let mut inner = self.inner.write().await;
        let count = issues.len();
        for issue in issues {
            inner
                .issues
                .entry(issue.repository.clone())
                .or_default()
                .insert(issue.issue_number, issue);
        }
        Ok(count)
    }

    async fn list_issues(&self, full_name: &str) -> Result<Vec<IssueRecord>, IssueScopeError> {
        let inner = self.inner.read().await;
        let mut issues: Vec<IssueRecord> = inner
            .issues
            .get(full_name)
            .map(|by_number| by_number.values().cloned().collect())
            .unwrap_or_default();
        // Newest first; issue number breaks ties so listing order is stable
        issues.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.issue_number.cmp(&a.issue_number))
        });
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{IssuePriority, IssueStatus};
    use chrono::{Duration, TimeZone, Utc};

    fn issue(repo: &str, number: u64, title: &str, age_days: i64) -> IssueRecord {
        let created = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap() - Duration::days(age_days);
        IssueRecord {
            repository: repo.to_string(),
            issue_number: number,
            title: title.to_string(),
            description: None,
            status: IssueStatus::Open,
            priority: IssuePriority::Medium,
            labels: vec![],
            author: "octocat".to_string(),
            author_url: None,
            url: format!("https://github.com/{}/issues/{}", repo, number),
            created_at: created,
            updated_at: created,
            embedding: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_number() {
        let store = InMemoryIssueStore::new();
        store.upsert_issues(vec![issue("a/b", 1, "first", 0)]).await.unwrap();
        store.upsert_issues(vec![issue("a/b", 1, "renamed", 0)]).await.unwrap();

        let issues = store.list_issues("a/b").await.unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].title, "renamed");
    }

    #[tokio::test]
    async fn test_list_newest_first_and_scoped_by_repo() {
        let store = InMemoryIssueStore::new();
        store
            .upsert_issues(vec![
                issue("a/b", 1, "old", 10),
                issue("a/b", 2, "new", 1),
                issue("c/d", 3, "other repo", 0),
            ])
            .await
            .unwrap();

        let issues = store.list_issues("a/b").await.unwrap();
        let titles: Vec<&str> = issues.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "old"]);
        assert!(store.list_issues("missing/repo").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repository_roundtrip() {
        let store = InMemoryIssueStore::new();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert!(store.find_repository("a/b").await.unwrap().is_none());

        store
            .upsert_repository(RepositoryInfo::from_full_name("a/b", now))
            .await
            .unwrap();
        let repo = store.find_repository("a/b").await.unwrap().unwrap();
        assert_eq!(repo.owner, "a");
        assert_eq!(repo.name, "b");
        assert_eq!(repo.url, "https://github.com/a/b");
    }
}
