/// Relevance scoring for issue ranking
///
/// Each issue's score is an integer sum of independent bonuses:
///   1. Match: keyword substring hits in title (+10), description (+5), labels (+5)
///   2. Keyword: per keyword, +3 for a title hit and +1 for a description hit
///   3. Priority: critical +4, high +3, medium +1, low 0
///   4. Status: depends on whether the prompt asks for open work (see `status_bonus`)
///   5. Recency: +2 for open issues updated inside the recency window
///
/// All scoring functions are pure. The evaluation time is always passed in,
/// never read from the system clock.

use chrono::{DateTime, Duration, Utc};

use crate::config::RankingConfig;
use crate::search::keywords::{extract_keywords, mentions_open};
use crate::store::{IssuePriority, IssueRecord, IssueStatus};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Per-component score breakdown (populated only when debug_scoring=true).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub title: i64,
    pub description: i64,
    pub labels: i64,
    pub keywords: i64,
    pub priority: i64,
    pub status: i64,
    pub recency: i64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> i64 {
        self.title
            + self.description
            + self.labels
            + self.keywords
            + self.priority
            + self.status
            + self.recency
    }
}

/// An issue paired with its relevance score for the duration of one ranking call.
#[derive(Debug, Clone)]
pub struct ScoredIssue<'a> {
    pub issue: &'a IssueRecord,
    /// Final score; may be negative
    pub score: i64,
    /// Component breakdown, only when RankingConfig.debug_scoring is true
    pub breakdown: Option<ScoreBreakdown>,
}

/// Ranks issues against a prompt using configurable result cap and recency window.
pub struct RelevanceRanker<'a> {
    config: &'a RankingConfig,
}

// ---------------------------------------------------------------------------
// Pure scoring functions
// ---------------------------------------------------------------------------

/// Bonus from the issue's own priority, independent of the prompt.
pub fn priority_bonus(priority: IssuePriority) -> i64 {
    match priority {
        IssuePriority::Critical => 4,
        IssuePriority::High => 3,
        IssuePriority::Medium => 1,
        IssuePriority::Low => 0,
    }
}

/// Status bonus.
///
/// When the prompt asks for open work, open issues get +20 plus a priority
/// tier (critical +15, high +10, medium +5) and closed issues get -15.
/// Otherwise open issues get +1 and closed issues -2.
pub fn status_bonus(status: IssueStatus, priority: IssuePriority, wants_open: bool) -> i64 {
    match (wants_open, status) {
        (true, IssueStatus::Open) => {
            let tier = match priority {
                IssuePriority::Critical => 15,
                IssuePriority::High => 10,
                IssuePriority::Medium => 5,
                IssuePriority::Low => 0,
            };
            20 + tier
        }
        (true, IssueStatus::Closed) => -15,
        (false, IssueStatus::Open) => 1,
        (false, IssueStatus::Closed) => -2,
    }
}

/// +2 for an open issue updated less than `window_days` before `now`.
pub fn recency_bonus(issue: &IssueRecord, now: DateTime<Utc>, window_days: i64) -> i64 {
    if issue.status != IssueStatus::Open {
        return 0;
    }
    if now.signed_duration_since(issue.updated_at) < Duration::days(window_days) {
        2
    } else {
        0
    }
}

/// Score one issue against already-extracted keywords.
pub fn score_issue(
    issue: &IssueRecord,
    keywords: &[String],
    wants_open: bool,
    now: DateTime<Utc>,
    window_days: i64,
) -> ScoreBreakdown {
    let title = issue.title.to_lowercase();
    let description = issue.description.as_deref().map(str::to_lowercase);
    let labels: Vec<String> = issue.labels.iter().map(|l| l.to_lowercase()).collect();

    let in_title = |k: &String| title.contains(k.as_str());
    let in_description = |k: &String| {
        description
            .as_deref()
            .map_or(false, |d| d.contains(k.as_str()))
    };

    let mut breakdown = ScoreBreakdown::default();

    if keywords.iter().any(in_title) {
        breakdown.title = 10;
    }
    if keywords.iter().any(in_description) {
        breakdown.description = 5;
    }
    if labels
        .iter()
        .any(|label| keywords.iter().any(|k| label.contains(k.as_str())))
    {
        breakdown.labels = 5;
    }

    for keyword in keywords {
        if in_title(keyword) {
            breakdown.keywords += 3;
        }
        if in_description(keyword) {
            breakdown.keywords += 1;
        }
    }

    breakdown.priority = priority_bonus(issue.priority);
    breakdown.status = status_bonus(issue.status, issue.priority, wants_open);
    breakdown.recency = recency_bonus(issue, now, window_days);
    breakdown
}

// ---------------------------------------------------------------------------
// RelevanceRanker
// ---------------------------------------------------------------------------

impl<'a> RelevanceRanker<'a> {
    pub fn new(config: &'a RankingConfig) -> Self {
        RelevanceRanker { config }
    }

    /// Score every issue, sort by score descending, keep the top `max_results`.
    ///
    /// The sort is stable: equal scores keep their input order.
    pub fn score_issues<'b>(
        &self,
        issues: &'b [IssueRecord],
        prompt: &str,
        now: DateTime<Utc>,
    ) -> Vec<ScoredIssue<'b>> {
        let keywords = extract_keywords(&prompt.to_lowercase());
        let wants_open = mentions_open(&keywords);
        let cfg = self.config;

        tracing::debug!(
            keywords = ?keywords,
            wants_open = wants_open,
            issue_count = issues.len(),
            "Scoring issues"
        );

        let mut scored: Vec<ScoredIssue<'b>> = issues
            .iter()
            .map(|issue| {
                let breakdown = score_issue(issue, &keywords, wants_open, now, cfg.recency_window_days);
                ScoredIssue {
                    issue,
                    score: breakdown.total(),
                    breakdown: if cfg.debug_scoring { Some(breakdown) } else { None },
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(cfg.max_results);

        if cfg.debug_scoring {
            for hit in scored.iter().take(10) {
                tracing::debug!(
                    issue_number = hit.issue.issue_number,
                    score = hit.score,
                    breakdown = ?hit.breakdown,
                    "Scored issue"
                );
            }
        }

        scored
    }

    /// Ranked issues without their scores.
    pub fn rank<'b>(
        &self,
        issues: &'b [IssueRecord],
        prompt: &str,
        now: DateTime<Utc>,
    ) -> Vec<&'b IssueRecord> {
        self.score_issues(issues, prompt, now)
            .into_iter()
            .map(|hit| hit.issue)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
