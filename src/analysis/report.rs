/// Markdown analysis report
///
/// Builds the human-readable summary returned alongside ranked issues:
/// repository overview, topic sections triggered by prompt words, general
/// observations and recommendations.

use crate::store::{IssuePriority, IssueRecord, IssueStatus, RepositoryInfo};

/// Count relevant issues whose title contains any of `title_terms` or whose
/// description contains any of `description_terms`.
fn count_matching(relevant: &[&IssueRecord], title_terms: &[&str], description_terms: &[&str]) -> usize {
    relevant
        .iter()
        .filter(|issue| {
            let title = issue.title.to_lowercase();
            let description = issue.description.as_deref().unwrap_or("").to_lowercase();
            title_terms.iter().any(|t| title.contains(*t))
                || description_terms.iter().any(|t| description.contains(*t))
        })
        .count()
}

fn section(out: &mut String, heading: &str, body: &str, found: usize, if_found: &str, if_none: &str) {
    out.push_str(&format!("## {}\n", heading));
    out.push_str(body);
    out.push_str(if found > 0 { if_found } else { if_none });
    out.push_str("\n\n");
}

/// Render the markdown report.
///
/// `all_issues` drives the overview counts; `relevant` is the ranked list.
/// The overview's high-priority line counts `high` only, while the summary
/// struct counts high and critical together.
pub fn generate_report(
    repository: &RepositoryInfo,
    all_issues: &[IssueRecord],
    relevant: &[&IssueRecord],
    prompt: &str,
) -> String {
    let total = all_issues.len();
    let open = all_issues.iter().filter(|i| i.status == IssueStatus::Open).count();
    let closed = all_issues.iter().filter(|i| i.status == IssueStatus::Closed).count();
    let high = all_issues.iter().filter(|i| i.priority == IssuePriority::High).count();
    let prompt_lower = prompt.to_lowercase();

    let mut out = format!("# Repository Analysis: {}\n\n", repository.full_name);

    out.push_str("## Overview\n");
    out.push_str(&format!("- **Repository**: {}\n", repository.full_name));
    out.push_str(&format!(
        "- **Language**: {}\n",
        repository.language.as_deref().unwrap_or("Not specified")
    ));
    out.push_str(&format!("- **Stars**: {}\n", repository.stars));
    out.push_str(&format!("- **Forks**: {}\n", repository.forks));
    out.push_str(&format!("- **Total Issues**: {}\n", total));
    out.push_str(&format!("- **Open Issues**: {}\n", open));
    out.push_str(&format!("- **Closed Issues**: {}\n", closed));
    out.push_str(&format!("- **High Priority Issues**: {}\n\n", high));

    if prompt_lower.contains("bug") || prompt_lower.contains("error") {
        let found = count_matching(relevant, &["bug", "error"], &["bug"]);
        section(
            &mut out,
            "Bug Analysis",
            &format!(
                "Found {} bug-related issues out of {} relevant issues. ",
                found,
                relevant.len()
            ),
            found,
            "Critical bugs need immediate attention, especially those with high priority.",
            "No critical bugs found in the recent issues.",
        );
    }

    if prompt_lower.contains("feature") || prompt_lower.contains("enhancement") {
        let found = count_matching(relevant, &["feature", "enhancement"], &[]);
        section(
            &mut out,
            "Feature Analysis",
            &format!("Identified {} feature requests. ", found),
            found,
            "The repository shows active development with ongoing feature improvements.",
            "No active feature requests found in recent issues.",
        );
    }

    if prompt_lower.contains("performance") || prompt_lower.contains("optimization") {
        let found = count_matching(relevant, &["performance", "slow"], &["performance"]);
        section(
            &mut out,
            "Performance Analysis",
            &format!("Found {} performance-related issues. ", found),
            found,
            "Performance improvements are needed to maintain system efficiency.",
            "No performance issues reported recently.",
        );
    }

    if prompt_lower.contains("security") {
        let found = count_matching(relevant, &["security", "vulnerability"], &[]);
        section(
            &mut out,
            "Security Analysis",
            &format!("Identified {} security-related issues. ", found),
            found,
            "Security issues require immediate attention to protect the codebase.",
            "No security vulnerabilities reported in recent issues.",
        );
    }

    out.push_str("## General Observations\n");
    if open as f64 > total as f64 * 0.5 {
        out.push_str(&format!(
            "- **Issue Management**: High number of open issues ({}/{}) suggests need for better issue triage and resolution processes.\n",
            open, total
        ));
    } else {
        out.push_str(&format!(
            "- **Issue Management**: Good issue resolution rate with {} closed issues out of {} total.\n",
            closed, total
        ));
    }
    if high > 0 {
        out.push_str(&format!(
            "- **Priority Management**: {} high priority issues require immediate attention from maintainers.\n",
            high
        ));
    }
    if !relevant.is_empty() {
        out.push_str(&format!(
            "- **Relevance**: Found {} issues matching your query \"{}\".\n",
            relevant.len(),
            prompt
        ));
    }

    out.push_str("\n## Recommendations\n");
    if open > 20 {
        out.push_str("- Consider implementing regular issue triage sessions to reduce open issue backlog.\n");
    }
    if high > 5 {
        out.push_str("- Prioritize high priority issues to maintain code quality and user satisfaction.\n");
    }
    if relevant.is_empty() {
        out.push_str("- No issues found matching your specific query. Consider refining your search terms.\n");
    } else {
        out.push_str(&format!(
            "- Focus on the {} relevant issues identified in this analysis.\n",
            relevant.len()
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn issue(number: u64, title: &str, status: IssueStatus, priority: IssuePriority) -> IssueRecord {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        IssueRecord {
            repository: "acme/widgets".to_string(),
            issue_number: number,
            title: title.to_string(),
            description: None,
            status,
            priority,
            labels: vec![],
            author: String::new(),
            author_url: None,
            url: String::new(),
            created_at: ts,
            updated_at: ts,
            embedding: None,
        }
    }

    fn repo() -> RepositoryInfo {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        RepositoryInfo {
            language: Some("Rust".to_string()),
            stars: 42,
            forks: 7,
            ..RepositoryInfo::from_full_name("acme/widgets", ts)
        }
    }

    #[test]
    fn test_overview_counts() {
        let issues = vec![
            issue(1, "Parser bug", IssueStatus::Open, IssuePriority::High),
            issue(2, "Docs typo", IssueStatus::Closed, IssuePriority::Critical),
            issue(3, "Slow build", IssueStatus::Closed, IssuePriority::Low),
        ];
        let relevant: Vec<&IssueRecord> = issues.iter().collect();
        let report = generate_report(&repo(), &issues, &relevant, "general health");

        assert!(report.starts_with("# Repository Analysis: acme/widgets\n\n## Overview\n"));
        assert!(report.contains("- **Language**: Rust\n"));
        assert!(report.contains("- **Stars**: 42\n"));
        assert!(report.contains("- **Total Issues**: 3\n"));
        assert!(report.contains("- **Open Issues**: 1\n"));
        assert!(report.contains("- **Closed Issues**: 2\n"));
        // critical is not counted in the overview line
        assert!(report.contains("- **High Priority Issues**: 1\n"));
        assert!(report.contains("Good issue resolution rate with 2 closed issues out of 3 total."));
        assert!(!report.contains("## Bug Analysis"));
        assert!(report.contains("- Focus on the 3 relevant issues identified in this analysis.\n"));
    }

    #[test]
    fn test_topic_sections_follow_prompt() {
        let issues = vec![
            issue(1, "Parser bug", IssueStatus::Open, IssuePriority::Medium),
            issue(2, "Slow startup", IssueStatus::Open, IssuePriority::Medium),
        ];
        let relevant: Vec<&IssueRecord> = issues.iter().collect();
        let report = generate_report(&repo(), &issues, &relevant, "Bug and performance triage");

        assert!(report.contains(
            "## Bug Analysis\nFound 1 bug-related issues out of 2 relevant issues. Critical bugs need immediate attention, especially those with high priority.\n\n"
        ));
        assert!(report.contains("## Performance Analysis\nFound 1 performance-related issues. "));
        assert!(!report.contains("## Security Analysis"));
        assert!(report.contains("High number of open issues (2/2)"));
    }

    #[test]
    fn test_no_relevant_issues() {
        let issues = vec![issue(1, "Anything", IssueStatus::Open, IssuePriority::Low)];
        let report = generate_report(&repo(), &issues, &[], "security audit");
        assert!(report.contains("Identified 0 security-related issues. No security vulnerabilities reported in recent issues."));
        assert!(!report.contains("**Relevance**"));
        assert!(report.contains("- No issues found matching your specific query."));
    }
}
