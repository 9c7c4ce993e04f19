/// Fingerprint similarity search over stored issues.
///
/// Compares a query fingerprint against each issue's stored embedding and
/// keeps matches above a threshold. Issues ingested without an embedding are
/// skipped.

use crate::embedding::{EmbeddingError, Vector, cosine_similarity};
use crate::store::IssueRecord;

/// An issue whose fingerprint is close to the query.
#[derive(Debug, Clone)]
pub struct SimilarIssue<'a> {
    pub issue: &'a IssueRecord,
    /// Cosine similarity, higher = more similar
    pub similarity: f64,
}

/// Find issues whose embedding has cosine similarity >= `threshold` with `query`.
///
/// Returns at most `limit` results, ordered by descending similarity.
/// Fails only when a stored embedding has a different dimension than the query.
pub fn find_similar<'a>(
    issues: &'a [IssueRecord],
    query: &Vector,
    threshold: f64,
    limit: usize,
) -> Result<Vec<SimilarIssue<'a>>, EmbeddingError> {
    let mut results = Vec::new();
    for issue in issues {
        let Some(embedding) = issue.embedding.as_ref() else {
            continue;
        };
        let similarity = cosine_similarity(query, embedding)?;
        if similarity >= threshold {
            results.push(SimilarIssue { issue, similarity });
        }
    }

    results.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(limit);
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::generate;
    use crate::store::{IssuePriority, IssueStatus};
    use chrono::{TimeZone, Utc};

    fn issue(number: u64, text: &str, embedded: bool) -> IssueRecord {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        IssueRecord {
            repository: "acme/widgets".to_string(),
            issue_number: number,
            title: text.to_string(),
            description: None,
            status: IssueStatus::Open,
            priority: IssuePriority::Medium,
            labels: vec![],
            author: String::new(),
            author_url: None,
            url: String::new(),
            created_at: ts,
            updated_at: ts,
            embedding: if embedded { Some(generate(text)) } else { None },
        }
    }

    #[test]
    fn test_exact_text_ranks_first() {
        let issues = vec![
            issue(1, "dark mode toggle", true),
            issue(2, "parser crash on empty input", true),
            issue(3, "parser crash on empty input", false),
        ];
        let query = generate("Parser crash on empty input");
        let hits = find_similar(&issues, &query, 0.5, 10).unwrap();
        assert_eq!(hits[0].issue.issue_number, 2);
        assert!((hits[0].similarity - 1.0).abs() < 1e-9);
        assert!(hits.iter().all(|h| h.issue.issue_number != 3));
    }

    #[test]
    fn test_threshold_and_limit() {
        let issues: Vec<IssueRecord> = (0..5).map(|n| issue(n, "same words here", true)).collect();
        let query = generate("same words here");
        assert_eq!(find_similar(&issues, &query, 0.9, 2).unwrap().len(), 2);
        assert!(find_similar(&issues, &query, 1.5, 10).unwrap().is_empty());
    }

    #[test]
    fn test_dimension_mismatch_propagates() {
        let issues = vec![issue(1, "text", true)];
        let query = Vector::from(vec![1.0, 0.0]);
        assert!(matches!(
            find_similar(&issues, &query, 0.0, 10),
            Err(EmbeddingError::LengthMismatch { .. })
        ));
    }
}
