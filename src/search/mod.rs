pub mod keywords;
pub mod relevance;
pub mod similar;

// Re-export key types for convenience
pub use keywords::{extract_keywords, mentions_open};
pub use relevance::{RelevanceRanker, ScoreBreakdown, ScoredIssue};
pub use similar::{SimilarIssue, find_similar};
