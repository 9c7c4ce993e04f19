/// Prompt keyword extraction
///
/// Turns a free-text prompt into the lowercase terms the relevance ranker
/// matches as substrings against issue titles, descriptions, and labels.

/// Technical terms recognised in prompts.
pub const TECHNICAL_TERMS: &[&str] = &[
    "bug", "error", "issue", "feature", "enhancement", "fix", "update", "improvement",
    "performance", "security", "documentation", "test", "deployment", "api", "ui",
    "frontend", "backend", "database", "refactor",
];

/// Keywords signalling the user wants actionable (open) work.
pub const OPEN_INTENT_TERMS: &[&str] = &[
    "open", "fix", "fixing", "resolved", "pending", "active", "current",
];

/// Words this short or shorter are dropped.
const MIN_WORD_LEN: usize = 3;

/// Tokens used when no word survives the length filter.
const FALLBACK_WORDS: usize = 5;

/// Extract keywords from a prompt.
///
/// Words shorter than three characters are dropped. The lexicon check keeps
/// any word that is either a technical term or one of the prompt's own words,
/// so in practice every remaining word is kept. When nothing remains, the
/// first five raw tokens are returned instead. Duplicates are preserved.
pub fn extract_keywords(prompt: &str) -> Vec<String> {
    let lowered = prompt.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();

    let words: Vec<&str> = tokens
        .iter()
        .copied()
        .filter(|w| w.chars().count() >= MIN_WORD_LEN)
        .collect();

    let keywords: Vec<String> = words
        .iter()
        .filter(|w| TECHNICAL_TERMS.contains(*w) || words.contains(*w))
        .map(|w| w.to_string())
        .collect();

    if keywords.is_empty() {
        return tokens
            .into_iter()
            .take(FALLBACK_WORDS)
            .map(str::to_string)
            .collect();
    }
    keywords
}

/// True if any keyword expresses intent to find open or in-progress work.
pub fn mentions_open(keywords: &[String]) -> bool {
    keywords
        .iter()
        .any(|k| OPEN_INTENT_TERMS.contains(&k.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_prompt() {
        assert!(extract_keywords("").is_empty());
        assert!(extract_keywords("   \t ").is_empty());
    }

    #[test]
    fn test_lowercases_and_drops_short_words() {
        assert_eq!(extract_keywords("Fix the UI of my Crash"), vec!["fix", "the", "crash"]);
    }

    #[test]
    fn test_fix_crash() {
        assert_eq!(extract_keywords("fix crash"), vec!["fix", "crash"]);
    }

    #[test]
    fn test_lexicon_does_not_restrict() {
        // Known oddity: the lexicon filter also accepts any prompt word, so
        // non-technical words survive. Kept as observed.
        assert_eq!(
            extract_keywords("slow startup banana"),
            vec!["slow", "startup", "banana"]
        );
    }

    #[test]
    fn test_duplicates_preserved() {
        assert_eq!(extract_keywords("bug bug"), vec!["bug", "bug"]);
    }

    #[test]
    fn test_fallback_uses_unfiltered_tokens() {
        assert_eq!(
            extract_keywords("a UI is on me ok"),
            vec!["a", "ui", "is", "on", "me"]
        );
        assert_eq!(extract_keywords("ui"), vec!["ui"]);
    }

    #[test]
    fn test_length_counts_characters() {
        // Three characters, more than three bytes
        assert_eq!(extract_keywords("été"), vec!["été"]);
    }

    #[test]
    fn test_mentions_open() {
        assert!(mentions_open(&extract_keywords("fix open bug")));
        assert!(mentions_open(&extract_keywords("show pending items")));
        assert!(!mentions_open(&extract_keywords("closed regressions")));
        assert!(!mentions_open(&[]));
    }
}
