//! Relevance scoring for prayer search.
//!
//! | match                                            | weight |
//! |--------------------------------------------------|--------|
//! | content contains the full query                  | 0.5    |
//! | scripture reference contains the full query      | 0.3    |
//! | each query word as a whole word in the content   | 0.1    |
//! | each query word found in the scripture reference | 0.05   |
//!
//! The sum is divided by the best score the query could reach, so results land in `[0, 1]`.

use regex::Regex;

const FULL_CONTENT_WEIGHT: f64 = 0.5;
const FULL_REFERENCE_WEIGHT: f64 = 0.3;
const WORD_CONTENT_WEIGHT: f64 = 0.1;
const WORD_REFERENCE_WEIGHT: f64 = 0.05;

/// A search query prepared once and scored against many documents.
#[derive(Debug)]
pub struct RelevanceQuery {
    phrase: String,
    words: Vec<String>,
    word_patterns: Vec<Regex>,
}

impl RelevanceQuery {
    /// Returns `None` for a blank query.
    pub fn new(query: &str) -> Option<Self> {
        let phrase = query.trim().to_lowercase();
        if phrase.is_empty() {
            return None;
        }
        let mut words: Vec<String> = Vec::new();
        for word in phrase.split_whitespace() {
            if !words.iter().any(|w| w == word) {
                words.push(word.to_string());
            }
        }
        let word_patterns = words
            .iter()
            .filter_map(|w| Regex::new(&format!(r"(?i)\b{}\b", regex::escape(w))).ok())
            .collect();
        Some(Self {
            phrase,
            words,
            word_patterns,
        })
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    fn max_score(&self) -> f64 {
        FULL_CONTENT_WEIGHT
            + FULL_REFERENCE_WEIGHT
            + self.words.len() as f64 * (WORD_CONTENT_WEIGHT + WORD_REFERENCE_WEIGHT)
    }

    /// Score one document, normalized into `[0, 1]`.
    pub fn score(&self, content: &str, scripture_reference: Option<&str>) -> f64 {
        let content_lower = content.to_lowercase();
        let reference_lower = scripture_reference.map(str::to_lowercase);

        let mut score = 0.0;
        if content_lower.contains(&self.phrase) {
            score += FULL_CONTENT_WEIGHT;
        }
        if let Some(reference) = reference_lower.as_deref() {
            if reference.contains(&self.phrase) {
                score += FULL_REFERENCE_WEIGHT;
            }
        }
        for pattern in &self.word_patterns {
            if pattern.is_match(content) {
                score += WORD_CONTENT_WEIGHT;
            }
        }
        if let Some(reference) = reference_lower.as_deref() {
            for word in &self.words {
                if reference.contains(word.as_str()) {
                    score += WORD_REFERENCE_WEIGHT;
                }
            }
        }

        (score / self.max_score()).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_is_rejected() {
        assert!(RelevanceQuery::new("   ").is_none());
    }

    #[test]
    fn full_match_in_content_beats_partial() {
        let q = RelevanceQuery::new("healing grace").unwrap();
        let full = q.score("Praying for healing grace this week", None);
        let partial = q.score("Praying for healing", None);
        assert!(full > partial);
        assert!(partial > 0.0);
    }

    #[test]
    fn word_matches_are_whole_words() {
        let q = RelevanceQuery::new("pray").unwrap();
        // "prayer" contains "pray" as a substring, so only the phrase weight applies.
        let substring_only = q.score("A prayer for peace", None);
        let whole_word = q.score("Please pray for peace", None);
        assert!(whole_word > substring_only);
    }

    #[test]
    fn perfect_document_scores_one() {
        let q = RelevanceQuery::new("john").unwrap();
        let score = q.score("Reading john today", Some("John 3:16"));
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn scripture_reference_contributes() {
        let q = RelevanceQuery::new("psalm 23").unwrap();
        let with_reference = q.score("The Lord is my shepherd", Some("Psalm 23:1"));
        let without = q.score("The Lord is my shepherd", None);
        assert!(with_reference > without);
        assert_eq!(without, 0.0);
    }

    #[test]
    fn duplicate_words_are_counted_once() {
        let q = RelevanceQuery::new("hope hope").unwrap();
        assert_eq!(q.words().len(), 1);
    }
}
