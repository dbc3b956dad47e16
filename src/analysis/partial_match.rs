use crate::analysis::analyzer::{search_key, KeyAnalyzer};
use crate::analysis::tokenizer::{normalize, WordTokenizer};
use crate::core::types::IndexEntry;

/// Indexes a string under its normalized form and under every suffix that
/// starts at a word boundary, so "new jersey" is found by "jer" as well as "new".
#[derive(Debug, Clone, Default)]
pub struct PartialMatchAnalyzer {
    pub tokenizer: WordTokenizer,
}

impl PartialMatchAnalyzer {
    pub fn new(tokenizer: WordTokenizer) -> Self {
        PartialMatchAnalyzer { tokenizer }
    }
}

impl KeyAnalyzer for PartialMatchAnalyzer {
    fn index_entries(&self, s: &str) -> Vec<IndexEntry> {
        if s.is_empty() {
            return Vec::new();
        }

        let normalized = normalize(s);
        if normalized.is_empty() {
            // whitespace only: keep it reachable under its raw text
            return vec![IndexEntry::new(s, s)];
        }

        let mut entries = vec![IndexEntry::new(normalized.as_str(), s)];

        // offsets strictly increase, so only offset 0 can repeat the whole key
        for token in self.tokenizer.tokenize(&normalized) {
            if token.offset > 0 {
                entries.push(IndexEntry::new(&normalized[token.offset..], s));
            }
        }

        entries
    }

    fn prefix_search_key(&self, query: &str) -> String {
        search_key(normalize(query), query)
    }

    fn name(&self) -> &str {
        "partial_match"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(s: &str) -> Vec<String> {
        PartialMatchAnalyzer::default()
            .index_entries(s)
            .into_iter()
            .map(|entry| entry.key)
            .collect()
    }

    #[test]
    fn derives_a_key_per_word_boundary() {
        assert_eq!(keys("New Jersey"), vec!["new jersey", "jersey"]);
        assert_eq!(
            keys("San Luis  Obispo"),
            vec!["san luis obispo", "luis obispo", "obispo"]
        );
        assert_eq!(keys("cat"), vec!["cat"]);
    }

    #[test]
    fn values_keep_the_source_text() {
        let entries = PartialMatchAnalyzer::default().index_entries("New Jersey");
        assert!(entries.iter().all(|entry| entry.value == "New Jersey"));
    }

    #[test]
    fn leading_punctuation_keeps_the_whole_key() {
        assert_eq!(keys("(new) york"), vec!["(new) york", "new) york", "york"]);
    }

    #[test]
    fn indexing_is_idempotent() {
        for s in ["new york", "  a b  a b ", "ünïcödé wörds", "x"] {
            assert_eq!(keys(s), keys(s));
        }
    }

    #[test]
    fn non_empty_strings_always_get_a_key() {
        assert_eq!(keys("   "), vec!["   "]);
        assert_eq!(keys("!!"), vec!["!!"]);
        assert!(keys("").is_empty());
    }

    #[test]
    fn search_key_matches_derived_keys() {
        let analyzer = PartialMatchAnalyzer::default();
        let search = analyzer.prefix_search_key("  JER");
        assert_eq!(search, "jer");

        for key in keys("New Jersey") {
            let prefix: String = key.chars().take(3).collect();
            assert!(key.starts_with(&analyzer.prefix_search_key(&prefix)));
        }
    }

    #[test]
    fn trailing_space_is_kept_once() {
        let analyzer = PartialMatchAnalyzer::default();
        assert_eq!(analyzer.prefix_search_key("New  "), "new ");
        assert_eq!(analyzer.prefix_search_key("   "), "");
    }
}
