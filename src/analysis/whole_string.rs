use crate::analysis::analyzer::{search_key, KeyAnalyzer};
use crate::analysis::tokenizer::normalize;
use crate::core::types::IndexEntry;

/// Classic prefix autocomplete: one key per string, its normalized form
#[derive(Debug, Clone, Copy, Default)]
pub struct WholeStringAnalyzer;

impl KeyAnalyzer for WholeStringAnalyzer {
    fn index_entries(&self, s: &str) -> Vec<IndexEntry> {
        if s.is_empty() {
            return Vec::new();
        }

        let normalized = normalize(s);
        let key = if normalized.is_empty() { s.to_string() } else { normalized };
        vec![IndexEntry::new(key, s)]
    }

    fn prefix_search_key(&self, query: &str) -> String {
        search_key(normalize(query), query)
    }

    fn name(&self) -> &str {
        "whole_string"
    }
}
