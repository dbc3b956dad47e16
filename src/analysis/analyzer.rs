use std::cmp::Ordering;
use serde::{Serialize, Deserialize};
use crate::analysis::partial_match::PartialMatchAnalyzer;
use crate::analysis::whole_string::WholeStringAnalyzer;
use crate::core::types::IndexEntry;

/// Maps source strings into the key space of a core's index
pub trait KeyAnalyzer: Send + Sync {
    /// Derived `(key, s)` pairs for `s`, deduplicated, in a fixed order
    fn index_entries(&self, s: &str) -> Vec<IndexEntry>;

    /// Translate a user-typed prefix into the same key space
    fn prefix_search_key(&self, query: &str) -> String;

    fn hash(&self, s: &str) -> String {
        content_hash(s)
    }

    fn preferred<'a>(&self, a: &'a str, b: &'a str) -> &'a str {
        preferred(a, b)
    }

    fn name(&self) -> &str;
}

/// Analyzer variants selectable by configuration tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerKind {
    #[default]
    PartialMatch,
    WholeString,
}

#[derive(Debug, Clone)]
pub enum Analyzer {
    PartialMatch(PartialMatchAnalyzer),
    WholeString(WholeStringAnalyzer),
}

impl Analyzer {
    pub fn from_kind(kind: AnalyzerKind) -> Self {
        match kind {
            AnalyzerKind::PartialMatch => Analyzer::PartialMatch(PartialMatchAnalyzer::default()),
            AnalyzerKind::WholeString => Analyzer::WholeString(WholeStringAnalyzer),
        }
    }

    pub fn kind(&self) -> AnalyzerKind {
        match self {
            Analyzer::PartialMatch(_) => AnalyzerKind::PartialMatch,
            Analyzer::WholeString(_) => AnalyzerKind::WholeString,
        }
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Analyzer::from_kind(AnalyzerKind::default())
    }
}

impl KeyAnalyzer for Analyzer {
    fn index_entries(&self, s: &str) -> Vec<IndexEntry> {
        match self {
            Analyzer::PartialMatch(analyzer) => analyzer.index_entries(s),
            Analyzer::WholeString(analyzer) => analyzer.index_entries(s),
        }
    }

    fn prefix_search_key(&self, query: &str) -> String {
        match self {
            Analyzer::PartialMatch(analyzer) => analyzer.prefix_search_key(query),
            Analyzer::WholeString(analyzer) => analyzer.prefix_search_key(query),
        }
    }

    fn hash(&self, s: &str) -> String {
        match self {
            Analyzer::PartialMatch(analyzer) => analyzer.hash(s),
            Analyzer::WholeString(analyzer) => analyzer.hash(s),
        }
    }

    fn preferred<'a>(&self, a: &'a str, b: &'a str) -> &'a str {
        match self {
            Analyzer::PartialMatch(analyzer) => analyzer.preferred(a, b),
            Analyzer::WholeString(analyzer) => analyzer.preferred(a, b),
        }
    }

    fn name(&self) -> &str {
        match self {
            Analyzer::PartialMatch(analyzer) => analyzer.name(),
            Analyzer::WholeString(analyzer) => analyzer.name(),
        }
    }
}

/// BLAKE3 hex digest of the raw string, used as the persistence key
pub fn content_hash(s: &str) -> String {
    blake3::hash(s.as_bytes()).to_hex().to_string()
}

/// Collision winner: more characters wins, then the lexicographically greater string.
///
/// Depends only on the unordered pair, so argument order never changes the result.
pub fn preferred<'a>(a: &'a str, b: &'a str) -> &'a str {
    let by_length = a.chars().count().cmp(&b.chars().count());

    match by_length.then_with(|| a.cmp(b)) {
        Ordering::Less => b,
        _ => a,
    }
}

/// Keep one trailing space the user typed so "new " stops at a word boundary
pub(crate) fn search_key(normalized: String, query: &str) -> String {
    let mut key = normalized;
    if !key.is_empty() && query.ends_with(char::is_whitespace) {
        key.push(' ');
    }
    key
}
