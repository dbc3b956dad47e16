use std::cmp::Ordering;
use crate::analysis::tokenizer::normalize;
use crate::search::distance::edit_distance;

/// Orders candidates by closeness to the query string
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultRanker;

impl ResultRanker {
    pub fn new() -> Self {
        ResultRanker
    }

    /// Exact match first, then by edit distance of the normalized forms,
    /// then lexicographically. Total, so output is reproducible.
    pub fn rank(&self, query: &str, candidates: Vec<String>) -> Vec<String> {
        let normalized_query = normalize(query);

        let mut scored: Vec<(bool, usize, String)> = candidates
            .into_iter()
            .map(|candidate| {
                let distance = edit_distance(&normalized_query, &normalize(&candidate));
                (candidate != query, distance, candidate)
            })
            .collect();

        scored.sort_by(|a, b| Self::compare(a, b));
        scored.dedup_by(|a, b| a.2 == b.2);
        scored.into_iter().map(|(_, _, candidate)| candidate).collect()
    }

    fn compare(a: &(bool, usize, String), b: &(bool, usize, String)) -> Ordering {
        a.0.cmp(&b.0)
            .then(a.1.cmp(&b.1))
            .then_with(|| a.2.cmp(&b.2))
    }
}
