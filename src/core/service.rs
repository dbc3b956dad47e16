use std::sync::Arc;
use tracing::debug;
use crate::analysis::analyzer::{Analyzer, KeyAnalyzer};
use crate::core::config::DEFAULT_MAX_RESULTS;
use crate::core::error::{Error, Result};
use crate::core::types::{PutResult, RemoveResult};
use crate::index::key_index::KeyIndex;
use crate::search::ranker::ResultRanker;
use crate::storage::persistence::PersistenceWorker;

/// Synchronous read/write surface of one core.
///
/// Calls block only on the key index lock; persistence is queued, never awaited.
pub struct IndexService {
    path: String,
    index: KeyIndex,
    analyzer: Analyzer,
    ranker: ResultRanker,
    persistence: Option<Arc<PersistenceWorker>>,
    max_results: usize,
}

impl IndexService {
    pub fn new(path: &str, analyzer: Analyzer) -> Self {
        IndexService {
            path: path.to_string(),
            index: KeyIndex::new(),
            analyzer,
            ranker: ResultRanker::new(),
            persistence: None,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_persistence(mut self, persistence: Arc<PersistenceWorker>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Write every derived key of every string, overwriting whatever was there
    pub fn put<S: AsRef<str>>(&self, strings: &[S], persist: bool) -> PutResult {
        let mut result = PutResult::with_capacity(strings.len());

        for string in strings {
            let string = string.as_ref();
            let mut keys = Vec::new();

            for entry in self.analyzer.index_entries(string) {
                self.index.put(entry.key.clone(), entry.value);
                keys.push(entry.key);
            }

            result.insert(string.to_string(), keys);
            if persist {
                self.persist(string);
            }
        }

        result
    }

    /// Delete every derived key; reports the value found at the last one
    pub fn remove<S: AsRef<str>>(&self, strings: &[S]) -> RemoveResult {
        let mut result = RemoveResult::with_capacity(strings.len());

        for string in strings {
            let string = string.as_ref();
            for entry in self.analyzer.index_entries(string) {
                let removed = self.index.remove(&entry.key);
                result.insert(string.to_string(), removed);
            }
        }

        result
    }

    /// Ranked matches for a prefix; an absent prefix is a caller error
    pub fn query(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        let prefix = prefix.ok_or_else(|| {
            Error::invalid_argument(format!("core {}: query requires a prefix", self.path))
        })?;
        Ok(self.prefixed_by(prefix))
    }

    /// Distinct values under the prefix, capped in lexicographic order and
    /// only then ranked. A strong match outside the first `max_results`
    /// values never surfaces; that keeps ranking cost bounded.
    pub fn prefixed_by(&self, prefix: &str) -> Vec<String> {
        let search_key = self.analyzer.prefix_search_key(prefix);
        let candidates = self.index.prefix_values(&search_key, self.max_results);

        debug!(core = %self.path, prefix, candidates = candidates.len(), "prefix query");
        self.ranker.rank(prefix, candidates)
    }

    /// Index size without a prefix, otherwise the size of the capped result
    pub fn count(&self, prefix: Option<&str>) -> usize {
        match prefix {
            None => self.index.size(),
            Some(prefix) => self.prefixed_by(prefix).len(),
        }
    }

    /// Queue a persistence job when a store is configured
    pub fn persist(&self, string: &str) {
        if let Some(persistence) = &self.persistence {
            persistence.persist(self.analyzer.hash(string), string.to_string());
        }
    }

    pub fn size(&self) -> usize {
        self.index.size()
    }

    pub fn first_key(&self) -> Option<String> {
        self.index.first_key()
    }

    pub fn last_key(&self) -> Option<String> {
        self.index.last_key()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn index(&self) -> &KeyIndex {
        &self.index
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn persistence(&self) -> Option<&Arc<PersistenceWorker>> {
        self.persistence.as_ref()
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use crate::analysis::analyzer::AnalyzerKind;
    use crate::core::config::{PersistenceConfig, PoolConfig};
    use crate::core::error::ErrorKind;
    use crate::storage::persistence::tests::{MemoryFactory, MemoryStore};

    fn service() -> IndexService {
        IndexService::new("/test", Analyzer::default())
    }

    #[test]
    fn query_finds_strings_at_inner_word_boundaries() {
        let service = service();
        service.put(&["new york", "new jersey"], false);

        assert_eq!(service.query(Some("jersey")).unwrap(), vec!["new jersey"]);
        assert_eq!(service.query(Some("new")).unwrap(), vec!["new york", "new jersey"]);
    }

    #[test]
    fn put_reports_keys_written() {
        let service = service();
        let result = service.put(&["New Jersey"], false);

        assert_eq!(result["New Jersey"], vec!["new jersey", "jersey"]);
        assert_eq!(service.size(), 2);
    }

    #[test]
    fn put_overwrites_without_collision_check() {
        let service = service();
        service.put(&["old york"], false);
        service.put(&["new york"], false);

        // "new york" is shorter-or-equal yet still takes the shared key
        assert_eq!(service.index().get("york").as_deref(), Some("new york"));
    }

    #[test]
    fn results_are_deduplicated() {
        let service = service();
        service.put(&["york york"], false);

        assert_eq!(service.query(Some("york")).unwrap(), vec!["york york"]);
    }

    #[test]
    fn results_are_capped_before_ranking() {
        let service = service();
        let strings: Vec<String> = (0..15).map(|i| format!("item {:02}", i)).collect();
        service.put(&strings, false);
        service.put(&["itemz"], false);

        let results = service.query(Some("item")).unwrap();
        assert_eq!(results.len(), 10);
        // "itemz" is closest to the query but sorts after the first ten values
        assert!(!results.contains(&"itemz".to_string()));
        assert_eq!(service.count(Some("item")), 10);
    }

    #[test]
    fn exact_match_is_ranked_first() {
        let service = service();
        service.put(&["catalog", "cat", "cats"], false);

        assert_eq!(service.query(Some("cat")).unwrap(), vec!["cat", "cats", "catalog"]);
    }

    #[test]
    fn absent_prefix_is_a_contract_violation() {
        let err = service().query(None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn count_without_prefix_is_index_size() {
        let service = service();
        service.put(&["new york", "new jersey"], false);

        assert_eq!(service.count(None), service.size());
        assert_eq!(service.count(None), 4);
        assert_eq!(service.count(Some("xyz")), 0);
    }

    #[test]
    fn remove_reports_last_key_value() {
        let service = service();
        service.put(&["new york"], false);
        service.put(&["york"], false);

        // "new york" derives "new york" then "york"; "york" now owns the latter
        let removed = service.remove(&["new york"]);
        assert_eq!(removed["new york"].as_deref(), Some("york"));
        assert_eq!(service.size(), 0);

        let removed = service.remove(&["missing"]);
        assert_eq!(removed["missing"], None);
    }

    #[test]
    fn whole_string_analyzer_ignores_inner_words() {
        let service = IndexService::new("/test", Analyzer::from_kind(AnalyzerKind::WholeString));
        service.put(&["new jersey"], false);

        assert!(service.query(Some("jersey")).unwrap().is_empty());
        assert_eq!(service.query(Some("new j")).unwrap(), vec!["new jersey"]);
    }

    #[test]
    fn persist_flag_controls_store_writes() {
        let store = Arc::new(MemoryStore::default());
        let worker = PersistenceWorker::start(
            "test",
            &PersistenceConfig::new("memory", "strings"),
            PoolConfig::default(),
            Arc::new(MemoryFactory(store.clone())),
        )
        .unwrap();
        let service = service().with_persistence(Arc::new(worker));

        service.put(&["kept"], true);
        service.put(&["skipped"], false);
        service.persistence().unwrap().wait_idle();

        let rows = store.rows.lock();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.get(&service.analyzer().hash("kept")).map(String::as_str), Some("kept"));
        assert_eq!(store.statements.load(Ordering::SeqCst), 1);
    }
}
