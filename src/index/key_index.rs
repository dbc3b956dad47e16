use std::collections::BTreeMap;
use std::ops::Bound;
use parking_lot::RwLock;

/// Sorted, lock-protected key → value map shared by every writer of a core.
///
/// Each operation takes the lock once, so a single call is atomic; nothing
/// groups several calls together.
#[derive(Debug, Default)]
pub struct KeyIndex {
    entries: RwLock<BTreeMap<String, String>>,
}

impl KeyIndex {
    pub fn new() -> Self {
        KeyIndex {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    /// Insert or overwrite, returning the previous value
    pub fn put(&self, key: String, value: String) -> Option<String> {
        self.entries.write().insert(key, value)
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.write().remove(key)
    }

    /// All entries whose key starts with `prefix`, in key order
    pub fn prefix_range(&self, prefix: &str) -> Vec<(String, String)> {
        let entries = self.entries.read();

        entries
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Distinct values under `prefix` in ascending order, at most `limit` of them.
    ///
    /// Collects under a single read lock so the scan sees one consistent state.
    pub fn prefix_values(&self, prefix: &str, limit: usize) -> Vec<String> {
        let entries = self.entries.read();
        let mut values: Vec<&String> = entries
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(_, value)| value)
            .collect();

        values.sort_unstable();
        values.dedup();
        values.truncate(limit);
        values.into_iter().cloned().collect()
    }

    pub fn size(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn first_key(&self) -> Option<String> {
        self.entries.read().keys().next().cloned()
    }

    pub fn last_key(&self) -> Option<String> {
        self.entries.read().keys().next_back().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with(pairs: &[(&str, &str)]) -> KeyIndex {
        let index = KeyIndex::new();
        for (key, value) in pairs {
            index.put(key.to_string(), value.to_string());
        }
        index
    }

    #[test]
    fn put_returns_previous_value() {
        let index = KeyIndex::new();
        assert_eq!(index.put("a".into(), "1".into()), None);
        assert_eq!(index.put("a".into(), "2".into()), Some("1".to_string()));
        assert_eq!(index.get("a").as_deref(), Some("2"));
        assert_eq!(index.size(), 1);
    }

    #[test]
    fn missing_keys_are_absent_not_errors() {
        let index = KeyIndex::new();
        assert_eq!(index.get("nope"), None);
        assert_eq!(index.remove("nope"), None);
        assert_eq!(index.first_key(), None);
        assert_eq!(index.last_key(), None);
        assert!(index.prefix_range("n").is_empty());
    }

    #[test]
    fn prefix_range_is_ordered_and_bounded() {
        let index = index_with(&[
            ("cab", "x"),
            ("cat", "cat"),
            ("catalog", "catalog"),
            ("cats", "cats"),
            ("cau", "y"),
            ("ca", "z"),
        ]);

        let keys: Vec<String> = index.prefix_range("cat").into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["cat", "catalog", "cats"]);
        assert_eq!(index.prefix_range("").len(), 6);
        assert_eq!(index.first_key().as_deref(), Some("ca"));
        assert_eq!(index.last_key().as_deref(), Some("cau"));
    }

    #[test]
    fn prefix_values_dedups_and_caps() {
        let index = index_with(&[
            ("york", "new york"),
            ("new york", "new york"),
            ("new jersey", "new jersey"),
            ("newark", "newark"),
        ]);

        assert_eq!(index.prefix_values("new", 10), vec!["new jersey", "new york", "newark"]);
        assert_eq!(index.prefix_values("new", 2), vec!["new jersey", "new york"]);
        assert_eq!(index.prefix_values("", 10).len(), 3);
    }
}
