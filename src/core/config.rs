use std::collections::HashSet;
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use crate::analysis::analyzer::AnalyzerKind;
use crate::core::error::{Error, Result};
use crate::parallel::pool::Backpressure;

pub const DEFAULT_WORKERS: usize = 20;
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Top-level configuration: one entry per index core
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cores: Vec<CoreConfig>,
}

impl Config {
    /// Parse and validate a JSON config document
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text).map_err(|err| match err.classify() {
            // well-formed JSON with bad values: unknown analyzer tag, missing path, ...
            Category::Data => Error::invalid_config(format!("config: {}", err)),
            _ => Error::from(err),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let mut paths = HashSet::with_capacity(self.cores.len());

        for core in &self.cores {
            core.validate()?;

            let path = core.normalized_path();
            if !paths.insert(path.clone()) {
                return Err(Error::invalid_config(format!(
                    "path {} is shared by 2 cores",
                    path
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    pub path: String,

    #[serde(default)]
    pub analyzer: AnalyzerKind,

    #[serde(default, alias = "jdbc")]
    pub persistence: Option<PersistenceConfig>,

    #[serde(default)]
    pub ingestion: PoolConfig,

    #[serde(default)]
    pub persistence_pool: PoolConfig,

    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl CoreConfig {
    pub fn new(path: &str) -> Self {
        CoreConfig {
            path: path.to_string(),
            analyzer: AnalyzerKind::default(),
            persistence: None,
            ingestion: PoolConfig::default(),
            persistence_pool: PoolConfig::default(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_analyzer(mut self, analyzer: AnalyzerKind) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn with_persistence(mut self, persistence: PersistenceConfig) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn with_ingestion(mut self, pool: PoolConfig) -> Self {
        self.ingestion = pool;
        self
    }

    pub fn with_persistence_pool(mut self, pool: PoolConfig) -> Self {
        self.persistence_pool = pool;
        self
    }

    /// `"/" + path` with surrounding slashes stripped
    pub fn normalized_path(&self) -> String {
        normalize_path(&self.path)
    }

    /// Path flattened into a name usable for thread names and log fields
    pub fn canonical_name(&self) -> String {
        let stripped = self.path.trim_matches('/');
        if stripped.is_empty() {
            "root".to_string()
        } else {
            stripped.replace('/', ".")
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 {
            return Err(Error::invalid_config(format!(
                "core {}: max_results must be positive",
                self.normalized_path()
            )));
        }

        self.ingestion.validate("ingestion")?;
        if let Some(persistence) = &self.persistence {
            self.persistence_pool.validate("persistence_pool")?;
            persistence.validate()?;
        }

        Ok(())
    }
}

pub fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim_matches('/'))
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

/// Settings for the relational side-channel store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    pub url: String,

    #[serde(default, alias = "user")]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    pub table: String,

    #[serde(default = "default_hash_column", alias = "hash")]
    pub hash_column: String,

    #[serde(default = "default_value_column", alias = "s")]
    pub value_column: String,
}

impl PersistenceConfig {
    pub fn new(url: &str, table: &str) -> Self {
        PersistenceConfig {
            url: url.to_string(),
            username: None,
            password: None,
            table: table.to_string(),
            hash_column: default_hash_column(),
            value_column: default_value_column(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::invalid_config("persistence url is empty"));
        }

        for (what, name) in [
            ("table", &self.table),
            ("hash column", &self.hash_column),
            ("value column", &self.value_column),
        ] {
            if !is_sql_identifier(name) {
                return Err(Error::invalid_config(format!(
                    "persistence {} {:?} is not a plain SQL identifier",
                    what, name
                )));
            }
        }

        Ok(())
    }
}

fn default_hash_column() -> String {
    "hash".to_string()
}

fn default_value_column() -> String {
    "s".to_string()
}

fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Sizing of a background worker pool
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PoolConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    #[serde(default)]
    pub backpressure: Backpressure,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            backpressure: Backpressure::default(),
        }
    }
}

impl PoolConfig {
    pub fn new(workers: usize, queue_capacity: usize, backpressure: Backpressure) -> Self {
        PoolConfig {
            workers,
            queue_capacity,
            backpressure,
        }
    }

    fn validate(&self, what: &str) -> Result<()> {
        if self.workers == 0 || self.queue_capacity == 0 {
            return Err(Error::invalid_config(format!(
                "{} pool needs at least one worker and one queue slot",
                what
            )));
        }
        Ok(())
    }
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;

    #[test]
    fn parses_minimal_core() {
        let config = Config::from_json_str(r#"{"cores": [{"path": "cities/"}]}"#).unwrap();
        let core = &config.cores[0];

        assert_eq!(core.normalized_path(), "/cities");
        assert_eq!(core.canonical_name(), "cities");
        assert_eq!(core.analyzer, AnalyzerKind::PartialMatch);
        assert_eq!(core.max_results, DEFAULT_MAX_RESULTS);
        assert_eq!(core.ingestion.workers, DEFAULT_WORKERS);
        assert!(core.persistence.is_none());
    }

    #[test]
    fn accepts_legacy_jdbc_field_names() {
        let text = r#"{"cores": [{
            "path": "/",
            "analyzer": "whole_string",
            "jdbc": {"url": "strings.db", "user": "app", "table": "strings", "hash": "h", "s": "v"}
        }]}"#;
        let config = Config::from_json_str(text).unwrap();
        let persistence = config.cores[0].persistence.as_ref().unwrap();

        assert_eq!(config.cores[0].canonical_name(), "root");
        assert_eq!(config.cores[0].analyzer, AnalyzerKind::WholeString);
        assert_eq!(persistence.username.as_deref(), Some("app"));
        assert_eq!(persistence.hash_column, "h");
        assert_eq!(persistence.value_column, "v");
    }

    #[test]
    fn rejects_duplicate_paths() {
        let text = r#"{"cores": [{"path": "/a"}, {"path": "a/"}]}"#;
        let err = Config::from_json_str(text).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidConfig);
        assert!(err.context.contains("/a"));
    }

    #[test]
    fn rejects_unknown_analyzer_as_config_error() {
        let err = Config::from_json_str(r#"{"cores": [{"path": "a", "analyzer": "Fancy"}]}"#)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidConfig);
        assert!(err.context.contains("Fancy"));
    }

    #[test]
    fn missing_path_is_a_config_error() {
        let text = r#"{"cores": [{"analyzer": "whole_string"}]}"#;
        let err = Config::from_json_str(text).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidConfig);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = Config::from_json_str(r#"{"cores": ["#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
    }

    #[test]
    fn rejects_unsafe_identifiers() {
        let persistence = PersistenceConfig::new("x.db", "strings; drop table x");
        let core = CoreConfig::new("a").with_persistence(persistence);
        assert_eq!(core.validate().unwrap_err().kind, ErrorKind::InvalidConfig);
    }

    #[test]
    fn rejects_empty_pools() {
        let core = CoreConfig::new("a").with_ingestion(PoolConfig::new(0, 10, Backpressure::Block));
        assert_eq!(core.validate().unwrap_err().kind, ErrorKind::InvalidConfig);
    }
}
