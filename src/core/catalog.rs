use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use crate::core::config::{normalize_path, Config, PersistenceConfig};
use crate::core::error::Result;
use crate::core::index_core::IndexCore;
use crate::core::stats::CoreStatus;
use crate::storage::connection::ConnectionFactory;
use crate::storage::sqlite::SqliteConnectionFactory;

/// All cores of a process, keyed by normalized path
pub struct Catalog {
    cores: BTreeMap<String, IndexCore>,
}

impl Catalog {
    pub fn open(config: &Config) -> Result<Self> {
        Self::open_with(config, |settings| {
            Arc::new(SqliteConnectionFactory::new(settings)) as Arc<dyn ConnectionFactory>
        })
    }

    /// Validate the whole config, then open every core with a factory built
    /// from its persistence settings
    pub fn open_with<F>(config: &Config, mut factory: F) -> Result<Self>
    where
        F: FnMut(&PersistenceConfig) -> Arc<dyn ConnectionFactory>,
    {
        config.validate()?;

        let mut cores = BTreeMap::new();
        for core_config in &config.cores {
            let store = core_config.persistence.as_ref().map(&mut factory);
            let core = IndexCore::open_with_factory(core_config.clone(), store)?;
            cores.insert(core_config.normalized_path(), core);
        }

        info!(cores = cores.len(), "catalog opened");
        Ok(Catalog { cores })
    }

    /// Look a core up by path; `"a"`, `"/a"` and `"a/"` are the same core
    pub fn get(&self, path: &str) -> Option<&IndexCore> {
        self.cores.get(&normalize_path(path))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.cores.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }

    pub fn status(&self) -> Vec<CoreStatus> {
        self.cores.values().map(IndexCore::status).collect()
    }

    pub fn wait_idle(&self) {
        for core in self.cores.values() {
            core.wait_idle();
        }
    }
}
