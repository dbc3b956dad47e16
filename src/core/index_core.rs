use std::sync::Arc;
use chrono::{DateTime, Utc};
use tracing::info;
use crate::analysis::analyzer::Analyzer;
use crate::core::config::CoreConfig;
use crate::core::error::Result;
use crate::core::service::IndexService;
use crate::core::stats::CoreStatus;
use crate::core::types::{PutResult, RemoveResult};
use crate::parallel::ingest::IngestionPipeline;
use crate::storage::connection::ConnectionFactory;
use crate::storage::persistence::PersistenceWorker;
use crate::storage::sqlite::SqliteConnectionFactory;

/// One independently configured index: its key index, its two worker pools
/// and its store connection. Nothing is shared between cores.
pub struct IndexCore {
    // dropped first so in-flight batches finish before the rest goes away
    ingestion: IngestionPipeline,
    service: Arc<IndexService>,
    persistence: Option<Arc<PersistenceWorker>>,
    config: CoreConfig,
    started_at: DateTime<Utc>,
}

impl IndexCore {
    /// Open a core, persisting to SQLite when a store is configured
    pub fn open(config: CoreConfig) -> Result<Self> {
        Self::open_with_factory(config, None)
    }

    /// Open a core with an explicit store connection factory.
    ///
    /// The factory is ignored when the config has no persistence settings.
    pub fn open_with_factory(
        config: CoreConfig,
        factory: Option<Arc<dyn ConnectionFactory>>,
    ) -> Result<Self> {
        config.validate()?;
        let name = config.canonical_name();

        let persistence = match &config.persistence {
            Some(settings) => {
                let factory = factory.unwrap_or_else(|| {
                    Arc::new(SqliteConnectionFactory::new(settings)) as Arc<dyn ConnectionFactory>
                });
                let worker =
                    PersistenceWorker::start(&name, settings, config.persistence_pool, factory)?;
                Some(Arc::new(worker))
            }
            None => None,
        };

        let analyzer = Analyzer::from_kind(config.analyzer);
        let mut service = IndexService::new(&config.normalized_path(), analyzer)
            .with_max_results(config.max_results);
        if let Some(worker) = &persistence {
            service = service.with_persistence(worker.clone());
        }
        let service = Arc::new(service);

        let ingestion = IngestionPipeline::new(&name, service.clone(), config.ingestion)?;

        info!(
            core = %config.normalized_path(),
            analyzer = ?config.analyzer,
            persistence = persistence.is_some(),
            "core opened"
        );

        Ok(IndexCore {
            ingestion,
            service,
            persistence,
            config,
            started_at: Utc::now(),
        })
    }

    pub fn query(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        self.service.query(prefix)
    }

    pub fn count(&self, prefix: Option<&str>) -> usize {
        self.service.count(prefix)
    }

    pub fn put<S: AsRef<str>>(&self, strings: &[S], persist: bool) -> PutResult {
        self.service.put(strings, persist)
    }

    pub fn remove<S: AsRef<str>>(&self, strings: &[S]) -> RemoveResult {
        self.service.remove(strings)
    }

    /// Hand a batch to the ingestion pool; does not wait for it
    pub fn submit_for_ingestion<I, S>(&self, strings: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingestion.submit(strings)
    }

    /// Drain ingestion, then persistence
    pub fn wait_idle(&self) {
        self.ingestion.wait_idle();
        if let Some(persistence) = &self.persistence {
            persistence.wait_idle();
        }
    }

    pub fn status(&self) -> CoreStatus {
        CoreStatus {
            path: self.service.path().to_string(),
            analyzer: self.config.analyzer,
            size: self.service.size(),
            first_key: self.service.first_key(),
            last_key: self.service.last_key(),
            ingestion: self.ingestion.stats(),
            persistence: self.persistence.as_ref().map(|worker| worker.stats()),
            started_at: self.started_at,
        }
    }

    pub fn service(&self) -> &Arc<IndexService> {
        &self.service
    }

    pub fn persistence(&self) -> Option<&Arc<PersistenceWorker>> {
        self.persistence.as_ref()
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn path(&self) -> &str {
        self.service.path()
    }
}
