use std::sync::Arc;
use tracing::{debug, info};
use crate::analysis::analyzer::KeyAnalyzer;
use crate::core::config::PoolConfig;
use crate::core::error::Result;
use crate::core::service::IndexService;
use crate::core::stats::PoolStats;
use crate::parallel::pool::WorkerPool;

/// Background absorption of string batches with collision resolution
pub struct IngestionPipeline {
    pool: WorkerPool,
    service: Arc<IndexService>,
}

impl IngestionPipeline {
    pub fn new(core: &str, service: Arc<IndexService>, config: PoolConfig) -> Result<Self> {
        let pool = WorkerPool::new(&format!("ingest.{}", core), config)?;
        Ok(IngestionPipeline { pool, service })
    }

    /// Queue a batch; one job absorbs the whole batch in order.
    ///
    /// Errors only when the queue rejects the batch or is shut down.
    pub fn submit<I, S>(&self, strings: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let strings: Vec<String> = strings.into_iter().map(Into::into).collect();
        if strings.is_empty() {
            return Ok(());
        }

        let service = self.service.clone();
        self.pool.submit(move || absorb(&service, &strings))
    }

    /// Block until every queued batch has been absorbed
    pub fn wait_idle(&self) {
        self.pool.wait_idle();
    }

    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

/// Write each derived key that is free; on a taken key, rewrite the whole
/// string only if it beats the current occupant.
///
/// The read and the write are separate index calls, so concurrent batches
/// can race on a key and the last writer wins.
pub fn absorb(service: &IndexService, strings: &[String]) {
    info!(core = %service.path(), strings = strings.len(), "absorbing batch");

    let analyzer = service.analyzer();
    let index = service.index();

    for string in strings {
        let mut accepted = false;

        for entry in analyzer.index_entries(string) {
            match index.get(&entry.key) {
                None => {
                    index.put(entry.key, entry.value);
                    accepted = true;
                }
                Some(existing) => {
                    let winner = analyzer.preferred(&existing, string);
                    if winner != existing {
                        debug!(
                            core = %service.path(),
                            key = %entry.key,
                            %existing,
                            winner,
                            "collision won"
                        );
                        service.put(&[winner], false);
                        accepted = true;
                    }
                }
            }
        }

        if accepted {
            service.persist(string);
        }
    }
}
