use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use parking_lot::Mutex;
use tracing::{debug, error, warn};
use crate::core::config::{PersistenceConfig, PoolConfig};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::stats::PersistenceStats;
use crate::parallel::pool::WorkerPool;
use crate::storage::connection::{ConnectionFactory, StoreConnection, UpsertStatement};

/// Best-effort shadow copy of accepted strings in the external store.
///
/// Jobs are fire-and-forget: failures are logged and counted, never returned
/// to the caller and never touch the in-memory index.
pub struct PersistenceWorker {
    pool: WorkerPool,
    shared: Arc<Shared>,
}

/// State every persistence job of one core works against
struct Shared {
    core: String,
    factory: Arc<dyn ConnectionFactory>,
    connection: Mutex<Option<Box<dyn StoreConnection>>>,
    statement: UpsertStatement,
    written: AtomicU64,
    failed: AtomicU64,
    reconnects: AtomicU64,
}

impl PersistenceWorker {
    /// Opens the first connection eagerly so a bad target fails at startup
    pub fn start(
        core: &str,
        config: &PersistenceConfig,
        pool: PoolConfig,
        factory: Arc<dyn ConnectionFactory>,
    ) -> Result<Self> {
        config.validate()?;

        let connection = factory.open().map_err(|err| {
            Error::new(
                err.kind,
                format!("core {}: couldn't open store connection: {}", core, err.context),
            )
        })?;

        let pool = WorkerPool::new(&format!("persist.{}", core), pool)?;

        Ok(PersistenceWorker {
            pool,
            shared: Arc::new(Shared {
                core: core.to_string(),
                factory,
                connection: Mutex::new(Some(connection)),
                statement: UpsertStatement::new(config),
                written: AtomicU64::new(0),
                failed: AtomicU64::new(0),
                reconnects: AtomicU64::new(0),
            }),
        })
    }

    /// Queue an upsert of `(hash, value)`; returns immediately
    pub fn persist(&self, hash: String, value: String) {
        let shared = self.shared.clone();

        if let Err(err) = self.pool.submit(move || shared.upsert(&hash, &value)) {
            warn!(
                core = %self.shared.core,
                error = %err,
                "persistence job dropped before queueing"
            );
            self.shared.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Close the shared handle; the next job reopens it
    pub fn close_connection(&self) {
        if let Some(conn) = self.shared.connection.lock().as_mut() {
            conn.close();
        }
    }

    pub fn wait_idle(&self) {
        self.pool.wait_idle();
    }

    /// Hold the shared handle so queued jobs stall behind it
    #[cfg(test)]
    pub(crate) fn lock_connection(
        &self,
    ) -> parking_lot::MutexGuard<'_, Option<Box<dyn StoreConnection>>> {
        self.shared.connection.lock()
    }

    pub fn stats(&self) -> PersistenceStats {
        PersistenceStats {
            written: self.shared.written.load(Ordering::Relaxed),
            failed: self.shared.failed.load(Ordering::Relaxed),
            reconnects: self.shared.reconnects.load(Ordering::Relaxed),
            pool: Some(self.pool.stats()),
        }
    }
}

impl Shared {
    fn upsert(&self, hash: &str, value: &str) {
        let mut slot = self.connection.lock();

        let result = match self.execute(&mut slot, hash, value) {
            Err(err) if err.kind == ErrorKind::ConnectionClosed => {
                // connection died under us: one reopen, one retry
                debug!(core = %self.core, "store connection closed mid-statement, retrying");
                slot.take();
                self.execute(&mut slot, hash, value)
            }
            other => other,
        };

        match result {
            Ok(()) => {
                self.written.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) if err.kind == ErrorKind::ConnectionClosed => {
                error!(
                    core = %self.core,
                    error = %err,
                    "couldn't reconnect to store, dropping string"
                );
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                warn!(core = %self.core, error = %err, "couldn't persist string");
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn execute(
        &self,
        slot: &mut Option<Box<dyn StoreConnection>>,
        hash: &str,
        value: &str,
    ) -> Result<()> {
        if slot.as_ref().map_or(true, |conn| conn.is_closed()) {
            let conn = self.factory.open()?;
            self.reconnects.fetch_add(1, Ordering::Relaxed);
            debug!(core = %self.core, "reopened store connection");
            *slot = Some(conn);
        }

        let conn = slot.as_mut().ok_or_else(|| {
            Error::new(ErrorKind::ConnectionClosed, "no store connection")
        })?;
        conn.upsert(&self.statement, hash, value)
    }
}
