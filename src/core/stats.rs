use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use crate::analysis::analyzer::AnalyzerKind;

/// Snapshot of one core for status pages and health checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreStatus {
    pub path: String,
    pub analyzer: AnalyzerKind,

    // Index metrics
    pub size: usize,
    pub first_key: Option<String>,
    pub last_key: Option<String>,

    // Background work
    pub ingestion: PoolStats,
    pub persistence: Option<PersistenceStats>,

    pub started_at: DateTime<Utc>,
}

impl CoreStatus {
    pub fn persistence_enabled(&self) -> bool {
        self.persistence.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub name: String,
    pub workers: usize,
    pub pending: usize,
    pub queued: usize,
}

/// Counters kept by the persistence worker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceStats {
    pub written: u64,
    pub failed: u64,
    pub reconnects: u64,
    pub pool: Option<PoolStats>,
}
