pub mod core;
pub mod index;
pub mod analysis;
pub mod search;
pub mod parallel;
pub mod storage;

pub use crate::analysis::analyzer::{Analyzer, AnalyzerKind, KeyAnalyzer};
pub use crate::core::catalog::Catalog;
pub use crate::core::config::{Config, CoreConfig, PersistenceConfig, PoolConfig};
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::index_core::IndexCore;
pub use crate::core::service::IndexService;
pub use crate::index::key_index::KeyIndex;
pub use crate::parallel::pool::Backpressure;

/*
┌──────────────────────────────────── AUTODEX LAYOUT ────────────────────────────────────┐
│                                                                                        │
│   Catalog ── path ──► IndexCore                                                        │
│                         │                                                              │
│                         ├── IngestionPipeline (WorkerPool "ingest.<core>")             │
│                         │        │ absorb(): get ─► preferred() ─► put                 │
│                         │        ▼                                                     │
│                         ├── Arc<IndexService> ─── put / remove / query / count         │
│                         │        │                                                     │
│                         │        ├── Analyzer        index_entries, prefix_search_key  │
│                         │        ├── KeyIndex        RwLock<BTreeMap<key, value>>      │
│                         │        ├── ResultRanker    exact ▸ edit distance ▸ lexical   │
│                         │        └── persist(s) ──┐                                    │
│                         │                         ▼                                    │
│                         └── PersistenceWorker (WorkerPool "persist.<core>")            │
│                                  └── StoreConnection: upsert (hash(s), s)              │
│                                                                                        │
└────────────────────────────────────────────────────────────────────────────────────────┘
*/
