pub mod pool;
pub mod ingest;
