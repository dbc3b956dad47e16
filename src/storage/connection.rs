use crate::core::config::PersistenceConfig;
use crate::core::error::Result;

/// Insert-or-update of one `(hash, value)` row, keyed by hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertStatement {
    sql: String,
}

impl UpsertStatement {
    /// Identifiers must already be validated by `PersistenceConfig::validate`
    pub fn new(config: &PersistenceConfig) -> Self {
        let sql = format!(
            "INSERT INTO {table} ({hash}, {value}) VALUES (?1, ?2) \
             ON CONFLICT({hash}) DO UPDATE SET {value} = excluded.{value}",
            table = config.table,
            hash = config.hash_column,
            value = config.value_column,
        );
        UpsertStatement { sql }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }
}

/// An open handle to the external store
pub trait StoreConnection: Send {
    fn is_closed(&self) -> bool;

    fn upsert(&mut self, statement: &UpsertStatement, hash: &str, value: &str) -> Result<()>;

    fn close(&mut self);
}

/// Opens (and reopens) store connections on demand
pub trait ConnectionFactory: Send + Sync {
    fn open(&self) -> Result<Box<dyn StoreConnection>>;
}
