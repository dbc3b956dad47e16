use std::time::Duration;
use rusqlite::{params, Connection};
use tracing::{debug, warn};
use crate::core::config::PersistenceConfig;
use crate::core::error::{Error, ErrorKind, Result};
use crate::storage::connection::{ConnectionFactory, StoreConnection, UpsertStatement};

/// Opens SQLite connections for a `PersistenceConfig`.
///
/// `url` may be a plain path, `sqlite://path` or `sqlite:path`.
#[derive(Debug, Clone)]
pub struct SqliteConnectionFactory {
    pub path: String,
    pub create_table: Option<String>,
    pub busy_timeout: Duration,
}

impl SqliteConnectionFactory {
    pub fn new(config: &PersistenceConfig) -> Self {
        let url = config.url.trim();
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);

        if config.username.is_some() || config.password.is_some() {
            debug!(url = %config.url, "sqlite ignores username and password");
        }

        SqliteConnectionFactory {
            path: path.to_string(),
            create_table: None,
            busy_timeout: Duration::from_secs(5),
        }
    }

    /// Create the target table on every open if it does not exist yet
    pub fn with_table(mut self, config: &PersistenceConfig) -> Self {
        self.create_table = Some(format!(
            "CREATE TABLE IF NOT EXISTS {table} ({hash} TEXT PRIMARY KEY, {value} TEXT NOT NULL)",
            table = config.table,
            hash = config.hash_column,
            value = config.value_column,
        ));
        self
    }
}

impl ConnectionFactory for SqliteConnectionFactory {
    fn open(&self) -> Result<Box<dyn StoreConnection>> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.busy_timeout)?;

        if let Some(ddl) = &self.create_table {
            conn.execute_batch(ddl)?;
        }

        debug!(path = %self.path, "opened sqlite connection");
        Ok(Box::new(SqliteConnection { conn: Some(conn) }))
    }
}

/// Autocommit SQLite handle; `None` once closed
pub struct SqliteConnection {
    conn: Option<Connection>,
}

impl StoreConnection for SqliteConnection {
    fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    fn upsert(&mut self, statement: &UpsertStatement, hash: &str, value: &str) -> Result<()> {
        let conn = self.conn.as_ref().ok_or_else(|| {
            Error::new(ErrorKind::ConnectionClosed, "sqlite connection is closed")
        })?;

        let mut prepared = conn.prepare_cached(statement.sql())?;
        prepared.execute(params![hash, value])?;
        Ok(())
    }

    fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err((_, err)) = conn.close() {
                warn!(error = %err, "closing sqlite connection failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(path: &str) -> PersistenceConfig {
        PersistenceConfig::new(path, "strings")
    }

    fn row(path: &std::path::Path, hash: &str) -> Option<String> {
        let conn = Connection::open(path).unwrap();
        conn.query_row("SELECT s FROM strings WHERE hash = ?1", params![hash], |row| row.get(0))
            .ok()
    }

    #[test]
    fn accepts_url_prefixes() {
        assert_eq!(SqliteConnectionFactory::new(&config("sqlite:///tmp/a.db")).path, "/tmp/a.db");
        assert_eq!(SqliteConnectionFactory::new(&config("sqlite:a.db")).path, "a.db");
        assert_eq!(SqliteConnectionFactory::new(&config("a.db")).path, "a.db");
    }

    #[test]
    fn upsert_inserts_then_updates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strings.db");
        let config = config(path.to_str().unwrap());
        let statement = UpsertStatement::new(&config);

        let factory = SqliteConnectionFactory::new(&config).with_table(&config);
        let mut conn = factory.open().unwrap();

        conn.upsert(&statement, "h1", "first").unwrap();
        conn.upsert(&statement, "h1", "second").unwrap();
        assert_eq!(row(&path, "h1").as_deref(), Some("second"));
    }

    #[test]
    fn closed_connection_reports_closed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strings.db");
        let config = config(path.to_str().unwrap());
        let statement = UpsertStatement::new(&config);

        let mut conn = SqliteConnectionFactory::new(&config).with_table(&config).open().unwrap();
        conn.close();

        assert!(conn.is_closed());
        let err = conn.upsert(&statement, "h", "v").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ConnectionClosed);
    }

    #[test]
    fn missing_table_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strings.db");
        let config = config(path.to_str().unwrap());

        let mut conn = SqliteConnectionFactory::new(&config).open().unwrap();
        let err = conn.upsert(&UpsertStatement::new(&config), "h", "v").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Storage);
    }
}
