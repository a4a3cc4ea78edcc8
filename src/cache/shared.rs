/// Shared cache tier
///
/// Entries are stored as JSON text with an absolute expiry so any process that
/// opens the same store sees them. Reads filter out expired rows; expired rows
/// are deleted lazily by `purge_expired`.
use crate::errors::{CacheError, CacheResult};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::Duration;

/// Storage backend for the shared tier
pub trait SharedStore: Send + Sync {
    /// Raw JSON for `key` if present and unexpired
    fn get_raw(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store raw JSON for `key`, replacing any previous value
    fn put_raw(&self, key: &str, json: &str, ttl: Duration) -> CacheResult<()>;
}

/// SQLite-backed shared store
pub struct SqliteSharedStore {
    conn: Mutex<Connection>,
}

impl SqliteSharedStore {
    /// Open (or create) the store; `":memory:"` opens a private in-memory database
    pub fn open(path: &str) -> CacheResult<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|source| CacheError::Directory {
                        path: parent.display().to_string(),
                        source,
                    })?;
                }
            }
            Connection::open(path)?
        };

        conn.busy_timeout(Duration::from_secs(2))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS cache_entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at INTEGER NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_cache_entries_expires ON cache_entries(expires_at);",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Delete expired rows, returning how many were removed
    pub fn purge_expired(&self) -> CacheResult<usize> {
        let conn = self.conn.lock();
        let removed = conn.execute(
            "DELETE FROM cache_entries WHERE expires_at <= ?1",
            params![now_millis()],
        )?;
        Ok(removed)
    }
}

impl SharedStore for SqliteSharedStore {
    fn get_raw(&self, key: &str) -> CacheResult<Option<String>> {
        let conn = self.conn.lock();
        let value = conn
            .query_row(
                "SELECT value FROM cache_entries WHERE key = ?1 AND expires_at > ?2",
                params![key, now_millis()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put_raw(&self, key: &str, json: &str, ttl: Duration) -> CacheResult<()> {
        let expires_at = now_millis().saturating_add(ttl_millis(ttl));
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO cache_entries (key, value, expires_at) VALUES (?1, ?2, ?3)",
            params![key, json, expires_at],
        )?;
        Ok(())
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn ttl_millis(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let store = SqliteSharedStore::open(":memory:").unwrap();
        store
            .put_raw("volumes:BTC", r#"{"binance":1.5}"#, Duration::from_secs(60))
            .unwrap();

        assert_eq!(
            store.get_raw("volumes:BTC").unwrap().as_deref(),
            Some(r#"{"binance":1.5}"#)
        );
        assert_eq!(store.get_raw("volumes:ETH").unwrap(), None);
    }

    #[test]
    fn test_expired_rows_are_invisible_and_purged() {
        let store = SqliteSharedStore::open(":memory:").unwrap();
        store.put_raw("k", "1", Duration::from_millis(0)).unwrap();
        store.put_raw("live", "2", Duration::from_secs(60)).unwrap();

        assert_eq!(store.get_raw("k").unwrap(), None);
        assert_eq!(store.purge_expired().unwrap(), 1);
        assert_eq!(store.get_raw("live").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_huge_ttl_saturates_instead_of_expiring() {
        assert_eq!(ttl_millis(Duration::MAX), i64::MAX);

        let store = SqliteSharedStore::open(":memory:").unwrap();
        store.put_raw("forever", "1", Duration::MAX).unwrap();
        assert_eq!(store.get_raw("forever").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_unusable_parent_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let path = blocker.join("shared.db");

        match SqliteSharedStore::open(path.to_str().unwrap()) {
            Err(CacheError::Directory { path, .. }) => assert!(path.ends_with("not-a-dir")),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("store opened under a regular file"),
        }
    }

    #[test]
    fn test_visible_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.db");
        let path = path.to_str().unwrap();

        let writer = SqliteSharedStore::open(path).unwrap();
        writer.put_raw("prices:ETH", "3100.5", Duration::from_secs(60)).unwrap();

        let reader = SqliteSharedStore::open(path).unwrap();
        assert_eq!(reader.get_raw("prices:ETH").unwrap().as_deref(), Some("3100.5"));
    }
}
