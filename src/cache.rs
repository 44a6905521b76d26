//! SQLite-backed store for resolved driver batches

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

#[cfg(test)]
use mockall::automock;

use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;
use tracing::{debug, info};

use crate::driver::result::DriverResult;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Corrupt cache entry: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache connection lock poisoned")]
    LockPoisoned,
}

/// A cached batch and the time it was stored
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Milliseconds since UNIX epoch
    pub timestamp: i64,
    pub data: Vec<DriverResult>,
}

impl CacheEntry {
    pub fn new(data: Vec<DriverResult>) -> Self {
        Self {
            timestamp: current_timestamp_ms(),
            data,
        }
    }

    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.timestamp
    }

    pub fn is_fresh(&self, now_ms: i64, ttl_ms: i64) -> bool {
        self.age_ms(now_ms) <= ttl_ms
    }
}

/// Get current timestamp in milliseconds since UNIX epoch
pub fn current_timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Trait for persisting resolved batches under a key
#[cfg_attr(test, automock)]
pub trait ResultStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;

    fn set(&self, key: &str, entry: &CacheEntry) -> Result<(), CacheError>;

    fn clear(&self, key: &str) -> Result<(), CacheError>;
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(db_path: &Path) -> Result<Self, CacheError> {
        info!("Initializing cache database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;

        Ok(store)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::LockPoisoned)
    }

    fn create_schema(&self) -> Result<(), CacheError> {
        debug!("Creating database schema");

        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS entries (
                key TEXT PRIMARY KEY,
                timestamp INTEGER NOT NULL,
                data TEXT NOT NULL
            )
            "#,
            [],
        )?;

        Ok(())
    }
}

impl ResultStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let conn = self.lock_conn()?;
        let row: Option<(i64, String)> = conn
            .query_row(
                "SELECT timestamp, data FROM entries WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((timestamp, data)) = row else {
            return Ok(None);
        };

        Ok(Some(CacheEntry {
            timestamp,
            data: serde_json::from_str(&data)?,
        }))
    }

    fn set(&self, key: &str, entry: &CacheEntry) -> Result<(), CacheError> {
        let data = serde_json::to_string(&entry.data)?;
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO entries (key, timestamp, data) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET timestamp = excluded.timestamp, data = excluded.data
            "#,
            params![key, entry.timestamp, data],
        )?;
        debug!("Saved {} results under {}", entry.data.len(), key);

        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), CacheError> {
        let conn = self.lock_conn()?;
        conn.execute("DELETE FROM entries WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::spec::DriverSpec;
    use crate::release::error::FetchFailure;
    use crate::release::types::RepoRef;
    use rstest::rstest;
    use tempfile::TempDir;

    fn create_store() -> (TempDir, SqliteStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteStore::new(&temp_dir.path().join("test.db")).unwrap();
        (temp_dir, store)
    }

    fn sample_results() -> Vec<DriverResult> {
        let spec = DriverSpec::new("gocql", "Go CQL driver", RepoRef::new("scylladb", "gocql"))
            .with_upstream(RepoRef::new("gocql", "gocql"));
        let mut result = DriverResult::failed(&spec, "Timeout fetching gocql");
        result.scylla_error = Some(FetchFailure::NoMatch);
        vec![result]
    }

    #[test]
    fn get_returns_none_for_missing_key() {
        let (_temp_dir, store) = create_store();
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn set_then_get_preserves_results_and_timestamp() {
        let (_temp_dir, store) = create_store();
        let entry = CacheEntry {
            timestamp: 1_000,
            data: sample_results(),
        };

        store.set("batch", &entry).unwrap();

        assert_eq!(store.get("batch").unwrap(), Some(entry));
    }

    #[test]
    fn set_replaces_existing_entry() {
        let (_temp_dir, store) = create_store();
        store
            .set("batch", &CacheEntry { timestamp: 1, data: sample_results() })
            .unwrap();
        store
            .set("batch", &CacheEntry { timestamp: 2, data: vec![] })
            .unwrap();

        let entry = store.get("batch").unwrap().unwrap();
        assert_eq!(entry.timestamp, 2);
        assert!(entry.data.is_empty());
    }

    #[test]
    fn clear_removes_entry() {
        let (_temp_dir, store) = create_store();
        store.set("batch", &CacheEntry::new(sample_results())).unwrap();

        store.clear("batch").unwrap();

        assert_eq!(store.get("batch").unwrap(), None);
    }

    #[test]
    fn get_reports_corrupt_data() {
        let (_temp_dir, store) = create_store();
        store
            .lock_conn()
            .unwrap()
            .execute(
                "INSERT INTO entries (key, timestamp, data) VALUES ('batch', 0, 'not json')",
                [],
            )
            .unwrap();

        assert!(matches!(
            store.get("batch"),
            Err(CacheError::Serialization(_))
        ));
    }

    #[rstest]
    #[case(0, true)]
    #[case(1_000, true)]
    #[case(1_001, false)]
    fn is_fresh_compares_age_with_ttl(#[case] age: i64, #[case] expected: bool) {
        let entry = CacheEntry {
            timestamp: 10_000,
            data: vec![],
        };
        assert_eq!(entry.is_fresh(10_000 + age, 1_000), expected);
    }
}
