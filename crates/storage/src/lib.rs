//! Persistence for tabshell: a long-value preference store, per-tab
//! blob storage and the inactivity tracker built on top of them.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tabshell_events::TabId;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Key-value persistence for long values, the shape an embedder's
/// preference service exposes. Reads are infallible and fall back to
/// the caller's default.
pub trait PrefStore: Send + Sync {
    fn read_long(&self, key: &str, default: i64) -> i64;
    fn write_long(&self, key: &str, value: i64) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Blob persistence keyed by tab and data id.
pub trait TabDataStore: Send + Sync {
    fn save(&self, tab: TabId, data_id: &str, data: &[u8]) -> Result<()>;
    fn restore(&self, tab: TabId, data_id: &str) -> Result<Option<Vec<u8>>>;
    fn delete(&self, tab: TabId, data_id: &str) -> Result<()>;
}

/// Sqlite database implementing both [`PrefStore`] and
/// [`TabDataStore`].
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tab_data (
                tab_id INTEGER NOT NULL,
                data_id TEXT NOT NULL,
                data BLOB NOT NULL,
                PRIMARY KEY (tab_id, data_id)
            );
            "#,
        )?;
        Ok(())
    }
}

impl PrefStore for Database {
    fn read_long(&self, key: &str, default: i64) -> i64 {
        let conn = self.conn.lock().expect("database mutex poisoned");
        match conn.query_row(
            "SELECT value FROM settings WHERE key = ?1",
            [key],
            |row| row.get(0),
        ) {
            Ok(value) => value,
            Err(rusqlite::Error::QueryReturnedNoRows) => default,
            Err(error) => {
                tracing::error!(%error, key, "preference read failed");
                default
            }
        }
    }

    fn write_long(&self, key: &str, value: i64) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            (key, value),
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
        Ok(())
    }
}

impl TabDataStore for Database {
    fn save(&self, tab: TabId, data_id: &str, data: &[u8]) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO tab_data (tab_id, data_id, data) VALUES (?1, ?2, ?3)",
            (tab.0, data_id, data),
        )?;
        Ok(())
    }

    fn restore(&self, tab: TabId, data_id: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        match conn.query_row(
            "SELECT data FROM tab_data WHERE tab_id = ?1 AND data_id = ?2",
            (tab.0, data_id),
            |row| row.get(0),
        ) {
            Ok(data) => Ok(Some(data)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn delete(&self, tab: TabId, data_id: &str) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute(
            "DELETE FROM tab_data WHERE tab_id = ?1 AND data_id = ?2",
            (tab.0, data_id),
        )?;
        Ok(())
    }
}

/// In-memory [`PrefStore`] for tests and bring-up.
pub struct MemoryPrefStore {
    values: Mutex<HashMap<String, i64>>,
}

impl MemoryPrefStore {
    pub fn new() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryPrefStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefStore for MemoryPrefStore {
    fn read_long(&self, key: &str, default: i64) -> i64 {
        let values = self.values.lock().expect("pref store poisoned");
        values.get(key).copied().unwrap_or(default)
    }

    fn write_long(&self, key: &str, value: i64) -> Result<()> {
        let mut values = self.values.lock().expect("pref store poisoned");
        values.insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().expect("pref store poisoned");
        values.remove(key);
        Ok(())
    }
}

/// Marks a cleared or never-set background timestamp.
pub const NO_BACKGROUND_TIME: i64 = -1;

/// Remembers when the application last went to the background.
///
/// `on_stop` records the current wall time under the injected
/// preference key; `on_resume` clears it back to the sentinel.
pub struct InactivityTracker {
    prefs: Arc<dyn PrefStore>,
    pref_key: String,
}

impl InactivityTracker {
    pub fn new(prefs: Arc<dyn PrefStore>, pref_key: impl Into<String>) -> Self {
        Self {
            prefs,
            pref_key: pref_key.into(),
        }
    }

    pub fn on_stop(&self) -> Result<()> {
        self.set_last_backgrounded_time_ms(Self::now_ms())
    }

    pub fn on_resume(&self) -> Result<()> {
        self.set_last_backgrounded_time_ms(NO_BACKGROUND_TIME)
    }

    /// Wall time of the last background transition, or
    /// [`NO_BACKGROUND_TIME`].
    pub fn last_backgrounded_time_ms(&self) -> i64 {
        self.prefs.read_long(&self.pref_key, NO_BACKGROUND_TIME)
    }

    /// Elapsed time since the last background transition, or
    /// [`NO_BACKGROUND_TIME`] when none is recorded.
    pub fn time_since_last_backgrounded_ms(&self) -> i64 {
        let last = self.last_backgrounded_time_ms();
        if last == NO_BACKGROUND_TIME {
            return NO_BACKGROUND_TIME;
        }
        Self::now_ms() - last
    }

    /// Store an explicit timestamp. Exposed so tests can pin time.
    pub fn set_last_backgrounded_time_ms(&self, timestamp_ms: i64) -> Result<()> {
        self.prefs.write_long(&self.pref_key, timestamp_ms)
    }

    fn now_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_prefs_read_write_remove() {
        let prefs = MemoryPrefStore::new();
        assert_eq!(prefs.read_long("missing", 42), 42);

        prefs.write_long("count", 7).unwrap();
        assert_eq!(prefs.read_long("count", 0), 7);

        prefs.remove("count").unwrap();
        assert_eq!(prefs.read_long("count", 0), 0);
    }

    #[test]
    fn sqlite_prefs_round_trip() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.read_long("last_seen", -1), -1);

        db.write_long("last_seen", 123_456).unwrap();
        db.write_long("last_seen", 654_321).unwrap(); // overwrite
        assert_eq!(db.read_long("last_seen", -1), 654_321);

        db.remove("last_seen").unwrap();
        assert_eq!(db.read_long("last_seen", -1), -1);
    }

    #[test]
    fn prefs_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tabshell.db");
        {
            let db = Database::open(&path).unwrap();
            db.write_long("persisted", 9).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.read_long("persisted", 0), 9);
    }

    #[test]
    fn tab_data_save_restore_delete() {
        let db = Database::open_in_memory().unwrap();
        let tab = TabId(3);

        assert_eq!(db.restore(tab, "thumbnail").unwrap(), None);

        db.save(tab, "thumbnail", b"abc").unwrap();
        db.save(tab, "state", b"xyz").unwrap();
        assert_eq!(db.restore(tab, "thumbnail").unwrap(), Some(b"abc".to_vec()));

        db.save(tab, "thumbnail", b"def").unwrap(); // overwrite
        assert_eq!(db.restore(tab, "thumbnail").unwrap(), Some(b"def".to_vec()));

        db.delete(tab, "thumbnail").unwrap();
        assert_eq!(db.restore(tab, "thumbnail").unwrap(), None);
        // Other entries for the tab are untouched.
        assert_eq!(db.restore(tab, "state").unwrap(), Some(b"xyz".to_vec()));
    }

    #[test]
    fn tab_data_is_scoped_per_tab() {
        let db = Database::open_in_memory().unwrap();
        db.save(TabId(1), "state", b"one").unwrap();
        db.save(TabId(2), "state", b"two").unwrap();

        assert_eq!(db.restore(TabId(1), "state").unwrap(), Some(b"one".to_vec()));
        assert_eq!(db.restore(TabId(2), "state").unwrap(), Some(b"two".to_vec()));
    }

    #[test]
    fn inactivity_tracker_records_and_clears() {
        let prefs = Arc::new(MemoryPrefStore::new());
        let tracker = InactivityTracker::new(prefs, "last_backgrounded_ms");

        assert_eq!(tracker.last_backgrounded_time_ms(), NO_BACKGROUND_TIME);
        assert_eq!(tracker.time_since_last_backgrounded_ms(), NO_BACKGROUND_TIME);

        tracker.on_stop().unwrap();
        assert!(tracker.last_backgrounded_time_ms() > 0);
        assert!(tracker.time_since_last_backgrounded_ms() >= 0);

        tracker.on_resume().unwrap();
        assert_eq!(tracker.last_backgrounded_time_ms(), NO_BACKGROUND_TIME);
        assert_eq!(tracker.time_since_last_backgrounded_ms(), NO_BACKGROUND_TIME);
    }

    #[test]
    fn inactivity_tracker_measures_elapsed_time_from_pinned_timestamp() {
        let prefs = Arc::new(MemoryPrefStore::new());
        let tracker = InactivityTracker::new(prefs, "last_backgrounded_ms");

        let one_minute_ago = chrono::Utc::now().timestamp_millis() - 60_000;
        tracker.set_last_backgrounded_time_ms(one_minute_ago).unwrap();

        let elapsed = tracker.time_since_last_backgrounded_ms();
        assert!(elapsed >= 60_000);
        assert!(elapsed < 120_000);
    }

    #[test]
    fn trackers_with_different_keys_are_independent() {
        let prefs: Arc<dyn PrefStore> = Arc::new(MemoryPrefStore::new());
        let a = InactivityTracker::new(prefs.clone(), "key_a");
        let b = InactivityTracker::new(prefs, "key_b");

        a.set_last_backgrounded_time_ms(100).unwrap();
        assert_eq!(a.last_backgrounded_time_ms(), 100);
        assert_eq!(b.last_backgrounded_time_ms(), NO_BACKGROUND_TIME);
    }
}
