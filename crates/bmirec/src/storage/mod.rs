//! Record store for bmirec.
//!
//! This module provides `SQLite`-based persistent storage for BMI records.
//! Records are append-only: there is no update or delete.

pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::engine::{categorize, Category, Measurement};
use crate::error::{Error, Result};
use crate::record::{BmiRecord, RecordId};

/// Path reported for in-memory stores.
const MEMORY_PATH: &str = ":memory:";

/// Timestamp layout written by `SQLite`'s `CURRENT_TIMESTAMP`.
const SQLITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Columns selected for every record query, in `row_to_record` order.
const RECORD_COLUMNS: &str = "id, name, height, weight, bmi, category, timestamp";

/// Options applied when opening a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Use `PRAGMA synchronous=FULL` so each append is on disk before it returns.
    /// When `false`, `NORMAL` is used.
    pub synchronous_full: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            synchronous_full: true,
        }
    }
}

/// Durable, append-only store of BMI records.
///
/// A store is either open or closed. It starts open; [`Store::close`] moves
/// it to closed, after which every query returns [`Error::StoreClosed`].
/// Dropping an open store releases the connection as well.
#[derive(Debug)]
pub struct Store {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection, `None` once closed.
    conn: Option<Connection>,
}

impl Store {
    /// Open or create a store at the given path with default options.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, StoreOptions::default())
    }

    /// Open or create a store at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist,
    /// and the `bmi_records` table if it is missing. Safe to call on every start.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open_with_options(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        let synchronous = if options.synchronous_full {
            "FULL"
        } else {
            "NORMAL"
        };
        conn.execute_batch(&format!(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous={synchronous};"
        ))?;

        schema::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Some(conn),
        })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(MEMORY_PATH),
            source,
        })?;

        schema::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(MEMORY_PATH),
            conn: Some(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the store has not been closed yet.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(Error::StoreClosed)
    }

    /// Append a record for a validated measurement.
    ///
    /// The id and timestamp are assigned here. The insert is committed
    /// before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreClosed`] after [`Store::close`], or an error if
    /// the database operation fails.
    pub fn append(
        &self,
        measurement: &Measurement,
        bmi: f64,
        category: Category,
    ) -> Result<RecordId> {
        let conn = self.conn()?;
        let timestamp = Utc::now().to_rfc3339();

        conn.execute(
            r"
            INSERT INTO bmi_records (name, height, weight, bmi, category, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                measurement.name,
                measurement.height_m,
                measurement.weight_kg,
                bmi,
                category.label(),
                timestamp,
            ],
        )?;

        let id = RecordId(conn.last_insert_rowid());
        debug!("Inserted record with id {}", id);
        Ok(id)
    }

    /// Return every record in insertion order (ascending id).
    ///
    /// An empty store yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreClosed`] after [`Store::close`], or an error if
    /// the database operation fails.
    pub fn list_all(&self) -> Result<Vec<BmiRecord>> {
        let mut stmt = self
            .conn()?
            .prepare(&format!("SELECT {RECORD_COLUMNS} FROM bmi_records ORDER BY id ASC"))?;

        let records = stmt
            .query_map([], Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Get a record by its id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreClosed`] after [`Store::close`], or an error if
    /// the database operation fails.
    pub fn get(&self, id: RecordId) -> Result<Option<BmiRecord>> {
        let result = self
            .conn()?
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM bmi_records WHERE id = ?1"),
                [id.get()],
                Self::row_to_record,
            )
            .optional()?;
        Ok(result)
    }

    /// Count records in the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreClosed`] after [`Store::close`], or an error if
    /// the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM bmi_records", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get store statistics.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreClosed`] after [`Store::close`], or an error if
    /// the database operation fails.
    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn()?;
        let total_records = self.count()?;

        let oldest: Option<String> = conn
            .query_row(
                "SELECT timestamp FROM bmi_records ORDER BY id ASC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let newest: Option<String> = conn
            .query_row(
                "SELECT timestamp FROM bmi_records ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let db_size_bytes = if self.path.as_os_str() == MEMORY_PATH {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StoreStats {
            total_records,
            oldest_record: oldest.as_deref().and_then(parse_timestamp),
            newest_record: newest.as_deref().and_then(parse_timestamp),
            db_size_bytes,
        })
    }

    /// Release the database connection.
    ///
    /// Calling this more than once is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if `SQLite` fails to close the connection. The store
    /// is closed either way.
    pub fn close(&mut self) -> Result<()> {
        let Some(conn) = self.conn.take() else {
            debug!("Store at {} already closed", self.path.display());
            return Ok(());
        };

        conn.close().map_err(|(_conn, source)| Error::DatabaseQuery(source))?;
        info!("Database closed at {}", self.path.display());
        Ok(())
    }

    /// Convert a database row to a `BmiRecord`.
    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<BmiRecord> {
        let id: i64 = row.get(0)?;
        let name: String = row.get(1)?;
        let height_m: f64 = row.get(2)?;
        let weight_kg: f64 = row.get(3)?;
        let bmi: f64 = row.get(4)?;
        let category_str: String = row.get(5)?;
        let timestamp_str: String = row.get(6)?;

        let category = Category::from_label(&category_str).unwrap_or_else(|| {
            warn!(
                "Unknown category '{}' on record {}, classifying from stored BMI",
                category_str, id
            );
            categorize(bmi)
        });

        let created_at = parse_timestamp(&timestamp_str).unwrap_or_else(|| {
            warn!(
                "Unreadable timestamp '{}' on record {}, using the Unix epoch",
                timestamp_str, id
            );
            DateTime::<Utc>::UNIX_EPOCH
        });

        Ok(BmiRecord {
            id: RecordId(id),
            name,
            height_m,
            weight_kg,
            bmi,
            category,
            created_at,
        })
    }
}

/// Parse a stored timestamp, either RFC 3339 or `SQLite`'s `CURRENT_TIMESTAMP` (UTC).
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, SQLITE_TIMESTAMP_FORMAT)
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Total number of records stored.
    pub total_records: i64,
    /// Timestamp of the first record.
    pub oldest_record: Option<DateTime<Utc>>,
    /// Timestamp of the latest record.
    pub newest_record: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compute_bmi;

    fn create_test_store() -> Store {
        Store::open_in_memory().expect("failed to create test store")
    }

    fn measurement(name: &str, height_m: f64, weight_kg: f64) -> Measurement {
        Measurement {
            name: name.to_string(),
            height_m,
            weight_kg,
        }
    }

    fn append_measurement(store: &Store, m: &Measurement) -> RecordId {
        let bmi = m.bmi();
        store.append(m, bmi, categorize(bmi)).unwrap()
    }

    fn temp_db_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bmirec_{label}_{}.db", std::process::id()))
    }

    fn remove_db_files(path: &Path) {
        let _ = std::fs::remove_file(path);
        let _ = std::fs::remove_file(path.with_extension("db-wal"));
        let _ = std::fs::remove_file(path.with_extension("db-shm"));
    }

    #[test]
    fn test_open_in_memory() {
        let store = Store::open_in_memory();
        assert!(store.is_ok());
        assert!(store.unwrap().is_open());
    }

    #[test]
    fn test_list_all_empty() {
        let store = create_test_store();
        let records = store.list_all().unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_append_and_list_all() {
        let store = create_test_store();
        let m = measurement("Sam", 1.8, 81.0);
        let bmi = compute_bmi(m.height_m, m.weight_kg);

        let id = store.append(&m, bmi, Category::Overweight).unwrap();
        let records = store.list_all().unwrap();

        assert_eq!(records.len(), 1);
        let last = records.last().unwrap();
        assert_eq!(last.id, id);
        assert_eq!(last.name, "Sam");
        assert_eq!(last.height_m, 1.8);
        assert_eq!(last.weight_kg, 81.0);
        assert_eq!(last.bmi, bmi);
        assert_eq!(last.category, Category::Overweight);
    }

    #[test]
    fn test_ids_strictly_increase() {
        let store = create_test_store();
        let mut previous = Vec::new();

        for i in 0..5 {
            let m = measurement(&format!("Person {i}"), 1.6 + f64::from(i) * 0.05, 60.0);
            let id = append_measurement(&store, &m);
            assert!(previous.iter().all(|p| id > *p));
            previous.push(id);
        }

        let records = store.list_all().unwrap();
        let ids: Vec<RecordId> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, previous);
    }

    #[test]
    fn test_list_all_insertion_order() {
        let store = create_test_store();
        for name in ["Charlie", "Alice", "Bob"] {
            append_measurement(&store, &measurement(name, 1.7, 70.0));
        }

        let names: Vec<String> = store.list_all().unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Charlie", "Alice", "Bob"]);
    }

    #[test]
    fn test_duplicates_allowed() {
        let store = create_test_store();
        let m = measurement("Alex", 1.7, 70.0);

        let id1 = append_measurement(&store, &m);
        let id2 = append_measurement(&store, &m);

        assert_ne!(id1, id2);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_get() {
        let store = create_test_store();
        let id = append_measurement(&store, &measurement("Alex", 1.7, 70.0));

        let record = store.get(id).unwrap().unwrap();
        assert_eq!(record.name, "Alex");
        assert_eq!(record.category, Category::NormalWeight);
    }

    #[test]
    fn test_get_nonexistent() {
        let store = create_test_store();
        assert!(store.get(RecordId(99999)).unwrap().is_none());
    }

    #[test]
    fn test_count() {
        let store = create_test_store();
        assert_eq!(store.count().unwrap(), 0);

        append_measurement(&store, &measurement("One", 1.7, 70.0));
        append_measurement(&store, &measurement("Two", 1.8, 90.0));

        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_created_at_is_recent() {
        let store = create_test_store();
        let before = Utc::now();
        let id = append_measurement(&store, &measurement("Alex", 1.7, 70.0));
        let after = Utc::now();

        let record = store.get(id).unwrap().unwrap();
        assert!(record.created_at >= before);
        assert!(record.created_at <= after);
    }

    #[test]
    fn test_reads_sqlite_default_timestamp() {
        let store = create_test_store();
        store
            .conn()
            .unwrap()
            .execute(
                "INSERT INTO bmi_records (name, height, weight, bmi, category) \
                 VALUES ('Legacy', 1.7, 70.0, 24.22, 'Normal weight')",
                [],
            )
            .unwrap();

        let records = store.list_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Legacy");
        assert!(records[0].created_at <= Utc::now());
    }

    #[test]
    fn test_unknown_category_falls_back_to_bmi() {
        let store = create_test_store();
        store
            .conn()
            .unwrap()
            .execute(
                "INSERT INTO bmi_records (name, height, weight, bmi, category, timestamp) \
                 VALUES ('Odd', 1.7, 95.0, 32.87, 'very heavy', '2024-01-15 10:00:00')",
                [],
            )
            .unwrap();

        let record = store.list_all().unwrap().remove(0);
        assert_eq!(record.category, Category::Obese);
        assert_eq!(
            record.created_at,
            parse_timestamp("2024-01-15T10:00:00Z").unwrap()
        );
    }

    #[test]
    fn test_unreadable_timestamp_reads_as_epoch() {
        let store = create_test_store();
        store
            .conn()
            .unwrap()
            .execute(
                "INSERT INTO bmi_records (name, height, weight, bmi, category, timestamp) \
                 VALUES ('Garbled', 1.7, 70.0, 24.22, 'Normal weight', 'not a date')",
                [],
            )
            .unwrap();

        let first = store.list_all().unwrap().remove(0);
        let second = store.list_all().unwrap().remove(0);
        assert_eq!(first.created_at, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-01-15T10:00:00+00:00").is_some());
        assert!(parse_timestamp("2024-01-15 10:00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_stats_empty() {
        let store = create_test_store();
        let stats = store.stats().unwrap();

        assert_eq!(stats.total_records, 0);
        assert!(stats.oldest_record.is_none());
        assert!(stats.newest_record.is_none());
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_stats_with_data() {
        let store = create_test_store();
        append_measurement(&store, &measurement("First", 1.7, 70.0));
        append_measurement(&store, &measurement("Second", 1.6, 50.0));

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_records, 2);
        assert!(stats.oldest_record.is_some());
        assert!(stats.newest_record.is_some());
        assert!(stats.oldest_record <= stats.newest_record);
    }

    #[test]
    fn test_path() {
        let store = create_test_store();
        assert_eq!(store.path().to_string_lossy(), ":memory:");
    }

    #[test]
    fn test_unicode_name() {
        let store = create_test_store();
        let id = append_measurement(&store, &measurement("Zoë 世界", 1.7, 70.0));
        assert_eq!(store.get(id).unwrap().unwrap().name, "Zoë 世界");
    }

    #[test]
    fn test_close_then_use_fails() {
        let mut store = create_test_store();
        store.close().unwrap();

        assert!(!store.is_open());
        let m = measurement("Late", 1.7, 70.0);
        assert!(store
            .append(&m, m.bmi(), Category::NormalWeight)
            .unwrap_err()
            .is_store_closed());
        assert!(store.list_all().unwrap_err().is_store_closed());
        assert!(store.count().unwrap_err().is_store_closed());
        assert!(store.stats().unwrap_err().is_store_closed());
        assert!(store.get(RecordId(1)).unwrap_err().is_store_closed());
    }

    #[test]
    fn test_double_close_is_noop() {
        let mut store = create_test_store();
        assert!(store.close().is_ok());
        assert!(store.close().is_ok());
        assert!(!store.is_open());
    }

    #[test]
    fn test_open_file_based_persists() {
        let db_path = temp_db_path("persist");
        remove_db_files(&db_path);

        let mut store = Store::open(&db_path).unwrap();
        let id = append_measurement(&store, &measurement("Sam", 1.8, 81.0));
        assert_eq!(store.path(), db_path);
        store.close().unwrap();

        // Reopening must not reset the table.
        let mut store = Store::open(&db_path).unwrap();
        let records = store.list_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        store.close().unwrap();

        remove_db_files(&db_path);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let root = std::env::temp_dir().join(format!("bmirec_test_{}", std::process::id()));
        let nested_path = root.join("nested/bmi_data.db");
        let _ = std::fs::remove_dir_all(&root);

        let store = Store::open(&nested_path).unwrap();
        assert!(nested_path.exists());

        drop(store);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_open_with_normal_sync() {
        let db_path = temp_db_path("normal_sync");
        remove_db_files(&db_path);

        let store = Store::open_with_options(
            &db_path,
            StoreOptions {
                synchronous_full: false,
            },
        )
        .unwrap();
        append_measurement(&store, &measurement("Alex", 1.7, 70.0));
        assert_eq!(store.count().unwrap(), 1);

        drop(store);
        remove_db_files(&db_path);
    }

    #[test]
    fn test_stats_db_size() {
        let db_path = temp_db_path("size");
        remove_db_files(&db_path);

        let store = Store::open(&db_path).unwrap();
        append_measurement(&store, &measurement("Alex", 1.7, 70.0));

        let stats = store.stats().unwrap();
        assert!(stats.db_size_bytes > 0);

        drop(store);
        remove_db_files(&db_path);
    }

    #[test]
    fn test_default_store_options() {
        assert!(StoreOptions::default().synchronous_full);
    }

    #[test]
    fn test_store_stats_clone() {
        let stats = StoreStats {
            total_records: 5,
            oldest_record: None,
            newest_record: None,
            db_size_bytes: 512,
        };
        assert_eq!(stats.clone(), stats);
    }
}
