//! `SQLite` schema definitions for bmirec.
//!
//! The schema is unversioned: every statement is idempotent and runs on
//! each open.

use rusqlite::Connection;

use crate::error::Result;

/// Name of the records table.
pub const RECORDS_TABLE: &str = "bmi_records";

/// SQL statement to create the records table.
///
/// `height` is stored in meters, `weight` in kilograms.
pub const CREATE_RECORDS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS bmi_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    height REAL NOT NULL,
    weight REAL NOT NULL,
    bmi REAL NOT NULL,
    category TEXT NOT NULL,
    timestamp TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
)
";

/// All schema creation statements in order.
///
/// Records are only ever read in id order, which the primary key covers.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_RECORDS_TABLE];

/// Create all tables and indexes that don't exist yet.
///
/// # Errors
///
/// Returns an error if any statement fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }
    Ok(())
}
