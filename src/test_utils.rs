/// # Test Utilities Module
///
/// Fixtures for unit tests: an SQLite database file in a temporary
/// directory with a known `people` table.

use crate::core::db::{ConnectionOptions, Database, Dsn};
use crate::core::{DriverError, Result};
use rusqlite::{params, Connection};
use tempfile::TempDir;

/// Isolated SQLite database file, removed when the fixture is dropped
pub struct DatabaseFixture {
    dir: TempDir,
}

impl DatabaseFixture {
    /// Contents of the `people` table, ordered by id
    pub const PEOPLE: [(i64, &'static str); 5] = [
        (1, "Alice"),
        (2, "Bob"),
        (3, "Carol"),
        (4, "Dave"),
        (5, "Eve"),
    ];

    /// Creates an empty database file
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let fixture = DatabaseFixture { dir };
        // writing the header makes sure the file exists on disk
        Connection::open(fixture.path())
            .and_then(|conn| conn.execute_batch("PRAGMA user_version = 1;"))
            .map_err(DriverError::from)?;
        Ok(fixture)
    }

    /// Creates a database file holding the `people` table
    pub fn with_people() -> Result<Self> {
        let fixture = Self::new()?;
        let conn = Connection::open(fixture.path()).map_err(DriverError::from)?;
        conn.execute_batch(
            "CREATE TABLE people (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            );",
        )
        .map_err(DriverError::from)?;
        for (id, name) in Self::PEOPLE {
            conn.execute("INSERT INTO people (id, name) VALUES (?1, ?2)", params![id, name])
                .map_err(DriverError::from)?;
        }
        Ok(fixture)
    }

    pub fn path(&self) -> std::path::PathBuf {
        self.dir.path().join("fixture.db")
    }

    pub fn dsn(&self) -> Dsn {
        Dsn::new("sqlite").with("dbname", self.path().to_string_lossy())
    }

    /// Opens the fixture through `Database`
    pub fn open(&self, options: Option<ConnectionOptions>) -> Result<Database> {
        Database::open(&self.dsn(), "", "", options)
    }
}
