//! SQLite storage: opening the database, schema creation, scratch lifecycle.
//!
//! The connection is never global. [`ScratchDatabase`] owns both the
//! temporary directory and the connection; loaders and reports borrow the
//! connection from it. Dropping it closes the connection first and then
//! removes the directory.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::error::{StorageError, StorageResult};

/// Database file name inside the scratch directory.
pub const DATABASE_FILE: &str = "moviedb.db";

/// Prefix of the scratch directory name.
const SCRATCH_PREFIX: &str = "moviedb-";

/// Schema for both tables.
pub const SCHEMA: &str = "
CREATE TABLE movies (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    year INTEGER NOT NULL,
    rank REAL
);

CREATE TABLE movies_genres (
    movie_id INTEGER NOT NULL,
    genre TEXT NOT NULL,
    FOREIGN KEY (movie_id) REFERENCES movies(id)
);
";

/// An open movie database.
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Open or create a database file.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StorageError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { conn, path: Some(path.to_path_buf()) })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Ok(Self { conn, path: None })
    }

    /// Create the `movies` and `movies_genres` tables.
    pub fn create_schema(&self) -> StorageResult<()> {
        self.conn.execute_batch(SCHEMA).map_err(StorageError::Schema)
    }

    /// Let SQLite enforce `movies_genres.movie_id → movies.id`.
    ///
    /// Off by default, in which case the foreign key is declared but not
    /// checked.
    pub fn set_foreign_keys(&self, enforce: bool) -> StorageResult<()> {
        self.conn
            .pragma_update(None, "foreign_keys", enforce)
            .map_err(StorageError::Pragma)
    }

    /// File backing the database, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Mutable access, needed to open a load transaction.
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Number of rows currently in `table`.
    pub fn row_count(&self, table: &str) -> rusqlite::Result<i64> {
        self.conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
    }
}

/// A database living in a fresh temporary directory.
///
/// Field order matters: the connection is dropped before the directory is
/// deleted.
pub struct ScratchDatabase {
    db: Database,
    dir: TempDir,
}

impl ScratchDatabase {
    /// Create the directory, open `moviedb.db` in it and create the schema.
    pub fn create() -> StorageResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir()
            .map_err(StorageError::TempDir)?;

        let db = Database::open(dir.path().join(DATABASE_FILE))?;
        db.create_schema()?;

        Ok(Self { db, dir })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut Database {
        &mut self.db
    }
}
