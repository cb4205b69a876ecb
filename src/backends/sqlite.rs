//! SQLite backend: one row per file.

use std::sync::{Mutex, MutexGuard, PoisonError};

use regex::Regex;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension, Params, params};

use crate::{Backend, FsError, Mode, RawFile};

const IN_MEMORY: &str = ":memory:";
const IDENTIFIER: &str = "^[A-Za-z0-9_]+$";

/// SQL text rendered once from validated identifiers.
#[derive(Debug)]
struct Statements {
    create: String,
    read: String,
    write: String,
    exists: String,
    remove: String,
    rename: String,
}

impl Statements {
    fn render(table: &str, file_col: &str, content_col: &str) -> Self {
        Self {
            create: format!(
                "CREATE TABLE {table}({file_col} TEXT(255) PRIMARY KEY, {content_col} BLOB)"
            ),
            read: format!("SELECT {content_col} FROM {table} WHERE {file_col} = ?1 LIMIT 1"),
            write: format!(
                "INSERT INTO {table}({file_col}, {content_col}) VALUES(?1, ?2) \
                 ON CONFLICT({file_col}) DO UPDATE SET {content_col} = ?2"
            ),
            exists: format!("SELECT {file_col} FROM {table} WHERE {file_col} = ?1 LIMIT 1"),
            remove: format!("DELETE FROM {table} WHERE {file_col} = ?1"),
            rename: format!("UPDATE {table} SET {file_col} = ?1 WHERE {file_col} = ?2"),
        }
    }
}

/// Files stored as rows of a SQLite table, keyed by path.
///
/// The table has a text primary-key column for the path and a blob column
/// for the stored bytes. Writes are upserts and commit immediately.
///
/// ```rust
/// use blobfs::{Filesystem, SqliteBackend};
///
/// let fs = Filesystem::new(SqliteBackend::open(":memory:").unwrap());
/// fs.open("a.txt", "w").unwrap().write("row").unwrap();
/// assert!(fs.is_file("a.txt").unwrap());
/// ```
#[derive(Debug)]
pub struct SqliteBackend {
    conn: Mutex<Connection>,
    database: String,
    table_name: String,
    sql: Statements,
}

impl SqliteBackend {
    /// Open `database` with the default `files(file, content)` layout.
    ///
    /// # Errors
    ///
    /// See [`with_table`](Self::with_table).
    pub fn open(database: &str) -> Result<Self, FsError> {
        Self::with_table(database, "files", "file", "content")
    }

    /// Open `database` using a custom table and column names.
    ///
    /// The table is created automatically only for `":memory:"` databases;
    /// otherwise call [`create_table`](Self::create_table) if it does not
    /// exist yet.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidIdentifier`] if a name has characters other than
    ///   ASCII letters, digits and underscores
    /// - [`FsError::Sqlite`] if the database cannot be opened
    pub fn with_table(
        database: &str,
        table_name: &str,
        file_col: &str,
        content_col: &str,
    ) -> Result<Self, FsError> {
        let identifier = Regex::new(IDENTIFIER).map_err(|e| FsError::invalid(e.to_string()))?;
        for (name, value) in [
            ("table_name", table_name),
            ("file_col", file_col),
            ("content_col", content_col),
        ] {
            if !identifier.is_match(value) {
                return Err(FsError::InvalidIdentifier {
                    name,
                    value: value.to_owned(),
                });
            }
        }

        let backend = Self {
            conn: Mutex::new(Connection::open(database)?),
            database: database.to_owned(),
            table_name: table_name.to_owned(),
            sql: Statements::render(table_name, file_col, content_col),
        };
        if database == IN_MEMORY {
            backend.create_table()?;
        }
        log::debug!("opened sqlite backend {database} table={table_name}");
        Ok(backend)
    }

    /// Create the storage table.
    ///
    /// # Errors
    ///
    /// - [`FsError::Sqlite`] if the table already exists or creation fails
    pub fn create_table(&self) -> Result<(), FsError> {
        self.execute(&self.sql.create, [])?;
        Ok(())
    }

    /// Run one SQL statement against the underlying connection.
    ///
    /// Returns the number of changed rows.
    pub fn execute(&self, sql: &str, params: impl Params) -> Result<usize, FsError> {
        Ok(self.conn().execute(sql, params)?)
    }

    /// Database path as given at construction.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Storage table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct SqliteFile<'a> {
    backend: &'a SqliteBackend,
    path: String,
}

impl RawFile for SqliteFile<'_> {
    fn read_raw(&mut self) -> Result<Vec<u8>, FsError> {
        let content = self
            .backend
            .conn()
            .query_row(&self.backend.sql.read, params![self.path], |row| {
                // Rows written by other tools may hold TEXT.
                match row.get_ref(0)? {
                    ValueRef::Blob(data) | ValueRef::Text(data) => Ok(data.to_vec()),
                    other => Err(rusqlite::Error::InvalidColumnType(
                        0,
                        "content".into(),
                        other.data_type(),
                    )),
                }
            })
            .optional()?;
        content.ok_or_else(|| FsError::NotFound {
            path: self.path.clone(),
        })
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<usize, FsError> {
        self.backend
            .execute(&self.backend.sql.write, params![self.path, data])?;
        Ok(data.len())
    }
}

impl Backend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn describe(&self, path: &str) -> String {
        format!(
            "sqlite3://{}?table_name={}&file={}",
            self.database, self.table_name, path
        )
    }

    fn acquire<'a>(&'a self, path: &str, _mode: &Mode) -> Result<Box<dyn RawFile + 'a>, FsError> {
        Ok(Box::new(SqliteFile {
            backend: self,
            path: path.to_owned(),
        }))
    }

    fn is_file(&self, path: &str) -> Result<bool, FsError> {
        let row = self
            .conn()
            .query_row(&self.sql.exists, params![path], |_| Ok(()))
            .optional()?;
        Ok(row.is_some())
    }

    fn remove_raw(&self, path: &str) -> Result<(), FsError> {
        self.execute(&self.sql.remove, params![path])?;
        Ok(())
    }

    fn rename_raw(&self, src: &str, dst: &str) -> Result<(), FsError> {
        self.execute(&self.sql.rename, params![dst, src])?;
        Ok(())
    }
}
