//! Connection bootstrap and schema setup for the SQLite stores.

use std::fmt::Display;
use std::path::Path;
use std::sync::{Arc, Mutex};

use meetnear_core::ports::PortError;
use rusqlite::Connection;
use tokio::task;
use tracing::{debug, info};

/// Schema version written to `PRAGMA user_version` once tables exist.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS users (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS meetups (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT NOT NULL,
    type       TEXT NOT NULL,
    start_date INTEGER NOT NULL,
    end_date   INTEGER,
    location   TEXT NOT NULL,
    creator    INTEGER NOT NULL,
    attendees  TEXT NOT NULL DEFAULT '[]'
);

CREATE INDEX IF NOT EXISTS meetups_location_start ON meetups (location, start_date);
";

/// Shared handle to one SQLite connection.
///
/// Cloning is cheap; all clones use the same connection. Statements run on
/// tokio's blocking pool so async callers never block a worker thread.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) a database file and make sure the schema exists.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::DataOperation`] when the file cannot be opened or
    /// the schema cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PortError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(data_error)?;
        info!(path = %path.display(), "opened meetups database");
        Self::bootstrap(conn)
    }

    /// Open a private in-memory database with the schema applied.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::DataOperation`] when SQLite cannot be initialised.
    pub fn open_in_memory() -> Result<Self, PortError> {
        let conn = Connection::open_in_memory().map_err(data_error)?;
        debug!("opened in-memory meetups database");
        Self::bootstrap(conn)
    }

    fn bootstrap(conn: Connection) -> Result<Self, PortError> {
        let version: u32 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .map_err(data_error)?;
        if version > SCHEMA_VERSION {
            return Err(PortError::DataOperation(format!(
                "database schema version {version} is newer than supported {SCHEMA_VERSION}"
            )));
        }
        if version < SCHEMA_VERSION {
            conn.execute_batch(SCHEMA_SQL).map_err(data_error)?;
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)
                .map_err(data_error)?;
            info!(from = version, to = SCHEMA_VERSION, "applied schema");
        }

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `op` with exclusive use of the connection on the blocking pool.
    ///
    /// The lock is held only for `op`; a read followed by a write in two calls
    /// is not atomic.
    pub(crate) async fn with_conn<T, F>(&self, op: F) -> Result<T, PortError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_poisoned| {
                PortError::Internal("database connection lock poisoned".into())
            })?;
            op(&guard).map_err(data_error)
        })
        .await
        .map_err(|err| PortError::Internal(format!("database task failed: {err}")))?
    }
}

/// Wrap a store failure, keeping its message.
pub(crate) fn data_error<E: Display>(err: E) -> PortError {
    PortError::DataOperation(err.to_string())
}
