//! SQLite implementation of the users store.

use async_trait::async_trait;
use rusqlite::OptionalExtension;
use tracing::info;

use meetnear_core::{
    model::{User, UserId},
    ports::{PortError, UsersPort},
};

use crate::db::Database;

/// Users store persisting to SQLite.
#[derive(Clone)]
pub struct SqliteUsersStore {
    db: Database,
}

impl SqliteUsersStore {
    /// Create a store on top of the shared database handle.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::DataOperation`] when the insert fails, e.g. because
    /// the username is taken.
    pub async fn add_user(&self, username: &str) -> Result<User, PortError> {
        let username = username.trim().to_owned();
        let insert_name = username.clone();
        let id = self
            .db
            .with_conn(move |conn| {
                conn.execute("INSERT INTO users (username) VALUES (?1);", [insert_name])?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        info!(user = id, "registered user");
        Ok(User {
            id: UserId(id),
            username,
        })
    }

    /// Look up a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::DataOperation`] when the lookup fails.
    pub async fn user(&self, id: UserId) -> Result<Option<User>, PortError> {
        self.db
            .with_conn(move |conn| {
                conn.query_row(
                    "SELECT id, username FROM users WHERE id = ?1;",
                    [id.0],
                    |row| {
                        Ok(User {
                            id: UserId(row.get("id")?),
                            username: row.get("username")?,
                        })
                    },
                )
                .optional()
            })
            .await
    }
}

#[async_trait]
impl UsersPort for SqliteUsersStore {
    async fn check_user_validity(&self, user_id: UserId) -> Result<bool, PortError> {
        let found = self
            .db
            .with_conn(move |conn| {
                conn.query_row("SELECT 1 FROM users WHERE id = ?1;", [user_id.0], |_row| Ok(()))
                    .optional()
            })
            .await?;
        Ok(found.is_some())
    }
}
