//! SQLite-backed meetups and users stores for meetnear.

/// Connection handling and schema bootstrap.
pub mod db;
/// Meetups store.
pub mod meetups;
/// Users store.
pub mod users;

pub use db::Database;
pub use meetups::SqliteMeetupsStore;
pub use users::SqliteUsersStore;
