//! SQLite storage bootstrap and entity schema creation.
//!
//! # Responsibility
//! - Resolve connection strings into concrete SQLite locations.
//! - Open and configure SQLite connections.
//! - Create the tables of registered entities before first use.
//!
//! # Invariants
//! - Returned connections have the configured `foreign_keys` mode and busy timeout.
//! - Returned connections have every registered entity table present.
//! - Existing tables are never altered or dropped.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod location;
mod open;
pub mod schema;

pub use location::DbLocation;
pub use open::{open_db, open_db_in_memory, open_location, ConnectionSettings};
pub use schema::{create_all, Schema, SchemaError};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Connection string is empty or names a non-SQLite driver.
    InvalidLocation(String),
    Schema(SchemaError),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::InvalidLocation(message) => write!(f, "invalid database location: {message}"),
            Self::Schema(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::InvalidLocation(_) => None,
            Self::Schema(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<SchemaError> for DbError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}
