//! SQLab core: a CRUD facade over SQLite for application-defined entities.
//!
//! Applications describe their record types through [`Entity`], register them
//! in a [`Schema`], and talk to the store through one [`SqLab`] handle:
//!
//! ```
//! use rusqlite::types::Value;
//! use rusqlite::Row;
//! use sqlab_core::{Column, ColumnType, CreateOutcome, Entity, Filter, Schema, SelectOptions, SqLab};
//!
//! #[derive(Debug, PartialEq)]
//! struct Tag {
//!     name: String,
//! }
//!
//! impl Entity for Tag {
//!     const TABLE: &'static str = "tags";
//!     const COLUMNS: &'static [Column] = &[Column::new("name", ColumnType::Text).primary_key()];
//!
//!     fn to_values(&self) -> Vec<Value> {
//!         vec![Value::Text(self.name.clone())]
//!     }
//!
//!     fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
//!         Ok(Self { name: row.get("name")? })
//!     }
//! }
//!
//! let lab = SqLab::connect("sqlite::memory:", Schema::new().with::<Tag>()).unwrap();
//! let tag = Tag { name: "rust".to_string() };
//! assert!(lab.create(&tag).unwrap().is_inserted());
//! assert_eq!(lab.create(&tag).unwrap(), CreateOutcome::AlreadyExists);
//!
//! let found: Vec<Tag> = lab
//!     .select(&SelectOptions::new().filter(Filter::eq("name", "rust".to_string())))
//!     .unwrap();
//! assert_eq!(found, vec![tag]);
//! ```

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use config::{ConfigError, LabConfig};
pub use db::{ConnectionSettings, DbError, DbLocation, DbResult, Schema, SchemaError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::entity::{Column, ColumnType, Entity, TableDef};
pub use model::record::Record;
pub use query::assign::Assignments;
pub use query::filter::Filter;
pub use query::order::Order;
pub use query::select::SelectOptions;
pub use query::{QueryError, QueryResult};
pub use repo::entity_repo::{EntityRepository, RepoError, RepoResult, SqliteEntityRepository};
pub use service::lab::{CreateOutcome, LabError, LabResult, SqLab};
pub use service::live_query::Query;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
