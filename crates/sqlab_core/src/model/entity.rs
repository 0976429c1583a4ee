//! Mapped entity contract and column metadata.
//!
//! # Responsibility
//! - Describe how an application record type maps onto one table.
//! - Carry the primary/unique flags consumed by create-time duplicate checks.
//!
//! # Invariants
//! - `Entity::to_values` yields exactly one value per entry in `COLUMNS`,
//!   in the same order.
//! - `Entity::from_row` reads a row selected with `COLUMNS` in declared order.
//! - Every usable entity declares at least one primary or unique column.

use rusqlite::types::Value;
use rusqlite::Row;

/// Storage class used when rendering `CREATE TABLE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Blob,
}

impl ColumnType {
    /// SQLite type name for DDL.
    pub fn sql_type(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
        }
    }
}

/// Static description of one entity field.
///
/// Built with `const` chaining so entity impls can keep their column list in a
/// `const` slice:
///
/// ```
/// use sqlab_core::{Column, ColumnType};
///
/// const COLUMNS: &[Column] = &[
///     Column::new("id", ColumnType::Integer).primary_key(),
///     Column::new("email", ColumnType::Text).unique(),
///     Column::new("nickname", ColumnType::Text).nullable(),
/// ];
/// assert!(COLUMNS[0].is_identity());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnType,
    pub primary_key: bool,
    pub unique: bool,
    pub nullable: bool,
}

impl Column {
    /// Creates a required, non-key column.
    pub const fn new(name: &'static str, kind: ColumnType) -> Self {
        Self {
            name,
            kind,
            primary_key: false,
            unique: false,
            nullable: false,
        }
    }

    /// Marks the column as (part of) the primary key.
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Adds a single-column `UNIQUE` constraint.
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Allows `NULL` values.
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Returns whether this column participates in duplicate detection.
    pub fn is_identity(&self) -> bool {
        self.primary_key || self.unique
    }
}

/// Table name plus ordered column list for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl TableDef {
    /// Looks up a declared column by exact name.
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Columns flagged primary key or unique, in declared order.
    pub fn identity_columns(&self) -> impl Iterator<Item = (usize, &'static Column)> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.is_identity())
    }

    pub fn has_identity(&self) -> bool {
        self.columns.iter().any(Column::is_identity)
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|column| column.name).collect()
    }
}

/// Application record type bound to a storage table.
///
/// Implementations are plain data mappers; they never talk to the database.
pub trait Entity: Sized {
    /// Table name. Must be a plain SQL identifier.
    const TABLE: &'static str;
    /// Ordered column list.
    const COLUMNS: &'static [Column];

    /// Values to bind for an insert, one per column in `COLUMNS` order.
    fn to_values(&self) -> Vec<Value>;

    /// Builds an instance from a row selected with all `COLUMNS`.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn table() -> TableDef {
        TableDef {
            name: Self::TABLE,
            columns: Self::COLUMNS,
        }
    }
}
