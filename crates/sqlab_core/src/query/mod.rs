//! Closed filter/ordering vocabulary and parameterized SQL rendering.
//!
//! # Responsibility
//! - Model predicates, orderings, projections and assignments as data.
//! - Render them into SQL text with `?` placeholders plus bound values.
//!
//! # Invariants
//! - Caller-supplied values only ever reach SQLite as bound parameters.
//! - Column names are resolved against the entity's declared columns before
//!   rendering; unknown names fail with `QueryError::UnknownColumn`.

use crate::db::schema::quote_ident;
use crate::model::entity::TableDef;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod assign;
pub mod filter;
pub mod order;
pub mod select;
pub(crate) mod sql;

pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    UnknownColumn {
        table: &'static str,
        column: String,
    },
    EmptyProjection,
    EmptyAssignments,
    DuplicateAssignment {
        table: &'static str,
        column: String,
    },
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownColumn { table, column } => {
                write!(f, "unknown column `{column}` for table `{table}`")
            }
            Self::EmptyProjection => write!(f, "column projection cannot be empty"),
            Self::EmptyAssignments => write!(f, "update requires at least one assignment"),
            Self::DuplicateAssignment { table, column } => {
                write!(f, "column `{column}` of table `{table}` is assigned twice")
            }
        }
    }
}

impl Error for QueryError {}

/// Resolves a declared column and returns its quoted identifier.
pub(crate) fn column_ref(table: &TableDef, name: &str) -> QueryResult<String> {
    table
        .column(name)
        .map(|column| quote_ident(column.name))
        .ok_or_else(|| QueryError::UnknownColumn {
            table: table.name,
            column: name.to_string(),
        })
}
