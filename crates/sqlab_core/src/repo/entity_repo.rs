//! Generic entity repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD primitives for any `Entity` over a borrowed connection.
//! - Classify SQLite constraint failures into semantic errors.
//!
//! # Invariants
//! - Repository calls never open or commit transactions; callers own the
//!   transaction boundary.
//! - Repository calls never log; the facade does.
//! - Entity metadata is validated before SQL is rendered from it.

use crate::db::schema::{validate_table, SchemaError};
use crate::db::DbError;
use crate::model::entity::{Entity, TableDef};
use crate::model::record::Record;
use crate::query::assign::Assignments;
use crate::query::filter::Filter;
use crate::query::select::SelectOptions;
use crate::query::sql::{
    render_count, render_delete, render_insert, render_select, render_update, Statement,
};
use crate::query::QueryError;
use rusqlite::ffi;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for entity persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Schema(SchemaError),
    Query(QueryError),
    Db(DbError),
    /// A primary key or unique constraint rejected the write.
    UniqueViolation {
        table: &'static str,
        message: String,
    },
    /// Any other constraint (`NOT NULL`, `CHECK`, foreign key) rejected the write.
    Constraint {
        table: &'static str,
        message: String,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schema(err) => write!(f, "{err}"),
            Self::Query(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UniqueViolation { table, message } => {
                write!(f, "unique constraint violated on `{table}`: {message}")
            }
            Self::Constraint { table, message } => {
                write!(f, "constraint violated on `{table}`: {message}")
            }
            Self::InvalidData(message) => write!(f, "invalid entity data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Schema(err) => Some(err),
            Self::Query(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::UniqueViolation { .. } | Self::Constraint { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<SchemaError> for RepoError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

impl From<QueryError> for RepoError {
    fn from(value: QueryError) -> Self {
        Self::Query(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for entity CRUD primitives.
pub trait EntityRepository {
    /// Inserts one entity and returns its rowid.
    fn insert<E: Entity>(&self, entity: &E) -> RepoResult<i64>;
    /// Counts stored rows matching any of `entity`'s primary/unique values, NULL included.
    fn count_conflicts<E: Entity>(&self, entity: &E) -> RepoResult<u64>;
    fn select<E: Entity>(&self, options: &SelectOptions) -> RepoResult<Vec<E>>;
    fn select_records(
        &self,
        table: &TableDef,
        columns: &[&str],
        options: &SelectOptions,
    ) -> RepoResult<Vec<Record>>;
    fn count(&self, table: &TableDef, options: &SelectOptions) -> RepoResult<u64>;
    /// Returns the number of rows changed.
    fn update(
        &self,
        table: &TableDef,
        assignments: &Assignments,
        filter: Option<&Filter>,
    ) -> RepoResult<usize>;
    /// Returns the number of rows removed.
    fn delete(&self, table: &TableDef, filter: Option<&Filter>) -> RepoResult<usize>;
}

/// SQLite-backed entity repository.
///
/// Accepts a plain connection or a `Transaction` (through deref).
pub struct SqliteEntityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntityRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EntityRepository for SqliteEntityRepository<'_> {
    fn insert<E: Entity>(&self, entity: &E) -> RepoResult<i64> {
        let table = E::table();
        validate_table(&table)?;
        let values = entity_values(&table, entity)?;

        self.conn
            .execute(&render_insert(&table), params_from_iter(values))
            .map_err(|err| classify_write_error(table.name, err))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn count_conflicts<E: Entity>(&self, entity: &E) -> RepoResult<u64> {
        let table = E::table();
        validate_table(&table)?;
        let values = entity_values(&table, entity)?;

        let probes = conflict_probes(&table, &values);
        if probes.is_empty() {
            return Ok(0);
        }

        self.count(&table, &SelectOptions::new().filter(Filter::Or(probes)))
    }

    fn select<E: Entity>(&self, options: &SelectOptions) -> RepoResult<Vec<E>> {
        let table = E::table();
        validate_table(&table)?;
        let statement = render_select(&table, &table.column_names(), options)?;

        let mut stmt = self.conn.prepare(&statement.sql)?;
        let mut rows = stmt.query(params_from_iter(statement.binds))?;
        let mut entities = Vec::new();
        while let Some(row) = rows.next()? {
            let entity = E::from_row(row).map_err(|err| {
                RepoError::InvalidData(format!("cannot map row of `{}`: {err}", table.name))
            })?;
            entities.push(entity);
        }

        Ok(entities)
    }

    fn select_records(
        &self,
        table: &TableDef,
        columns: &[&str],
        options: &SelectOptions,
    ) -> RepoResult<Vec<Record>> {
        validate_table(table)?;
        let statement = render_select(table, columns, options)?;
        let names: Vec<String> = columns.iter().map(|column| column.to_string()).collect();

        let mut stmt = self.conn.prepare(&statement.sql)?;
        let mut rows = stmt.query(params_from_iter(statement.binds))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let values = (0..names.len())
                .map(|index| row.get::<_, Value>(index))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            records.push(Record::new(names.clone(), values));
        }

        Ok(records)
    }

    fn count(&self, table: &TableDef, options: &SelectOptions) -> RepoResult<u64> {
        validate_table(table)?;
        let Statement { sql, binds } = render_count(table, options)?;
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(binds), |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {count}")))
    }

    fn update(
        &self,
        table: &TableDef,
        assignments: &Assignments,
        filter: Option<&Filter>,
    ) -> RepoResult<usize> {
        validate_table(table)?;
        let Statement { sql, binds } = render_update(table, assignments, filter)?;
        self.conn
            .execute(&sql, params_from_iter(binds))
            .map_err(|err| classify_write_error(table.name, err))
    }

    fn delete(&self, table: &TableDef, filter: Option<&Filter>) -> RepoResult<usize> {
        validate_table(table)?;
        let Statement { sql, binds } = render_delete(table, filter)?;
        self.conn
            .execute(&sql, params_from_iter(binds))
            .map_err(|err| classify_write_error(table.name, err))
    }
}

fn entity_values<E: Entity>(table: &TableDef, entity: &E) -> RepoResult<Vec<Value>> {
    let values = entity.to_values();
    if values.len() != table.columns.len() {
        return Err(RepoError::InvalidData(format!(
            "`{}` produced {} values for {} columns",
            table.name,
            values.len(),
            table.columns.len()
        )));
    }
    Ok(values)
}

/// One equality probe per primary/unique column, to be ORed together.
///
/// A NULL value probes with `IS NULL`, so a stored NULL counts as a match.
fn conflict_probes(table: &TableDef, values: &[Value]) -> Vec<Filter> {
    table
        .identity_columns()
        .map(|(index, column)| Filter::Eq(column.name.to_string(), values[index].clone()))
        .collect()
}

fn classify_write_error(table: &'static str, err: rusqlite::Error) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, message) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            let message = message.clone().unwrap_or_else(|| failure.to_string());
            return match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    RepoError::UniqueViolation { table, message }
                }
                _ => RepoError::Constraint { table, message },
            };
        }
    }
    RepoError::from(err)
}
