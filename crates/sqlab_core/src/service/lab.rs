//! Data-access facade over one SQLite connection.
//!
//! # Responsibility
//! - Provide connect/select/create/update/delete entry points for any entity.
//! - Own transaction boundaries for writes.
//! - Emit one structured log event per operation, including failures.
//!
//! # Invariants
//! - Every write runs in its own transaction and is rolled back on error.
//! - `create` checks and inserts under one `IMMEDIATE` transaction, and treats
//!   a unique/primary-key violation from the insert as "already exists".
//! - A missing filter on `update`/`delete` targets every row of the table;
//!   this is logged at `warn`.
//! - Bound values never appear in log lines.

use crate::config::LabConfig;
use crate::db::{open_location, DbError, DbLocation, Schema, SchemaError};
use crate::model::entity::Entity;
use crate::model::record::Record;
use crate::query::assign::Assignments;
use crate::query::filter::Filter;
use crate::query::select::SelectOptions;
use crate::query::QueryError;
use crate::repo::entity_repo::{EntityRepository, RepoError, SqliteEntityRepository};
use crate::service::live_query::Query;
use log::{error, info, log, warn, Level};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type LabResult<T> = Result<T, LabError>;

/// Error returned by every facade operation.
#[derive(Debug)]
pub enum LabError {
    Db(DbError),
    Schema(SchemaError),
    Query(QueryError),
    /// A write was rejected by a table constraint.
    Constraint(String),
    InvalidData(String),
}

impl Display for LabError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Schema(err) => write!(f, "{err}"),
            Self::Query(err) => write!(f, "{err}"),
            Self::Constraint(message) => write!(f, "{message}"),
            Self::InvalidData(message) => write!(f, "{message}"),
        }
    }
}

impl Error for LabError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Schema(err) => Some(err),
            Self::Query(err) => Some(err),
            Self::Constraint(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for LabError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Schema(err) => Self::Schema(err),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for LabError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<RepoError> for LabError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Schema(err) => Self::Schema(err),
            RepoError::Query(err) => Self::Query(err),
            RepoError::Db(err) => Self::from(err),
            err @ (RepoError::UniqueViolation { .. } | RepoError::Constraint { .. }) => {
                Self::Constraint(err.to_string())
            }
            RepoError::InvalidData(message) => Self::InvalidData(message),
        }
    }
}

/// Result of `SqLab::create`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Inserted { rowid: i64 },
    /// A row with one of the instance's primary/unique values already exists;
    /// nothing was written.
    AlreadyExists,
}

impl CreateOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted { .. })
    }
}

/// CRUD facade bound to one connection.
///
/// Independent handles can coexist; each owns its connection, and the
/// connection closes when the handle is dropped. The handle is `Send` but
/// not `Sync`: share it across threads only behind the caller's own lock.
pub struct SqLab {
    conn: Connection,
    location: DbLocation,
    schema: Schema,
}

impl SqLab {
    /// Opens `location` with default settings and creates missing tables.
    ///
    /// ```
    /// use sqlab_core::{Schema, SqLab};
    ///
    /// let lab = SqLab::connect("sqlite::memory:", Schema::new()).unwrap();
    /// assert_eq!(lab.location().mode(), "memory");
    /// ```
    pub fn connect(location: &str, schema: Schema) -> LabResult<Self> {
        Self::connect_with_config(&LabConfig::for_url(location), schema)
    }

    pub fn connect_with_config(config: &LabConfig, schema: Schema) -> LabResult<Self> {
        let location = config.location()?;
        let conn = open_location(&location, &config.connection_settings(), &schema)?;
        Ok(Self {
            conn,
            location,
            schema,
        })
    }

    pub fn location(&self) -> &DbLocation {
        &self.location
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Raw connection for statements outside the facade vocabulary.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Starts a live query over `E` that can later be read, updated or deleted.
    pub fn query<E: Entity>(&self) -> Query<'_, E> {
        Query::new(self)
    }

    /// Reads entities matching `options`, fully materialized and ordered.
    pub fn select<E: Entity>(&self, options: &SelectOptions) -> LabResult<Vec<E>> {
        let started_at = Instant::now();
        let result = self.repo().select::<E>(options).map_err(LabError::from);
        finish(Level::Debug, "select", E::TABLE, started_at, result, |rows| {
            rows.len() as u64
        })
    }

    /// Reads a column projection of `E` matching `options`.
    pub fn select_columns<E: Entity>(
        &self,
        columns: &[&str],
        options: &SelectOptions,
    ) -> LabResult<Vec<Record>> {
        let started_at = Instant::now();
        let result = self
            .repo()
            .select_records(&E::table(), columns, options)
            .map_err(LabError::from);
        finish(Level::Debug, "select", E::TABLE, started_at, result, |rows| {
            rows.len() as u64
        })
    }

    /// Counts rows of `E` matching `filter`.
    pub fn count<E: Entity>(&self, filter: Option<&Filter>) -> LabResult<u64> {
        let options = SelectOptions {
            filter: filter.cloned(),
            ..SelectOptions::default()
        };
        self.count_window::<E>(&options)
    }

    pub(crate) fn count_window<E: Entity>(&self, options: &SelectOptions) -> LabResult<u64> {
        let started_at = Instant::now();
        let result = self
            .repo()
            .count(&E::table(), options)
            .map_err(LabError::from);
        finish(Level::Debug, "count", E::TABLE, started_at, result, |count| {
            *count
        })
    }

    /// Inserts `instance` unless a row shares one of its primary/unique values.
    pub fn create<E: Entity>(&self, instance: &E) -> LabResult<CreateOutcome> {
        let started_at = Instant::now();
        let result = self.in_transaction(TransactionBehavior::Immediate, |repo| {
            create_one(repo, instance)
        });
        if let Ok(CreateOutcome::AlreadyExists) = result {
            info!(
                "event=create module=lab status=skipped reason=duplicate table={}",
                E::TABLE
            );
        }
        finish(Level::Info, "create", E::TABLE, started_at, result, |outcome| {
            u64::from(outcome.is_inserted())
        })
    }

    /// Creates a batch in one transaction; any hard failure rolls back the batch.
    pub fn create_many<E: Entity>(&self, instances: &[E]) -> LabResult<Vec<CreateOutcome>> {
        let started_at = Instant::now();
        let result = self.in_transaction(TransactionBehavior::Immediate, |repo| {
            instances
                .iter()
                .map(|instance| create_one(repo, instance))
                .collect::<LabResult<Vec<_>>>()
        });
        finish(Level::Info, "create", E::TABLE, started_at, result, |outcomes| {
            outcomes.iter().filter(|outcome| outcome.is_inserted()).count() as u64
        })
    }

    /// Applies `assignments` to every row of `E` matching `filter`.
    ///
    /// `filter = None` updates the whole table. Returns the affected row count;
    /// zero matches is not an error.
    pub fn update<E: Entity>(
        &self,
        assignments: &Assignments,
        filter: Option<&Filter>,
    ) -> LabResult<usize> {
        let started_at = Instant::now();
        warn_if_unfiltered("update", E::TABLE, filter);
        let table = E::table();
        let result = self.in_transaction(TransactionBehavior::Deferred, |repo| {
            repo.update(&table, assignments, filter)
                .map_err(LabError::from)
        });
        finish(Level::Info, "update", E::TABLE, started_at, result, |rows| {
            *rows as u64
        })
    }

    /// Deletes every row of `E` matching `filter`.
    ///
    /// `filter = None` empties the table. Returns the removed row count.
    pub fn delete<E: Entity>(&self, filter: Option<&Filter>) -> LabResult<usize> {
        let started_at = Instant::now();
        warn_if_unfiltered("delete", E::TABLE, filter);
        let table = E::table();
        let result = self.in_transaction(TransactionBehavior::Deferred, |repo| {
            repo.delete(&table, filter).map_err(LabError::from)
        });
        finish(Level::Info, "delete", E::TABLE, started_at, result, |rows| {
            *rows as u64
        })
    }

    fn repo(&self) -> SqliteEntityRepository<'_> {
        SqliteEntityRepository::new(&self.conn)
    }

    fn in_transaction<T>(
        &self,
        behavior: TransactionBehavior,
        work: impl FnOnce(&SqliteEntityRepository<'_>) -> LabResult<T>,
    ) -> LabResult<T> {
        let tx = Transaction::new_unchecked(&self.conn, behavior)?;
        // Dropping `tx` on the error path rolls back.
        let value = work(&SqliteEntityRepository::new(&tx))?;
        tx.commit()?;
        Ok(value)
    }
}

fn create_one<E: Entity>(
    repo: &SqliteEntityRepository<'_>,
    instance: &E,
) -> LabResult<CreateOutcome> {
    if repo.count_conflicts(instance)? > 0 {
        return Ok(CreateOutcome::AlreadyExists);
    }

    match repo.insert(instance) {
        Ok(rowid) => Ok(CreateOutcome::Inserted { rowid }),
        // Another connection won the race between our check and insert.
        Err(RepoError::UniqueViolation { .. }) => Ok(CreateOutcome::AlreadyExists),
        Err(err) => Err(err.into()),
    }
}

fn warn_if_unfiltered(event: &str, table: &str, filter: Option<&Filter>) {
    if filter.is_none() {
        warn!("event={event} module=lab status=unfiltered scope=all_rows table={table}");
    }
}

fn finish<T>(
    level: Level,
    event: &str,
    table: &str,
    started_at: Instant,
    result: LabResult<T>,
    rows: impl FnOnce(&T) -> u64,
) -> LabResult<T> {
    let duration_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(value) => log!(
            level,
            "event={event} module=lab status=ok table={table} rows={} duration_ms={duration_ms}",
            rows(value)
        ),
        Err(err) => error!(
            "event={event} module=lab status=error table={table} duration_ms={duration_ms} error={err}"
        ),
    }
    result
}
