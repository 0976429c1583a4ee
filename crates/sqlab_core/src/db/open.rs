//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas from `ConnectionSettings`.
//! - Create registered entity tables before returning a usable connection.
//!
//! # Invariants
//! - A connection is only returned after bootstrap fully succeeded.

use super::location::DbLocation;
use super::schema::{create_all, Schema};
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Per-connection tunables applied right after open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub busy_timeout: Duration,
    pub foreign_keys: bool,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
            foreign_keys: true,
        }
    }
}

/// Opens a SQLite database file with default settings and creates missing tables.
pub fn open_db(path: impl AsRef<Path>, schema: &Schema) -> DbResult<Connection> {
    open_location(
        &DbLocation::File(path.as_ref().to_path_buf()),
        &ConnectionSettings::default(),
        schema,
    )
}

/// Opens a private in-memory database with default settings.
pub fn open_db_in_memory(schema: &Schema) -> DbResult<Connection> {
    open_location(&DbLocation::Memory, &ConnectionSettings::default(), schema)
}

/// Opens `location`, applies `settings` and creates the tables of `schema`.
///
/// # Side effects
/// - Creates the database file when it does not exist.
/// - Emits `db_open` logging events with duration and status.
pub fn open_location(
    location: &DbLocation,
    settings: &ConnectionSettings,
    schema: &Schema,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = location.mode();
    info!("event=db_open module=db status=start mode={mode}");

    let opened = match location {
        DbLocation::Memory => Connection::open_in_memory(),
        DbLocation::File(path) => Connection::open(path),
    };
    let mut conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn, settings, schema) {
        Ok(tables_created) => {
            info!(
                "event=db_open module=db status=ok mode={mode} tables={} tables_created={} duration_ms={}",
                schema.tables().len(),
                tables_created,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(
    conn: &mut Connection,
    settings: &ConnectionSettings,
    schema: &Schema,
) -> DbResult<usize> {
    let foreign_keys = if settings.foreign_keys { "ON" } else { "OFF" };
    conn.execute_batch(&format!("PRAGMA foreign_keys = {foreign_keys};"))?;
    conn.busy_timeout(settings.busy_timeout)?;
    create_all(conn, schema)
}
