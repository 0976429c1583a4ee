//! Entity table registry and `CREATE TABLE` rendering.
//!
//! # Responsibility
//! - Collect the tables an application wants present at connect time.
//! - Validate entity metadata before any SQL is rendered from it.
//! - Create missing tables; leave existing ones untouched.
//!
//! # Invariants
//! - Every identifier reaching SQL text matches `IDENTIFIER_PATTERN` and is
//!   double-quoted.
//! - A registered table has at least one primary or unique column.
//! - Table creation for one schema happens in a single transaction.

use crate::db::{DbError, DbResult};
use crate::model::entity::{Entity, TableDef};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(IDENTIFIER_PATTERN).expect("valid identifier regex"));

pub type SchemaResult<T> = Result<T, SchemaError>;

/// Invalid entity metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    InvalidIdentifier {
        table: String,
        identifier: String,
    },
    NoColumns(&'static str),
    DuplicateColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Entity declares neither a primary key nor a unique column.
    NoIdentityColumn(&'static str),
    /// Two registered entities claim one table name with different columns.
    ConflictingTable(&'static str),
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentifier { table, identifier } => write!(
                f,
                "invalid identifier `{identifier}` in table `{table}`; expected {IDENTIFIER_PATTERN}"
            ),
            Self::NoColumns(table) => write!(f, "table `{table}` declares no columns"),
            Self::DuplicateColumn { table, column } => {
                write!(f, "table `{table}` declares column `{column}` twice")
            }
            Self::NoIdentityColumn(table) => write!(
                f,
                "table `{table}` needs at least one primary key or unique column"
            ),
            Self::ConflictingTable(table) => {
                write!(f, "table `{table}` is registered with conflicting columns")
            }
        }
    }
}

impl Error for SchemaError {}

/// Returns whether `name` can be used as a table or column identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name)
}

pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{name}\"")
}

/// Checks one table definition.
pub fn validate_table(table: &TableDef) -> SchemaResult<()> {
    if !is_valid_identifier(table.name) {
        return Err(SchemaError::InvalidIdentifier {
            table: table.name.to_string(),
            identifier: table.name.to_string(),
        });
    }
    if table.columns.is_empty() {
        return Err(SchemaError::NoColumns(table.name));
    }

    let mut seen = HashSet::new();
    for column in table.columns {
        if !is_valid_identifier(column.name) {
            return Err(SchemaError::InvalidIdentifier {
                table: table.name.to_string(),
                identifier: column.name.to_string(),
            });
        }
        if !seen.insert(column.name) {
            return Err(SchemaError::DuplicateColumn {
                table: table.name,
                column: column.name,
            });
        }
    }

    if !table.has_identity() {
        return Err(SchemaError::NoIdentityColumn(table.name));
    }

    Ok(())
}

/// Ordered set of entity tables to create at connect time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    tables: Vec<TableDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity. Registering the same entity twice is a no-op.
    pub fn with<E: Entity>(mut self) -> Self {
        self.add_table(E::table());
        self
    }

    pub fn add_table(&mut self, table: TableDef) {
        if !self.tables.contains(&table) {
            self.tables.push(table);
        }
    }

    pub fn tables(&self) -> &[TableDef] {
        &self.tables
    }

    pub fn contains(&self, table_name: &str) -> bool {
        self.tables.iter().any(|table| table.name == table_name)
    }

    pub fn validate(&self) -> SchemaResult<()> {
        let mut names = HashSet::new();
        for table in &self.tables {
            validate_table(table)?;
            if !names.insert(table.name) {
                return Err(SchemaError::ConflictingTable(table.name));
            }
        }
        Ok(())
    }
}

/// Renders `CREATE TABLE IF NOT EXISTS` for a validated table.
///
/// Primary key columns become one table-level `PRIMARY KEY (...)` so composite
/// keys work; unique columns get column-level `UNIQUE`.
pub fn create_table_sql(table: &TableDef) -> String {
    let mut lines: Vec<String> = table
        .columns
        .iter()
        .map(|column| {
            let mut line = format!(
                "    {} {}",
                quote_ident(column.name),
                column.kind.sql_type()
            );
            if !column.nullable {
                line.push_str(" NOT NULL");
            }
            if column.unique {
                line.push_str(" UNIQUE");
            }
            line
        })
        .collect();

    let key_columns: Vec<String> = table
        .columns
        .iter()
        .filter(|column| column.primary_key)
        .map(|column| quote_ident(column.name))
        .collect();
    if !key_columns.is_empty() {
        lines.push(format!("    PRIMARY KEY ({})", key_columns.join(", ")));
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
        quote_ident(table.name),
        lines.join(",\n")
    )
}

/// Creates every missing table of `schema` and returns how many were new.
pub fn create_all(conn: &mut Connection, schema: &Schema) -> DbResult<usize> {
    schema.validate().map_err(DbError::Schema)?;

    let tx = conn.transaction()?;
    let mut created = 0;
    for table in schema.tables() {
        if table_exists(&tx, table.name)? {
            debug!(
                "event=schema_sync module=db status=skip table={}",
                table.name
            );
            continue;
        }
        tx.execute_batch(&create_table_sql(table))?;
        debug!(
            "event=schema_sync module=db status=created table={} columns={}",
            table.name,
            table.columns.len()
        );
        created += 1;
    }
    tx.commit()?;

    Ok(created)
}

fn table_exists(conn: &Connection, table_name: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table_name],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

#[cfg(test)]
mod tests {
    use super::{
        create_all, create_table_sql, is_valid_identifier, validate_table, Schema, SchemaError,
    };
    use crate::model::entity::{Column, ColumnType, TableDef};
    use rusqlite::Connection;

    const MEMBERSHIP: TableDef = TableDef {
        name: "memberships",
        columns: &[
            Column::new("group_id", ColumnType::Integer).primary_key(),
            Column::new("user_id", ColumnType::Integer).primary_key(),
            Column::new("badge", ColumnType::Text).unique().nullable(),
        ],
    };

    #[test]
    fn identifiers_reject_quotes_and_spaces() {
        assert!(is_valid_identifier("users"));
        assert!(is_valid_identifier("_private2"));
        assert!(!is_valid_identifier("2fast"));
        assert!(!is_valid_identifier("name\"; DROP TABLE users; --"));
        assert!(!is_valid_identifier("first name"));
        assert!(!is_valid_identifier(""));
    }

    #[test]
    fn composite_primary_key_renders_as_table_constraint() {
        let sql = create_table_sql(&MEMBERSHIP);
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"memberships\""));
        assert!(sql.contains("\"group_id\" INTEGER NOT NULL"));
        assert!(sql.contains("\"badge\" TEXT UNIQUE"));
        assert!(!sql.contains("\"badge\" TEXT NOT NULL"));
        assert!(sql.contains("PRIMARY KEY (\"group_id\", \"user_id\")"));
    }

    #[test]
    fn validate_table_rejects_missing_identity() {
        const LOGS: TableDef = TableDef {
            name: "logs",
            columns: &[Column::new("line", ColumnType::Text)],
        };
        assert_eq!(
            validate_table(&LOGS),
            Err(SchemaError::NoIdentityColumn("logs"))
        );
    }

    #[test]
    fn validate_table_rejects_duplicate_columns() {
        const DUPES: TableDef = TableDef {
            name: "dupes",
            columns: &[
                Column::new("id", ColumnType::Integer).primary_key(),
                Column::new("id", ColumnType::Text),
            ],
        };
        assert_eq!(
            validate_table(&DUPES),
            Err(SchemaError::DuplicateColumn {
                table: "dupes",
                column: "id"
            })
        );
    }

    #[test]
    fn conflicting_registrations_are_rejected() {
        let mut schema = Schema::new();
        schema.add_table(MEMBERSHIP);
        schema.add_table(MEMBERSHIP);
        assert_eq!(schema.tables().len(), 1);

        const OTHER_MEMBERSHIPS: TableDef = TableDef {
            name: "memberships",
            columns: &[Column::new("id", ColumnType::Integer).primary_key()],
        };
        schema.add_table(OTHER_MEMBERSHIPS);
        assert_eq!(
            schema.validate(),
            Err(SchemaError::ConflictingTable("memberships"))
        );
    }

    #[test]
    fn create_all_is_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        let mut schema = Schema::new();
        schema.add_table(MEMBERSHIP);

        assert_eq!(create_all(&mut conn, &schema).unwrap(), 1);
        assert_eq!(create_all(&mut conn, &schema).unwrap(), 0);

        conn.execute(
            "INSERT INTO memberships (group_id, user_id, badge) VALUES (1, 1, NULL);",
            [],
        )
        .unwrap();
        let duplicate = conn.execute(
            "INSERT INTO memberships (group_id, user_id, badge) VALUES (1, 1, 'x');",
            [],
        );
        assert!(duplicate.is_err());
    }
}
