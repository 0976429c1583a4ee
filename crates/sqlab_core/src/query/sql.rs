//! Statement rendering for the repository layer.

use super::assign::Assignments;
use super::filter::Filter;
use super::order::render_order_by;
use super::select::SelectOptions;
use super::{column_ref, QueryError, QueryResult};
use crate::db::schema::quote_ident;
use crate::model::entity::TableDef;
use rusqlite::types::Value;

/// SQL text plus positional bind values.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Statement {
    pub sql: String,
    pub binds: Vec<Value>,
}

pub(crate) fn render_insert(table: &TableDef) -> String {
    let columns: Vec<String> = table
        .columns
        .iter()
        .map(|column| quote_ident(column.name))
        .collect();
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({placeholders});",
        quote_ident(table.name),
        columns.join(", ")
    )
}

pub(crate) fn render_select(
    table: &TableDef,
    columns: &[&str],
    options: &SelectOptions,
) -> QueryResult<Statement> {
    if columns.is_empty() {
        return Err(QueryError::EmptyProjection);
    }
    let projection = columns
        .iter()
        .map(|column| column_ref(table, column))
        .collect::<QueryResult<Vec<_>>>()?;

    let mut binds = Vec::new();
    let mut sql = format!(
        "SELECT {} FROM {}",
        projection.join(", "),
        quote_ident(table.name)
    );
    sql.push_str(&render_where(table, options.filter.as_ref(), &mut binds)?);
    sql.push_str(&render_order_by(table, &options.order)?);
    push_window(&mut sql, &mut binds, options);

    Ok(Statement { sql, binds })
}

/// Counts rows inside the same window a select with `options` would return.
pub(crate) fn render_count(table: &TableDef, options: &SelectOptions) -> QueryResult<Statement> {
    let mut binds = Vec::new();
    let mut inner = format!("SELECT 1 FROM {}", quote_ident(table.name));
    inner.push_str(&render_where(table, options.filter.as_ref(), &mut binds)?);
    push_window(&mut inner, &mut binds, options);

    Ok(Statement {
        sql: format!("SELECT COUNT(*) FROM ({inner})"),
        binds,
    })
}

pub(crate) fn render_update(
    table: &TableDef,
    assignments: &Assignments,
    filter: Option<&Filter>,
) -> QueryResult<Statement> {
    let mut binds = Vec::new();
    let set_list = assignments.render(table, &mut binds)?;
    let mut sql = format!("UPDATE {} SET {set_list}", quote_ident(table.name));
    sql.push_str(&render_where(table, filter, &mut binds)?);
    Ok(Statement { sql, binds })
}

pub(crate) fn render_delete(table: &TableDef, filter: Option<&Filter>) -> QueryResult<Statement> {
    let mut binds = Vec::new();
    let mut sql = format!("DELETE FROM {}", quote_ident(table.name));
    sql.push_str(&render_where(table, filter, &mut binds)?);
    Ok(Statement { sql, binds })
}

fn render_where(
    table: &TableDef,
    filter: Option<&Filter>,
    binds: &mut Vec<Value>,
) -> QueryResult<String> {
    match filter {
        Some(filter) => Ok(format!(" WHERE {}", filter.render(table, binds)?)),
        None => Ok(String::new()),
    }
}

fn push_window(sql: &mut String, binds: &mut Vec<Value>, options: &SelectOptions) {
    if let Some(limit) = options.limit {
        sql.push_str(" LIMIT ?");
        binds.push(Value::Integer(i64::from(limit)));
        if options.offset > 0 {
            sql.push_str(" OFFSET ?");
            binds.push(Value::Integer(i64::from(options.offset)));
        }
    } else if options.offset > 0 {
        sql.push_str(" LIMIT -1 OFFSET ?");
        binds.push(Value::Integer(i64::from(options.offset)));
    }
}
