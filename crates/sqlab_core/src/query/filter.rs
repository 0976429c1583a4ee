//! Predicate expressions.

use super::{column_ref, QueryResult};
use crate::model::entity::TableDef;
use rusqlite::types::Value;

/// Filter expression over one entity's columns.
///
/// `And(vec![])` matches every row and `Or(vec![])` matches none, so folding
/// over an empty list behaves like the neutral element of each connective.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    Ne(String, Value),
    Lt(String, Value),
    Le(String, Value),
    Gt(String, Value),
    Ge(String, Value),
    /// Inclusive range.
    Between(String, Value, Value),
    In(String, Vec<Value>),
    IsNull(String),
    IsNotNull(String),
    /// SQL `LIKE` pattern (`%`, `_`).
    Like(String, String),
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(column.into(), value.into())
    }

    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Ne(column.into(), value.into())
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lt(column.into(), value.into())
    }

    pub fn le(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Le(column.into(), value.into())
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Gt(column.into(), value.into())
    }

    pub fn ge(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Ge(column.into(), value.into())
    }

    pub fn between(
        column: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self::Between(column.into(), low.into(), high.into())
    }

    pub fn is_in<V: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::In(column.into(), values.into_iter().map(Into::into).collect())
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self::IsNull(column.into())
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::IsNotNull(column.into())
    }

    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Like(column.into(), pattern.into())
    }

    /// Conjunction; `And`s on either side are flattened.
    pub fn and(self, other: Filter) -> Self {
        let mut parts = match self {
            Self::And(parts) => parts,
            first => vec![first],
        };
        match other {
            Self::And(rest) => parts.extend(rest),
            second => parts.push(second),
        }
        Self::And(parts)
    }

    /// Disjunction; `Or`s on either side are flattened.
    pub fn or(self, other: Filter) -> Self {
        let mut parts = match self {
            Self::Or(parts) => parts,
            first => vec![first],
        };
        match other {
            Self::Or(rest) => parts.extend(rest),
            second => parts.push(second),
        }
        Self::Or(parts)
    }

    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Renders a SQL boolean expression and appends its bound values to `binds`.
    pub(crate) fn render(&self, table: &TableDef, binds: &mut Vec<Value>) -> QueryResult<String> {
        let sql = match self {
            Self::Eq(column, Value::Null) => format!("{} IS NULL", column_ref(table, column)?),
            Self::Ne(column, Value::Null) => {
                format!("{} IS NOT NULL", column_ref(table, column)?)
            }
            Self::Eq(column, value) => compare(table, column, "=", value, binds)?,
            Self::Ne(column, value) => compare(table, column, "<>", value, binds)?,
            Self::Lt(column, value) => compare(table, column, "<", value, binds)?,
            Self::Le(column, value) => compare(table, column, "<=", value, binds)?,
            Self::Gt(column, value) => compare(table, column, ">", value, binds)?,
            Self::Ge(column, value) => compare(table, column, ">=", value, binds)?,
            Self::Between(column, low, high) => {
                let column = column_ref(table, column)?;
                binds.push(low.clone());
                binds.push(high.clone());
                format!("{column} BETWEEN ? AND ?")
            }
            Self::In(column, values) => {
                let column = column_ref(table, column)?;
                if values.is_empty() {
                    "0 = 1".to_string()
                } else {
                    binds.extend(values.iter().cloned());
                    let placeholders = vec!["?"; values.len()].join(", ");
                    format!("{column} IN ({placeholders})")
                }
            }
            Self::IsNull(column) => format!("{} IS NULL", column_ref(table, column)?),
            Self::IsNotNull(column) => format!("{} IS NOT NULL", column_ref(table, column)?),
            Self::Like(column, pattern) => {
                let column = column_ref(table, column)?;
                binds.push(Value::Text(pattern.clone()));
                format!("{column} LIKE ?")
            }
            Self::And(parts) => join(table, parts, " AND ", "1 = 1", binds)?,
            Self::Or(parts) => join(table, parts, " OR ", "0 = 1", binds)?,
            Self::Not(inner) => format!("NOT {}", inner.render(table, binds)?),
        };
        Ok(format!("({sql})"))
    }
}

fn compare(
    table: &TableDef,
    column: &str,
    operator: &str,
    value: &Value,
    binds: &mut Vec<Value>,
) -> QueryResult<String> {
    let column = column_ref(table, column)?;
    binds.push(value.clone());
    Ok(format!("{column} {operator} ?"))
}

fn join(
    table: &TableDef,
    parts: &[Filter],
    separator: &str,
    empty: &str,
    binds: &mut Vec<Value>,
) -> QueryResult<String> {
    if parts.is_empty() {
        return Ok(empty.to_string());
    }
    let rendered = parts
        .iter()
        .map(|part| part.render(table, binds))
        .collect::<QueryResult<Vec<_>>>()?;
    Ok(rendered.join(separator))
}
