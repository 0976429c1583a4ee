//! Column assignments for bulk updates.

use super::{column_ref, QueryError, QueryResult};
use crate::model::entity::TableDef;
use rusqlite::types::Value;
use std::collections::HashSet;

/// Ordered `column = value` pairs applied by an update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignments {
    entries: Vec<(String, Value)>,
}

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push((column.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|(column, value)| (column.as_str(), value))
    }

    /// Renders the `SET` list and appends bound values in assignment order.
    pub(crate) fn render(&self, table: &TableDef, binds: &mut Vec<Value>) -> QueryResult<String> {
        if self.entries.is_empty() {
            return Err(QueryError::EmptyAssignments);
        }

        let mut seen = HashSet::new();
        let mut parts = Vec::with_capacity(self.entries.len());
        for (column, value) in &self.entries {
            let quoted = column_ref(table, column)?;
            if !seen.insert(column.as_str()) {
                return Err(QueryError::DuplicateAssignment {
                    table: table.name,
                    column: column.clone(),
                });
            }
            parts.push(format!("{quoted} = ?"));
            binds.push(value.clone());
        }
        Ok(parts.join(", "))
    }
}

impl<C: Into<String>, V: Into<Value>> FromIterator<(C, V)> for Assignments {
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(column, value)| (column.into(), value.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Assignments;
    use crate::model::entity::{Column, ColumnType, TableDef};
    use crate::query::QueryError;
    use rusqlite::types::Value;

    const USERS: TableDef = TableDef {
        name: "users",
        columns: &[
            Column::new("id", ColumnType::Integer).primary_key(),
            Column::new("name", ColumnType::Text),
        ],
    };

    #[test]
    fn renders_set_list_in_order() {
        let mut binds = Vec::new();
        let sql = Assignments::new()
            .set("name", "Zed".to_string())
            .set("id", 9_i64)
            .render(&USERS, &mut binds)
            .unwrap();
        assert_eq!(sql, "\"name\" = ?, \"id\" = ?");
        assert_eq!(
            binds,
            vec![Value::Text("Zed".to_string()), Value::Integer(9)]
        );
    }

    #[test]
    fn empty_and_duplicate_assignments_are_errors() {
        let mut binds = Vec::new();
        assert_eq!(
            Assignments::new().render(&USERS, &mut binds),
            Err(QueryError::EmptyAssignments)
        );

        let twice: Assignments = [("name", "a".to_string()), ("name", "b".to_string())]
            .into_iter()
            .collect();
        assert!(matches!(
            twice.render(&USERS, &mut binds),
            Err(QueryError::DuplicateAssignment { .. })
        ));
    }
}
