//! Ordering keys.

use super::{column_ref, QueryResult};
use crate::model::entity::TableDef;

/// One `ORDER BY` key. Lists of keys apply in listed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Order {
    Asc(String),
    Desc(String),
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self::Asc(column.into())
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self::Desc(column.into())
    }

    pub fn column(&self) -> &str {
        match self {
            Self::Asc(column) | Self::Desc(column) => column,
        }
    }

    pub(crate) fn render(&self, table: &TableDef) -> QueryResult<String> {
        let direction = match self {
            Self::Asc(_) => "ASC",
            Self::Desc(_) => "DESC",
        };
        Ok(format!("{} {direction}", column_ref(table, self.column())?))
    }
}

/// Renders a full `ORDER BY` clause ending in the rowid tie-break.
///
/// Rows that compare equal on every caller key keep insertion order.
pub(crate) fn render_order_by(table: &TableDef, keys: &[Order]) -> QueryResult<String> {
    let mut rendered = keys
        .iter()
        .map(|key| key.render(table))
        .collect::<QueryResult<Vec<_>>>()?;
    rendered.push("rowid ASC".to_string());
    Ok(format!(" ORDER BY {}", rendered.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::{render_order_by, Order};
    use crate::model::entity::{Column, ColumnType, TableDef};

    const ITEMS: TableDef = TableDef {
        name: "items",
        columns: &[
            Column::new("sku", ColumnType::Text).primary_key(),
            Column::new("price", ColumnType::Real),
        ],
    };

    #[test]
    fn keys_render_in_listed_order_with_rowid_tie_break() {
        let clause =
            render_order_by(&ITEMS, &[Order::desc("price"), Order::asc("sku")]).unwrap();
        assert_eq!(
            clause,
            " ORDER BY \"price\" DESC, \"sku\" ASC, rowid ASC"
        );
    }

    #[test]
    fn no_keys_still_orders_by_rowid() {
        assert_eq!(render_order_by(&ITEMS, &[]).unwrap(), " ORDER BY rowid ASC");
    }

    #[test]
    fn unknown_key_fails() {
        assert!(render_order_by(&ITEMS, &[Order::asc("weight")]).is_err());
    }
}
