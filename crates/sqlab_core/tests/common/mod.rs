#![allow(dead_code)]

use rusqlite::types::Value;
use rusqlite::Row;
use sqlab_core::{Column, ColumnType, Entity, Schema, SqLab};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
}

impl User {
    pub fn new(id: i64, email: &str, name: &str) -> Self {
        Self {
            id,
            email: email.to_string(),
            name: name.to_string(),
        }
    }
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [Column] = &[
        Column::new("id", ColumnType::Integer).primary_key(),
        Column::new("email", ColumnType::Text).unique(),
        Column::new("name", ColumnType::Text),
    ];

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.id),
            Value::Text(self.email.clone()),
            Value::Text(self.name.clone()),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            email: row.get("email")?,
            name: row.get("name")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub sku: String,
    pub title: String,
    pub price: f64,
    pub barcode: Option<String>,
}

impl Product {
    pub fn new(sku: &str, title: &str, price: f64, barcode: Option<&str>) -> Self {
        Self {
            sku: sku.to_string(),
            title: title.to_string(),
            price,
            barcode: barcode.map(str::to_string),
        }
    }
}

impl Entity for Product {
    const TABLE: &'static str = "products";
    const COLUMNS: &'static [Column] = &[
        Column::new("sku", ColumnType::Text).primary_key(),
        Column::new("title", ColumnType::Text),
        Column::new("price", ColumnType::Real),
        Column::new("barcode", ColumnType::Text).unique().nullable(),
    ];

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.sku.clone()),
            Value::Text(self.title.clone()),
            Value::Real(self.price),
            match &self.barcode {
                Some(code) => Value::Text(code.clone()),
                None => Value::Null,
            },
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            sku: row.get("sku")?,
            title: row.get("title")?,
            price: row.get("price")?,
            barcode: row.get("barcode")?,
        })
    }
}

pub fn schema() -> Schema {
    Schema::new().with::<User>().with::<Product>()
}

pub fn memory_lab() -> SqLab {
    SqLab::connect("sqlite::memory:", schema()).unwrap()
}

pub fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

pub fn seed_users(lab: &SqLab, users: &[User]) {
    for user in users {
        assert!(lab.create(user).unwrap().is_inserted(), "seed {user:?}");
    }
}
