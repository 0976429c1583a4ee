mod common;

use common::{schema, text, Product, User};
use rusqlite::Connection;
use sqlab_core::db::{open_db, open_db_in_memory};
use sqlab_core::{
    CreateOutcome, DbError, EntityRepository, Filter, LabConfig, LabError, RepoError, Schema,
    SelectOptions, SqLab, SqliteEntityRepository,
};

fn table_exists(conn: &Connection, table_name: &str) -> bool {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    exists == 1
}

fn file_url(dir: &tempfile::TempDir, name: &str) -> String {
    format!("sqlite://{}", dir.path().join(name).display())
}

#[test]
fn open_in_memory_creates_registered_tables() {
    let conn = open_db_in_memory(&schema()).unwrap();

    assert!(table_exists(&conn, "users"));
    assert!(table_exists(&conn, "products"));
}

#[test]
fn empty_schema_opens_without_tables() {
    let conn = open_db_in_memory(&Schema::new()).unwrap();
    assert!(!table_exists(&conn, "users"));
}

#[test]
fn reopening_file_database_keeps_rows_and_tables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sqlab.db");

    let conn = open_db(&path, &schema()).unwrap();
    SqliteEntityRepository::new(&conn)
        .insert(&User::new(1, "a@x", "A"))
        .unwrap();
    drop(conn);

    let conn = open_db(&path, &schema()).unwrap();
    let users = SqliteEntityRepository::new(&conn)
        .select::<User>(&SelectOptions::default())
        .unwrap();
    assert_eq!(users, vec![User::new(1, "a@x", "A")]);
}

#[test]
fn existing_table_is_left_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            legacy_flag INTEGER NOT NULL DEFAULT 1
        );",
    )
    .unwrap();
    drop(conn);

    let lab = SqLab::connect(&format!("sqlite:{}", path.display()), schema()).unwrap();
    lab.create(&User::new(1, "a@x", "A")).unwrap();

    let legacy_flag: i64 = lab
        .connection()
        .query_row("SELECT legacy_flag FROM users WHERE id = 1;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(legacy_flag, 1);
}

#[test]
fn unsupported_driver_is_reported_as_invalid_location() {
    let err = SqLab::connect("postgresql://localhost/app", schema())
        .err()
        .unwrap();
    assert!(matches!(err, LabError::Db(DbError::InvalidLocation(_))));
}

#[test]
fn config_settings_are_applied_to_the_connection() {
    let config = LabConfig {
        busy_timeout_ms: 1_250,
        foreign_keys: false,
        ..LabConfig::default()
    };
    let lab = SqLab::connect_with_config(&config, schema()).unwrap();

    let busy_timeout: i64 = lab
        .connection()
        .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
        .unwrap();
    let foreign_keys: i64 = lab
        .connection()
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(busy_timeout, 1_250);
    assert_eq!(foreign_keys, 0);
}

#[test]
fn connecting_twice_yields_independent_memory_stores() {
    let first = SqLab::connect(":memory:", schema()).unwrap();
    let second = SqLab::connect(":memory:", schema()).unwrap();

    first.create(&User::new(1, "a@x", "A")).unwrap();

    assert_eq!(first.count::<User>(None).unwrap(), 1);
    assert_eq!(second.count::<User>(None).unwrap(), 0);
}

#[test]
fn duplicate_from_second_handle_on_same_file_is_detected() {
    let dir = tempfile::tempdir().unwrap();
    let url = file_url(&dir, "shared.db");
    let writer = SqLab::connect(&url, schema()).unwrap();
    let other = SqLab::connect(&url, schema()).unwrap();

    assert!(writer
        .create(&Product::new("SKU", "Desk", 120.0, Some("111")))
        .unwrap()
        .is_inserted());
    let outcome = other
        .create(&Product::new("OTHER", "Chair", 60.0, Some("111")))
        .unwrap();

    assert_eq!(outcome, CreateOutcome::AlreadyExists);
    assert_eq!(
        other
            .count::<Product>(Some(&Filter::eq("barcode", text("111"))))
            .unwrap(),
        1
    );
}

#[test]
fn repository_insert_maps_store_constraint_to_unique_violation() {
    let conn = open_db_in_memory(&schema()).unwrap();
    let repo = SqliteEntityRepository::new(&conn);

    repo.insert(&User::new(1, "a@x", "A")).unwrap();
    let err = repo.insert(&User::new(2, "a@x", "B")).unwrap_err();

    assert!(matches!(
        err,
        RepoError::UniqueViolation { table: "users", .. }
    ));
    assert_eq!(repo.count_conflicts(&User::new(3, "a@x", "C")).unwrap(), 1);
    assert_eq!(repo.count_conflicts(&User::new(3, "c@x", "C")).unwrap(), 0);
}
