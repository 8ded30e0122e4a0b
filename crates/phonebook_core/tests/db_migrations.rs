use phonebook_core::db::migrations::latest_version;
use phonebook_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "contacts");
    assert_table_exists(&conn, "contact_numbers");
}

#[test]
fn foreign_keys_are_enabled() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phonebook.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "contacts");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn phone_rows_reject_duplicate_types_and_cascade_with_contact() {
    let conn = open_db_in_memory().unwrap();
    conn.execute("INSERT INTO contacts (id, name) VALUES (1, 'Amy');", [])
        .unwrap();
    conn.execute(
        "INSERT INTO contact_numbers (contact_id, position, number, number_type)
         VALUES (1, 0, '1', 'HOME');",
        [],
    )
    .unwrap();

    let duplicate = conn.execute(
        "INSERT INTO contact_numbers (contact_id, position, number, number_type)
         VALUES (1, 1, '2', 'HOME');",
        [],
    );
    assert!(duplicate.is_err());

    conn.execute("DELETE FROM contacts WHERE id = 1;", []).unwrap();
    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM contact_numbers;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
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
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
