use attendance_core::db::migrations::{latest_version, schema_version};
use attendance_core::db::{
    open_db, open_db_in_memory, session_db_path, DbError, SESSION_DB_FILE_NAME,
};
use rusqlite::{params, Connection};

fn insert_entry(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO credential_entries (key, value) VALUES (?1, ?2);",
        params![key, value],
    )
}

#[test]
fn fresh_store_is_at_latest_schema() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(schema_version(&conn).unwrap(), latest_version());
}

#[test]
fn credential_key_is_unique() {
    let conn = open_db_in_memory().unwrap();
    insert_entry(&conn, "access_token", "tok").unwrap();

    let err = insert_entry(&conn, "access_token", "tok-2").unwrap_err();
    assert_eq!(
        err.sqlite_error_code(),
        Some(rusqlite::ErrorCode::ConstraintViolation)
    );
}

#[test]
fn credential_value_is_required() {
    let conn = open_db_in_memory().unwrap();
    let err = conn
        .execute(
            "INSERT INTO credential_entries (key, value) VALUES ('x_token', NULL);",
            [],
        )
        .unwrap_err();
    assert_eq!(
        err.sqlite_error_code(),
        Some(rusqlite::ErrorCode::ConstraintViolation)
    );
}

#[test]
fn entries_are_stamped_on_insert() {
    let conn = open_db_in_memory().unwrap();
    insert_entry(&conn, "session_id", "sid").unwrap();

    let updated_at: i64 = conn
        .query_row(
            "SELECT updated_at FROM credential_entries WHERE key = 'session_id';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(updated_at > 0);
}

#[test]
fn connections_zero_deleted_rows() {
    let conn = open_db_in_memory().unwrap();
    let secure_delete: i64 = conn
        .query_row("PRAGMA secure_delete;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(secure_delete, 1);
}

#[test]
fn reopening_keeps_stored_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(SESSION_DB_FILE_NAME);

    let first = open_db(&path).unwrap();
    insert_entry(&first, "user_id", "1201").unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second).unwrap(), latest_version());
    let value: String = second
        .query_row(
            "SELECT value FROM credential_entries WHERE key = 'user_id';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(value, "1201");
}

#[test]
fn store_from_newer_build_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(SESSION_DB_FILE_NAME);
    Connection::open(&path)
        .unwrap()
        .execute_batch("PRAGMA user_version = 999;")
        .unwrap();

    match open_db(&path).unwrap_err() {
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
fn store_path_lives_in_an_absolute_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("app-data");
    let data_dir_str = data_dir.to_str().unwrap();

    let path = session_db_path(data_dir_str).unwrap();
    assert_eq!(path, data_dir.join(SESSION_DB_FILE_NAME));
    assert!(data_dir.is_dir());
}

#[test]
fn store_path_rejects_blank_or_relative_dirs() {
    for raw in ["", "   ", "relative/data"] {
        let err = session_db_path(raw).unwrap_err();
        assert!(matches!(err, DbError::InvalidStoreDir(_)), "{raw:?}: {err}");
    }
}
