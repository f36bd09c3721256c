use ecokid_core::db::migrations::latest_version;
use ecokid_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "accounts");
    assert_table_exists(&conn, "ai_usage");
    assert_table_exists(&conn, "articles");
    assert_table_exists(&conn, "comments");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("economy.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "accounts");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

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
fn unopenable_path_reports_the_database_location() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("economy.sqlite3");

    let err = open_db(&path).unwrap_err();
    let DbError::Open { path: reported, .. } = &err else {
        panic!("expected an open error");
    };
    assert_eq!(reported, &path);
    assert!(err.to_string().contains("economy.sqlite3"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn schema_refuses_failed_comments_and_duplicate_accounts() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO articles (id, title, content, created_at) VALUES ('a', 't', 'c', 0);",
        [],
    )
    .unwrap();

    let failed_comment = conn.execute(
        "INSERT INTO comments (id, user_id, article_id, content, is_passed, created_at)
         VALUES ('c1', 'u', 'a', 'text', 0, 0);",
        [],
    );
    assert!(failed_comment.is_err());

    conn.execute(
        "INSERT INTO accounts (account_id, user_id, balance) VALUES ('acc_u', 'u', 10);",
        [],
    )
    .unwrap();
    let duplicate = conn.execute(
        "INSERT INTO accounts (account_id, user_id, balance) VALUES ('acc_u2', 'u', 10);",
        [],
    );
    assert!(duplicate.is_err());
}

#[test]
fn deleting_an_article_cascades_to_its_comments() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO articles (id, title, content, created_at) VALUES ('a', 't', 'c', 0);
         INSERT INTO comments (id, user_id, article_id, content, is_passed, created_at)
         VALUES ('c1', 'u', 'a', 'text', 1, 0);
         DELETE FROM articles WHERE id = 'a';",
    )
    .unwrap();

    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM comments;", [], |row| row.get(0))
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
