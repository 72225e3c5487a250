// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn connect_runs_migrations_on_an_in_memory_database() {
    let pool = connect("sqlite::memory:").await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'sessions'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn connect_creates_a_missing_file_backed_database_and_migrates_it() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("agent-commander.sqlite3");
    assert!(!db_path.exists());

    let url = format!("sqlite://{}", db_path.display());
    let pool = connect(&url).await.unwrap();

    assert!(db_path.exists());
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'hosts'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}
