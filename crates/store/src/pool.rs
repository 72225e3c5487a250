// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::{StoreError, StoreResult};

/// Open (creating if absent) the sqlite database at `database_url` and run
/// any pending migrations. `database_url` is an sqlite connection string,
/// e.g. `sqlite://./agent-commander.db` or `sqlite::memory:` for tests.
pub async fn connect(database_url: &str) -> StoreResult<SqlitePool> {
    let options: SqliteConnectOptions = database_url.parse().map_err(StoreError::Database)?;
    let options = options.create_if_missing(true);
    // A pooled `:memory:` database is a separate database per connection;
    // cap the pool at one connection so tests see a single consistent store.
    let max_connections = if database_url.contains(":memory:") { 1 } else { 10 };
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| StoreError::Database(e.into()))?;
    Ok(pool)
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
