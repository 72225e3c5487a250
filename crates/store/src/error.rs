// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use agent_commander_types::error::CommanderError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt row: {0}")]
    CorruptRow(String),
}

impl From<StoreError> for CommanderError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => CommanderError::NotFound,
            StoreError::Database(_) | StoreError::CorruptRow(_) => CommanderError::InternalError,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Collapse `sqlx::Error::RowNotFound` into `StoreError::NotFound` at a
/// `fetch_one`/`fetch_optional` call site; every other sqlx error passes
/// through as an opaque `Database` error.
pub fn not_found_on_empty(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        other => StoreError::Database(other),
    }
}
