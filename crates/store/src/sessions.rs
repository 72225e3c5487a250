// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use agent_commander_types::ids::{GroupId, HostId, SessionId};
use agent_commander_types::protocol::agent::SessionUpsert;
use agent_commander_types::session::{Provider, Session, SessionKind, SessionMetadata, SessionStatus};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::error::{not_found_on_empty, StoreError, StoreResult};

/// Escape `%`, `_`, and `\` for use inside a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

fn row_to_session(row: SqliteRow) -> Result<Session, StoreError> {
    let kind: String = row.try_get("kind")?;
    let provider: String = row.try_get("provider")?;
    let status: String = row.try_get("status")?;
    let metadata_json: String = row.try_get("metadata")?;

    let kind = serde_json::from_value(serde_json::Value::String(kind))
        .map_err(|e| StoreError::CorruptRow(format!("kind: {e}")))?;
    let provider = serde_json::from_value(serde_json::Value::String(provider))
        .map_err(|e| StoreError::CorruptRow(format!("provider: {e}")))?;
    let status = serde_json::from_value(serde_json::Value::String(status))
        .map_err(|e| StoreError::CorruptRow(format!("status: {e}")))?;
    let metadata: SessionMetadata =
        serde_json::from_str(&metadata_json).map_err(|e| StoreError::CorruptRow(format!("metadata: {e}")))?;

    Ok(Session {
        id: row.try_get("id")?,
        host_id: row.try_get("host_id")?,
        kind,
        provider,
        status,
        title: row.try_get("title")?,
        cwd: row.try_get("cwd")?,
        repo_root: row.try_get("repo_root")?,
        git_branch: row.try_get("git_branch")?,
        git_remote: row.try_get("git_remote")?,
        tmux_target: row.try_get("tmux_target")?,
        tmux_pane_id: row.try_get("tmux_pane_id")?,
        group_id: row.try_get("group_id")?,
        forked_from: row.try_get("forked_from")?,
        fork_depth: row.try_get::<i64, _>("fork_depth")? as u32,
        archived_at: row.try_get("archived_at")?,
        idled_at: row.try_get("idled_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        last_activity_at: row.try_get("last_activity_at")?,
        metadata,
    })
}

/// Filter parameters for a paged session listing (spec §4.8 `getSessions`).
///
/// `group_id: Some(None)` means "ungrouped" (`group_id IS NULL`); `None`
/// means the filter is not applied at all. `ungrouped` is a convenience
/// alias that callers may set instead of threading the nested option
/// themselves — `list`/`list_page` treat it identically to
/// `group_id: Some(None)`.
#[derive(Debug, Clone, Default)]
pub struct SessionListFilter {
    pub host_id: Option<HostId>,
    pub group_id: Option<Option<GroupId>>,
    pub ungrouped: bool,
    pub statuses: Vec<SessionStatus>,
    pub provider: Option<Provider>,
    pub needs_attention: bool,
    pub include_archived: bool,
    pub archived_only: bool,
    /// Substring match over `title`, `cwd`, `repo_root`, `git_branch`
    /// (case-insensitive, spec §4.8's `q`).
    pub q: Option<String>,
    pub cursor: Option<SessionId>,
    pub limit: i64,
    pub offset: i64,
}

/// A page of sessions alongside the total row count matching the same
/// filter sans `limit`/`offset` (spec §4.8's `getSessionsPage`).
#[derive(Debug, Clone)]
pub struct SessionPage {
    pub sessions: Vec<Session>,
    pub total: i64,
}

#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or refresh a session from an agent's `sessions.upsert` batch.
    /// `group_id` is `None` when the caller didn't resolve a new group for
    /// this upsert — in that case any existing assignment is preserved.
    pub async fn upsert(
        &self,
        host_id: &HostId,
        upsert: &SessionUpsert,
        group_id: Option<GroupId>,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        let kind = serde_json::to_value(upsert.kind).unwrap_or_default();
        let provider = serde_json::to_value(upsert.provider).unwrap_or_default();
        let status = serde_json::to_value(upsert.status).unwrap_or_default();
        let metadata_json = serde_json::to_string(&upsert.metadata).unwrap_or_else(|_| "{}".to_owned());

        sqlx::query(
            r#"
            INSERT INTO sessions (
                id, host_id, kind, provider, status, title, cwd, repo_root, git_branch, git_remote,
                tmux_target, tmux_pane_id, group_id, forked_from, fork_depth,
                archived_at, idled_at, created_at, updated_at, last_activity_at, metadata
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15,
                NULL, NULL, ?16, ?16, ?16, ?17
            )
            ON CONFLICT (id) DO UPDATE SET
                host_id = excluded.host_id,
                kind = excluded.kind,
                provider = excluded.provider,
                status = excluded.status,
                title = excluded.title,
                cwd = excluded.cwd,
                repo_root = excluded.repo_root,
                git_branch = excluded.git_branch,
                git_remote = excluded.git_remote,
                tmux_target = excluded.tmux_target,
                tmux_pane_id = excluded.tmux_pane_id,
                group_id = COALESCE(excluded.group_id, sessions.group_id),
                forked_from = excluded.forked_from,
                fork_depth = excluded.fork_depth,
                updated_at = excluded.updated_at,
                last_activity_at = excluded.last_activity_at,
                metadata = excluded.metadata
            "#,
        )
        .bind(upsert.id)
        .bind(host_id)
        .bind(kind.as_str())
        .bind(provider.as_str())
        .bind(status.as_str())
        .bind(&upsert.title)
        .bind(&upsert.cwd)
        .bind(&upsert.repo_root)
        .bind(&upsert.git_branch)
        .bind(&upsert.git_remote)
        .bind(&upsert.tmux_target)
        .bind(&upsert.tmux_pane_id)
        .bind(group_id)
        .bind(upsert.forked_from)
        .bind(upsert.fork_depth as i64)
        .bind(now)
        .bind(metadata_json)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, id: SessionId) -> StoreResult<Session> {
        let row = sqlx::query("SELECT * FROM sessions WHERE id = ?1").bind(id).fetch_one(&self.pool).await.map_err(not_found_on_empty)?;
        row_to_session(row)
    }

    /// Build the shared `WHERE` fragment for `filter`, in a fixed condition
    /// order that `list`/`count`/`list_page` all bind identically.
    fn where_clause(filter: &SessionListFilter) -> String {
        let mut sql = String::from("WHERE 1 = 1");
        if filter.host_id.is_some() {
            sql.push_str(" AND host_id = ?");
        }
        if filter.ungrouped || matches!(filter.group_id, Some(None)) {
            sql.push_str(" AND group_id IS NULL");
        } else if filter.group_id.is_some() {
            sql.push_str(" AND group_id = ?");
        }
        if !filter.statuses.is_empty() {
            let placeholders = vec!["?"; filter.statuses.len()].join(", ");
            sql.push_str(&format!(" AND status IN ({placeholders})"));
        }
        if filter.needs_attention {
            sql.push_str(" AND status IN ('WAITING_FOR_INPUT', 'WAITING_FOR_APPROVAL', 'ERROR')");
        }
        if filter.provider.is_some() {
            sql.push_str(" AND provider = ?");
        }
        if filter.archived_only {
            sql.push_str(" AND archived_at IS NOT NULL");
        } else if !filter.include_archived {
            sql.push_str(" AND archived_at IS NULL");
        }
        if filter.q.is_some() {
            sql.push_str(
                " AND (title LIKE ? ESCAPE '\\' OR cwd LIKE ? ESCAPE '\\' OR repo_root LIKE ? ESCAPE '\\' OR git_branch LIKE ? ESCAPE '\\')",
            );
        }
        sql
    }

    /// Bind `filter`'s fields onto `query` in the exact order
    /// [`Self::where_clause`] emits its placeholders.
    fn bind_filter<'q>(
        mut query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
        filter: &'q SessionListFilter,
    ) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
        if let Some(host_id) = &filter.host_id {
            query = query.bind(host_id);
        }
        if !filter.ungrouped {
            if let Some(Some(group_id)) = filter.group_id {
                query = query.bind(group_id);
            }
        }
        for status in &filter.statuses {
            query = query.bind(status.as_str());
        }
        if let Some(provider) = filter.provider {
            let value = serde_json::to_value(provider).unwrap_or_default();
            query = query.bind(value.as_str().unwrap_or_default().to_owned());
        }
        if let Some(q) = &filter.q {
            let pattern = format!("%{}%", escape_like(q));
            query = query.bind(pattern.clone()).bind(pattern.clone()).bind(pattern.clone()).bind(pattern);
        }
        query
    }

    pub async fn list(&self, filter: &SessionListFilter) -> StoreResult<Vec<Session>> {
        let mut sql = format!("SELECT * FROM sessions {}", Self::where_clause(filter));
        if filter.cursor.is_some() {
            sql.push_str(" AND id > ?");
        }
        sql.push_str(" ORDER BY id LIMIT ? OFFSET ?");

        let mut query = sqlx::query(&sql);
        query = Self::bind_filter(query, filter);
        if let Some(cursor) = filter.cursor {
            query = query.bind(cursor);
        }
        let limit = if filter.limit > 0 { filter.limit } else { 100 };
        query = query.bind(limit).bind(filter.offset.max(0));

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(row_to_session).collect()
    }

    /// Total rows matching `filter`, ignoring `limit`/`offset`/`cursor`
    /// (spec §4.8's `getSessionsPage` pairing).
    pub async fn count(&self, filter: &SessionListFilter) -> StoreResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM sessions {}", Self::where_clause(filter));
        let mut query = sqlx::query_scalar(&sql);
        query = Self::bind_filter_scalar(query, filter);
        let total: i64 = query.fetch_one(&self.pool).await?;
        Ok(total)
    }

    fn bind_filter_scalar<'q>(
        mut query: sqlx::query::QueryScalar<'q, sqlx::Sqlite, i64, sqlx::sqlite::SqliteArguments<'q>>,
        filter: &'q SessionListFilter,
    ) -> sqlx::query::QueryScalar<'q, sqlx::Sqlite, i64, sqlx::sqlite::SqliteArguments<'q>> {
        if let Some(host_id) = &filter.host_id {
            query = query.bind(host_id);
        }
        if !filter.ungrouped {
            if let Some(Some(group_id)) = filter.group_id {
                query = query.bind(group_id);
            }
        }
        for status in &filter.statuses {
            query = query.bind(status.as_str());
        }
        if let Some(provider) = filter.provider {
            let value = serde_json::to_value(provider).unwrap_or_default();
            query = query.bind(value.as_str().unwrap_or_default().to_owned());
        }
        if let Some(q) = &filter.q {
            let pattern = format!("%{}%", escape_like(q));
            query = query.bind(pattern.clone()).bind(pattern.clone()).bind(pattern.clone()).bind(pattern);
        }
        query
    }

    /// `getSessionsPage` (spec §4.8): a page of sessions alongside the
    /// total count matching the same filter.
    pub async fn list_page(&self, filter: &SessionListFilter) -> StoreResult<SessionPage> {
        let sessions = self.list(filter).await?;
        let total = self.count(filter).await?;
        Ok(SessionPage { sessions, total })
    }

    pub async fn prune(&self, host_id: &str, keep_ids: &[SessionId]) -> StoreResult<Vec<SessionId>> {
        let existing: Vec<(SessionId,)> =
            sqlx::query_as("SELECT id FROM sessions WHERE host_id = ?1 AND archived_at IS NULL").bind(host_id).fetch_all(&self.pool).await?;
        let to_prune: Vec<SessionId> = existing.into_iter().map(|(id,)| id).filter(|id| !keep_ids.contains(id)).collect();
        for id in &to_prune {
            sqlx::query("UPDATE sessions SET archived_at = ?2, updated_at = ?2 WHERE id = ?1").bind(id).bind(Utc::now()).execute(&self.pool).await?;
        }
        Ok(to_prune)
    }

    pub async fn set_title(&self, id: SessionId, title: Option<&str>, now: DateTime<Utc>) -> StoreResult<()> {
        sqlx::query("UPDATE sessions SET title = ?2, updated_at = ?3 WHERE id = ?1").bind(id).bind(title).bind(now).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn set_idled(&self, id: SessionId, idled: bool, now: DateTime<Utc>) -> StoreResult<()> {
        let idled_at = idled.then_some(now);
        sqlx::query("UPDATE sessions SET idled_at = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(idled_at)
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Archiving is monotonic: re-archiving an already-archived session
    /// leaves its original `archived_at` untouched (spec §3, §8 — a bulk
    /// `archive` over an id set that already contains archived sessions
    /// must not double-archive). Unarchiving always clears it unconditionally,
    /// since only an explicit operator unarchive may unset it.
    pub async fn set_archived(&self, id: SessionId, archived: bool, now: DateTime<Utc>) -> StoreResult<()> {
        if archived {
            sqlx::query("UPDATE sessions SET archived_at = COALESCE(archived_at, ?2), updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;
        } else {
            sqlx::query("UPDATE sessions SET archived_at = NULL, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    pub async fn assign_group(&self, id: SessionId, group_id: Option<GroupId>, now: DateTime<Utc>) -> StoreResult<()> {
        sqlx::query("UPDATE sessions SET group_id = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(group_id)
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: SessionId) -> StoreResult<()> {
        sqlx::query("DELETE FROM sessions WHERE id = ?1").bind(id).execute(&self.pool).await?;
        Ok(())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "sessions_tests.rs"]
mod tests;
