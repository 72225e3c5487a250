// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use agent_commander_types::event::{Event, EventAppend};
use agent_commander_types::ids::SessionId;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::StoreResult;

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    session_id: SessionId,
    seq: i64,
    ts: chrono::DateTime<chrono::Utc>,
    #[sqlx(rename = "type")]
    event_type: String,
    payload: String,
}

impl TryFrom<EventRow> for Event {
    type Error = crate::error::StoreError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let payload = serde_json::from_str(&row.payload).map_err(|e| crate::error::StoreError::CorruptRow(e.to_string()))?;
        Ok(Event { id: row.id, session_id: row.session_id, seq: row.seq as u64, ts: row.ts, event_type: row.event_type, payload })
    }
}

#[derive(Clone)]
pub struct EventStore {
    pool: SqlitePool,
}

impl EventStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a batch of events for one session, assigning each the next
    /// `seq` in that session's monotonic sequence. A batch is idempotent
    /// per `event_id` — re-delivering an already-stored id is a no-op for
    /// that entry and does not consume a new `seq`.
    pub async fn append_batch(&self, session_id: SessionId, events: Vec<EventAppend>) -> StoreResult<Vec<Event>> {
        let mut tx = self.pool.begin().await?;
        let mut next_seq: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(seq), 0) + 1 FROM events WHERE session_id = ?1")
            .bind(session_id)
            .fetch_one(&mut *tx)
            .await?;

        let mut appended = Vec::with_capacity(events.len());
        for event in events {
            let id = event.event_id.unwrap_or_else(Uuid::new_v4);
            let payload_json = serde_json::to_string(&event.payload).unwrap_or_else(|_| "null".to_owned());

            let inserted = sqlx::query(
                "INSERT OR IGNORE INTO events (id, session_id, seq, ts, type, payload) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(id)
            .bind(session_id)
            .bind(next_seq)
            .bind(event.ts)
            .bind(&event.event_type)
            .bind(&payload_json)
            .execute(&mut *tx)
            .await?;

            if inserted.rows_affected() == 0 {
                // Either the id or the (session_id, seq) pair already existed;
                // treat as an already-applied replay and skip without
                // advancing seq.
                continue;
            }
            appended.push(Event { id, session_id, seq: next_seq as u64, ts: event.ts, event_type: event.event_type, payload: event.payload });
            next_seq += 1;
        }

        tx.commit().await?;
        Ok(appended)
    }

    pub async fn list_for_session(&self, session_id: SessionId, since_seq: u64, limit: i64) -> StoreResult<Vec<Event>> {
        let rows: Vec<EventRow> = sqlx::query_as(
            "SELECT * FROM events WHERE session_id = ?1 AND seq > ?2 ORDER BY seq LIMIT ?3",
        )
        .bind(session_id)
        .bind(since_seq as i64)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Event::try_from).collect()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
