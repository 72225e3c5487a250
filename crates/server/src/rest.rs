// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! REST surface (spec §6.4). Every handler resolves a [`Principal`] from
//! the bearer token and checks its role before touching the store or
//! dispatching to an agent — `operator` for session/command/terminal
//! traffic, `admin` for host mutation and token issuance.

use std::sync::Arc;

use agent_commander_dispatch::pending::HOST_LEVEL_COMMAND_TIMEOUT;
use agent_commander_store::SessionListFilter;
use agent_commander_types::approval::{Approval, ApprovalDecisionRequest};
use agent_commander_types::error::CommanderError;
use agent_commander_types::host::{Host, HostCapabilities};
use agent_commander_types::ids::{ApprovalId, GroupId, HostId, SessionId, HOST_LEVEL_SESSION_ID};
use agent_commander_types::protocol::agent::{ApprovalsDecisionPush, ServerToAgentMessage};
use agent_commander_types::protocol::command::{
    BulkOperationRequest, CommandRequest, CopyToRequest, DispatchResponse, SessionPatchRequest,
};
use agent_commander_types::protocol::ui::{ServerToUiMessage, SessionsChanged};
use agent_commander_types::session::{Provider, Session, SessionStatus};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::{bearer_token, Principal, Role};
use crate::policy;
use crate::state::ServerState;

type ApiResult<T> = Result<Json<T>, CommanderError>;

/// Resolve the caller's principal and require at least `min_role`.
async fn require_role(state: &ServerState, headers: &HeaderMap, min_role: Role) -> Result<Principal, CommanderError> {
    let token = bearer_token(headers).ok_or(CommanderError::AuthMissing)?;
    let principal = state.token_resolver.resolve(token).await.ok_or(CommanderError::AuthInvalid)?;
    if principal.role < min_role {
        return Err(CommanderError::Forbidden);
    }
    Ok(principal)
}

// -- health -------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// `GET /v1/health` — unauthenticated liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "running" })
}

// -- sessions -----------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SessionsQuery {
    pub host_id: Option<HostId>,
    pub group_id: Option<GroupId>,
    #[serde(default)]
    pub ungrouped: bool,
    pub status: Option<String>,
    pub provider: Option<Provider>,
    #[serde(default)]
    pub needs_attention: bool,
    #[serde(default)]
    pub include_archived: bool,
    #[serde(default)]
    pub archived_only: bool,
    pub q: Option<String>,
    pub cursor: Option<SessionId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn parse_statuses(csv: Option<&str>) -> Vec<SessionStatus> {
    csv.map(|raw| raw.split(',').filter_map(|s| serde_json::from_value(serde_json::Value::String(s.trim().to_owned())).ok()).collect())
        .unwrap_or_default()
}

impl From<&SessionsQuery> for SessionListFilter {
    fn from(query: &SessionsQuery) -> Self {
        SessionListFilter {
            host_id: query.host_id.clone(),
            group_id: if query.ungrouped { Some(None) } else { query.group_id.map(Some) },
            ungrouped: query.ungrouped,
            statuses: parse_statuses(query.status.as_deref()),
            provider: query.provider,
            needs_attention: query.needs_attention,
            include_archived: query.include_archived,
            archived_only: query.archived_only,
            q: query.q.clone(),
            cursor: query.cursor,
            limit: query.limit.unwrap_or(100),
            offset: query.offset.unwrap_or(0),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionsPageResponse {
    pub sessions: Vec<Session>,
    pub total: i64,
}

/// `GET /v1/sessions` (spec §4.8's `getSessionsPage`).
pub async fn list_sessions(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Query(query): Query<SessionsQuery>,
) -> ApiResult<SessionsPageResponse> {
    require_role(&state, &headers, Role::ReadOnly).await?;
    let filter = SessionListFilter::from(&query);
    let page = state.store.sessions.list_page(&filter).await?;
    Ok(Json(SessionsPageResponse { sessions: page.sessions, total: page.total }))
}

/// `GET /v1/sessions/:id`
pub async fn get_session(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(id): Path<SessionId>,
) -> ApiResult<Session> {
    require_role(&state, &headers, Role::ReadOnly).await?;
    let session = state.store.sessions.get(id).await?;
    Ok(Json(session))
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub since_seq: Option<u64>,
    pub limit: Option<i64>,
}

/// `GET /v1/sessions/:id/events`
pub async fn get_session_events(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(id): Path<SessionId>,
    Query(query): Query<EventsQuery>,
) -> ApiResult<Vec<agent_commander_types::Event>> {
    require_role(&state, &headers, Role::ReadOnly).await?;
    let events = state.store.events.list_for_session(id, query.since_seq.unwrap_or(0), query.limit.unwrap_or(200)).await?;
    Ok(Json(events))
}

/// `PATCH /v1/sessions/:id`
pub async fn patch_session(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(id): Path<SessionId>,
    Json(body): Json<SessionPatchRequest>,
) -> ApiResult<Session> {
    require_role(&state, &headers, Role::Operator).await?;
    let now = Utc::now();
    if let Some(title) = &body.title {
        state.store.sessions.set_title(id, Some(title.as_str()), now).await?;
    }
    if let Some(idle) = body.idle {
        state.store.sessions.set_idled(id, idle, now).await?;
    }
    let session = state.store.sessions.get(id).await?;
    state.bus.publish(ServerToUiMessage::SessionsChanged(SessionsChanged { sessions: vec![session.clone()], deleted: Vec::new() }));
    Ok(Json(session))
}

/// `DELETE /v1/sessions/:id`
pub async fn delete_session(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(id): Path<SessionId>,
) -> Result<(), CommanderError> {
    require_role(&state, &headers, Role::Operator).await?;
    state.store.sessions.delete(id).await?;
    state.bus.publish(ServerToUiMessage::SessionsChanged(SessionsChanged { sessions: Vec::new(), deleted: vec![id] }));
    Ok(())
}

/// `POST /v1/sessions/:id/commands` (spec §8 scenario 3).
pub async fn dispatch_command(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(id): Path<SessionId>,
    Json(body): Json<CommandRequest>,
) -> ApiResult<DispatchResponse> {
    require_role(&state, &headers, Role::Operator).await?;
    let session = state.store.sessions.get(id).await?;
    let command = serde_json::json!({ "type": body.command_type, "payload": body.payload });
    let cmd_id = state.dispatcher.dispatch(&session.host_id, id, command, session.provider).await?;
    Ok(Json(DispatchResponse { cmd_id }))
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// `POST /v1/sessions/:id/copy-to` (spec §4.4, §8 scenario 4).
pub async fn copy_to(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(id): Path<SessionId>,
    Json(body): Json<CopyToRequest>,
) -> ApiResult<OkResponse> {
    require_role(&state, &headers, Role::Operator).await?;
    state.cross_host_copy.execute(id, &body).await?;
    Ok(Json(OkResponse { ok: true }))
}

#[derive(Debug, Default, Deserialize)]
pub struct ForkRequest {
    #[serde(default)]
    pub title: Option<String>,
}

/// `POST /v1/sessions/:id/fork` — asks the owning agent to spawn a new pane
/// derived from `id`; the forked session itself is created through the
/// agent's own subsequent `sessions.upsert`, same as any other pane.
pub async fn fork_session(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(id): Path<SessionId>,
    Json(body): Json<ForkRequest>,
) -> ApiResult<DispatchResponse> {
    require_role(&state, &headers, Role::Operator).await?;
    let session = state.store.sessions.get(id).await?;
    let command = serde_json::json!({
        "type": "fork_session",
        "payload": { "forked_from": id, "fork_depth": session.fork_depth + 1, "title": body.title },
    });
    let cmd_id = state.dispatcher.dispatch(&session.host_id, id, command, session.provider).await?;
    Ok(Json(DispatchResponse { cmd_id }))
}

#[derive(Debug, Deserialize)]
pub struct SpawnRequest {
    pub host_id: HostId,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub provider: Option<Provider>,
    #[serde(default)]
    pub title: Option<String>,
}

/// `POST /v1/sessions/spawn` — a host-level command (no session exists yet,
/// so it is dispatched against [`HOST_LEVEL_SESSION_ID`] like directory
/// listing and adopt-panes).
pub async fn spawn_session(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Json(body): Json<SpawnRequest>,
) -> ApiResult<DispatchResponse> {
    require_role(&state, &headers, Role::Operator).await?;
    let provider = body.provider.unwrap_or(Provider::Shell);
    let command = serde_json::json!({
        "type": "spawn_session",
        "payload": { "cwd": body.cwd, "title": body.title },
    });
    let cmd_id = state.dispatcher.dispatch(&body.host_id, HOST_LEVEL_SESSION_ID, command, provider).await?;
    Ok(Json(DispatchResponse { cmd_id }))
}

/// `POST /v1/sessions/bulk` (spec §4.4).
pub async fn bulk_operation(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Json(body): Json<BulkOperationRequest>,
) -> ApiResult<agent_commander_types::protocol::command::BulkOperationResponse> {
    require_role(&state, &headers, Role::Operator).await?;
    let response = state.bulk_operations.apply(&body).await;
    Ok(Json(response))
}

// -- hosts ----------------------------------------------------------------

/// `GET /v1/hosts`
pub async fn list_hosts(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> ApiResult<Vec<Host>> {
    require_role(&state, &headers, Role::ReadOnly).await?;
    let hosts = state.store.hosts.list().await?;
    Ok(Json(hosts))
}

#[derive(Debug, Deserialize)]
pub struct HostRegisterRequest {
    pub id: HostId,
    pub name: String,
    #[serde(default)]
    pub capabilities: HostCapabilities,
}

/// `POST /v1/hosts` — admin-only provisioning ahead of an agent's first
/// `agent.hello` (spec §3: "created on first admin provisioning").
pub async fn register_host(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Json(body): Json<HostRegisterRequest>,
) -> ApiResult<Host> {
    require_role(&state, &headers, Role::Admin).await?;
    state.store.hosts.upsert(&body.id, &body.name, None, None, &body.capabilities, None, Utc::now()).await?;
    let host = state.store.hosts.get(&body.id).await?;
    Ok(Json(host))
}

#[derive(Debug, Serialize)]
pub struct HostTokenResponse {
    pub token: String,
}

/// `POST /v1/hosts/:id/token` — mint an agent bearer token, admin-only.
pub async fn issue_host_token(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(id): Path<HostId>,
) -> ApiResult<HostTokenResponse> {
    require_role(&state, &headers, Role::Admin).await?;
    let token = state.store.agent_tokens.issue(&id, Utc::now()).await?;
    Ok(Json(HostTokenResponse { token }))
}

/// `GET /v1/hosts/:id/orphan-panes` — round-trips a host-level command to
/// the agent and hands its result straight back; the shape of "a pane" is
/// owned by the agent, not this control plane.
pub async fn list_orphan_panes(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(id): Path<HostId>,
) -> ApiResult<serde_json::Value> {
    require_role(&state, &headers, Role::Operator).await?;
    let command = serde_json::json!({ "type": "list_orphan_panes", "payload": {} });
    let result = state.dispatcher.dispatch_and_wait(&id, HOST_LEVEL_SESSION_ID, command, HOST_LEVEL_COMMAND_TIMEOUT).await?;
    if !result.ok {
        return Err(CommanderError::InternalError);
    }
    Ok(Json(result.result.unwrap_or(serde_json::Value::Null)))
}

#[derive(Debug, Deserialize)]
pub struct AdoptPanesRequest {
    pub pane_ids: Vec<String>,
}

/// `POST /v1/hosts/:id/adopt-panes`
pub async fn adopt_panes(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(id): Path<HostId>,
    Json(body): Json<AdoptPanesRequest>,
) -> ApiResult<serde_json::Value> {
    require_role(&state, &headers, Role::Operator).await?;
    let command = serde_json::json!({ "type": "adopt_panes", "payload": { "pane_ids": body.pane_ids } });
    let result = state.dispatcher.dispatch_and_wait(&id, HOST_LEVEL_SESSION_ID, command, HOST_LEVEL_COMMAND_TIMEOUT).await?;
    if !result.ok {
        return Err(CommanderError::InternalError);
    }
    Ok(Json(result.result.unwrap_or(serde_json::Value::Null)))
}

#[derive(Debug, Deserialize)]
pub struct DirectoryQuery {
    pub path: String,
    #[serde(default)]
    pub show_hidden: bool,
}

/// `GET /v1/hosts/:id/directories` — enforced by the root allow-list
/// (`policy::check_directory_allowed`) before ever asking the agent.
pub async fn list_directory(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(id): Path<HostId>,
    Query(query): Query<DirectoryQuery>,
) -> ApiResult<serde_json::Value> {
    require_role(&state, &headers, Role::Operator).await?;
    let host = state.store.hosts.get(&id).await?;
    if !policy::capabilities_allow_listing(&host.capabilities) {
        return Err(CommanderError::Forbidden);
    }
    policy::check_directory_allowed(&query.path, &host.capabilities.directory_roots, &state.config.directory_roots)?;

    let command = serde_json::json!({
        "type": "list_directory",
        "payload": { "path": query.path, "show_hidden": query.show_hidden },
    });
    let result = state.dispatcher.dispatch_and_wait(&id, HOST_LEVEL_SESSION_ID, command, HOST_LEVEL_COMMAND_TIMEOUT).await?;
    if !result.ok {
        return Err(CommanderError::InternalError);
    }
    let listing = filter_hidden_entries(result.result.unwrap_or(serde_json::Value::Null), query.show_hidden);
    Ok(Json(listing))
}

/// Drop dotfile entries the agent returned anyway when the caller didn't
/// ask for them (spec §7's `HiddenNotAllowed`, enforced per-entry since the
/// agent's own listing may not respect `show_hidden`).
fn filter_hidden_entries(mut listing: serde_json::Value, show_hidden: bool) -> serde_json::Value {
    if let Some(entries) = listing.get_mut("entries").and_then(|v| v.as_array_mut()) {
        entries.retain(|entry| {
            let name = entry.get("name").and_then(|n| n.as_str()).unwrap_or("");
            policy::check_hidden_allowed(name, show_hidden).is_ok()
        });
    }
    listing
}

// -- approvals --------------------------------------------------------------

/// `GET /v1/sessions/:id/approvals` — pending approvals for one session.
pub async fn list_pending_approvals(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(id): Path<SessionId>,
) -> ApiResult<Vec<Approval>> {
    require_role(&state, &headers, Role::ReadOnly).await?;
    let approvals = state.store.approvals.list_pending_for_session(id).await?;
    Ok(Json(approvals))
}

/// `POST /v1/approvals/:id/decide` (spec §4.6, §7's idempotency rule:
/// repeated identical decisions return 200, divergent ones 409).
pub async fn decide_approval(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Path(id): Path<ApprovalId>,
    Json(body): Json<ApprovalDecisionRequest>,
) -> ApiResult<Approval> {
    require_role(&state, &headers, Role::Operator).await?;
    let existing = state.store.approvals.get(id).await?;
    if let Some(prior_decision) = existing.decision {
        if prior_decision == body.decision {
            return Ok(Json(existing));
        }
        return Err(CommanderError::AlreadyDecided);
    }

    let now = Utc::now();
    let decided_payload = body.payload.updated_input.clone();
    state.store.approvals.decide(id, body.decision, decided_payload, now).await?;

    let session = state.store.sessions.get(existing.session_id).await?;
    let push = ServerToAgentMessage::ApprovalsDecision(ApprovalsDecisionPush {
        approval_id: id,
        session_id: existing.session_id,
        decision: body.decision,
        mode: body.mode,
        payload: body.payload,
    });
    if let Err(err) = state.bus.send_to_agent(&session.host_id, push).await {
        warn!(%err, approval_id = %id, "approval decision recorded but agent was unreachable");
    }

    let decided = state.store.approvals.get(id).await?;
    state.bus.publish(ServerToUiMessage::ApprovalsUpdated(decided.clone()));
    Ok(Json(decided))
}

#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#[cfg(test)]
#[path = "rest_tests.rs"]
mod tests;
