//! Agent handlers

use axum::{extract::State, Json};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::middleware::auth::{hash_token, AgentContext};
use crate::models::{
    LogEntry, Node, RegisterNodeRequest, RegisterNodeResponse, SyncEntriesRequest,
    SyncEntriesResponse,
};
use crate::{AppError, AppResult, AppState};

/// Register a collector node.
///
/// Registration is the node's startup reset: its stored entries are
/// dropped, its init time re-stamped, and a fresh bearer token issued.
/// Re-registering an existing node is idempotent in effect; it only ever
/// touches that node's own namespace.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterNodeRequest>,
) -> AppResult<Json<RegisterNodeResponse>> {
    req.validate()?;

    if req.agent_key != state.config.agent_secret {
        return Err(AppError::Unauthorized);
    }

    let token = Uuid::new_v4().to_string();
    let token_hash = hash_token(&token);

    let node = Node::register(&state.pool, &req.node_name, &req.agent_version, &token_hash).await?;
    let dropped = Node::reset_entries(&state.pool, node.id).await?;

    tracing::info!(
        "Node registered: {} ({}), {} stale entries dropped",
        node.name,
        node.id,
        dropped
    );

    Ok(Json(RegisterNodeResponse {
        token,
        server_time: Utc::now().timestamp(),
    }))
}

/// Ingest one batch of classified entries from an agent.
pub async fn sync_entries(
    State(state): State<AppState>,
    agent: AgentContext,
    Json(req): Json<SyncEntriesRequest>,
) -> AppResult<Json<SyncEntriesResponse>> {
    req.validate()?;

    Node::touch(&state.pool, agent.node_id).await?;

    let mut inserted = 0;
    for entry in &req.entries {
        match LogEntry::upsert(&state.pool, agent.node_id, &req.source, entry).await {
            Ok(_) => inserted += 1,
            Err(e) => tracing::warn!("Failed to store entry {}: {}", entry.log_id, e),
        }
    }

    tracing::debug!(
        "Synced {} entries from {} ({})",
        inserted,
        agent.node_name,
        req.source
    );

    Ok(Json(SyncEntriesResponse {
        inserted_count: inserted,
        server_time: Utc::now().timestamp(),
    }))
}
