//! Log read views
//!
//! Read-only snapshots over the stored entries. No write endpoints here.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::MsgResponse;
use crate::models::{EntryMeta, EntryPayload, LogEntry, SourceFilter, SourceStatus};
use crate::{AppError, AppResult, AppState};

/// Newest entries per logical source, metadata only.
/// Optional `machine` + `source` narrow the view to one table.
pub async fn detail(
    State(state): State<AppState>,
    Query(filter): Query<SourceFilter>,
) -> AppResult<Json<MsgResponse<Vec<EntryMeta>>>> {
    let entries = LogEntry::list_detail(&state.pool, &filter).await?;
    Ok(Json(MsgResponse::new(entries)))
}

/// Newest 100 WARN/ERROR entries across all sources, oldest first.
pub async fn alerts(
    State(state): State<AppState>,
) -> AppResult<Json<MsgResponse<Vec<EntryMeta>>>> {
    let entries = LogEntry::recent_alerts(&state.pool).await?;
    Ok(Json(MsgResponse::new(entries)))
}

/// The feed consumed by the analysis collaborator: ERROR entries stamped
/// after each node's init grace window, oldest first.
pub async fn analysis_feed(
    State(state): State<AppState>,
) -> AppResult<Json<MsgResponse<Vec<EntryMeta>>>> {
    let entries = LogEntry::analysis_feed(&state.pool).await?;
    Ok(Json(MsgResponse::new(entries)))
}

/// The single newest entry of every logical source.
pub async fn source_status(
    State(state): State<AppState>,
) -> AppResult<Json<MsgResponse<Vec<SourceStatus>>>> {
    let status = LogEntry::source_status(&state.pool).await?;
    Ok(Json(MsgResponse::new(status)))
}

#[derive(Debug, Deserialize)]
pub struct EntriesQuery {
    pub machine: String,
    pub source: String,
    /// Comma-separated identities
    pub ids: String,
}

/// Full payloads for specific identities within one logical table.
pub async fn entries(
    State(state): State<AppState>,
    Query(query): Query<EntriesQuery>,
) -> AppResult<Json<MsgResponse<Vec<EntryPayload>>>> {
    let ids: Vec<String> = query
        .ids
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if ids.is_empty() {
        return Err(AppError::ValidationError("ids must not be empty".to_string()));
    }

    let payloads = LogEntry::payloads(&state.pool, &query.machine, &query.source, &ids).await?;
    Ok(Json(MsgResponse::new(payloads)))
}
