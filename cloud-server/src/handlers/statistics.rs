//! Statistics view

use axum::extract::{Query, State};
use axum::Json;

use crate::models::{LogEntry, SourceFilter, Statistics};
use crate::{AppResult, AppState};

/// Hourly per-severity counts, the input series for anomaly detection.
/// Optional `machine` + `source` narrow to one logical table.
pub async fn statistics(
    State(state): State<AppState>,
    Query(filter): Query<SourceFilter>,
) -> AppResult<Json<Statistics>> {
    let stats = LogEntry::statistics(&state.pool, &filter).await?;
    Ok(Json(stats))
}
