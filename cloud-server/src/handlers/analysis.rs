//! Analysis report handlers

use axum::extract::State;
use axum::Json;
use serde_json::json;
use validator::Validate;

use crate::models::{AnalysisReport, SaveAnalysisRequest, SaveAnalysisResponse};
use crate::{AppResult, AppState};

/// Latest analysis results, or an empty document before the first save.
pub async fn get(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let report = AnalysisReport::latest(&state.pool).await?;
    Ok(Json(report.map(|r| r.data).unwrap_or_else(|| json!({}))))
}

/// Store a new analysis document posted by the analysis collaborator.
pub async fn save(
    State(state): State<AppState>,
    Json(req): Json<SaveAnalysisRequest>,
) -> AppResult<Json<SaveAnalysisResponse>> {
    req.validate()?;

    let report = AnalysisReport::save(&state.pool, &req.data).await?;
    tracing::info!("Analysis report {} stored", report.id);

    Ok(Json(SaveAnalysisResponse { success: true }))
}
