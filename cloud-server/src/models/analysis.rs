//! Analysis report model
//!
//! The statistical analysis collaborator is opaque to this system: it reads
//! the analysis feed, computes its burst/distribution results elsewhere and
//! posts them back as one JSON document served to dashboards as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AnalysisReport {
    pub id: i64,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SaveAnalysisRequest {
    pub data: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct SaveAnalysisResponse {
    pub success: bool,
}

impl AnalysisReport {
    pub async fn save(pool: &PgPool, data: &serde_json::Value) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, AnalysisReport>(
            r#"
            INSERT INTO analysis_reports (data)
            VALUES ($1)
            RETURNING *
            "#,
        )
        .bind(data)
        .fetch_one(pool)
        .await
    }

    pub async fn latest(pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, AnalysisReport>(
            "SELECT * FROM analysis_reports ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .fetch_optional(pool)
        .await
    }
}
