//! Node (collector agent) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Node {
    pub id: Uuid,
    pub name: String,
    pub agent_version: Option<String>,
    #[serde(skip_serializing)]
    pub token_hash: Option<String>,
    /// Collector start time. Entries earlier than this plus a short grace
    /// window are startup noise and excluded from the analysis feed.
    pub init_time: DateTime<Utc>,
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterNodeRequest {
    #[validate(length(min = 1, max = 255))]
    pub node_name: String,
    #[validate(length(min = 1))]
    pub agent_key: String,
    pub agent_version: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterNodeResponse {
    pub token: String,
    pub server_time: i64,
}

impl Node {
    /// Register (or re-register) a collector node.
    ///
    /// Re-registration rotates the token and re-stamps `init_time`: the
    /// node is starting over, so its previous init marker is obsolete.
    pub async fn register(
        pool: &PgPool,
        name: &str,
        agent_version: &str,
        token_hash: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Node>(
            r#"
            INSERT INTO nodes (name, agent_version, token_hash, init_time, last_seen)
            VALUES ($1, $2, $3, NOW(), NOW())
            ON CONFLICT (name) DO UPDATE SET
                agent_version = EXCLUDED.agent_version,
                token_hash = EXCLUDED.token_hash,
                init_time = NOW(),
                last_seen = NOW(),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(agent_version)
        .bind(token_hash)
        .fetch_one(pool)
        .await
    }

    /// Drop every stored entry in this node's namespace. Called at
    /// registration so a restarted collector starts from a clean slate;
    /// other nodes' data is untouched.
    pub async fn reset_entries(pool: &PgPool, node_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM log_entries WHERE node_id = $1")
            .bind(node_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn find_by_token_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Node>("SELECT * FROM nodes WHERE token_hash = $1")
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    pub async fn touch(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE nodes SET last_seen = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
