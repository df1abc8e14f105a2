//! Database module - PostgreSQL connection and migrations

use sqlx::{postgres::PgPoolOptions, PgPool};

/// Create database connection pool
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Create tables if not exist
    sqlx::query(SCHEMA_SQL).execute(pool).await?;

    tracing::info!("Database schema applied successfully");
    Ok(())
}

/// Database schema SQL
const SCHEMA_SQL: &str = r#"
-- Collector nodes (one row per machine)
CREATE TABLE IF NOT EXISTS nodes (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL UNIQUE,
    agent_version VARCHAR(50),
    token_hash VARCHAR(255),
    init_time TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    last_seen TIMESTAMPTZ,
    created_at TIMESTAMPTZ DEFAULT NOW(),
    updated_at TIMESTAMPTZ DEFAULT NOW()
);

-- Classified log entries (synced from agents)
-- Identity is keyed per logical table: re-sent rows upsert, never duplicate.
CREATE TABLE IF NOT EXISTS log_entries (
    id BIGSERIAL PRIMARY KEY,
    node_id UUID NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
    source VARCHAR(150) NOT NULL,
    log_id VARCHAR(64) NOT NULL,
    severity VARCHAR(10) NOT NULL,
    payload TEXT NOT NULL,
    time TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ DEFAULT NOW(),
    UNIQUE (node_id, source, log_id)
);

-- Results posted back by the analysis collaborator
CREATE TABLE IF NOT EXISTS analysis_reports (
    id BIGSERIAL PRIMARY KEY,
    data JSONB NOT NULL,
    created_at TIMESTAMPTZ DEFAULT NOW()
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_entries_node_source ON log_entries(node_id, source);
CREATE INDEX IF NOT EXISTS idx_entries_time ON log_entries(time);
CREATE INDEX IF NOT EXISTS idx_entries_severity ON log_entries(severity, time);
CREATE INDEX IF NOT EXISTS idx_nodes_token ON nodes(token_hash);
"#;
