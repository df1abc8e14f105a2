//! LogHawk Cloud Server
//!
//! Central storage and aggregation for LogHawk collector agents.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     LOGHAWK CLOUD                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────────┐  ┌─────────────────────┐ │
//! │  │  Agent    │  │  Read Façade  │  │  Analysis Exchange  │ │
//! │  │  Ingest   │  │  (detail /    │  │  (feed out,         │ │
//! │  │  (Axum)   │  │   statistics) │  │   results in)       │ │
//! │  └─────┬─────┘  └───────┬───────┘  └──────────┬──────────┘ │
//! │        └────────────────┼─────────────────────┘            │
//! │                         ▼                                  │
//! │                  ┌─────────────┐                           │
//! │                  │ PostgreSQL  │                           │
//! │                  └─────────────┘                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;

use anyhow::Context;
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loghawk_cloud=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("LogHawk Cloud Server starting...");
    tracing::info!(
        "Database: {}",
        config.database_url.split('@').last().unwrap_or("***")
    );

    // Initialize database pool
    let pool = db::create_pool(&config.database_url)
        .await
        .context("Failed to create database pool")?;

    // Run migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    // Build application state
    let state = AppState {
        pool,
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind server address")?;
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::PgPool,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Public routes (no auth required). The read façade is open like the
    // original aggregation API; only ingest needs a token.
    let public_routes = Router::new()
        .route("/health", get(handlers::health::check))
        // Node registration (validates the shared agent key)
        .route("/api/v1/agent/register", post(handlers::agent::register))
        // Read façade
        .route("/api/v1/logs/detail", get(handlers::logs::detail))
        .route("/api/v1/logs/alerts", get(handlers::logs::alerts))
        .route("/api/v1/logs/analysis-feed", get(handlers::logs::analysis_feed))
        .route("/api/v1/logs/entries", get(handlers::logs::entries))
        .route("/api/v1/sources/status", get(handlers::logs::source_status))
        .route("/api/v1/statistics", get(handlers::statistics::statistics))
        // Analysis exchange
        .route(
            "/api/v1/analysis",
            get(handlers::analysis::get).post(handlers::analysis::save),
        );

    // Agent routes (agent token auth) - requires a registered node token
    let agent_routes = Router::new()
        .route("/api/v1/agent/sync/entries", post(handlers::agent::sync_entries))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_agent_auth,
        ));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .merge(agent_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
