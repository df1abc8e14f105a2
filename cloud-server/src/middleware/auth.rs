//! Authentication middleware

use axum::{
    extract::{FromRequestParts, Request, State},
    http::header::AUTHORIZATION,
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::Node;
use crate::{AppError, AppState};

/// Agent context extracted from the bearer token
#[derive(Debug, Clone)]
pub struct AgentContext {
    pub node_id: Uuid,
    pub node_name: String,
}

/// Middleware: Require agent token authentication
pub async fn require_agent_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&req)?;

    // Tokens are stored hashed; look the node up by hash
    let token_hash = hash_token(&token);
    let node = Node::find_by_token_hash(&state.pool, &token_hash)
        .await
        .map_err(|_| AppError::InternalError("Database error".to_string()))?
        .ok_or(AppError::Unauthorized)?;

    let agent_ctx = AgentContext {
        node_id: node.id,
        node_name: node.name,
    };

    req.extensions_mut().insert(agent_ctx);

    Ok(next.run(req).await)
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(req: &Request) -> Result<String, AppError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AppError::Unauthorized)?
        .to_str()
        .map_err(|_| AppError::Unauthorized)?;

    if !auth_header.starts_with("Bearer ") {
        return Err(AppError::Unauthorized);
    }

    Ok(auth_header[7..].to_string())
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

// Implement FromRequestParts for AgentContext
#[axum::async_trait]
impl<S> FromRequestParts<S> for AgentContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AgentContext>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
