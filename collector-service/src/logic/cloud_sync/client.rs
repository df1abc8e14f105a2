//! Cloud API Client
//!
//! HTTP client for communicating with the LogHawk cloud server.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants;

/// Cloud server configuration
#[derive(Debug, Clone)]
pub struct CloudConfig {
    pub server_url: String,
    pub agent_key: String,
    pub timeout_seconds: u64,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            server_url: constants::get_cloud_url(),
            agent_key: constants::get_agent_key(),
            timeout_seconds: constants::get_upload_timeout(),
        }
    }
}

/// Cloud API client
pub struct CloudClient {
    config: CloudConfig,
    node_name: String,
    agent_token: Option<String>,
    http_client: reqwest::Client,
}

// Request/Response types

#[derive(Debug, Serialize)]
pub struct RegisterNodeRequest {
    pub node_name: String,
    pub agent_key: String,
    pub agent_version: String,
}

/// Registration response. Registering also resets the node's own namespace
/// server-side and records the collector's init time.
#[derive(Debug, Deserialize)]
pub struct RegisterNodeResponse {
    pub token: String,
    pub server_time: i64,
}

/// One classified line on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct EntryRecord {
    pub log_id: String,
    pub severity: String,
    pub payload: String,
    /// Extraction time, epoch seconds. Shared by the whole cycle's batch.
    pub time: i64,
}

#[derive(Debug, Serialize)]
pub struct SyncEntriesRequest<'a> {
    pub source: &'a str,
    pub entries: &'a [EntryRecord],
}

#[derive(Debug, Deserialize)]
pub struct SyncEntriesResponse {
    pub inserted_count: usize,
    pub server_time: i64,
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: i64,
}

impl CloudClient {
    /// Create new cloud client
    pub fn new(config: CloudConfig, node_name: String) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            node_name,
            agent_token: None,
            http_client,
        }
    }

    /// Check server health
    pub async fn health_check(&self) -> Result<HealthResponse, CloudError> {
        let url = format!("{}/health", self.config.server_url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| CloudError::NetworkError(e.to_string()))?;

        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|e| CloudError::ParseError(e.to_string()))
        } else {
            Err(CloudError::ServerError(response.status().as_u16()))
        }
    }

    /// Register this node with the cloud server.
    ///
    /// Server-side this clears all previously stored entries for the node
    /// and records the init time used downstream to filter startup noise.
    /// The returned bearer token authenticates every subsequent upload.
    pub async fn register(&mut self) -> Result<RegisterNodeResponse, CloudError> {
        let url = format!("{}/api/v1/agent/register", self.config.server_url);

        let request = RegisterNodeRequest {
            node_name: self.node_name.clone(),
            agent_key: self.config.agent_key.clone(),
            agent_version: constants::APP_VERSION.to_string(),
        };

        log::info!("Registering node '{}' with {}", self.node_name, self.config.server_url);

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| CloudError::NetworkError(e.to_string()))?;

        if response.status().is_success() {
            let result: RegisterNodeResponse = response
                .json()
                .await
                .map_err(|e| CloudError::ParseError(e.to_string()))?;

            self.agent_token = Some(result.token.clone());

            log::info!("Node registered, namespace reset acknowledged");
            Ok(result)
        } else {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            log::error!("Registration failed ({}): {}", status, error_text);
            Err(CloudError::RegistrationFailed(error_text))
        }
    }

    /// Send one batch of classified entries as a single request.
    ///
    /// No retry happens inside this call: a failure is returned to the
    /// caller, which suppresses line-count advancement so the next cycle
    /// re-sends the same range. Re-delivery is safe: the server upserts by
    /// (node, source, log_id).
    pub async fn sync_entries(
        &self,
        source: &str,
        entries: &[EntryRecord],
    ) -> Result<SyncEntriesResponse, CloudError> {
        let token = self.agent_token.as_ref().ok_or(CloudError::NotRegistered)?;

        let url = format!("{}/api/v1/agent/sync/entries", self.config.server_url);
        let request = SyncEntriesRequest { source, entries };

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(&request)
            .send()
            .await
            .map_err(|e| CloudError::NetworkError(e.to_string()))?;

        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|e| CloudError::ParseError(e.to_string()))
        } else {
            Err(CloudError::ServerError(response.status().as_u16()))
        }
    }
}

/// Cloud client errors
#[derive(Debug, Clone)]
pub enum CloudError {
    NetworkError(String),
    ServerError(u16),
    ParseError(String),
    NotRegistered,
    RegistrationFailed(String),
}

impl std::fmt::Display for CloudError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError(e) => write!(f, "Network error: {}", e),
            Self::ServerError(code) => write!(f, "Server error: {}", code),
            Self::ParseError(e) => write!(f, "Parse error: {}", e),
            Self::NotRegistered => write!(f, "Node not registered"),
            Self::RegistrationFailed(e) => write!(f, "Registration failed: {}", e),
        }
    }
}

impl std::error::Error for CloudError {}
