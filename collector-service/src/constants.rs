//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change the default cloud server, only edit this file.

/// Default Cloud Server URL
///
/// This is the fallback URL when no environment variable is set.
pub const DEFAULT_CLOUD_URL: &str = "http://localhost:8080";

/// Default agent key (shared secret presented at registration)
pub const DEFAULT_AGENT_KEY: &str = "dev-agent-secret-change-in-production-789012";

/// Default poll interval (seconds) between tail cycles
pub const DEFAULT_POLL_INTERVAL: u64 = 1;

/// Default upload timeout (seconds) for one batch request
pub const DEFAULT_UPLOAD_TIMEOUT: u64 = 30;

/// Default log roots scanned every cycle. A root that is a directory is
/// listed flat (one level); a root that is a file is tracked directly.
pub const DEFAULT_LOG_ROOTS: &str = "/var/log/containers,/var/log/messages";

/// File name suffixes excluded from discovery (editor/temp artifacts)
pub const SKIPPED_SUFFIXES: &[&str] = &[".swp", ".tmp", "~"];

/// Maximum byte length of `<node> + <logical table name>` accepted by the
/// storage layer. Longer names are truncated and disambiguated with a hash
/// fragment.
pub const TABLE_NAME_LIMIT: usize = 120;

/// Length of the hex hash fragment appended to truncated table names
pub const TABLE_HASH_LEN: usize = 10;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get cloud server URL from environment or use default
pub fn get_cloud_url() -> String {
    std::env::var("LOGHAWK_SERVER_URL").unwrap_or_else(|_| DEFAULT_CLOUD_URL.to_string())
}

/// Get agent key from environment or use default
pub fn get_agent_key() -> String {
    std::env::var("LOGHAWK_AGENT_KEY").unwrap_or_else(|_| DEFAULT_AGENT_KEY.to_string())
}

/// Get poll interval from environment or use default
pub fn get_poll_interval() -> u64 {
    std::env::var("LOGHAWK_POLL_INTERVAL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_POLL_INTERVAL)
}

/// Get upload timeout from environment or use default
pub fn get_upload_timeout() -> u64 {
    std::env::var("LOGHAWK_UPLOAD_TIMEOUT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_UPLOAD_TIMEOUT)
}
