//! Collector Configuration
//!
//! Environment-driven startup parameters plus severity rule loading. Rule
//! validation is the one fatal path: the collector must not classify
//! anything without both keyword tiers defined.

use std::path::PathBuf;

use crate::constants;
use crate::logic::severity::SeverityRules;

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Node identifier used as the storage namespace. Defaults to hostname.
    pub node_name: String,
    pub server_url: String,
    pub agent_key: String,
    /// Roots scanned each cycle: directories (flat) or single files.
    pub log_roots: Vec<PathBuf>,
    pub poll_interval_secs: u64,
    pub upload_timeout_secs: u64,
    /// Optional JSON rules file; the built-in rule set is used when unset.
    pub rules_path: Option<PathBuf>,
}

impl CollectorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let node_name = std::env::var("LOGHAWK_NODE_NAME").unwrap_or_else(|_| {
            hostname::get()
                .map(|h| h.to_string_lossy().to_string())
                .unwrap_or_else(|_| "unknown".to_string())
        });

        let log_roots = std::env::var("LOGHAWK_LOG_ROOTS")
            .unwrap_or_else(|_| constants::DEFAULT_LOG_ROOTS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();

        Self {
            node_name,
            server_url: constants::get_cloud_url(),
            agent_key: constants::get_agent_key(),
            log_roots,
            poll_interval_secs: constants::get_poll_interval(),
            upload_timeout_secs: constants::get_upload_timeout(),
            rules_path: std::env::var("LOGHAWK_RULES_PATH").ok().map(PathBuf::from),
        }
    }

    /// Load and validate the severity rules.
    ///
    /// A rules file missing either tier fails here and the process must not
    /// start; an absent rules path falls back to the built-in set.
    pub fn load_rules(&self) -> Result<SeverityRules, ConfigError> {
        match &self.rules_path {
            None => Ok(SeverityRules::default()),
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .map_err(|e| ConfigError::RulesUnreadable(path.clone(), e))?;
                SeverityRules::from_json(&raw)
                    .map_err(|e| ConfigError::MalformedRules(path.clone(), e.to_string()))
            }
        }
    }
}

/// Startup configuration errors. Both variants are fatal.
#[derive(Debug)]
pub enum ConfigError {
    RulesUnreadable(PathBuf, std::io::Error),
    MalformedRules(PathBuf, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RulesUnreadable(p, e) => {
                write!(f, "cannot read rules file {}: {}", p.display(), e)
            }
            Self::MalformedRules(p, e) => {
                write!(f, "malformed rules file {}: {}", p.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn rules_file_with_both_tiers_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(f, r#"{{"error": ["boom"], "warn": []}}"#).unwrap();

        let config = CollectorConfig {
            node_name: "n".into(),
            server_url: "http://localhost".into(),
            agent_key: "k".into(),
            log_roots: vec![],
            poll_interval_secs: 1,
            upload_timeout_secs: 30,
            rules_path: Some(path),
        };
        let rules = config.load_rules().unwrap();
        assert_eq!(rules.error, vec!["boom"]);
        assert!(rules.warn.is_empty());
    }

    #[test]
    fn rules_file_missing_a_tier_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(f, r#"{{"error": ["boom"]}}"#).unwrap();

        let config = CollectorConfig {
            node_name: "n".into(),
            server_url: "http://localhost".into(),
            agent_key: "k".into(),
            log_roots: vec![],
            poll_interval_secs: 1,
            upload_timeout_secs: 30,
            rules_path: Some(path),
        };
        assert!(matches!(config.load_rules(), Err(ConfigError::MalformedRules(..))));
    }

    #[test]
    fn absent_rules_path_uses_builtin_set() {
        let config = CollectorConfig {
            node_name: "n".into(),
            server_url: "http://localhost".into(),
            agent_key: "k".into(),
            log_roots: vec![],
            poll_interval_secs: 1,
            upload_timeout_secs: 30,
            rules_path: None,
        };
        let rules = config.load_rules().unwrap();
        assert!(rules.error.contains(&"ERROR".to_string()));
        assert!(rules.warn.contains(&"warn".to_string()));
    }
}
