//! Severity Classification
//!
//! Pure keyword-rule tagging of raw log lines. No I/O, no state.

mod classifier;
mod rules;

pub use classifier::classify;
pub use rules::SeverityRules;

use serde::{Deserialize, Serialize};

/// Severity tier of a single log line.
///
/// Escalation-only: a line matching both tiers is ERROR, never downgraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Normal,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Normal => "NORMAL",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
