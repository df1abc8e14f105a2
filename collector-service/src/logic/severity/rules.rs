//! Severity Rule Sets
//!
//! Keyword tiers and their validation. No classify logic here.

use serde::{Deserialize, Serialize};

/// Keyword tiers for classification.
///
/// Matching is case-sensitive and exact as configured: the default set
/// spells out the case variants that show up in real logs instead of
/// case-folding at match time. Both tiers are required fields: a rules
/// file missing either one fails to parse and must abort startup, even
/// though an empty keyword list is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeverityRules {
    pub error: Vec<String>,
    pub warn: Vec<String>,
}

impl Default for SeverityRules {
    fn default() -> Self {
        Self {
            error: [
                "error", "Error", "ERROR", "fail", "fatal", "Fatal", "Critical", "critical",
                "CRITICAL",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            warn: ["Warn", "warn"].iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SeverityRules {
    /// Parse a rules file. Serde enforces that both tiers are present.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
