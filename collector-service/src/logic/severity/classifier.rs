//! Severity Classifier
//!
//! Chỉ chứa hàm classify thuần. Types và rule data nằm ở module cha.
//! Input: raw line + keyword tiers. Output: Severity.

use super::rules::SeverityRules;
use super::Severity;

/// Classify one log line against the keyword tiers.
///
/// The error tier is scanned first; the first substring match returns
/// ERROR immediately. Only then is the warn tier scanned. ERROR therefore
/// wins over WARN regardless of where either keyword sits in the line.
/// Matching is case-sensitive (the tiers carry their own case variants).
///
/// Pure and deterministic, safe to call from any number of cycles.
pub fn classify(line: &str, rules: &SeverityRules) -> Severity {
    if rules.error.iter().any(|kw| line.contains(kw.as_str())) {
        return Severity::Error;
    }
    if rules.warn.iter().any(|kw| line.contains(kw.as_str())) {
        return Severity::Warn;
    }
    Severity::Normal
}
