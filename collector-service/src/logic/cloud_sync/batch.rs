//! Batch Construction
//!
//! Đóng gói các dòng mới của một file trong một cycle thành một batch:
//! phân loại từng dòng, gán identity và timestamp chung, suy ra tên logical
//! table cho phía storage.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::path::Path;

use super::client::EntryRecord;
use crate::constants::{TABLE_HASH_LEN, TABLE_NAME_LIMIT};
use crate::logic::severity::{classify, SeverityRules};

/// The newly extracted, classified lines of one file in one poll cycle.
pub struct EntryBatch {
    pub source: String,
    pub entries: Vec<EntryRecord>,
}

/// Build the upload batch for one file.
///
/// Identity is `<extraction-epoch-seconds>-<intra-batch-sequence>`: the
/// timestamp alone is not unique when several lines land in the same tick,
/// and colliding identities would silently overwrite each other in storage.
/// Every entry shares the cycle start timestamp; granularity is per poll
/// cycle, not per line.
pub fn build_batch(
    source: &str,
    lines: &[String],
    rules: &SeverityRules,
    cycle_time: DateTime<Utc>,
) -> EntryBatch {
    let epoch = cycle_time.timestamp();
    let entries = lines
        .iter()
        .enumerate()
        .map(|(seq, line)| EntryRecord {
            log_id: format!("{}-{}", epoch, seq),
            severity: classify(line, rules).as_str().to_string(),
            payload: line.clone(),
            time: epoch,
        })
        .collect();

    EntryBatch {
        source: source.to_string(),
        entries,
    }
}

/// Derive the logical table name for a file path.
///
/// The storage layer namespaces entries per (node, source) and caps the
/// combined identifier length. When `node + path` would not fit, the path
/// is truncated and a short hex fragment of its SHA-256 is appended so two
/// distinct long paths never collapse into the same name.
pub fn logical_table_name(node: &str, path: &Path) -> String {
    let full = path.to_string_lossy();
    if node.len() + full.len() <= TABLE_NAME_LIMIT {
        return full.into_owned();
    }

    let budget = TABLE_NAME_LIMIT
        .saturating_sub(node.len())
        .saturating_sub(TABLE_HASH_LEN);
    let mut prefix: String = String::with_capacity(budget);
    for ch in full.chars() {
        if prefix.len() + ch.len_utf8() > budget {
            break;
        }
        prefix.push(ch);
    }

    let digest = Sha256::digest(full.as_bytes());
    let fragment = &hex::encode(digest)[..TABLE_HASH_LEN];
    format!("{}{}", prefix, fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn identities_combine_cycle_epoch_and_sequence() {
        let rules = SeverityRules::default();
        let cycle = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let lines = vec!["a".to_string(), "b".to_string(), "c".to_string()];

        let batch = build_batch("/var/log/messages", &lines, &rules, cycle);

        let ids: Vec<&str> = batch.entries.iter().map(|e| e.log_id.as_str()).collect();
        assert_eq!(ids, vec!["1700000000-0", "1700000000-1", "1700000000-2"]);
        assert!(batch.entries.iter().all(|e| e.time == 1_700_000_000));
    }

    #[test]
    fn batch_classifies_each_line_once() {
        let rules = SeverityRules::default();
        let cycle = Utc::now();
        let lines = vec![
            "service listening".to_string(),
            "warn: queue backlog".to_string(),
            "ERROR disk full".to_string(),
        ];

        let batch = build_batch("svc", &lines, &rules, cycle);
        let severities: Vec<&str> = batch.entries.iter().map(|e| e.severity.as_str()).collect();
        assert_eq!(severities, vec!["NORMAL", "WARN", "ERROR"]);
        assert_eq!(batch.entries[2].payload, "ERROR disk full");
    }

    #[test]
    fn short_paths_pass_through_untouched() {
        let name = logical_table_name("m1", Path::new("/var/log/messages"));
        assert_eq!(name, "/var/log/messages");
    }

    #[test]
    fn long_paths_are_truncated_within_the_limit() {
        let long = PathBuf::from(format!("/var/log/containers/{}.log", "x".repeat(200)));
        let name = logical_table_name("node-1", &long);
        assert!("node-1".len() + name.len() <= TABLE_NAME_LIMIT);
    }

    #[test]
    fn distinct_long_paths_stay_distinct() {
        // identical prefix far beyond the budget, different tails
        let shared = format!("/var/log/containers/{}", "p".repeat(150));
        let a = PathBuf::from(format!("{}-alpha.log", shared));
        let b = PathBuf::from(format!("{}-beta.log", shared));

        let name_a = logical_table_name("node-1", &a);
        let name_b = logical_table_name("node-1", &b);
        assert_ne!(name_a, name_b, "hash fragment must disambiguate");
    }
}
