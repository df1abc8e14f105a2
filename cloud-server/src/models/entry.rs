//! Log entry model and aggregate queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Default number of entries served per logical source on the detail view
const DETAIL_PER_SOURCE: i64 = 100;

/// Number of entries on the recent-alerts view
const ALERTS_LIMIT: i64 = 100;

/// Seconds after a collector's init time during which its entries are
/// considered startup noise and excluded from the analysis feed
const INIT_GRACE_SECS: i32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LogEntry {
    pub id: i64,
    pub node_id: Uuid,
    pub source: String,
    pub log_id: String,
    pub severity: String,
    pub payload: String,
    pub time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// One classified line as shipped by an agent.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct EntryIn {
    #[validate(length(min = 1, max = 64))]
    pub log_id: String,
    #[validate(custom(function = "validate_severity"))]
    pub severity: String,
    pub payload: String,
    /// Extraction time, epoch seconds
    pub time: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SyncEntriesRequest {
    #[validate(length(min = 1, max = 150))]
    pub source: String,
    #[validate(length(min = 1, max = 10000), nested)]
    pub entries: Vec<EntryIn>,
}

#[derive(Debug, Serialize)]
pub struct SyncEntriesResponse {
    pub inserted_count: usize,
    pub server_time: i64,
}

/// Optional narrowing to one logical table. The original API accepted
/// either no parameters or both.
#[derive(Debug, Deserialize, Default)]
pub struct SourceFilter {
    pub machine: Option<String>,
    pub source: Option<String>,
}

impl SourceFilter {
    pub fn as_pair(&self) -> Option<(&str, &str)> {
        match (&self.machine, &self.source) {
            (Some(m), Some(s)) => Some((m.as_str(), s.as_str())),
            _ => None,
        }
    }
}

/// Entry metadata served by the read views (payload omitted).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EntryMeta {
    pub log_id: String,
    pub time: DateTime<Utc>,
    pub severity: String,
    pub machine: String,
    pub source: String,
}

/// Latest-entry marker for one logical source.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SourceStatus {
    pub time: DateTime<Utc>,
    pub severity: String,
    pub machine: String,
    pub source: String,
}

/// Identity/payload pair for point lookups.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EntryPayload {
    pub log_id: String,
    pub payload: String,
}

/// One hourly severity bucket as stored in the statistics view.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StatBucket {
    /// Hour bucket, `YYYY-MM-DD-HH`
    pub time: String,
    pub count: i64,
    pub machine: String,
    pub source: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct StatRow {
    pub time: String,
    pub severity: String,
    pub count: i64,
    pub machine: String,
    pub source: String,
}

/// Hourly counts split by severity tier.
#[derive(Debug, Serialize)]
pub struct Statistics {
    #[serde(rename = "statistics_error")]
    pub error: Vec<StatBucket>,
    #[serde(rename = "statistics_warn")]
    pub warn: Vec<StatBucket>,
    #[serde(rename = "statistics_normal")]
    pub normal: Vec<StatBucket>,
}

fn validate_severity(value: &str) -> Result<(), ValidationError> {
    match value {
        "NORMAL" | "WARN" | "ERROR" => Ok(()),
        _ => Err(ValidationError::new("unknown severity tier")),
    }
}

impl LogEntry {
    /// Insert one entry, upserting on the per-table identity key.
    ///
    /// Agents deliver at-least-once: a resent identity overwrites its own
    /// earlier row instead of duplicating it.
    pub async fn upsert(
        pool: &PgPool,
        node_id: Uuid,
        source: &str,
        entry: &EntryIn,
    ) -> Result<Self, sqlx::Error> {
        let time = DateTime::from_timestamp(entry.time, 0).unwrap_or_else(Utc::now);

        sqlx::query_as::<_, LogEntry>(
            r#"
            INSERT INTO log_entries (node_id, source, log_id, severity, payload, time)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (node_id, source, log_id) DO UPDATE SET
                severity = EXCLUDED.severity,
                payload = EXCLUDED.payload,
                time = EXCLUDED.time
            RETURNING *
            "#,
        )
        .bind(node_id)
        .bind(source)
        .bind(&entry.log_id)
        .bind(&entry.severity)
        .bind(&entry.payload)
        .bind(time)
        .fetch_one(pool)
        .await
    }

    /// Newest entries per logical source (metadata only), optionally
    /// narrowed to one (machine, source) pair.
    pub async fn list_detail(
        pool: &PgPool,
        filter: &SourceFilter,
    ) -> Result<Vec<EntryMeta>, sqlx::Error> {
        match filter.as_pair() {
            Some((machine, source)) => {
                sqlx::query_as::<_, EntryMeta>(
                    r#"
                    SELECT e.log_id, e.time, e.severity, n.name AS machine, e.source
                    FROM log_entries e
                    JOIN nodes n ON n.id = e.node_id
                    WHERE n.name = $1 AND e.source = $2
                    ORDER BY e.time DESC
                    LIMIT $3
                    "#,
                )
                .bind(machine)
                .bind(source)
                .bind(DETAIL_PER_SOURCE)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, EntryMeta>(
                    r#"
                    SELECT log_id, time, severity, machine, source FROM (
                        SELECT e.log_id, e.time, e.severity, n.name AS machine, e.source,
                               ROW_NUMBER() OVER (
                                   PARTITION BY e.node_id, e.source ORDER BY e.time DESC
                               ) AS rn
                        FROM log_entries e
                        JOIN nodes n ON n.id = e.node_id
                    ) ranked
                    WHERE rn <= $1
                    "#,
                )
                .bind(DETAIL_PER_SOURCE)
                .fetch_all(pool)
                .await
            }
        }
    }

    /// Newest 100 WARN/ERROR entries, oldest first.
    pub async fn recent_alerts(pool: &PgPool) -> Result<Vec<EntryMeta>, sqlx::Error> {
        let mut rows = sqlx::query_as::<_, EntryMeta>(
            r#"
            SELECT e.log_id, e.time, e.severity, n.name AS machine, e.source
            FROM log_entries e
            JOIN nodes n ON n.id = e.node_id
            WHERE e.severity IN ('WARN', 'ERROR')
            ORDER BY e.time DESC
            LIMIT $1
            "#,
        )
        .bind(ALERTS_LIMIT)
        .fetch_all(pool)
        .await?;
        rows.reverse();
        Ok(rows)
    }

    /// ERROR entries past each node's init grace window, oldest first.
    /// This is the feed consumed by the analysis collaborator; the grace
    /// window drops lines stamped while the collector was still starting.
    pub async fn analysis_feed(pool: &PgPool) -> Result<Vec<EntryMeta>, sqlx::Error> {
        sqlx::query_as::<_, EntryMeta>(
            r#"
            SELECT e.log_id, e.time, e.severity, n.name AS machine, e.source
            FROM log_entries e
            JOIN nodes n ON n.id = e.node_id
            WHERE e.severity = 'ERROR'
              AND e.time > n.init_time + make_interval(secs => $1)
            ORDER BY e.time ASC
            "#,
        )
        .bind(INIT_GRACE_SECS as f64)
        .fetch_all(pool)
        .await
    }

    /// Payloads for specific identities within one logical table.
    pub async fn payloads(
        pool: &PgPool,
        machine: &str,
        source: &str,
        ids: &[String],
    ) -> Result<Vec<EntryPayload>, sqlx::Error> {
        sqlx::query_as::<_, EntryPayload>(
            r#"
            SELECT e.log_id, e.payload
            FROM log_entries e
            JOIN nodes n ON n.id = e.node_id
            WHERE n.name = $1 AND e.source = $2 AND e.log_id = ANY($3)
            ORDER BY e.time ASC
            "#,
        )
        .bind(machine)
        .bind(source)
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    /// The single newest entry of every logical source.
    pub async fn source_status(pool: &PgPool) -> Result<Vec<SourceStatus>, sqlx::Error> {
        sqlx::query_as::<_, SourceStatus>(
            r#"
            SELECT DISTINCT ON (e.node_id, e.source)
                   e.time, e.severity, n.name AS machine, e.source
            FROM log_entries e
            JOIN nodes n ON n.id = e.node_id
            ORDER BY e.node_id, e.source, e.time DESC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Hourly counts per (source, severity), newest buckets first.
    pub async fn statistics(
        pool: &PgPool,
        filter: &SourceFilter,
    ) -> Result<Statistics, sqlx::Error> {
        let rows = match filter.as_pair() {
            Some((machine, source)) => {
                sqlx::query_as::<_, StatRow>(
                    r#"
                    SELECT to_char(e.time, 'YYYY-MM-DD-HH24') AS time,
                           e.severity, COUNT(*) AS count,
                           n.name AS machine, e.source
                    FROM log_entries e
                    JOIN nodes n ON n.id = e.node_id
                    WHERE n.name = $1 AND e.source = $2
                    GROUP BY 1, e.severity, n.name, e.source
                    ORDER BY 1 DESC
                    "#,
                )
                .bind(machine)
                .bind(source)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, StatRow>(
                    r#"
                    SELECT to_char(e.time, 'YYYY-MM-DD-HH24') AS time,
                           e.severity, COUNT(*) AS count,
                           n.name AS machine, e.source
                    FROM log_entries e
                    JOIN nodes n ON n.id = e.node_id
                    GROUP BY 1, e.severity, n.name, e.source
                    ORDER BY 1 DESC
                    "#,
                )
                .fetch_all(pool)
                .await?
            }
        };
        Ok(partition_stats(rows))
    }
}

/// Split severity-tagged buckets into the three statistics series.
pub fn partition_stats(rows: Vec<StatRow>) -> Statistics {
    let mut stats = Statistics {
        error: Vec::new(),
        warn: Vec::new(),
        normal: Vec::new(),
    };
    for row in rows {
        let bucket = StatBucket {
            time: row.time,
            count: row.count,
            machine: row.machine,
            source: row.source,
        };
        match row.severity.as_str() {
            "ERROR" => stats.error.push(bucket),
            "WARN" => stats.warn.push(bucket),
            _ => stats.normal.push(bucket),
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(severity: &str, time: &str, count: i64) -> StatRow {
        StatRow {
            time: time.to_string(),
            severity: severity.to_string(),
            count,
            machine: "m1".to_string(),
            source: "/var/log/messages".to_string(),
        }
    }

    #[test]
    fn stats_partition_by_severity_tier() {
        let stats = partition_stats(vec![
            row("ERROR", "2026-08-06-10", 3),
            row("WARN", "2026-08-06-10", 7),
            row("NORMAL", "2026-08-06-10", 41),
            row("ERROR", "2026-08-06-09", 1),
        ]);

        assert_eq!(stats.error.len(), 2);
        assert_eq!(stats.warn.len(), 1);
        assert_eq!(stats.normal.len(), 1);
        assert_eq!(stats.error[0].count, 3);
        assert_eq!(stats.warn[0].time, "2026-08-06-10");
    }

    #[test]
    fn sync_request_validation_rejects_bad_severity() {
        let req = SyncEntriesRequest {
            source: "/var/log/messages".to_string(),
            entries: vec![EntryIn {
                log_id: "1700000000-0".to_string(),
                severity: "PANIC".to_string(),
                payload: "boom".to_string(),
                time: 1_700_000_000,
            }],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn sync_request_validation_accepts_wellformed_batch() {
        let req = SyncEntriesRequest {
            source: "/var/log/messages".to_string(),
            entries: vec![
                EntryIn {
                    log_id: "1700000000-0".to_string(),
                    severity: "NORMAL".to_string(),
                    payload: "started".to_string(),
                    time: 1_700_000_000,
                },
                EntryIn {
                    log_id: "1700000000-1".to_string(),
                    severity: "ERROR".to_string(),
                    payload: "ERROR oom".to_string(),
                    time: 1_700_000_000,
                },
            ],
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn sync_request_validation_rejects_empty_batch_and_blank_ids() {
        let empty = SyncEntriesRequest {
            source: "/var/log/messages".to_string(),
            entries: vec![],
        };
        assert!(empty.validate().is_err());

        let blank_id = SyncEntriesRequest {
            source: "/var/log/messages".to_string(),
            entries: vec![EntryIn {
                log_id: "".to_string(),
                severity: "NORMAL".to_string(),
                payload: "x".to_string(),
                time: 1_700_000_000,
            }],
        };
        assert!(blank_id.validate().is_err());
    }

    #[test]
    fn filter_pair_requires_both_parameters() {
        let both = SourceFilter {
            machine: Some("m1".into()),
            source: Some("s".into()),
        };
        assert_eq!(both.as_pair(), Some(("m1", "s")));

        let half = SourceFilter {
            machine: Some("m1".into()),
            source: None,
        };
        assert_eq!(half.as_pair(), None);
        assert_eq!(SourceFilter::default().as_pair(), None);
    }
}
