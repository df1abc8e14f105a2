//! Collect Cycle Loop
//!
//! The poll scheduler driving one discover → diff → extract → classify →
//! upload pass per tick. Files are processed sequentially, one cycle at a
//! time; the loop task owns the tracker outright so its state needs no
//! locking. If a cycle overruns the interval the next one starts
//! immediately. Best-effort pacing, not a strict period.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use super::cloud_sync::{build_batch, logical_table_name, CloudClient, EntryBatch};
use super::config::CollectorConfig;
use super::severity::SeverityRules;
use super::tailer;
use super::tracker::{FileChange, FileTracker, TrackError};

/// Transport boundary for one batch upload.
///
/// The HTTP client is the production implementation; tests substitute an
/// in-memory transport to observe batches and inject failures.
pub trait BatchTransport {
    fn upload(
        &self,
        batch: &EntryBatch,
    ) -> impl std::future::Future<Output = Result<usize, super::cloud_sync::CloudError>> + Send;
}

impl BatchTransport for CloudClient {
    async fn upload(
        &self,
        batch: &EntryBatch,
    ) -> Result<usize, super::cloud_sync::CloudError> {
        self.sync_entries(&batch.source, &batch.entries)
            .await
            .map(|resp| resp.inserted_count)
    }
}

pub struct CollectLoop<T> {
    node_name: String,
    log_roots: Vec<PathBuf>,
    poll_interval: Duration,
    rules: SeverityRules,
    tracker: FileTracker,
    transport: T,
}

impl<T: BatchTransport> CollectLoop<T> {
    pub fn new(config: &CollectorConfig, rules: SeverityRules, transport: T) -> Self {
        Self {
            node_name: config.node_name.clone(),
            log_roots: config.log_roots.clone(),
            poll_interval: Duration::from_secs(config.poll_interval_secs.max(1)),
            rules,
            tracker: FileTracker::new(),
            transport,
        }
    }

    /// Run cycles for the process lifetime. Termination is external.
    pub async fn run(mut self) {
        log::info!(
            "Collect loop started (interval: {:?}, roots: {})",
            self.poll_interval,
            self.log_roots.len()
        );

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.run_cycle().await;
        }
    }

    /// One full pass over discovery and every tracked file.
    pub async fn run_cycle(&mut self) {
        self.tracker.discover(&self.log_roots);

        for path in self.tracker.paths() {
            match self.process_file(&path).await {
                Ok(()) => {}
                Err(TrackError::FileGone(_)) => {
                    log::warn!("{} no longer exists on this machine", path.display());
                    self.tracker.remove(&path);
                }
                Err(e @ TrackError::Io(..)) => {
                    // transient read failure: skip this file, keep the cycle going
                    log::warn!("skipping this cycle: {}", e);
                }
            }
        }
    }

    async fn process_file(&mut self, path: &Path) -> Result<(), TrackError> {
        let diff = self.tracker.diff(path)?;

        let skip_lines = match diff.change {
            FileChange::None => return Ok(()),
            FileChange::Append(_) => {
                self.tracker.get(path).map(|f| f.last_line_count).unwrap_or(0)
            }
            FileChange::Reset => {
                log::info!("{} shrank, re-reading full content", path.display());
                0
            }
        };

        let lines = tailer::extract_new(path, skip_lines)?;
        if lines.is_empty() {
            return Ok(());
        }

        let source = logical_table_name(&self.node_name, path);
        let batch = build_batch(&source, &lines, &self.rules, Utc::now());

        let upload_ok = match self.transport.upload(&batch).await {
            Ok(count) => {
                log::debug!("{} | {} lines uploaded", batch.source, count);
                true
            }
            Err(e) => {
                log::warn!("upload failed for {}: {} - will resend next cycle", batch.source, e);
                false
            }
        };

        self.tracker.apply_upload_outcome(path, diff.total, upload_ok);
        Ok(())
    }

    #[cfg(test)]
    pub fn tracker(&self) -> &FileTracker {
        &self.tracker
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }
}
