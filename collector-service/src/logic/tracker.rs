//! File Tracker
//!
//! Theo dõi trạng thái từng log file: đường dẫn, số dòng đã thấy, cờ lỗi
//! upload. Phát hiện file mới, file lớn lên, file bị truncate/rotate, file
//! biến mất.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use crate::constants::SKIPPED_SUFFIXES;

/// Per-file tracking state.
///
/// `last_line_count` only moves forward once a cycle for the file completed
/// cleanly; `last_error` carries the upload outcome into the next cycle so
/// a failed range is re-sent instead of skipped.
#[derive(Debug, Clone)]
pub struct TrackedFile {
    pub path: PathBuf,
    pub last_line_count: usize,
    pub last_error: bool,
}

/// How a file changed since the previous cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChange {
    /// Line count unchanged. No extraction, no batch.
    None,
    /// File grew by this many lines.
    Append(usize),
    /// Line count shrank: the file was truncated or rotated, the full
    /// current content counts as new.
    Reset,
}

/// Result of one diff pass over a tracked file.
#[derive(Debug, Clone, Copy)]
pub struct FileDiff {
    /// Total lines currently in the file.
    pub total: usize,
    pub change: FileChange,
}

/// Local tracking errors. Neither variant is fatal to a cycle.
#[derive(Debug)]
pub enum TrackError {
    /// The file vanished between cycles: stop tracking it.
    FileGone(PathBuf),
    /// Any other read failure (permissions, transient I/O): skip the file
    /// for this cycle only.
    Io(PathBuf, std::io::Error),
}

impl std::fmt::Display for TrackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileGone(p) => write!(f, "{} no longer exists on this machine", p.display()),
            Self::Io(p, e) => write!(f, "failed to read {}: {}", p.display(), e),
        }
    }
}

impl std::error::Error for TrackError {}

/// The tracked-file set. Owned exclusively by the poll cycle task; nothing
/// else mutates it, so no locking is involved.
#[derive(Debug, Default)]
pub struct FileTracker {
    files: BTreeMap<PathBuf, TrackedFile>,
}

impl FileTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the configured roots and pick up files not yet tracked.
    ///
    /// A root that is a directory is listed flat (one level, no recursion);
    /// a root that is itself a file is tracked directly. Names ending in a
    /// reserved temp suffix are skipped. Newly discovered files start at
    /// line count 0 so their whole current content is treated as new.
    /// Returns the paths added this pass.
    pub fn discover(&mut self, roots: &[PathBuf]) -> Vec<PathBuf> {
        let mut added = Vec::new();
        for root in roots {
            if root.is_file() {
                self.track_if_new(root, &mut added);
            } else if root.is_dir() {
                let entries = match std::fs::read_dir(root) {
                    Ok(entries) => entries,
                    Err(e) => {
                        log::warn!("cannot list {}: {}", root.display(), e);
                        continue;
                    }
                };
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.is_file() {
                        self.track_if_new(&path, &mut added);
                    }
                }
            }
        }
        added
    }

    fn track_if_new(&mut self, path: &Path, added: &mut Vec<PathBuf>) {
        if self.files.contains_key(path) || is_skipped(path) {
            return;
        }
        log::info!("tracking new log file: {}", path.display());
        self.files.insert(
            path.to_path_buf(),
            TrackedFile {
                path: path.to_path_buf(),
                last_line_count: 0,
                last_error: false,
            },
        );
        added.push(path.to_path_buf());
    }

    /// Re-count the file's lines and compare with the last seen count.
    pub fn diff(&self, path: &Path) -> Result<FileDiff, TrackError> {
        let tracked = self
            .files
            .get(path)
            .ok_or_else(|| TrackError::FileGone(path.to_path_buf()))?;
        let total = count_lines(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TrackError::FileGone(path.to_path_buf()),
            _ => TrackError::Io(path.to_path_buf(), e),
        })?;

        let change = if total == tracked.last_line_count {
            FileChange::None
        } else if total > tracked.last_line_count {
            FileChange::Append(total - tracked.last_line_count)
        } else {
            FileChange::Reset
        };
        Ok(FileDiff { total, change })
    }

    /// Record the upload outcome for a file whose batch was just sent.
    ///
    /// The count adopts the new total only when the previous cycle's flag
    /// was clear AND the current upload succeeded; the flag then takes the
    /// current outcome. A failed upload leaves the count untouched so the
    /// next diff re-covers the unsent range, and the first success after a
    /// failure is re-sent once more before the count advances.
    pub fn apply_upload_outcome(&mut self, path: &Path, new_total: usize, upload_ok: bool) {
        if let Some(tracked) = self.files.get_mut(path) {
            if upload_ok && !tracked.last_error {
                tracked.last_line_count = new_total;
            }
            tracked.last_error = !upload_ok;
        }
    }

    /// Drop a file from tracking (confirmed gone).
    pub fn remove(&mut self, path: &Path) {
        if self.files.remove(path).is_some() {
            log::info!("stopped tracking {}", path.display());
        }
    }

    pub fn get(&self, path: &Path) -> Option<&TrackedFile> {
        self.files.get(path)
    }

    /// Snapshot of tracked paths, in stable order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn is_skipped(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    SKIPPED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Count lines without allocating per-line strings. A trailing chunk with
/// no newline still counts as a line, matching the extraction pass.
fn count_lines(path: &Path) -> std::io::Result<usize> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut buf = Vec::new();
    let mut count = 0usize;
    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf)?;
        if read == 0 {
            break;
        }
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_lines(path: &Path, lines: &[&str]) {
        let mut f = File::create(path).unwrap();
        for line in lines {
            writeln!(f, "{}", line).unwrap();
        }
    }

    #[test]
    fn discover_tracks_plain_files_and_skips_temp_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        write_lines(&dir.path().join("app.log"), &["a"]);
        write_lines(&dir.path().join("app.log.swp"), &["x"]);
        write_lines(&dir.path().join("scratch.tmp"), &["x"]);
        write_lines(&dir.path().join("backup~"), &["x"]);

        let mut tracker = FileTracker::new();
        let added = tracker.discover(&[dir.path().to_path_buf()]);

        assert_eq!(added, vec![dir.path().join("app.log")]);
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.get(&dir.path().join("app.log")).unwrap().last_line_count, 0);
    }

    #[test]
    fn discover_accepts_a_file_root_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("messages");
        write_lines(&file, &["boot"]);

        let mut tracker = FileTracker::new();
        assert_eq!(tracker.discover(&[file.clone()]).len(), 1);
        assert!(tracker.discover(&[file.clone()]).is_empty());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn diff_reports_growth() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("grow.log");
        write_lines(&file, &["1", "2", "3"]);

        let mut tracker = FileTracker::new();
        tracker.discover(&[file.clone()]);
        tracker.apply_upload_outcome(&file, 3, true);

        write_lines(&file, &["1", "2", "3", "4", "5"]);
        let diff = tracker.diff(&file).unwrap();
        assert_eq!(diff.total, 5);
        assert_eq!(diff.change, FileChange::Append(2));
    }

    #[test]
    fn diff_reports_truncation_as_reset() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("rotate.log");
        write_lines(&file, &["a"; 50]);

        let mut tracker = FileTracker::new();
        tracker.discover(&[file.clone()]);
        tracker.apply_upload_outcome(&file, 50, true);

        write_lines(&file, &["b"; 10]);
        let diff = tracker.diff(&file).unwrap();
        assert_eq!(diff.total, 10);
        assert_eq!(diff.change, FileChange::Reset);
    }

    #[test]
    fn diff_reports_no_change() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("idle.log");
        write_lines(&file, &["a", "b"]);

        let mut tracker = FileTracker::new();
        tracker.discover(&[file.clone()]);
        tracker.apply_upload_outcome(&file, 2, true);

        let diff = tracker.diff(&file).unwrap();
        assert_eq!(diff.change, FileChange::None);
    }

    #[test]
    fn diff_on_missing_file_is_file_gone() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("gone.log");
        write_lines(&file, &["a"]);

        let mut tracker = FileTracker::new();
        tracker.discover(&[file.clone()]);
        std::fs::remove_file(&file).unwrap();

        match tracker.diff(&file) {
            Err(TrackError::FileGone(p)) => assert_eq!(p, file),
            other => panic!("expected FileGone, got {:?}", other.map(|d| d.change)),
        }
        tracker.remove(&file);
        assert!(tracker.is_empty());
    }

    #[test]
    fn failed_upload_suppresses_count_advancement() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("retry.log");
        write_lines(&file, &["a", "b", "c"]);

        let mut tracker = FileTracker::new();
        tracker.discover(&[file.clone()]);

        tracker.apply_upload_outcome(&file, 3, false);
        assert_eq!(tracker.get(&file).unwrap().last_line_count, 0);
        assert!(tracker.get(&file).unwrap().last_error);

        // next cycle re-covers the same range
        let diff = tracker.diff(&file).unwrap();
        assert_eq!(diff.change, FileChange::Append(3));
    }

    #[test]
    fn first_success_after_failure_advances_one_cycle_late() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("lag.log");
        write_lines(&file, &["a", "b"]);

        let mut tracker = FileTracker::new();
        tracker.discover(&[file.clone()]);

        tracker.apply_upload_outcome(&file, 2, false);
        // upload recovered, but the stale error flag holds the count back
        tracker.apply_upload_outcome(&file, 2, true);
        assert_eq!(tracker.get(&file).unwrap().last_line_count, 0);
        // the following clean cycle finally advances
        tracker.apply_upload_outcome(&file, 2, true);
        assert_eq!(tracker.get(&file).unwrap().last_line_count, 2);
    }
}
