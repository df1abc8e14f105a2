//! Tail Engine
//!
//! Đọc phần nội dung mới của một log file theo kết quả diff. Mỗi lần gọi
//! đều mở lại file từ đĩa, không giữ file handle giữa các cycle, nên một
//! file đang bị rotate có thể cho kết quả đọc không nhất quán; điều đó được
//! chấp nhận, chỉ coi là lỗi khi file biến mất hẳn.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use super::tracker::TrackError;

/// Extract the lines past the already-seen prefix, in file order.
///
/// For an APPEND diff the caller passes the previous line count so exactly
/// the newly appended lines come back; for RESET it passes 0 and the whole
/// file is re-read. Line terminators are stripped; invalid UTF-8 is
/// replaced lossily rather than failing the file.
pub fn extract_new(path: &Path, skip_lines: usize) -> Result<Vec<String>, TrackError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => TrackError::FileGone(path.to_path_buf()),
        _ => TrackError::Io(path.to_path_buf(), e),
    })?;

    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    let mut index = 0usize;
    let mut lines = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| TrackError::Io(path.to_path_buf(), e))?;
        if read == 0 {
            break;
        }
        if index >= skip_lines {
            let mut line = String::from_utf8_lossy(&buf).into_owned();
            while line.ends_with('\n') || line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }
        index += 1;
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn append_returns_exactly_the_new_suffix_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grow.log");
        let mut f = File::create(&path).unwrap();
        for i in 1..=53 {
            writeln!(f, "line {}", i).unwrap();
        }

        // previous count 50, file now 53: exactly lines 51-53
        let lines = extract_new(&path, 50).unwrap();
        assert_eq!(lines, vec!["line 51", "line 52", "line 53"]);
    }

    #[test]
    fn reset_returns_the_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rotate.log");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "first").unwrap();
        writeln!(f, "second").unwrap();

        let lines = extract_new(&path, 0).unwrap();
        assert_eq!(lines, vec!["first", "second"]);
    }

    #[test]
    fn trailing_unterminated_line_is_included() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.log");
        let mut f = File::create(&path).unwrap();
        write!(f, "done\nstill writing").unwrap();

        let lines = extract_new(&path, 0).unwrap();
        assert_eq!(lines, vec!["done", "still writing"]);
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.log");
        let mut f = File::create(&path).unwrap();
        f.write_all(b"ok\n\xff\xfe broken\n").unwrap();

        let lines = extract_new(&path, 0).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "ok");
        assert!(lines[1].contains("broken"));
    }

    #[test]
    fn missing_file_maps_to_file_gone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.log");
        assert!(matches!(extract_new(&path, 0), Err(TrackError::FileGone(_))));
    }
}
