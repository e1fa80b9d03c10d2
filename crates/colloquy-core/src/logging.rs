//! Per-thread agent I/O logs.
//!
//! Every request sent to an agent and every line it prints can be mirrored to
//! `{log_dir}/{thread_id}.log`. Application logging goes through the `log`
//! facade; these files are the raw transcript of the agent conversation.

use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::Path,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};

/// Thread-safe handle to an append-only log file.
pub type LogHandle = Arc<Mutex<Option<File>>>;

/// Format a UTC time as ISO 8601 with milliseconds (e.g. 2026-02-04T10:15:30.123Z).
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Write a timestamped line to the log file (if present).
pub fn log_line(handle: &LogHandle, direction: &str, data: &str) {
    if let Ok(mut guard) = handle.lock() {
        if let Some(ref mut file) = *guard {
            let ts = format_timestamp(Utc::now());
            let _ = writeln!(file, "[{}] {}: {}", ts, direction, data);
            let _ = file.flush();
        }
    }
}

/// Open (or create) a log file at `{log_dir}/{log_id}.log` and return a shared handle.
///
/// With no directory, or if the file can't be opened, the handle is inert.
pub fn open_log_file(log_dir: Option<&Path>, log_id: &str) -> LogHandle {
    let file = log_dir.and_then(|dir| {
        std::fs::create_dir_all(dir).ok()?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(format!("{}.log", log_id)))
            .map_err(|e| log::warn!("Could not open agent log for {log_id}: {e}"))
            .ok()
    });
    Arc::new(Mutex::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    #[test]
    fn timestamp_format() {
        let at = Utc.with_ymd_and_hms(2026, 2, 4, 10, 15, 30).unwrap()
            + chrono::Duration::milliseconds(123);
        assert_eq!(format_timestamp(at), "2026-02-04T10:15:30.123Z");
    }

    #[test]
    fn timestamp_has_fixed_width() {
        let ts = format_timestamp(Utc::now());
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), 24);
    }

    #[test]
    fn open_log_file_creates_file() {
        let dir = tempdir().unwrap();

        let handle = open_log_file(Some(dir.path()), "thread-1");
        assert!(handle.lock().unwrap().is_some());
        assert!(dir.path().join("thread-1.log").exists());
    }

    #[test]
    fn open_log_file_creates_missing_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("logs").join("agents");

        let handle = open_log_file(Some(&nested), "thread-2");
        assert!(handle.lock().unwrap().is_some());
        assert!(nested.join("thread-2.log").exists());
    }

    #[test]
    fn open_log_file_none_dir() {
        let handle = open_log_file(None, "thread-3");
        assert!(handle.lock().unwrap().is_none());
    }

    #[test]
    fn log_line_appends_lines() {
        let dir = tempdir().unwrap();

        let handle = open_log_file(Some(dir.path()), "thread-4");
        log_line(&handle, "STDIN", "hello world");
        log_line(&handle, "STDOUT", "{\"kind\":\"done\"}");

        let contents = std::fs::read_to_string(dir.path().join("thread-4.log")).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("STDIN: hello world"));
        assert!(lines[1].contains("STDOUT: {\"kind\":\"done\"}"));
    }

    #[test]
    fn log_line_handles_none_file() {
        let handle: LogHandle = Arc::new(Mutex::new(None));
        // Should not panic
        log_line(&handle, "STDIN", "test");
    }
}
