//! Per-session diagnostic trace
//!
//! The trace is a human-readable record of one shift session: every pin
//! state written, every level sampled, every failed device step and the
//! final verdict. It is independent of the `log` facade and is not needed
//! for protocol correctness.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Fixed name of the trace file inside the session directory
pub const TRACE_FILE_NAME: &str = "SPI Sequence Trace.txt";

/// Append-only sink for trace lines
pub trait DiagnosticSink {
    /// Append one line of text
    fn append_line(&self, line: &str);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Trace written to `<dir>/SPI Sequence Trace.txt`
///
/// The first line of a session truncates the file; later lines append.
/// Write failures are reported through `log` and otherwise ignored.
#[derive(Debug)]
pub struct FileTrace {
    path: PathBuf,
    started: Mutex<bool>,
}

impl FileTrace {
    /// Trace into the fixed file name inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::at_path(dir.as_ref().join(TRACE_FILE_NAME))
    }

    /// Trace into an explicit file path
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            started: Mutex::new(false),
        }
    }

    /// Path of the trace file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&self, started: bool, line: &str) -> std::io::Result<()> {
        let mut file = if started {
            OpenOptions::new().append(true).create(true).open(&self.path)?
        } else {
            OpenOptions::new()
                .write(true)
                .truncate(true)
                .create(true)
                .open(&self.path)?
        };
        writeln!(file, "{}", line)
    }
}

impl DiagnosticSink for FileTrace {
    fn append_line(&self, line: &str) {
        let mut started = lock(&self.started);
        match self.write_line(*started, line) {
            Ok(()) => *started = true,
            Err(e) => log::warn!("Failed to write trace file {}: {}", self.path.display(), e),
        }
    }
}

/// Trace kept in memory
#[derive(Debug, Default)]
pub struct MemoryTrace {
    lines: Mutex<Vec<String>>,
}

impl MemoryTrace {
    /// Create an empty trace
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all lines so far
    pub fn lines(&self) -> Vec<String> {
        lock(&self.lines).clone()
    }

    /// Number of lines that contain `needle`
    pub fn count_containing(&self, needle: &str) -> usize {
        lock(&self.lines)
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }
}

impl DiagnosticSink for MemoryTrace {
    fn append_line(&self, line: &str) {
        lock(&self.lines).push(line.to_string());
    }
}

/// Trace that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTrace;

impl DiagnosticSink for NullTrace {
    fn append_line(&self, _line: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "chainprog-trace-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_file_trace_truncates_then_appends() {
        let dir = scratch_dir("truncate");
        let path = dir.join(TRACE_FILE_NAME);
        fs::write(&path, "stale content from an earlier session\n").unwrap();

        let trace = FileTrace::in_dir(&dir);
        assert_eq!(trace.path(), path.as_path());
        trace.append_line("first");
        trace.append_line("second");

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");

        // A new session starts from scratch
        let trace = FileTrace::in_dir(&dir);
        trace.append_line("again");
        assert_eq!(fs::read_to_string(&path).unwrap(), "again\n");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_trace_missing_dir_is_not_fatal() {
        let root = scratch_dir("missing");
        let trace = FileTrace::in_dir(root.join("does-not-exist"));
        trace.append_line("dropped");
        assert!(!trace.path().exists());

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_memory_trace() {
        let trace = MemoryTrace::new();
        trace.append_line("CS: 0");
        trace.append_line("CK: 1");
        trace.append_line("CS: 1");
        assert_eq!(trace.lines().len(), 3);
        assert_eq!(trace.count_containing("CS:"), 2);
    }
}
