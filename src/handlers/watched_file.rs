//! Rotation-aware file handler
//!
//! Watches the log file identity: when an external rotation moves or deletes
//! the file behind the configured path, the path is transparently reopened
//! and writing continues into the new file.

use super::{stream::open_log_file, Handler, StreamHandler};
use crate::core::{Level, Record, Result};
use crate::format::Formatter;
use std::fs::File;
use std::io::{self, Write};
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Device+inode identity of the file currently behind the configured path;
/// `None` when the path does not resolve.
type Signature = Option<(u64, u64)>;

fn stat_signature(path: &Path) -> Signature {
    std::fs::metadata(path)
        .ok()
        .map(|meta| (meta.dev(), meta.ino()))
}

/// File sink that re-derives the on-disk identity of its path before each
/// write and reopens when it changed.
struct WatchedFile {
    file: File,
    path: PathBuf,
    append: bool,
    signature: Signature,
}

impl WatchedFile {
    fn open(path: PathBuf, append: bool) -> Result<Self> {
        let file = open_log_file(&path, append)?;
        let signature = stat_signature(&path);
        Ok(Self {
            file,
            path,
            append,
            signature,
        })
    }

    /// One stat per written record: without an external rotation
    /// notification, checking on every write is the only way to notice that
    /// the path now names a different file.
    fn reopen_if_moved(&mut self) {
        let current = stat_signature(&self.path);
        if current == self.signature {
            return;
        }

        let _ = self.file.sync_all();
        match open_log_file(&self.path, self.append) {
            Ok(file) => {
                self.file = file;
                self.signature = stat_signature(&self.path);
            }
            Err(err) => {
                // keep writing into the detached file rather than lose records
                eprintln!(
                    "[logtree] WatchedFileHandler: reopening '{}' failed: {}",
                    self.path.display(),
                    err
                );
            }
        }
    }
}

impl Write for WatchedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.reopen_if_moved();
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Handler over a watched file.
///
/// Composes a [`StreamHandler`] whose sink performs the identity check on
/// the worker thread, immediately before each write, so the check can never
/// race the write itself.
pub struct WatchedFileHandler {
    inner: StreamHandler,
}

impl WatchedFileHandler {
    pub fn new(path: impl Into<PathBuf>, append: bool) -> Result<Self> {
        let sink = WatchedFile::open(path.into(), append)?;
        Ok(Self {
            inner: StreamHandler::new(sink),
        })
    }
}

impl Handler for WatchedFileHandler {
    fn handle(&self, record: &Record) -> Result<()> {
        self.inner.handle(record)
    }

    fn set_formatter(&self, formatter: Arc<dyn Formatter>) {
        self.inner.set_formatter(formatter);
    }

    fn formatter(&self) -> Option<Arc<dyn Formatter>> {
        self.inner.formatter()
    }

    fn set_level(&self, level: Level) {
        self.inner.set_level(level);
    }

    fn level(&self) -> Level {
        self.inner.level()
    }

    fn shutdown(&self) {
        self.inner.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_follows_rename() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("app.log");
        let rotated = dir.path().join("app.log.1");

        let mut sink = WatchedFile::open(path.clone(), true).expect("open");
        sink.write_all(b"first\n").expect("write");
        sink.flush().expect("flush");

        std::fs::rename(&path, &rotated).expect("rename");

        sink.write_all(b"second\n").expect("write");
        sink.flush().expect("flush");

        let fresh = std::fs::read_to_string(&path).expect("read new file");
        assert_eq!(fresh, "second\n");
        let old = std::fs::read_to_string(&rotated).expect("read rotated file");
        assert_eq!(old, "first\n");
    }

    #[test]
    fn test_sink_survives_deletion() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("app.log");

        let mut sink = WatchedFile::open(path.clone(), true).expect("open");
        sink.write_all(b"first\n").expect("write");

        std::fs::remove_file(&path).expect("remove");

        sink.write_all(b"second\n").expect("write");
        sink.flush().expect("flush");

        let fresh = std::fs::read_to_string(&path).expect("read recreated file");
        assert_eq!(fresh, "second\n");
    }
}
