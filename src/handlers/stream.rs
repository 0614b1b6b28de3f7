//! Stream-backed handler with an asynchronous delivery pipeline

use super::Handler;
use crate::core::{LogError, Level, Record, Result};
use crate::format::Formatter;
use crossbeam_channel::{bounded, Sender};
use parking_lot::{Mutex, RwLock};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::thread;

/// Capacity of the per-handler record queue. Once it is exceeded, `handle`
/// blocks the caller until the worker frees space instead of dropping.
const QUEUE_CAPACITY: usize = 100;

/// Handler writing rendered records to any `Write` sink.
///
/// One dedicated worker thread consumes a bounded queue, renders each record
/// through the attached formatter, appends a line terminator and writes to
/// the sink. Per-handler write order matches enqueue order exactly.
pub struct StreamHandler {
    formatter: Arc<RwLock<Option<Arc<dyn Formatter>>>>,
    level: RwLock<Level>,
    state: Mutex<PipelineState>,
}

/// ACTIVE while both sender and worker are present; dropping the sender puts
/// the worker into its drain phase, joining it completes the stop.
struct PipelineState {
    sender: Option<Sender<Record>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl StreamHandler {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        let (sender, receiver) = bounded::<Record>(QUEUE_CAPACITY);
        let formatter: Arc<RwLock<Option<Arc<dyn Formatter>>>> = Arc::new(RwLock::new(None));
        let worker_formatter = Arc::clone(&formatter);

        let worker = thread::spawn(move || {
            let mut writer = writer;
            // runs until every sender is gone and the queue has drained
            for record in receiver.iter() {
                let Some(formatter) = worker_formatter.read().clone() else {
                    eprintln!("[logtree] StreamHandler: no formatter, record dropped");
                    continue;
                };
                let mut line = match formatter.format(&record) {
                    Ok(line) => line,
                    Err(err) => {
                        eprintln!("[logtree] StreamHandler: formatter error: {}", err);
                        continue;
                    }
                };
                line.push(b'\n');
                if let Err(err) = writer.write_all(&line) {
                    eprintln!("[logtree] StreamHandler: write error: {}", err);
                }
            }
            let _ = writer.flush();
        });

        Self {
            formatter,
            level: RwLock::new(Level::Inherit),
            state: Mutex::new(PipelineState {
                sender: Some(sender),
                worker: Some(worker),
            }),
        }
    }

    /// Stream handler over a freshly opened file: append or truncate per
    /// `append`, created if missing.
    pub fn file(path: impl AsRef<Path>, append: bool) -> Result<Self> {
        let file = open_log_file(path.as_ref(), append)?;
        Ok(Self::new(file))
    }
}

pub(crate) fn open_log_file(path: &Path, append: bool) -> Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true);
    if append {
        options.append(true);
    } else {
        options.truncate(true);
    }
    options
        .open(path)
        .map_err(|err| LogError::io_operation("opening", path.display().to_string(), err))
}

impl Handler for StreamHandler {
    fn handle(&self, record: &Record) -> Result<()> {
        let level = *self.level.read();
        if level != Level::Inherit && record.level < level {
            return Ok(());
        }

        // clone the sender outside the lock so a full queue blocks only this
        // caller, never a concurrent shutdown
        let sender = self.state.lock().sender.clone();
        if let Some(sender) = sender {
            // a send error means shutdown won the race; accepted-but-ignored
            let _ = sender.send(record.clone());
        }
        Ok(())
    }

    fn set_formatter(&self, formatter: Arc<dyn Formatter>) {
        *self.formatter.write() = Some(formatter);
    }

    fn formatter(&self) -> Option<Arc<dyn Formatter>> {
        self.formatter.read().clone()
    }

    fn set_level(&self, level: Level) {
        *self.level.write() = level;
    }

    fn level(&self) -> Level {
        *self.level.read()
    }

    fn shutdown(&self) {
        // The lock is held across the join: concurrent shutdown callers all
        // block until the worker has confirmed completion, then no-op.
        let mut state = self.state.lock();
        state.sender.take();
        if let Some(worker) = state.worker.take() {
            if worker.join().is_err() {
                eprintln!("[logtree] StreamHandler: worker panicked during shutdown");
            }
        }
    }
}

impl Drop for StreamHandler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::TemplateFormatter;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn message_formatter() -> Arc<dyn Formatter> {
        Arc::new(TemplateFormatter::new("{message}").expect("valid template"))
    }

    #[test]
    fn test_writes_in_enqueue_order() {
        let buf = SharedBuf::default();
        let handler = StreamHandler::new(buf.clone());
        handler.set_formatter(message_formatter());

        // more than QUEUE_CAPACITY records exercises the blocking path
        for idx in 0..250 {
            let record = Record::new("test", Level::Info, format!("message {}", idx));
            handler.handle(&record).expect("handle");
        }
        handler.shutdown();

        let contents = buf.contents();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 250);
        for (idx, line) in lines.iter().enumerate() {
            assert_eq!(*line, format!("message {}", idx));
        }
    }

    #[test]
    fn test_handle_after_shutdown_is_noop() {
        let buf = SharedBuf::default();
        let handler = StreamHandler::new(buf.clone());
        handler.set_formatter(message_formatter());

        handler.shutdown();
        handler.shutdown(); // idempotent

        let record = Record::new("test", Level::Info, "late");
        assert!(handler.handle(&record).is_ok());
        assert_eq!(buf.contents(), "");
    }

    #[test]
    fn test_level_floor() {
        let buf = SharedBuf::default();
        let handler = StreamHandler::new(buf.clone());
        handler.set_formatter(message_formatter());
        handler.set_level(Level::Error);

        handler
            .handle(&Record::new("test", Level::Info, "filtered"))
            .expect("handle");
        handler
            .handle(&Record::new("test", Level::Error, "kept"))
            .expect("handle");
        handler.shutdown();

        assert_eq!(buf.contents(), "kept\n");
    }

    #[test]
    fn test_formatterless_handler_drops_records() {
        let buf = SharedBuf::default();
        let handler = StreamHandler::new(buf.clone());

        handler
            .handle(&Record::new("test", Level::Info, "dropped"))
            .expect("handle");
        handler.shutdown();

        assert_eq!(buf.contents(), "");
    }
}
