//! Handler implementations
//!
//! A handler owns one output sink, a formatter and a dedicated worker thread
//! that renders and writes records asynchronously, so slow IO never blocks
//! the emitting caller.

pub mod stream;

#[cfg(unix)]
pub mod watched_file;

pub use stream::StreamHandler;

#[cfg(unix)]
pub use watched_file::WatchedFileHandler;

use crate::core::{Level, Record, Result};
use crate::format::Formatter;
use std::sync::Arc;

/// Capability interface every handler variant implements.
///
/// Handlers are attached to loggers as `Arc<dyn Handler>`; one instance may
/// be attached to any number of nodes and must be shut down exactly once
/// regardless (tree-wide shutdown deduplicates by instance identity).
pub trait Handler: Send + Sync {
    /// Enqueue a record for asynchronous delivery.
    ///
    /// Blocks only when the handler's bounded queue is full (deliberate
    /// backpressure). After `shutdown` this is a no-op success.
    fn handle(&self, record: &Record) -> Result<()>;

    fn set_formatter(&self, formatter: Arc<dyn Formatter>);
    fn formatter(&self) -> Option<Arc<dyn Formatter>>;

    /// Minimum level this handler accepts; `Level::Inherit` means no floor.
    fn set_level(&self, level: Level);
    fn level(&self) -> Level;

    /// Two-phase stop: stop accepting new records, drain what is queued,
    /// then return once the worker has exited. Idempotent; blocks without
    /// timeout, so an unresponsive sink can hang shutdown indefinitely.
    fn shutdown(&self);
}
