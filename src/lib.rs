//! # logtree
//!
//! A hierarchical, handler/formatter-based logging facility: leveled
//! messages are emitted against named logger nodes arranged in a tree,
//! propagate to handlers attached anywhere on the path to the root, and are
//! rendered and written asynchronously so slow IO never blocks the caller.
//!
//! ## Features
//!
//! - **Logger tree**: per-node levels with inheritance, handlers attached at
//!   any node, `a/b/c` style paths
//! - **Asynchronous delivery**: one bounded queue and dedicated worker per
//!   handler, with blocking backpressure and graceful drain on shutdown
//! - **Staged records**: buffer diagnostic context and emit it only when a
//!   later error makes it interesting
//! - **Template formatting**: `"{time} {name<20} {level<8} {message}"` with
//!   width/alignment and optional level- and pattern-based coloring
//! - **Rotation awareness**: the watched-file handler notices its file being
//!   moved and transparently reopens
//!
//! ## Quick start
//!
//! ```no_run
//! use logtree::{BasicConfigOpts, Level};
//!
//! logtree::basic_config(BasicConfigOpts {
//!     level: Level::Debug,
//!     ..BasicConfigOpts::default()
//! }).expect("logging setup");
//!
//! let log = logtree::get_logger("app/net");
//! log.info("listening");
//!
//! logtree::shutdown(); // drain all handler queues at process exit
//! ```

pub mod core;
pub mod format;
pub mod handlers;
pub mod macros;

pub mod prelude {
    pub use crate::core::{
        basic_config, get_logger, root, shutdown, BasicConfigOpts, CrashOpts, Level, LogError,
        Logger, Record, Registry, Result, DEFAULT_FORMAT,
    };
    pub use crate::format::{Formatter, PatternColor, TemplateFormatter};
    pub use crate::handlers::{Handler, StreamHandler};
    #[cfg(unix)]
    pub use crate::handlers::WatchedFileHandler;
}

pub use crate::core::{
    basic_config, get_logger, root, shutdown, BasicConfigOpts, CrashOpts, Level, LogError, Logger,
    Record, Registry, Result, DEFAULT_FORMAT,
};
pub use crate::format::{color, Formatter, PatternColor, TemplateFormatter};
pub use crate::handlers::{Handler, StreamHandler};
#[cfg(unix)]
pub use crate::handlers::WatchedFileHandler;
