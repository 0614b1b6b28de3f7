//! Process-wide logger registry
//!
//! The registry owns the logger tree: a root node plus a path-to-node map
//! guarding creation so each path maps to exactly one node. It is an
//! explicit, independently constructible object; a process-global instance
//! backs the free functions [`root`], [`get_logger`], [`shutdown`] and
//! [`basic_config`].

use super::{
    error::Result,
    level::Level,
    logger::Logger,
};
use crate::format::TemplateFormatter;
use crate::handlers::{Handler, StreamHandler};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

/// Template used when [`BasicConfigOpts::format`] is not set.
pub const DEFAULT_FORMAT: &str = "{time} {name<20} {level<8} {message}";

pub(crate) struct Tree {
    pub(crate) root: Arc<Logger>,
    pub(crate) nodes: Mutex<HashMap<String, Arc<Logger>>>,
}

impl Tree {
    fn new() -> Arc<Tree> {
        Arc::new_cyclic(|tree| Tree {
            root: Logger::new_root(tree.clone()),
            nodes: Mutex::new(HashMap::new()),
        })
    }
}

/// The logger tree and its path map.
///
/// A fresh registry has a root logger at level `Warning` with no handlers.
/// `reset` and `basic_config` replace the whole tree atomically under the
/// registry's lock, after shutting the previous tree's handlers down.
pub struct Registry {
    tree: RwLock<Arc<Tree>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            tree: RwLock::new(Tree::new()),
        }
    }

    /// The root logger (path is the empty string).
    pub fn root(&self) -> Arc<Logger> {
        Arc::clone(&self.tree.read().root)
    }

    /// Return or create the logger at `name` under the root. An empty name
    /// or `"root"` returns the root itself.
    pub fn get_logger(&self, name: &str) -> Arc<Logger> {
        if name.is_empty() || name == "root" {
            return self.root();
        }
        self.root().get_logger(name)
    }

    /// Shut down every handler reachable from the root, deduplicated by
    /// instance identity so each is shut down exactly once. Blocks until all
    /// workers have drained their queues.
    pub fn shutdown(&self) {
        let tree = {
            let guard = self.tree.read();
            Arc::clone(&*guard)
        };
        shutdown_handlers(&tree.root);
    }

    /// Shut down the current tree and replace it with a fresh one.
    pub fn reset(&self) {
        self.shutdown();
        *self.tree.write() = Tree::new();
    }

    /// One-call setup: replaces the current tree with a fresh one whose root
    /// carries the configured handler(s), formatter and level.
    pub fn basic_config(&self, opts: BasicConfigOpts) -> Result<()> {
        self.shutdown();
        let tree = Tree::new();

        let level = if opts.level == Level::Inherit {
            Level::Warning
        } else {
            opts.level
        };
        let format = opts.format.unwrap_or_else(|| DEFAULT_FORMAT.to_string());

        let mut handlers = opts.handlers;
        if handlers.is_empty() {
            let handler = if let Some(writer) = opts.writer {
                StreamHandler::new(writer)
            } else if let Some(path) = opts.file_name {
                StreamHandler::file(path, opts.file_append)?
            } else {
                StreamHandler::new(std::io::stderr())
            };
            handlers.push(Arc::new(handler) as Arc<dyn Handler>);
        }

        // handlers without a formatter share one default formatter
        let mut default_formatter: Option<Arc<TemplateFormatter>> = None;
        for handler in &handlers {
            if handler.formatter().is_none() {
                let formatter = match &default_formatter {
                    Some(formatter) => Arc::clone(formatter),
                    None => {
                        let formatter = Arc::new(TemplateFormatter::new(&format)?);
                        default_formatter = Some(Arc::clone(&formatter));
                        formatter
                    }
                };
                handler.set_formatter(formatter);
            }
        }

        for handler in handlers {
            tree.root.add_handler(handler)?;
        }
        tree.root.set_level(level);

        *self.tree.write() = tree;
        Ok(())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Options for [`Registry::basic_config`] / [`basic_config`].
pub struct BasicConfigOpts {
    /// Log to this file when no writer and no handlers are given.
    pub file_name: Option<PathBuf>,
    /// Append to `file_name` instead of truncating it (default true).
    pub file_append: bool,
    /// Log to this writer when no handlers are given; takes precedence over
    /// `file_name`.
    pub writer: Option<Box<dyn Write + Send>>,
    /// Template for handlers that come without a formatter.
    pub format: Option<String>,
    /// Root level; `Inherit` means the default (`Warning`).
    pub level: Level,
    /// Pre-built handlers to attach to the root.
    pub handlers: Vec<Arc<dyn Handler>>,
}

impl Default for BasicConfigOpts {
    fn default() -> Self {
        Self {
            file_name: None,
            file_append: true,
            writer: None,
            format: None,
            level: Level::Inherit,
            handlers: Vec::new(),
        }
    }
}

pub(crate) fn shutdown_handlers(root: &Arc<Logger>) {
    let mut handlers = Vec::new();
    collect_handlers(root, &mut handlers);
    shutdown_unique(handlers);
}

// depth-first: children before the node's own handlers
fn collect_handlers(node: &Arc<Logger>, out: &mut Vec<Arc<dyn Handler>>) {
    for child in node.child_nodes() {
        collect_handlers(&child, out);
    }
    out.extend(node.own_handlers());
}

/// Shut down each distinct handler instance exactly once, no matter how many
/// nodes it was attached to.
pub(crate) fn shutdown_unique(handlers: Vec<Arc<dyn Handler>>) {
    let mut seen = HashSet::new();
    for handler in handlers {
        if seen.insert(Arc::as_ptr(&handler) as *const ()) {
            handler.shutdown();
        }
    }
}

static DEFAULT_REGISTRY: OnceLock<Registry> = OnceLock::new();

fn default_registry() -> &'static Registry {
    DEFAULT_REGISTRY.get_or_init(Registry::new)
}

/// Root logger of the process-global registry.
pub fn root() -> Arc<Logger> {
    default_registry().root()
}

/// Return or create `name` under the global root; an empty name or `"root"`
/// returns the root itself.
pub fn get_logger(name: &str) -> Arc<Logger> {
    default_registry().get_logger(name)
}

/// Shut down every handler reachable from the global root, each exactly
/// once. Intended to be called once at process exit so queued records are
/// flushed before termination.
pub fn shutdown() {
    default_registry().shutdown()
}

/// One-call setup of the process-global registry.
pub fn basic_config(opts: BasicConfigOpts) -> Result<()> {
    default_registry().basic_config(opts)
}
