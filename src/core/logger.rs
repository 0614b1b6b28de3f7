//! Logger tree nodes and the record dispatch algorithm

use super::{
    error::{LogError, Result},
    level::Level,
    record::Record,
    registry::{self, Tree},
};
use crate::handlers::Handler;
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, Weak};

/// A named node in the logger hierarchy.
///
/// Loggers are created through [`Registry::get_logger`](crate::Registry) or
/// [`Logger::get_logger`] and shared as `Arc<Logger>`. A node owns its level,
/// its attached handlers and its staged-record buffer; records emitted on it
/// propagate to every handler on the path up to the root.
///
/// Nodes are created once per path and never removed.
pub struct Logger {
    /// Full path; the root is the empty string, children are joined by `/`.
    name: String,
    parent: Option<Arc<Logger>>,
    tree: Weak<Tree>,
    level: RwLock<Level>,
    handlers: RwLock<Vec<Arc<dyn Handler>>>,
    children: Mutex<Vec<Arc<Logger>>>,
    staged: Mutex<Vec<Record>>,
}

/// Options for [`Logger::crash`].
#[derive(Debug, Clone, Default)]
pub struct CrashOpts {
    /// Strip this prefix from source file references in the stack trace.
    pub build_path: Option<String>,
    /// Shut down the handler tree and exit with this code, if set.
    pub exit_code: Option<i32>,
    /// Emit the stack verbatim, without frame trimming or path stripping.
    pub plain_stack: bool,
}

impl Logger {
    pub(crate) fn new_root(tree: Weak<Tree>) -> Arc<Logger> {
        Arc::new(Logger {
            name: String::new(),
            parent: None,
            tree,
            level: RwLock::new(Level::Warning),
            handlers: RwLock::new(Vec::new()),
            children: Mutex::new(Vec::new()),
            staged: Mutex::new(Vec::new()),
        })
    }

    fn new_child(parent: &Arc<Logger>, name: String) -> Arc<Logger> {
        let child = Arc::new(Logger {
            name,
            parent: Some(Arc::clone(parent)),
            tree: parent.tree.clone(),
            level: RwLock::new(Level::Inherit),
            handlers: RwLock::new(Vec::new()),
            children: Mutex::new(Vec::new()),
            staged: Mutex::new(Vec::new()),
        });
        parent.children.lock().push(Arc::clone(&child));
        child
    }

    /// Full path of this logger; empty for the root.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the child logger at `self.name + "/" + sub_name`, creating and
    /// registering it on first use. Idempotent.
    pub fn get_logger(self: &Arc<Self>, sub_name: &str) -> Arc<Logger> {
        let name = if self.name.is_empty() {
            sub_name.to_string()
        } else {
            format!("{}/{}", self.name, sub_name)
        };

        let tree = match self.tree.upgrade() {
            Some(tree) => tree,
            // The owning registry was reset while this handle stayed alive;
            // the child still works but is no longer registered.
            None => return Logger::new_child(self, name),
        };

        let mut nodes = tree.nodes.lock();
        if let Some(existing) = nodes.get(&name) {
            return Arc::clone(existing);
        }
        let child = Logger::new_child(self, name.clone());
        nodes.insert(name, Arc::clone(&child));
        child
    }

    /// Set this logger's own level. `Level::Inherit` delegates back to the
    /// ancestors.
    pub fn set_level(&self, level: Level) {
        *self.level.write() = level;
    }

    /// Effective level: this node's level, or the first explicit level found
    /// walking the ancestors, or `Warning` when nothing is set up to the
    /// root. Never returns `Inherit`.
    pub fn level(&self) -> Level {
        let mut node = self;
        loop {
            let level = *node.level.read();
            if level != Level::Inherit {
                return level;
            }
            match node.parent.as_deref() {
                Some(parent) => node = parent,
                None => return Level::Warning,
            }
        }
    }

    /// Attach a handler to this node.
    ///
    /// Fails with [`LogError::NoFormatter`] if the handler has no formatter:
    /// it could never render a record.
    pub fn add_handler(&self, handler: Arc<dyn Handler>) -> Result<()> {
        if handler.formatter().is_none() {
            return Err(LogError::NoFormatter);
        }
        self.handlers.write().push(handler);
        Ok(())
    }

    /// Remove all handlers from this node. Descendants resolved handlers
    /// through the ancestor walk, so they lose them too.
    pub fn remove_handlers(&self) {
        self.handlers.write().clear();
    }

    /// Replace all handlers on this node with a single new one.
    pub fn replace_handlers(&self, handler: Arc<dyn Handler>) -> Result<()> {
        self.remove_handlers();
        self.add_handler(handler)
    }

    /// All handlers visible from this logger: its own plus its ancestors',
    /// in walk order. For introspection; dispatch walks the nodes directly.
    pub fn handlers(&self) -> Vec<Arc<dyn Handler>> {
        let mut handlers = Vec::new();
        let mut node = Some(self);
        while let Some(current) = node {
            handlers.extend(current.handlers.read().iter().cloned());
            node = current.parent.as_deref();
        }
        handlers
    }

    pub(crate) fn own_handlers(&self) -> Vec<Arc<dyn Handler>> {
        self.handlers.read().clone()
    }

    pub(crate) fn child_nodes(&self) -> Vec<Arc<Logger>> {
        self.children.lock().clone()
    }

    /// Core dispatch: level gate, lazy record construction, ancestor walk.
    ///
    /// With `stage` set, the record is appended to the staged buffer of every
    /// walked node that owns handlers instead of being delivered, so a later
    /// flush at any level of the chain reproduces it there.
    fn dispatch(&self, level: Level, stage: bool, message: impl Into<String>) {
        if level < self.level() {
            return;
        }

        let mut pending = Some(message);
        let mut record: Option<Record> = None;

        let mut node = Some(self);
        while let Some(current) = node {
            {
                let handlers = current.handlers.read();
                if !handlers.is_empty() {
                    if record.is_none() {
                        if let Some(message) = pending.take() {
                            record = Some(Record::new(self.name.clone(), level, message));
                        }
                    }
                    if let Some(record) = &record {
                        if stage {
                            current.staged.lock().push(record.clone());
                        } else {
                            for handler in handlers.iter() {
                                // delivery errors never reach the caller
                                let _ = handler.handle(record);
                            }
                        }
                    }
                }
            }
            node = current.parent.as_deref();
        }
    }

    /// Drain the staged buffers of this node and every ancestor, oldest
    /// first, each into that node's own handlers.
    fn flush_staged(&self) {
        let mut node = Some(self);
        while let Some(current) = node {
            let drained = std::mem::take(&mut *current.staged.lock());
            if !drained.is_empty() {
                let handlers = current.handlers.read();
                for record in &drained {
                    for handler in handlers.iter() {
                        let _ = handler.handle(record);
                    }
                }
            }
            node = current.parent.as_deref();
        }
    }

    fn discard_staged(&self) {
        self.staged.lock().clear();
    }

    fn shutdown_tree(&self) {
        match self.tree.upgrade() {
            Some(tree) => registry::shutdown_handlers(&tree.root),
            // detached node: best effort on what is reachable from here
            None => registry::shutdown_unique(self.handlers()),
        }
    }

    /// Log a message, routing it to the behavior of the matching severity
    /// call: `Error` flushes staged context first, `Fatal` additionally
    /// terminates the process, everything else discards staged context.
    pub fn log(&self, level: Level, message: impl Into<String>) {
        match level {
            Level::Fatal => self.fatal(message),
            Level::Error => self.error(message),
            _ => {
                self.discard_staged();
                self.dispatch(level, false, message);
            }
        }
    }

    /// Log a message with TRACE level.
    pub fn trace(&self, message: impl Into<String>) {
        self.discard_staged();
        self.dispatch(Level::Trace, false, message);
    }

    /// Log a message with DEBUG level.
    pub fn debug(&self, message: impl Into<String>) {
        self.discard_staged();
        self.dispatch(Level::Debug, false, message);
    }

    /// Log a message with INFO level.
    pub fn info(&self, message: impl Into<String>) {
        self.discard_staged();
        self.dispatch(Level::Info, false, message);
    }

    /// Log a message with WARNING level.
    pub fn warning(&self, message: impl Into<String>) {
        self.discard_staged();
        self.dispatch(Level::Warning, false, message);
    }

    /// Log a message with ERROR level, after flushing any staged records on
    /// this node and its ancestors.
    pub fn error(&self, message: impl Into<String>) {
        self.flush_staged();
        self.dispatch(Level::Error, false, message);
    }

    /// Log a message with FATAL level, shut down every handler in the tree
    /// and exit the process with code 1.
    pub fn fatal(&self, message: impl Into<String>) -> ! {
        self.flush_staged();
        self.dispatch(Level::Fatal, false, message);
        self.shutdown_tree();
        std::process::exit(1);
    }

    /// Stage a DEBUG message: buffered until the next `error`/`fatal` on this
    /// path flushes it, or a plain call discards it.
    pub fn stage_debug(&self, message: impl Into<String>) {
        self.dispatch(Level::Debug, true, message);
    }

    /// Stage an INFO message until the next flush.
    pub fn stage_info(&self, message: impl Into<String>) {
        self.dispatch(Level::Info, true, message);
    }

    /// Stage a WARNING message until the next flush.
    pub fn stage_warning(&self, message: impl Into<String>) {
        self.dispatch(Level::Warning, true, message);
    }

    /// Report a crash: emits `err` and the supplied pre-captured stack trace
    /// at ERROR severity, after flushing staged context.
    ///
    /// Termination is opt-in: the process exits only when `opts.exit_code`
    /// is set.
    pub fn crash(&self, err: &str, stack: &str, opts: CrashOpts) {
        let lines = trim_stack(stack, &opts);

        if opts.plain_stack {
            self.error(format!("CRASH: {}\n{}", err, lines.join("\n")));
        } else {
            self.error(format!("CRASH: {}\n   {}", err, lines.join("\n   ")));
        }

        if let Some(code) = opts.exit_code {
            self.shutdown_tree();
            std::process::exit(code);
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &*self.level.read())
            .field("handlers", &self.handlers.read().len())
            .field("staged", &self.staged.lock().len())
            .finish()
    }
}

/// Drop the uninteresting prefix of a raw stack trace: everything before the
/// panic entry point is capture machinery, not cause. A trace without a
/// recognizable marker is returned whole.
fn trim_stack(stack: &str, opts: &CrashOpts) -> Vec<String> {
    if opts.plain_stack {
        return stack.lines().map(str::to_string).collect();
    }

    let mut lines = Vec::new();
    let mut in_trace = false;
    for line in stack.lines() {
        if !in_trace && line.trim_start().starts_with("panic") {
            in_trace = true;
        }
        if !in_trace {
            continue;
        }
        lines.push(match &opts.build_path {
            Some(build_path) => strip_build_path(line, build_path),
            None => line.to_string(),
        });
    }

    if lines.is_empty() {
        return stack.lines().map(str::to_string).collect();
    }
    lines
}

fn strip_build_path(line: &str, build_path: &str) -> String {
    match line
        .strip_prefix('\t')
        .and_then(|l| l.strip_prefix(build_path))
    {
        Some(rest) => format!("   {}", rest.trim_start_matches('/')),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::Registry;

    #[test]
    fn test_get_logger_paths() {
        let registry = Registry::new();
        let root = registry.root();
        assert_eq!(root.name(), "");

        let app = root.get_logger("app");
        assert_eq!(app.name(), "app");

        let net = app.get_logger("net");
        assert_eq!(net.name(), "app/net");

        // idempotent: same path yields the same node
        assert!(Arc::ptr_eq(&app, &root.get_logger("app")));
    }

    #[test]
    fn test_level_inheritance() {
        let registry = Registry::new();
        let root = registry.root();
        let child = root.get_logger("child");
        let grandchild = child.get_logger("grand");

        // nothing explicit below the root: everything sees the root's level
        assert_eq!(grandchild.level(), Level::Warning);

        child.set_level(Level::Debug);
        assert_eq!(grandchild.level(), Level::Debug);
        assert_eq!(child.level(), Level::Debug);
        assert_eq!(root.level(), Level::Warning);

        child.set_level(Level::Inherit);
        assert_eq!(grandchild.level(), Level::Warning);
    }

    #[test]
    fn test_add_handler_requires_formatter() {
        use crate::handlers::StreamHandler;

        let registry = Registry::new();
        let root = registry.root();

        let handler = Arc::new(StreamHandler::new(std::io::sink()));
        let result = root.add_handler(handler);
        assert!(matches!(result, Err(LogError::NoFormatter)));
    }

    #[test]
    fn test_trim_stack_skips_capture_machinery() {
        let stack = "backtrace::capture\nstd::backtrace_rs\npanicked at 'boom'\n\tsrc/main.rs:10";
        let lines = trim_stack(stack, &CrashOpts::default());
        assert_eq!(lines, vec!["panicked at 'boom'", "\tsrc/main.rs:10"]);
    }

    #[test]
    fn test_trim_stack_strips_build_path() {
        let opts = CrashOpts {
            build_path: Some("/home/ci/build".to_string()),
            ..CrashOpts::default()
        };
        let stack = "panicked at 'boom'\n\t/home/ci/build/src/main.rs:10";
        let lines = trim_stack(stack, &opts);
        assert_eq!(lines, vec!["panicked at 'boom'", "   src/main.rs:10"]);
    }

    #[test]
    fn test_trim_stack_without_marker_keeps_everything() {
        let stack = "frame one\nframe two";
        let lines = trim_stack(stack, &CrashOpts::default());
        assert_eq!(lines, vec!["frame one", "frame two"]);
    }
}
