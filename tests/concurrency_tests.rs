//! Concurrency tests: many emitters feeding one shared handler
//!
//! Verifies the ordering contract: per-handler write order matches enqueue
//! order, so each emitter's messages come out in submission order even when
//! the handler queue forces backpressure.

use logtree::{Handler, Level, Registry, StreamHandler, TemplateFormatter};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use std::thread;

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock())
            .lines()
            .map(str::to_string)
            .collect()
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

#[test]
fn test_concurrent_emitters_share_one_handler() {
    const WIDTH: usize = 8;
    const COUNT: usize = 250; // more than the handler queue capacity

    let registry = Registry::new();
    let buf = SharedBuf::default();
    let handler = StreamHandler::new(buf.clone());
    handler.set_formatter(Arc::new(
        TemplateFormatter::new("{name} {message}").expect("valid template"),
    ));
    registry
        .root()
        .add_handler(Arc::new(handler))
        .expect("add handler");
    registry.root().set_level(Level::Debug);

    let mut workers = Vec::new();
    for worker in 0..WIDTH {
        let log = registry.get_logger(&format!("test{}", worker));
        workers.push(thread::spawn(move || {
            for idx in 0..COUNT {
                log.info(format!("test message {}", idx));
            }
        }));
    }
    for worker in workers {
        worker.join().expect("emitter thread");
    }

    registry.shutdown();

    let lines = buf.lines();
    assert_eq!(lines.len(), WIDTH * COUNT);

    // per emitter: all messages present, in submission order
    for worker in 0..WIDTH {
        let prefix = format!("test{} ", worker);
        let from_worker: Vec<&String> =
            lines.iter().filter(|line| line.starts_with(&prefix)).collect();
        assert_eq!(from_worker.len(), COUNT, "logger test{}", worker);
        for (idx, line) in from_worker.iter().enumerate() {
            assert_eq!(**line, format!("test{} test message {}", worker, idx));
        }
    }
}

#[test]
fn test_shared_handler_shut_down_exactly_once() {
    let registry = Registry::new();
    let buf = SharedBuf::default();
    let handler = StreamHandler::new(buf.clone());
    handler.set_formatter(Arc::new(
        TemplateFormatter::new("{message}").expect("valid template"),
    ));
    let handler: Arc<dyn Handler> = Arc::new(handler);

    // the same instance attached at three places in the tree
    registry
        .root()
        .add_handler(Arc::clone(&handler))
        .expect("add handler");
    let a = registry.get_logger("a");
    a.add_handler(Arc::clone(&handler)).expect("add handler");
    let b = registry.get_logger("a").get_logger("b");
    b.add_handler(Arc::clone(&handler)).expect("add handler");
    registry.root().set_level(Level::Debug);

    // walk hits three attachments
    b.info("fan-out");

    // dedup by identity: drains once, joins once, and a second tree-wide
    // shutdown stays a no-op
    registry.shutdown();
    registry.shutdown();

    assert_eq!(buf.lines(), vec!["fan-out", "fan-out", "fan-out"]);
}

#[test]
fn test_concurrent_get_logger_returns_one_node() {
    let registry = Registry::new();
    let root = registry.root();

    let mut workers = Vec::new();
    for _ in 0..8 {
        let root = Arc::clone(&root);
        workers.push(thread::spawn(move || root.get_logger("shared/path")));
    }

    let nodes: Vec<_> = workers
        .into_iter()
        .map(|worker| worker.join().expect("lookup thread"))
        .collect();
    for node in &nodes[1..] {
        assert!(Arc::ptr_eq(&nodes[0], node));
    }
}
