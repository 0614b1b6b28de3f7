//! Log record structure

use super::level::Level;
use chrono::{DateTime, Local};

/// An immutable snapshot of one emitted log message.
///
/// Records are built lazily by the dispatch walk, only once at least one
/// handler is reachable, and are cloned into each handler's queue so no
/// handler ever observes mutation by another party.
#[derive(Debug, Clone)]
pub struct Record {
    pub timestamp: DateTime<Local>,
    /// Full path of the emitting logger; empty string for the root.
    pub name: String,
    pub level: Level,
    /// Already-interpolated message text.
    pub message: String,
}

impl Record {
    pub fn new(name: impl Into<String>, level: Level, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            name: name.into(),
            level,
            message: message.into(),
        }
    }

    /// Last segment of the logger path.
    pub fn basename(&self) -> &str {
        match self.name.rsplit('/').next() {
            Some(base) => base,
            None => self.name.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename() {
        let rec = Record::new("app/net/http", Level::Info, "hello");
        assert_eq!(rec.basename(), "http");

        let rec = Record::new("app", Level::Info, "hello");
        assert_eq!(rec.basename(), "app");

        let rec = Record::new("", Level::Info, "hello");
        assert_eq!(rec.basename(), "");
    }
}
