//! Record formatting

pub mod color;
pub mod template;

pub use template::{PatternColor, TemplateFormatter};

use crate::core::{Record, Result};

/// Capability interface for formatters.
///
/// A formatter is compiled once and then shared read-only, as
/// `Arc<dyn Formatter>`, by any number of handlers; configure it before
/// putting it into concurrent use.
pub trait Formatter: Send + Sync {
    /// Render a record into displayable bytes (no trailing newline).
    fn format(&self, record: &Record) -> Result<Vec<u8>>;
}
