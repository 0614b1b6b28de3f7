//! Log level definitions

use std::fmt;
use std::str::FromStr;

/// Severity of a log record.
///
/// `Inherit` is a sentinel, not a severity: a logger whose level is
/// `Inherit` resolves its effective level from its ancestors (see
/// [`Logger::level`](crate::Logger::level)). The global default, applied at
/// an unset root, is `Warning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Level {
    Inherit = 0,
    Trace = 1,
    Debug = 2,
    Info = 3,
    #[default]
    Warning = 4,
    Error = 5,
    Fatal = 6,
}

impl Level {
    pub fn name(&self) -> &'static str {
        match self {
            Level::Inherit => "INHERIT",
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INHERIT" => Ok(Level::Inherit),
            "TRACE" => Ok(Level::Trace),
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARN" | "WARNING" => Ok(Level::Warning),
            "ERROR" => Ok(Level::Error),
            "FATAL" => Ok(Level::Fatal),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Level::Inherit < Level::Trace);
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warning);
        assert!(Level::Warning < Level::Error);
        assert!(Level::Error < Level::Fatal);
    }

    #[test]
    fn test_names() {
        assert_eq!(Level::Warning.name(), "WARNING");
        assert_eq!(Level::Inherit.to_string(), "INHERIT");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("debug".parse::<Level>(), Ok(Level::Debug));
        assert_eq!("WARN".parse::<Level>(), Ok(Level::Warning));
        assert_eq!("WARNING".parse::<Level>(), Ok(Level::Warning));
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn test_default_is_warning() {
        assert_eq!(Level::default(), Level::Warning);
    }
}
