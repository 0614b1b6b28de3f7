//! Core logger types: the tree, levels, records and the registry

pub mod error;
pub mod level;
pub mod logger;
pub mod record;
pub mod registry;

pub use error::{LogError, Result};
pub use level::Level;
pub use logger::{CrashOpts, Logger};
pub use record::Record;
pub use registry::{
    basic_config, get_logger, root, shutdown, BasicConfigOpts, Registry, DEFAULT_FORMAT,
};
