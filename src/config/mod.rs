//! Config module.
//! Per-session write configuration, its validation, and the XML-backed
//! application config used by the `openz` binary.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
pub use types::{AppConfig, ContentMode, LogLevel, WriteConfig};
pub use xml::{load_app_config, load_app_config_from_path};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "OPENZ_CONFIG";
