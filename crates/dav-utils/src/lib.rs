//! # dav-utils
//!
//! Helpers that small scripts keep re-implementing: a JSON configuration
//! file with type-checked fields, a template generator for it, and a
//! ready-made logger.
//!
//! This is the facade crate: it re-exports everything from
//! `dav-utils-core` and adds [`Config`] and [`Logging`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dav_utils::Config;
//!
//! // Write a template once, edit it, then load it on every run.
//! Config::new()?.create_template("settings.json")?;
//!
//! let config = Config::from_file("settings.json")?;
//! config.log().info("Configuration loaded.");
//! # Ok::<(), dav_utils::ConfigError>(())
//! ```
//!
//! ## Configuration files
//!
//! A configuration file is a JSON object. Keys are matched
//! case-insensitively; `LOG_DATE_FMT`, `LOG_FMT` and `LOG_LVL` configure the
//! logger and must be strings, every other key is kept as an extra
//! attribute:
//!
//! ```json
//! {
//!   "LOG_DATE_FMT": "%H:%M:%S",
//!   "LOG_FMT": "%(asctime)s.%(msecs)03d|%(levelname).1s|%(message)s",
//!   "LOG_LVL": "DEBUG",
//!   "OUTPUT_DIR": "reports"
//! }
//! ```

#![forbid(unsafe_code)]

// Re-export core types and helpers
pub use dav_utils_core::*;

mod config;

/// Script logger.
pub mod logging;

pub use config::{
    Config, ConfigError, ConfigSource, DEFAULT_LOG_DATE_FMT, DEFAULT_LOG_FMT, DEFAULT_LOG_LVL,
};
pub use logging::{LogLevel, Logging};
