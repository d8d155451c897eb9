//! JSON-backed script configuration.

use crate::logging::{validate_date_format, LogFormat, Logging, LoggingError};
use dav_utils_core::utils::{self, UtilError};
use dav_utils_core::{AttrError, AttrStore, Reflect, StringType, TypeChecker};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Default date format of log lines.
pub const DEFAULT_LOG_DATE_FMT: &str = "%H:%M:%S";
/// Default message template: `HH:MM:SS.mmm|<level initial>|<message>`.
pub const DEFAULT_LOG_FMT: &str = "%(asctime)s.%(msecs)03d|%(levelname).1s|%(message)s";
/// Default log level.
pub const DEFAULT_LOG_LVL: &str = "DEBUG";

/// Accepted configuration file extensions.
const EXTENSIONS: &[&str] = &[".json"];

/// Member names of [`Config`] and of the file helpers it builds on; file
/// keys with these names are ignored.
const METHODS: &[&str] = &[
    "check_exists",
    "check_extension",
    "check_not_exists",
    "create_template",
    "date_to_str",
    "effective_attrs",
    "get",
    "load",
    "log",
    "public_attrs",
    "read_file_gen",
    "read_lines",
    "save_json_file",
    "save_text_file",
    "set",
    "source",
    "str_to_date",
    "update",
];

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file is missing, has the wrong extension, or is not a JSON object.
    #[error(transparent)]
    Util(#[from] UtilError),

    /// An attribute was rejected.
    #[error(transparent)]
    Attr(#[from] AttrError),

    /// The logging parameters are unusable.
    #[error(transparent)]
    Logging(#[from] LoggingError),
}

/// Where a [`Config`] got its values from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built-in defaults only.
    Defaults,
    /// Defaults overridden by the given file.
    File(PathBuf),
}

impl ConfigSource {
    /// Returns the file path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(p) => Some(p),
            Self::Defaults => None,
        }
    }
}

/// Script configuration.
///
/// Holds three text parameters for the logger (`log_date_fmt`, `log_fmt`,
/// `log_lvl`) plus any other keys found in the configuration file, and owns
/// the [`Logging`] built from those parameters. Changing the parameters
/// after construction does not reconfigure the logger.
#[derive(Debug)]
pub struct Config {
    attrs: AttrStore,
    source: ConfigSource,
    log: Logging,
}

impl Config {
    /// Creates a configuration with the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Logging`] if the logger cannot be built.
    pub fn new() -> Result<Self, ConfigError> {
        Self::build(None)
    }

    /// Creates a configuration from the defaults overridden by `path`.
    ///
    /// Keys are matched case-insensitively. Unknown keys become extra
    /// attributes; the three logging keys must hold text.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded (see [`Config::load`]),
    /// a logging key is not text, or the logger cannot be built.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::build(Some(path.as_ref()))
    }

    /// Returns the public attributes a configuration built from `path` (or
    /// from the defaults when `None`) would have, without creating its
    /// logger.
    ///
    /// The logging parameters are still checked, so this fails exactly when
    /// [`Config::from_file`] would.
    ///
    /// # Errors
    ///
    /// See [`Config::from_file`].
    pub fn effective_attrs(path: Option<&Path>) -> Result<Map<String, Value>, ConfigError> {
        let (attrs, _) = settings(path)?;
        LogFormat::parse(text(&attrs, "log_fmt", DEFAULT_LOG_FMT))?;
        validate_date_format(text(&attrs, "log_date_fmt", DEFAULT_LOG_DATE_FMT))?;
        Ok(attrs.public_attrs())
    }

    fn build(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (attrs, source) = settings(path)?;

        let log = Logging::new(
            text(&attrs, "log_date_fmt", DEFAULT_LOG_DATE_FMT),
            text(&attrs, "log_fmt", DEFAULT_LOG_FMT),
            text(&attrs, "log_lvl", DEFAULT_LOG_LVL),
        )?;

        Ok(Self { attrs, source, log })
    }

    /// Reads the configuration file at `path` without applying it.
    ///
    /// A relative path that does not exist is also looked up next to the
    /// running executable. The extension is checked before the file is read.
    ///
    /// # Errors
    ///
    /// Returns [`UtilError::NotFound`], [`UtilError::ExtensionMismatch`],
    /// or a read/parse error, wrapped in [`ConfigError::Util`].
    pub fn load(path: impl AsRef<Path>) -> Result<Map<String, Value>, ConfigError> {
        Ok(read(path.as_ref())?.1)
    }

    /// Writes every public attribute, with upper-cased keys, to `path` as
    /// pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Util`] if the file cannot be written.
    pub fn create_template(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let template: Map<String, Value> = self
            .public_attrs()
            .into_iter()
            .map(|(key, value)| (key.to_uppercase(), value))
            .collect();

        utils::save_json_file(path, &template)?;
        self.log.info(&format!("Template {} created.", path.display()));
        Ok(())
    }

    /// Returns the logger.
    #[must_use]
    pub fn log(&self) -> &Logging {
        &self.log
    }

    /// Returns where the values came from.
    #[must_use]
    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// Returns the log date format.
    #[must_use]
    pub fn log_date_fmt(&self) -> &str {
        text(&self.attrs, "log_date_fmt", DEFAULT_LOG_DATE_FMT)
    }

    /// Returns the log message template.
    #[must_use]
    pub fn log_fmt(&self) -> &str {
        text(&self.attrs, "log_fmt", DEFAULT_LOG_FMT)
    }

    /// Returns the log level name, as configured.
    #[must_use]
    pub fn log_lvl(&self) -> &str {
        text(&self.attrs, "log_lvl", DEFAULT_LOG_LVL)
    }

    /// Returns an attribute by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    /// Sets an attribute; the logging parameters must stay text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Attr`] if the value is rejected or `name` is a
    /// method name.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), ConfigError> {
        self.attrs.set(name, value)?;
        Ok(())
    }
}

impl Reflect for Config {
    fn attrs(&self) -> &AttrStore {
        &self.attrs
    }

    fn attrs_mut(&mut self) -> &mut AttrStore {
        &mut self.attrs
    }
}

fn default_attrs() -> Result<AttrStore, AttrError> {
    let mut attrs = AttrStore::new()
        .with_field(TypeChecker::new("log_date_fmt", StringType))
        .with_field(TypeChecker::new("log_fmt", StringType))
        .with_field(TypeChecker::new("log_lvl", StringType))
        .with_reserved(METHODS.iter().copied());

    attrs.set("log_date_fmt", Value::from(DEFAULT_LOG_DATE_FMT))?;
    attrs.set("log_fmt", Value::from(DEFAULT_LOG_FMT))?;
    attrs.set("log_lvl", Value::from(DEFAULT_LOG_LVL))?;
    Ok(attrs)
}

fn settings(path: Option<&Path>) -> Result<(AttrStore, ConfigSource), ConfigError> {
    let mut attrs = default_attrs()?;

    let source = match path {
        Some(path) => {
            let (resolved, values) = read(path)?;
            attrs.update(&values)?;
            tracing::debug!("Loaded configuration from {}", resolved.display());
            ConfigSource::File(resolved)
        }
        None => ConfigSource::Defaults,
    };
    Ok((attrs, source))
}

fn read(path: &Path) -> Result<(PathBuf, Map<String, Value>), UtilError> {
    let resolved = utils::check_exists(path)?;
    utils::check_extension(&resolved, EXTENSIONS)?;
    let values = utils::load_json_object(&resolved)?;
    Ok((resolved, values))
}

fn text<'a>(attrs: &'a AttrStore, name: &str, default: &'a str) -> &'a str {
    attrs.get(name).and_then(Value::as_str).unwrap_or(default)
}
