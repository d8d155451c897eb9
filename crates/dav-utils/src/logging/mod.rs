//! Script logger: one named logger with a level, a message template and a
//! set of output handlers.
//!
//! The logger is a private [`tracing`] dispatcher. It is never installed as
//! the global default, so messages sent through a [`Logging`] reach only its
//! own handlers, and events from other code never reach them.
//!
//! ```no_run
//! use dav_utils::logging::Logging;
//!
//! let log = Logging::new("%H:%M:%S", "%(asctime)s|%(levelname).1s|%(message)s", "info")?;
//! log.info("started");
//! # Ok::<(), dav_utils::logging::LoggingError>(())
//! ```

mod format;
mod handler;
mod level;

pub use format::{validate_date_format, LogFormat};
pub use handler::{FileHandler, Handler, StdoutHandler};
pub use level::LogLevel;

use chrono::Local;
use format::Record;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::field::{Field, Visit};
use tracing::{Dispatch, Event, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

/// Logger name used by [`Logging::new`].
pub const DEFAULT_LOGGER_NAME: &str = "dav_utils";

/// Logging configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The message template cannot be parsed.
    #[error("Invalid log format `{template}`: {reason}")]
    Format {
        /// The template text.
        template: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The date format contains an unknown directive.
    #[error("Invalid log date format `{date_fmt}`")]
    DateFormat {
        /// The date format text.
        date_fmt: String,
    },

    /// A handler's destination cannot be opened.
    #[error("Failed to open log file {}: {source}", path.display())]
    Io {
        /// Path of the destination.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
}

type Handlers = Arc<Mutex<Vec<Box<dyn Handler>>>>;

fn lock(handlers: &Handlers) -> MutexGuard<'_, Vec<Box<dyn Handler>>> {
    handlers.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Configured script logger.
///
/// A standard-output handler is attached on construction. Handlers are
/// released by [`Logging::close`], which also runs on drop.
#[derive(Debug)]
pub struct Logging {
    name: String,
    level: LogLevel,
    log_fmt: String,
    log_date_fmt: String,
    handlers: Handlers,
    dispatch: Dispatch,
    closed: bool,
}

impl Logging {
    /// Creates a logger named [`DEFAULT_LOGGER_NAME`].
    ///
    /// # Errors
    ///
    /// See [`Logging::named`].
    pub fn new(log_date_fmt: &str, log_fmt: &str, log_lvl: &str) -> Result<Self, LoggingError> {
        Self::named(DEFAULT_LOGGER_NAME, log_date_fmt, log_fmt, log_lvl)
    }

    /// Creates a logger called `name`.
    ///
    /// `log_lvl` is matched case-insensitively against the [`LogLevel`]
    /// names; anything else selects [`LogLevel::Error`].
    ///
    /// # Errors
    ///
    /// Returns [`LoggingError::Format`] or [`LoggingError::DateFormat`] if
    /// either template is invalid.
    pub fn named(
        name: &str,
        log_date_fmt: &str,
        log_fmt: &str,
        log_lvl: &str,
    ) -> Result<Self, LoggingError> {
        let level = LogLevel::from_name(log_lvl);
        let format = LogFormat::parse(log_fmt)?;
        validate_date_format(log_date_fmt)?;

        let handlers = Handlers::default();
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(HandlerWriter(Arc::clone(&handlers)))
            .event_format(TemplateFormat {
                name: name.to_string(),
                format,
                date_fmt: log_date_fmt.to_string(),
            });
        let subscriber = tracing_subscriber::registry()
            .with(layer)
            .with(LevelFilter::from_level(level.tracing_level()));

        let mut logging = Self {
            name: name.to_string(),
            level,
            log_fmt: log_fmt.to_string(),
            log_date_fmt: log_date_fmt.to_string(),
            handlers,
            dispatch: Dispatch::new(subscriber),
            closed: false,
        };
        logging.add_handler(Box::new(StdoutHandler::new()));
        logging.debug("Log configuration applied.");
        Ok(logging)
    }

    /// Returns the logger name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the effective level.
    #[must_use]
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Returns the message template.
    #[must_use]
    pub fn log_fmt(&self) -> &str {
        &self.log_fmt
    }

    /// Returns the date format.
    #[must_use]
    pub fn log_date_fmt(&self) -> &str {
        &self.log_date_fmt
    }

    /// Attaches another output handler.
    pub fn add_handler(&mut self, handler: Box<dyn Handler>) {
        lock(&self.handlers).push(handler);
    }

    /// Returns the number of attached handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        lock(&self.handlers).len()
    }

    /// Returns `true` if messages at `level` are written.
    #[must_use]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    /// Writes `message` at `level`.
    pub fn log(&self, level: LogLevel, message: &str) {
        if !self.is_enabled(level) {
            return;
        }
        let severity = level.name();
        tracing::dispatcher::with_default(&self.dispatch, || match level {
            LogLevel::Debug => tracing::debug!(severity, "{message}"),
            LogLevel::Info => tracing::info!(severity, "{message}"),
            LogLevel::Warning => tracing::warn!(severity, "{message}"),
            LogLevel::Error | LogLevel::Critical => tracing::error!(severity, "{message}"),
        });
    }

    /// Writes a debug message.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Writes an info message.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Writes a warning message.
    pub fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    /// Writes an error message.
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    /// Writes a critical message.
    pub fn critical(&self, message: &str) {
        self.log(LogLevel::Critical, message);
    }

    /// Closes and detaches every handler.
    ///
    /// Later messages are discarded. Calling this again does nothing.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.debug("Remove existing handlers.");
        let detached: Vec<_> = lock(&self.handlers).drain(..).collect();
        for mut handler in detached {
            if let Err(e) = handler.close() {
                tracing::warn!("Failed to close log handler {handler:?}: {e}");
            }
        }
        self.closed = true;
    }
}

impl Drop for Logging {
    fn drop(&mut self) {
        self.close();
    }
}

/// Fans each formatted line out to the attached handlers.
#[derive(Clone)]
struct HandlerWriter(Handlers);

impl io::Write for HandlerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let line = String::from_utf8_lossy(buf);
        let mut first_error = None;
        for handler in lock(&self.0).iter_mut() {
            if let Err(e) = handler.emit(&line) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        lock(&self.0).iter_mut().try_for_each(|handler| handler.flush())
    }
}

impl<'a> MakeWriter<'a> for HandlerWriter {
    type Writer = HandlerWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Renders events through a [`LogFormat`].
struct TemplateFormat {
    name: String,
    format: LogFormat,
    date_fmt: String,
}

impl<S, N> FormatEvent<S, N> for TemplateFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let record = Record {
            time: Local::now(),
            level: visitor
                .severity
                .unwrap_or_else(|| LogLevel::from_tracing(*event.metadata().level())),
            message: &visitor.message,
            name: &self.name,
        };
        let line = self.format.render(&record, &self.date_fmt)?;
        writeln!(writer, "{line}")
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    severity: Option<LogLevel>,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "severity" => self.severity = Some(LogLevel::from_name(value)),
            _ => {}
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const FMT: &str = "%(asctime)s.%(msecs)03d|%(levelname).1s|%(message)s";

    fn with_file(level: &str) -> (TempDir, PathBuf, Logging) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.log");
        let mut logging = Logging::new("%H:%M:%S", FMT, level).unwrap();
        logging.add_handler(Box::new(FileHandler::open(&path).unwrap()));
        (tmp, path, logging)
    }

    fn lines(path: &std::path::Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_each_level_writes_one_line() {
        let (_tmp, path, logging) = with_file("DEBUG");

        logging.debug("debug");
        logging.info("info");
        logging.warning("warning");
        logging.error("error");
        logging.critical("critical");

        let written = lines(&path);
        assert_eq!(written.len(), 5);
        let tails: Vec<&str> = written
            .iter()
            .map(|l| l.split_once('|').unwrap().1)
            .collect();
        assert_eq!(
            tails,
            ["D|debug", "I|info", "W|warning", "E|error", "C|critical"]
        );
    }

    #[test]
    fn test_default_line_shape() {
        let (_tmp, path, logging) = with_file("DEBUG");
        logging.debug("test");

        let written = lines(&path);
        let line = written.last().unwrap();
        let (time, rest) = line.split_once('|').unwrap();
        assert_eq!(rest, "D|test");

        let bytes = time.as_bytes();
        assert_eq!(bytes.len(), "HH:MM:SS.mmm".len(), "{time}");
        for (i, b) in bytes.iter().enumerate() {
            match i {
                2 | 5 => assert_eq!(*b, b':'),
                8 => assert_eq!(*b, b'.'),
                _ => assert!(b.is_ascii_digit(), "{time}"),
            }
        }
    }

    #[test]
    fn test_messages_below_level_are_dropped() {
        let (_tmp, path, logging) = with_file("warning");

        logging.debug("hidden");
        logging.info("hidden");
        logging.warning("shown");

        assert_eq!(lines(&path).len(), 1);
    }

    #[test]
    fn test_critical_level_drops_errors() {
        let (_tmp, path, logging) = with_file("CRITICAL");

        logging.error("hidden");
        logging.critical("shown");

        let written = lines(&path);
        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("|C|shown"));
    }

    #[test]
    fn test_unknown_level_falls_back_to_error() {
        let logging = Logging::new("%H:%M:%S", FMT, "NOPE").unwrap();
        assert_eq!(logging.level(), LogLevel::Error);
        assert!(!logging.is_enabled(LogLevel::Warning));
    }

    #[test]
    fn test_stdout_handler_attached() {
        let logging = Logging::new("%H:%M:%S", FMT, "ERROR").unwrap();
        assert_eq!(logging.handler_count(), 1);
    }

    #[test]
    fn test_close_detaches_handlers() {
        let (_tmp, path, mut logging) = with_file("DEBUG");
        logging.info("before");
        logging.close();

        assert_eq!(logging.handler_count(), 0);
        logging.info("after");
        logging.close();

        let written = lines(&path);
        assert!(written.iter().any(|l| l.ends_with("|D|Remove existing handlers.")));
        assert!(!written.iter().any(|l| l.ends_with("after")));
    }

    #[test]
    fn test_drop_flushes_file_handler() {
        let (_tmp, path, logging) = with_file("DEBUG");
        logging.info("last words");
        drop(logging);

        let written = lines(&path);
        assert!(written.last().unwrap().ends_with("|D|Remove existing handlers."));
    }

    #[test]
    fn test_loggers_are_isolated() {
        let (_tmp_a, path_a, a) = with_file("DEBUG");
        let (_tmp_b, path_b, b) = with_file("DEBUG");

        a.info("only a");
        b.info("only b");

        assert!(lines(&path_a).iter().all(|l| !l.contains("only b")));
        assert!(lines(&path_b).iter().all(|l| !l.contains("only a")));
    }

    #[test]
    fn test_named_logger() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("named.log");
        let mut logging = Logging::named("report", "%H", "%(name)s:%(message)s", "INFO").unwrap();
        logging.add_handler(Box::new(FileHandler::open(&path).unwrap()));

        logging.info("ready");
        assert_eq!(lines(&path), ["report:ready"]);
        assert_eq!(logging.name(), "report");
    }

    #[test]
    fn test_invalid_templates() {
        assert!(matches!(
            Logging::new("%H", "%(bogus)s", "INFO"),
            Err(LoggingError::Format { .. })
        ));
        assert!(matches!(
            Logging::new("%H:%", FMT, "INFO"),
            Err(LoggingError::DateFormat { .. })
        ));
    }
}
