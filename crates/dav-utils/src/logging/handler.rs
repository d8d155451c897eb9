//! Output handlers for formatted log lines.

use super::LoggingError;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// A destination for formatted log lines.
pub trait Handler: fmt::Debug + Send {
    /// Writes one formatted line, including its trailing newline.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error.
    fn emit(&mut self, line: &str) -> io::Result<()>;

    /// Flushes buffered output.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Releases the destination. Called once when the handler is detached.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error.
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

/// Writes log lines to standard output.
#[derive(Debug, Default)]
pub struct StdoutHandler;

impl StdoutHandler {
    /// Creates a stdout handler.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Handler for StdoutHandler {
    fn emit(&mut self, line: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(line.as_bytes())?;
        stdout.flush()
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

/// Appends log lines to a file, flushing after every line.
#[derive(Debug)]
pub struct FileHandler {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileHandler {
    /// Opens `path` for appending, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`LoggingError::Io`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoggingError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| LoggingError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: Some(BufWriter::new(file)),
        })
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Handler for FileHandler {
    fn emit(&mut self, line: &str) -> io::Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                format!("{} is closed", self.path.display()),
            ));
        };
        writer.write_all(line.as_bytes())?;
        writer.flush()
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        match self.writer.take() {
            Some(mut writer) => writer.flush(),
            None => Ok(()),
        }
    }
}
