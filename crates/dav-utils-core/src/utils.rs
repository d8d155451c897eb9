//! File, path and date helpers shared by scripts.

pub mod dates;
pub mod files;
pub mod paths;

use std::path::PathBuf;

#[doc(inline)]
pub use dates::{date_to_str, str_to_date};
#[doc(inline)]
pub use files::{load_json_object, read_lines, save_json_file, save_text_file};
#[doc(inline)]
pub use paths::{check_exists, check_exists_in, check_extension, check_not_exists, install_dir};

/// Errors raised by the helpers in this module.
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    /// The file exists neither at the given path nor in the fallback directory.
    #[error("File {} not exists.", path.display())]
    NotFound {
        /// Last path that was tried.
        path: PathBuf,
    },

    /// The path is already taken.
    #[error("File {} already exists.", path.display())]
    AlreadyExists {
        /// The existing path.
        path: PathBuf,
    },

    /// The file extension is not one of the accepted ones.
    #[error("{} has extension `{found}`, expected one of: {}", path.display(), expected.join(", "))]
    ExtensionMismatch {
        /// The checked path.
        path: PathBuf,
        /// Extension found on the path, with its leading dot (empty if none).
        found: String,
        /// Accepted extensions.
        expected: Vec<String>,
    },

    /// A date could not be parsed or formatted with the given pattern.
    #[error("{message}")]
    Conversion {
        /// Description of the failure.
        message: String,
    },

    /// IO error on a file.
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The file is not valid JSON, or a value could not be serialized.
    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying serde error.
        source: serde_json::Error,
    },

    /// The JSON document is valid but its top level is not an object.
    #[error("{} does not contain a JSON object", path.display())]
    NotAnObject {
        /// The parsed path.
        path: PathBuf,
    },
}

impl UtilError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
