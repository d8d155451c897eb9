//! Path checks used before reading or writing files.

use super::UtilError;
use std::path::{Path, PathBuf};

/// Returns the directory holding the running executable.
///
/// Used as the fallback location for relative paths that do not exist in
/// the current directory.
#[must_use]
pub fn install_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// Returns `path` if it exists, else the same path under [`install_dir`].
///
/// # Errors
///
/// Returns [`UtilError::NotFound`] if neither location exists.
pub fn check_exists(path: impl AsRef<Path>) -> Result<PathBuf, UtilError> {
    check_exists_in(path.as_ref(), install_dir().as_deref())
}

/// Testable core of [`check_exists`]: takes the fallback directory as a
/// parameter.
///
/// # Errors
///
/// Returns [`UtilError::NotFound`] naming the last path tried.
pub fn check_exists_in(path: &Path, fallback_dir: Option<&Path>) -> Result<PathBuf, UtilError> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }

    let Some(dir) = fallback_dir else {
        return Err(UtilError::NotFound {
            path: path.to_path_buf(),
        });
    };

    let candidate = dir.join(path);
    if candidate.exists() {
        tracing::debug!(
            "{} not found, using {}",
            path.display(),
            candidate.display()
        );
        return Ok(candidate);
    }

    Err(UtilError::NotFound { path: candidate })
}

/// Returns `path` if nothing exists there yet.
///
/// # Errors
///
/// Returns [`UtilError::AlreadyExists`] if the path is taken.
pub fn check_not_exists(path: impl AsRef<Path>) -> Result<PathBuf, UtilError> {
    let path = path.as_ref();
    if path.exists() {
        return Err(UtilError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    Ok(path.to_path_buf())
}

/// Checks that the extension of `path` is one of `extensions`.
///
/// Extensions are written with their leading dot (`".json"`) and compared
/// case-sensitively.
///
/// # Errors
///
/// Returns [`UtilError::ExtensionMismatch`] otherwise.
pub fn check_extension(path: impl AsRef<Path>, extensions: &[&str]) -> Result<(), UtilError> {
    let path = path.as_ref();
    let found = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    if extensions.contains(&found.as_str()) {
        Ok(())
    } else {
        Err(UtilError::ExtensionMismatch {
            path: path.to_path_buf(),
            found,
            expected: extensions.iter().map(|e| (*e).to_string()).collect(),
        })
    }
}
