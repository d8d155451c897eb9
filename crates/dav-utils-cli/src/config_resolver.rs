//! Configuration file resolution.
//!
//! Resolves the configuration file path using a deterministic priority order:
//!
//! 1. `--config` flag or `$DAV_UTILS_CONFIG` (explicit path)
//! 2. `config.json` in the working directory
//! 3. No config found → defaults

use anyhow::{Context, Result};
use dav_utils::Config;
use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    /// Explicitly specified via `--config` or the environment.
    Explicit(PathBuf),
    /// Found in the working directory.
    Project(PathBuf),
    /// No config found; defaults will be used.
    Default,
}

impl ConfigLocation {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) => Some(p),
            Self::Default => None,
        }
    }
}

/// Config file name looked up in the working directory.
const PROJECT_CONFIG_NAME: &str = "config.json";

/// Resolves the configuration file path.
///
/// See module-level docs for resolution order.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigLocation {
    if let Some(p) = explicit {
        return ConfigLocation::Explicit(p.to_path_buf());
    }

    let candidate = project_dir.join(PROJECT_CONFIG_NAME);
    if candidate.exists() {
        tracing::debug!("Found project config: {}", candidate.display());
        return ConfigLocation::Project(candidate);
    }

    ConfigLocation::Default
}

/// Builds the [`Config`] for a resolved location.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded.
pub fn load(location: &ConfigLocation) -> Result<Config> {
    match location.path() {
        Some(p) => Config::from_file(p)
            .with_context(|| format!("Failed to load config: {}", p.display())),
        None => Config::new().context("Failed to build default config"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_takes_priority_over_project() {
        let tmp = TempDir::new().unwrap();
        let explicit = tmp.path().join("custom.json");
        fs::write(&explicit, "{}").unwrap();
        fs::write(tmp.path().join("config.json"), "{}").unwrap();

        let result = resolve(tmp.path(), Some(&explicit));
        assert_eq!(result, ConfigLocation::Explicit(explicit));
    }

    #[test]
    fn explicit_does_not_check_existence() {
        // Explicit path is trusted as-is (loading reports the missing file)
        let result = resolve(Path::new("/tmp"), Some(Path::new("/nonexistent.json")));
        assert_eq!(
            result,
            ConfigLocation::Explicit(PathBuf::from("/nonexistent.json"))
        );
    }

    #[test]
    fn project_config_found() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.json"), "{}").unwrap();

        let result = resolve(tmp.path(), None);
        assert_eq!(
            result,
            ConfigLocation::Project(tmp.path().join("config.json"))
        );
    }

    #[test]
    fn no_config_anywhere_returns_default() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(resolve(tmp.path(), None), ConfigLocation::Default);
        assert!(ConfigLocation::Default.path().is_none());
    }

    #[test]
    fn load_reads_resolved_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{"LOG_LVL": "ERROR", "NAME": "nightly"}"#).unwrap();

        let config = load(&ConfigLocation::Project(path)).unwrap();
        assert_eq!(config.log_lvl(), "ERROR");
        assert_eq!(config.get("name"), Some(&serde_json::json!("nightly")));
    }

    #[test]
    fn load_reports_missing_explicit_file() {
        let tmp = TempDir::new().unwrap();
        let missing = ConfigLocation::Explicit(tmp.path().join("missing.json"));

        let err = load(&missing).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }
}
