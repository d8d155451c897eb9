//! Template command implementation.

use anyhow::{Context, Result};
use dav_utils::utils::check_not_exists;
use std::path::Path;

use crate::config_resolver::{self, ConfigLocation};

/// Runs the template command.
pub fn run(source: &ConfigLocation, path: &Path, force: bool) -> Result<()> {
    if !force {
        check_not_exists(path).context("Use --force to overwrite")?;
    }

    let config = config_resolver::load(source)?;
    config
        .create_template(path)
        .with_context(|| format!("Failed to write template: {}", path.display()))?;

    println!("Created {}", path.display());
    Ok(())
}
