//! Show command implementation.

use anyhow::{Context, Result};
use dav_utils::Config;

use crate::config_resolver::ConfigLocation;

/// Runs the show command.
///
/// Only the JSON document is written to stdout; no logger is created.
pub fn run(source: &ConfigLocation) -> Result<()> {
    println!("{}", render(source)?);
    Ok(())
}

fn render(source: &ConfigLocation) -> Result<String> {
    let attrs = Config::effective_attrs(source.path()).with_context(|| match source.path() {
        Some(p) => format!("Failed to load config: {}", p.display()),
        None => "Failed to build default config".to_string(),
    })?;
    Ok(serde_json::to_string_pretty(&attrs)?)
}
