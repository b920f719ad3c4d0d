//! toolshed - locate, configure and run external helper tools
//!
//! This library crate exposes the binary's wiring for integration testing.

pub mod config;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use ts_tools::{PathResolver, ToolRegistry};

/// Open the settings file and build a registry over it.
///
/// The application directory is taken from `app_dir` if given, then from the
/// `[app] dir` setting, then from the location of the running executable.
pub fn open_registry(settings_path: &Path, app_dir: Option<&Path>) -> Result<ToolRegistry> {
    let config = config::load_config_or_default(settings_path)?;
    let app_dir = resolve_app_dir(app_dir, &config)?;
    let store = config::TomlStore::open(settings_path)?;

    tracing::debug!(
        "Using settings {:?}, application directory {:?}",
        settings_path,
        app_dir
    );

    Ok(ToolRegistry::new(Arc::new(store), PathResolver::new(app_dir)))
}

fn resolve_app_dir(flag: Option<&Path>, config: &config::Config) -> Result<PathBuf> {
    if let Some(dir) = flag.or(config.app.dir.as_deref()) {
        return Ok(dir.to_path_buf());
    }
    ts_tools::app_dir().context("Failed to determine application directory")
}
