use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings for the toolshed binary itself, read from the `[app]` table.
///
/// Tool paths and timeouts live in the `[thirdparty]` table of the same file
/// and are accessed through [`super::TomlStore`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Directory relative tool paths are anchored at. Defaults to the
    /// directory of the running executable.
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is not set (e.g. "toolshed=debug").
    #[serde(default)]
    pub log: Option<String>,
}
