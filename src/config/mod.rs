pub mod persist;
mod types;

pub use persist::TomlStore;
pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Settings file used when `--config` is not given.
pub const DEFAULT_SETTINGS_PATH: &str = "~/.config/toolshed/settings.toml";

/// Table holding tool paths and timeouts.
pub const TOOLS_TABLE: &str = "thirdparty";

/// Resolve the settings file location.
pub fn settings_path(custom_path: Option<&Path>) -> PathBuf {
    match custom_path {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(shellexpand::tilde(DEFAULT_SETTINGS_PATH).as_ref()),
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from `path`, or return the default config if it does not exist yet
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!("No config file at {:?}; using defaults", path);
        Ok(Config::default())
    }
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if let Some(dir) = &config.app.dir {
        if !dir.is_absolute() {
            anyhow::bail!("app.dir must be an absolute path, got {:?}", dir);
        }
        if !dir.is_dir() {
            tracing::warn!("app.dir does not exist: {:?}", dir);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_path_wins() {
        assert_eq!(
            settings_path(Some(Path::new("/etc/toolshed.toml"))),
            PathBuf::from("/etc/toolshed.toml")
        );
    }

    #[test]
    fn default_path_is_expanded() {
        let path = settings_path(None);
        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.ends_with(".config/toolshed/settings.toml"));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config_or_default(&tmp.path().join("absent.toml")).unwrap();
        assert!(config.app.dir.is_none());
    }

    #[test]
    fn app_section_is_parsed_alongside_tool_table() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(
            &path,
            "[app]\ndir = \"/opt/studio\"\nlog = \"toolshed=debug\"\n\n[thirdparty]\ntranscoder-path = \"/usr/bin\"\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.app.dir, Some(PathBuf::from("/opt/studio")));
        assert_eq!(config.app.log.as_deref(), Some("toolshed=debug"));
    }

    #[test]
    fn relative_app_dir_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(&path, "[app]\ndir = \"studio\"\n").unwrap();
        assert!(load_config(&path).is_err());
    }
}
