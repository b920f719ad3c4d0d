//! Tool settings persisted in a TOML file, using toml_edit to preserve
//! formatting and comments.

use super::TOOLS_TABLE;
use anyhow::{Context, Result};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use toml_edit::{DocumentMut, Item};
use ts_core::{SettingKey, SettingsStore};

/// [`SettingsStore`] backed by the `[thirdparty]` table of a TOML file.
///
/// The file is read once on open; every write updates the in-memory
/// document and rewrites the file. Other tables and comments are kept.
#[derive(Debug)]
pub struct TomlStore {
    path: PathBuf,
    doc: RwLock<DocumentMut>,
}

impl TomlStore {
    /// Open the settings file at `path`. A missing file starts out empty and
    /// is created on the first write.
    pub fn open(path: &Path) -> Result<Self> {
        let doc = match std::fs::read_to_string(path) {
            Ok(content) => content
                .parse::<DocumentMut>()
                .with_context(|| format!("Failed to parse settings file: {:?}", path))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No settings file at {:?}; starting empty", path);
                DocumentMut::new()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read settings file: {:?}", path))
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            doc: RwLock::new(doc),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lookup<T>(&self, key: SettingKey, read: impl FnOnce(&Item) -> Option<T>) -> Option<T> {
        let doc = self.doc.read();
        doc.get(TOOLS_TABLE)
            .and_then(|table| table.get(key.as_str()))
            .and_then(read)
    }

    /// Update `key` and save the file. The in-memory document only changes
    /// once the file has been written, so a failed save leaves both untouched.
    fn write(&self, key: SettingKey, value: toml_edit::Value) -> ts_core::Result<()> {
        // The lock is held across the file write so writers never interleave.
        let mut doc = self.doc.write();

        let mut updated = doc.clone();
        if !updated.contains_table(TOOLS_TABLE) {
            updated.insert(TOOLS_TABLE, toml_edit::table());
        }
        updated[TOOLS_TABLE][key.as_str()] = toml_edit::value(value);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, updated.to_string())?;

        *doc = updated;
        tracing::debug!("Saved {} to {:?}", key, self.path);
        Ok(())
    }
}

impl SettingsStore for TomlStore {
    fn get_string(&self, key: SettingKey) -> String {
        self.lookup(key, |item| {
            item.as_str()
                .map(str::to_string)
                .or_else(|| item.as_integer().map(|i| i.to_string()))
        })
        .unwrap_or_default()
    }

    fn get_int(&self, key: SettingKey) -> i64 {
        self.lookup(key, |item| {
            item.as_integer()
                .or_else(|| item.as_str().and_then(|s| s.trim().parse().ok()))
        })
        .unwrap_or_else(|| key.default_int())
    }

    fn set_string(&self, key: SettingKey, value: &str) -> ts_core::Result<()> {
        self.write(key, value.into())
    }

    fn set_int(&self, key: SettingKey, value: i64) -> ts_core::Result<()> {
        self.write(key, value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_reads_defaults() {
        let tmp = TempDir::new().unwrap();
        let store = TomlStore::open(&tmp.path().join("settings.toml")).unwrap();
        assert_eq!(store.get_string(SettingKey::TranscoderPath), "");
        assert_eq!(store.get_int(SettingKey::TranscoderTimeout), 600);
    }

    #[test]
    fn first_write_creates_file_and_parents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/settings.toml");
        let store = TomlStore::open(&path).unwrap();

        store.set_string(SettingKey::LipSyncPath, "./rhubarb").unwrap();
        store.set_int(SettingKey::LipSyncTimeout, -1).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[thirdparty]"));
        assert!(content.contains("lipsync-path = \"./rhubarb\""));
        assert!(content.contains("lipsync-timeout = -1"));
    }

    #[test]
    fn values_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.toml");
        {
            let store = TomlStore::open(&path).unwrap();
            store.set_string(SettingKey::TranscoderPath, "/usr/bin").unwrap();
            store.set_int(SettingKey::TranscoderTimeout, 45).unwrap();
        }
        let store = TomlStore::open(&path).unwrap();
        assert_eq!(store.get_string(SettingKey::TranscoderPath), "/usr/bin");
        assert_eq!(store.get_int(SettingKey::TranscoderTimeout), 45);
    }

    #[test]
    fn comments_and_other_tables_are_preserved() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(
            &path,
            "# studio settings\n[app]\nlog = \"info\" # keep quiet\n\n[thirdparty]\n# bundled copy\ntranscoder-path = \"./ffmpeg\"\n",
        )
        .unwrap();

        let store = TomlStore::open(&path).unwrap();
        store.set_string(SettingKey::TranscoderPath, "/usr/local/bin").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("# studio settings"));
        assert!(content.contains("log = \"info\" # keep quiet"));
        assert!(content.contains("# bundled copy"));
        assert!(content.contains("transcoder-path = \"/usr/local/bin\""));
    }

    #[test]
    fn loosely_typed_values_are_accepted() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(&path, "[thirdparty]\nlipsync-timeout = \"90\"\nlipsync-path = 7\n").unwrap();

        let store = TomlStore::open(&path).unwrap();
        assert_eq!(store.get_int(SettingKey::LipSyncTimeout), 90);
        assert_eq!(store.get_string(SettingKey::LipSyncPath), "7");
    }

    #[test]
    fn failed_save_keeps_previous_value() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("blocker/settings.toml");
        let store = TomlStore::open(&path).unwrap();

        // A regular file where the parent directory should be.
        std::fs::write(tmp.path().join("blocker"), "").unwrap();

        assert!(store.set_string(SettingKey::TranscoderPath, "/usr/bin").is_err());
        assert_eq!(store.get_string(SettingKey::TranscoderPath), "");

        std::fs::remove_file(tmp.path().join("blocker")).unwrap();
        store.set_string(SettingKey::TranscoderPath, "/usr/bin").unwrap();
        assert_eq!(store.get_string(SettingKey::TranscoderPath), "/usr/bin");
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("transcoder-path = \"/usr/bin\""));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(&path, "[thirdparty\n").unwrap();
        assert!(TomlStore::open(&path).is_err());
    }
}
