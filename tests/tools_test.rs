//! Integration tests for tool discovery and settings persistence.

use assert_matches::assert_matches;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;
use toolshed::config::TomlStore;
use ts_core::{MemoryStore, SettingKey, SettingsStore};
use ts_tools::{initialize, DetectReport, Platform, PathResolver, Tool, ToolRegistry};

/// Resolver over a fake filesystem holding only `files`.
fn fake_resolver(files: &'static [&'static str]) -> PathResolver {
    let probe = move |path: &Path| files.iter().any(|f| Path::new(f) == path);
    PathResolver::with_probe("/opt/studio", Platform::UNIX, Arc::new(probe))
}

#[test]
fn system_install_is_detected_and_saved_once() {
    let store = Arc::new(MemoryStore::new());
    let registry = ToolRegistry::new(
        store.clone(),
        fake_resolver(&["/usr/bin/ffmpeg", "/usr/bin/ffprobe"]),
    );

    assert_eq!(registry.autodetect(Tool::Transcoder).as_deref(), Some("/usr/bin"));

    let reports = initialize(&registry);
    assert_matches!(
        &reports[0],
        DetectReport::Detected { tool: Tool::Transcoder, directory } if directory == "/usr/bin"
    );
    assert_matches!(reports[1], DetectReport::NotFound { tool: Tool::LipSync });
    assert_eq!(store.get_string(SettingKey::TranscoderPath), "/usr/bin");
    assert_eq!(store.write_count(), 1);

    // A second startup finds the saved directory valid and writes nothing.
    let reports = initialize(&registry);
    assert_matches!(reports[0], DetectReport::AlreadyConfigured { .. });
    assert_eq!(store.write_count(), 1);
}

#[test]
fn bundled_copy_beats_system_install() {
    let registry = ToolRegistry::new(
        Arc::new(MemoryStore::new()),
        fake_resolver(&[
            "/opt/studio/./ffmpeg/bin/ffmpeg",
            "/opt/studio/./ffmpeg/bin/ffprobe",
            "/usr/bin/ffmpeg",
            "/usr/bin/ffprobe",
        ]),
    );
    assert_eq!(
        registry.autodetect(Tool::Transcoder).as_deref(),
        Some("./ffmpeg/bin")
    );
}

#[test]
fn half_installed_tool_is_not_configured() {
    // ffprobe missing: the directory is not usable for the transcoder.
    let registry = ToolRegistry::new(
        Arc::new(MemoryStore::new().with_string(SettingKey::TranscoderPath, "/usr/bin")),
        fake_resolver(&["/usr/bin/ffmpeg"]),
    );
    assert!(!registry.is_configured(Tool::Transcoder));
    assert_eq!(registry.autodetect(Tool::Transcoder), None);
}

#[test]
fn detected_directory_is_written_to_settings_file() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("settings.toml");
    std::fs::write(&path, "# keep me\n[app]\nlog = \"warn\"\n").unwrap();

    let store = Arc::new(TomlStore::open(&path).unwrap());
    let registry = ToolRegistry::new(store, fake_resolver(&["/usr/bin/rhubarb"]));
    initialize(&registry);

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("# keep me"));
    assert!(content.contains("lipsync-path = \"/usr/bin\""));
    assert!(!content.contains("transcoder-path"));

    let reopened = TomlStore::open(&path).unwrap();
    assert_eq!(reopened.get_string(SettingKey::LipSyncPath), "/usr/bin");
    assert_eq!(reopened.get_int(SettingKey::LipSyncTimeout), 600);
}

#[test]
fn unchanged_values_do_not_touch_the_file() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("settings.toml");

    let registry = ToolRegistry::new(
        Arc::new(TomlStore::open(&path).unwrap()),
        PathResolver::new(tmp.path()),
    );
    // Default timeout: nothing to write, so no file is created.
    assert!(!registry.set_timeout(Tool::Transcoder, 600).unwrap());
    assert!(!path.exists());

    assert!(registry.set_timeout(Tool::Transcoder, -1).unwrap());
    assert!(path.exists());
    assert!(registry.timeout(Tool::Transcoder).duration().is_none());
}

#[test]
fn failed_save_is_retried_on_next_set() {
    let tmp = tempdir().unwrap();
    let blocker = tmp.path().join("blocker");
    let path = blocker.join("settings.toml");

    let registry = ToolRegistry::new(
        Arc::new(TomlStore::open(&path).unwrap()),
        PathResolver::new(tmp.path()),
    );
    // The settings directory cannot be created while a file sits there.
    std::fs::write(&blocker, "").unwrap();

    assert!(registry.set_directory(Tool::Transcoder, "/usr/bin").is_err());
    assert_eq!(registry.directory(Tool::Transcoder), "");

    std::fs::remove_file(&blocker).unwrap();
    assert!(registry.set_directory(Tool::Transcoder, "/usr/bin").unwrap());
    assert!(std::fs::read_to_string(&path)
        .unwrap()
        .contains("transcoder-path = \"/usr/bin\""));
}
