//! Persisted tool settings.
//!
//! Tool locations and timeouts are owned by the host application's
//! preferences. [`SettingsStore`] is the narrow seam toolshed reads and writes
//! them through; [`MemoryStore`] is the in-process implementation used when
//! nothing needs to survive a restart (and by tests).

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Default timeout, in seconds, for every tool.
pub const DEFAULT_TIMEOUT_SECS: i64 = 600;

/// The fixed set of keys toolshed persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    TranscoderPath,
    TranscoderTimeout,
    LipSyncPath,
    LipSyncTimeout,
}

impl SettingKey {
    /// All keys, in declaration order.
    pub const ALL: [SettingKey; 4] = [
        SettingKey::TranscoderPath,
        SettingKey::TranscoderTimeout,
        SettingKey::LipSyncPath,
        SettingKey::LipSyncTimeout,
    ];

    /// The persisted name of the key.
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::TranscoderPath => "transcoder-path",
            SettingKey::TranscoderTimeout => "transcoder-timeout",
            SettingKey::LipSyncPath => "lipsync-path",
            SettingKey::LipSyncTimeout => "lipsync-timeout",
        }
    }

    /// Look a key up by its persisted name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }

    /// Value returned for an integer key that was never written.
    pub fn default_int(&self) -> i64 {
        match self {
            SettingKey::TranscoderTimeout | SettingKey::LipSyncTimeout => DEFAULT_TIMEOUT_SECS,
            SettingKey::TranscoderPath | SettingKey::LipSyncPath => 0,
        }
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read/write access to persisted settings.
///
/// Getters never fail: a missing or unreadable value yields the empty string
/// or [`SettingKey::default_int`]. Implementations must be safe to share
/// between threads.
pub trait SettingsStore: Send + Sync {
    /// Read a string value; missing keys read as `""`.
    fn get_string(&self, key: SettingKey) -> String;

    /// Read an integer value; missing keys read as the key's default.
    fn get_int(&self, key: SettingKey) -> i64;

    /// Persist a string value.
    fn set_string(&self, key: SettingKey, value: &str) -> crate::Result<()>;

    /// Persist an integer value.
    fn set_int(&self, key: SettingKey, value: i64) -> crate::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Text(String),
    Int(i64),
}

/// In-memory [`SettingsStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<SettingKey, Value>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a string value without counting it as a write.
    pub fn with_string(self, key: SettingKey, value: impl Into<String>) -> Self {
        self.values.write().insert(key, Value::Text(value.into()));
        self
    }

    /// Pre-populate an integer value without counting it as a write.
    pub fn with_int(self, key: SettingKey, value: i64) -> Self {
        self.values.write().insert(key, Value::Int(value));
        self
    }

    /// Number of `set_*` calls that reached the store.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl SettingsStore for MemoryStore {
    fn get_string(&self, key: SettingKey) -> String {
        match self.values.read().get(&key) {
            Some(Value::Text(s)) => s.clone(),
            Some(Value::Int(i)) => i.to_string(),
            None => String::new(),
        }
    }

    fn get_int(&self, key: SettingKey) -> i64 {
        match self.values.read().get(&key) {
            Some(Value::Int(i)) => *i,
            Some(Value::Text(s)) => s.trim().parse().unwrap_or_else(|_| key.default_int()),
            None => key.default_int(),
        }
    }

    fn set_string(&self, key: SettingKey, value: &str) -> crate::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.values.write().insert(key, Value::Text(value.to_string()));
        tracing::debug!("Stored {key} = {value:?}");
        Ok(())
    }

    fn set_int(&self, key: SettingKey, value: i64) -> crate::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.values.write().insert(key, Value::Int(value));
        tracing::debug!("Stored {key} = {value}");
        Ok(())
    }
}
