//! Per-tool configuration backed by a [`SettingsStore`].
//!
//! The [`ToolRegistry`] is the one place the rest of the host asks "where is
//! the transcoder, and how long may it run?". Values are read through to the
//! store on every call so a change made elsewhere is picked up by the next
//! launch.

use parking_lot::Mutex;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use ts_core::{Result, SettingsStore};

use crate::autodetect;
use crate::process::Timeout;
use crate::resolver::PathResolver;
use crate::tool::{Binary, Tool};

/// Snapshot of one tool's configuration, as reported by [`ToolRegistry::status`].
#[derive(Debug, Clone, Serialize)]
pub struct ToolStatus {
    pub tool: Tool,
    /// Directory as stored in settings (may be relative or empty).
    pub directory: String,
    /// The same directory after relative-path resolution.
    pub resolved: PathBuf,
    /// Whether every required executable exists there.
    pub configured: bool,
    /// Timeout in seconds; negative means no limit.
    pub timeout_secs: i64,
}

/// Registry of the managed tools' locations and timeouts.
pub struct ToolRegistry {
    store: Arc<dyn SettingsStore>,
    resolver: PathResolver,
    /// Serializes compare-and-write in the setters.
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl ToolRegistry {
    pub fn new(store: Arc<dyn SettingsStore>, resolver: PathResolver) -> Self {
        Self {
            store,
            resolver,
            write_lock: Mutex::new(()),
        }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Configured directory for `tool`, as stored.
    pub fn directory(&self, tool: Tool) -> String {
        self.store.get_string(tool.path_key())
    }

    /// Store a new directory for `tool`.
    ///
    /// Nothing is written when `dir` equals the current value. Returns whether
    /// a write happened.
    pub fn set_directory(&self, tool: Tool, dir: &str) -> Result<bool> {
        let _guard = self.write_lock.lock();
        if self.store.get_string(tool.path_key()) == dir {
            return Ok(false);
        }
        self.store.set_string(tool.path_key(), dir)?;
        tracing::info!("Set {} directory to {:?}", tool, dir);
        Ok(true)
    }

    /// Configured timeout for `tool` in seconds; negative means no limit.
    pub fn timeout_secs(&self, tool: Tool) -> i64 {
        self.store.get_int(tool.timeout_key())
    }

    pub fn timeout(&self, tool: Tool) -> Timeout {
        Timeout::from_secs(self.timeout_secs(tool))
    }

    /// Store a new timeout for `tool`; same change guard as [`Self::set_directory`].
    pub fn set_timeout(&self, tool: Tool, secs: i64) -> Result<bool> {
        let _guard = self.write_lock.lock();
        if self.store.get_int(tool.timeout_key()) == secs {
            return Ok(false);
        }
        self.store.set_int(tool.timeout_key(), secs)?;
        tracing::info!("Set {} timeout to {}s", tool, secs);
        Ok(true)
    }

    /// Whether the configured directory holds every required executable.
    pub fn is_configured(&self, tool: Tool) -> bool {
        self.resolver
            .exists(&self.directory(tool), tool.required_binaries())
    }

    /// Current or best-effort directory for `tool`, without persisting it.
    pub fn autodetect(&self, tool: Tool) -> Option<String> {
        autodetect::autodetect(&self.resolver, tool, &self.directory(tool))
    }

    /// The configured directory after relative-path resolution.
    pub fn resolved_directory(&self, tool: Tool) -> PathBuf {
        self.resolver.resolve(&self.directory(tool))
    }

    /// Where `binary` would be launched from right now.
    pub fn executable_path(&self, binary: Binary) -> PathBuf {
        self.resolver
            .executable_path(&self.directory(binary.tool()), binary)
    }

    pub fn status(&self, tool: Tool) -> ToolStatus {
        let directory = self.directory(tool);
        ToolStatus {
            tool,
            resolved: self.resolver.resolve(&directory),
            configured: self.resolver.exists(&directory, tool.required_binaries()),
            timeout_secs: self.timeout_secs(tool),
            directory,
        }
    }
}
