//! Resolution of configured tool directories and presence checks.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::platform::Platform;
use crate::tool::Binary;

/// Answers "is there a file at this path?".
///
/// The default implementation is [`LocalFs`]. Any `Fn(&Path) -> bool` closure
/// also works, e.g. a fake filesystem in tests.
pub trait FileProbe: Send + Sync {
    fn exists_as_file(&self, path: &Path) -> bool;
}

/// [`FileProbe`] backed by the local filesystem.
///
/// Symlinks are followed; a dangling link is reported as missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileProbe for LocalFs {
    fn exists_as_file(&self, path: &Path) -> bool {
        std::fs::metadata(path)
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }
}

impl<F> FileProbe for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn exists_as_file(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Turns configured directory strings into absolute locations.
#[derive(Clone)]
pub struct PathResolver {
    app_dir: PathBuf,
    platform: Platform,
    probe: Arc<dyn FileProbe>,
}

impl fmt::Debug for PathResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathResolver")
            .field("app_dir", &self.app_dir)
            .field("platform", &self.platform.name)
            .finish_non_exhaustive()
    }
}

impl PathResolver {
    /// Resolver for the local filesystem on the current platform.
    pub fn new(app_dir: impl Into<PathBuf>) -> Self {
        Self::with_probe(app_dir, Platform::current(), Arc::new(LocalFs))
    }

    /// Resolver with an explicit platform table and file probe.
    pub fn with_probe(
        app_dir: impl Into<PathBuf>,
        platform: Platform,
        probe: Arc<dyn FileProbe>,
    ) -> Self {
        Self {
            app_dir: app_dir.into(),
            platform,
            probe,
        }
    }

    /// The host application's own directory.
    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Resolve a configured directory.
    ///
    /// An empty string or one starting with `.` is anchored at the
    /// application directory; anything else is used as-is. Process launches
    /// go through the same rule.
    pub fn resolve(&self, base: &str) -> PathBuf {
        if base.is_empty() || base.starts_with('.') {
            self.app_dir.join(base)
        } else {
            PathBuf::from(base)
        }
    }

    /// Full path of `binary` inside the configured directory `dir`.
    pub fn executable_path(&self, dir: &str, binary: Binary) -> PathBuf {
        self.resolve(dir)
            .join(self.platform.executable_name(binary.stem()))
    }

    /// Whether every one of `binaries` exists in `dir`.
    pub fn exists(&self, dir: &str, binaries: &[Binary]) -> bool {
        binaries.iter().all(|&binary| {
            let path = self.executable_path(dir, binary);
            let found = self.probe.exists_as_file(&path);
            tracing::trace!("Probe {} -> {}", path.display(), found);
            found
        })
    }
}
