//! # ts-tools
//!
//! Discovery, configuration and bounded execution of the external helper
//! tools toolshed manages: the FFmpeg transcoder and Rhubarb Lip Sync.
//!
//! This crate provides:
//!
//! - **Path resolution** ([`PathResolver`]) -- anchor relative directories at
//!   the application directory and check that executables exist.
//! - **Autodetection** ([`autodetect()`]) -- probe a fixed, ordered list of
//!   candidate directories.
//! - **Configuration** ([`ToolRegistry`]) -- per-tool directory and timeout,
//!   read from and written to a [`ts_core::SettingsStore`].
//! - **Invocation** ([`ProcessRequest`], [`ToolRegistry::start`]) -- launch an
//!   executable from the configured directory.
//! - **Bounded wait** ([`ToolProcess::wait_for`]) -- block until success, tool
//!   error, timeout or start failure.
//! - **Startup** ([`initialize`]) -- autodetect and persist missing tools.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ts_core::MemoryStore;
//! use ts_tools::{app_dir, initialize, PathResolver, ProcessRequest, Binary, ToolRegistry};
//!
//! # fn main() -> ts_core::Result<()> {
//! let registry = ToolRegistry::new(Arc::new(MemoryStore::new()), PathResolver::new(app_dir()?));
//! initialize(&registry);
//!
//! let outcome = registry.run(&ProcessRequest::new(Binary::Ffprobe).arg("-version"))?;
//! println!("ffprobe: {}", outcome.kind());
//! # Ok(())
//! # }
//! ```

pub mod autodetect;
pub mod init;
pub mod invoke;
pub mod platform;
pub mod process;
pub mod registry;
pub mod resolver;
pub mod tool;

// ---- Re-exports for convenience ----

pub use autodetect::{autodetect, candidates};
pub use init::{initialize, DetectReport};
pub use invoke::{audio_decode_args, decode_to_stdout, AudioDecode, ProcessRequest, SampleFormat};
pub use platform::Platform;
pub use process::{InvocationOutcome, Timeout, ToolProcess};
pub use registry::{ToolRegistry, ToolStatus};
pub use resolver::{FileProbe, LocalFs, PathResolver};
pub use tool::{ffmpeg_audio_extensions, ffmpeg_video_extensions, Binary, Tool};

/// Directory containing the running executable.
///
/// Resolve this once at startup and hand it to [`PathResolver::new`].
pub fn app_dir() -> ts_core::Result<std::path::PathBuf> {
    let exe = std::env::current_exe()?;
    exe.parent()
        .map(|dir| dir.to_path_buf())
        .ok_or_else(|| ts_core::Error::Config(format!("{} has no parent directory", exe.display())))
}
