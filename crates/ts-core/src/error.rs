//! Unified error type for toolshed.
//!
//! The four invocation failures ([`Error::NotConfigured`],
//! [`Error::StartFailure`], [`Error::ToolFailed`], [`Error::Timeout`]) are
//! separate variants so callers can branch on what went wrong instead of
//! seeing a single "failed".

use std::time::Duration;

/// Unified error type covering all failure modes in toolshed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No valid directory is known for the tool and autodetection found none.
    #[error("{tool} is not configured; no valid installation directory found")]
    NotConfigured {
        /// Name of the tool (e.g. "transcoder").
        tool: String,
    },

    /// The operating system could not spawn the process.
    #[error("Failed to start {tool}: {message}")]
    StartFailure {
        /// Name of the executable that failed to launch.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// The process ran and exited unsuccessfully.
    #[error("Tool error [{tool}]: {}", describe_exit(.code, .message))]
    ToolFailed {
        /// Name of the executable that failed.
        tool: String,
        /// Exit code, if the process exited normally.
        code: Option<i32>,
        /// Captured diagnostics (usually stderr).
        message: String,
    },

    /// The process did not finish within the configured bound.
    #[error("{tool} timed out after {after:?}")]
    Timeout {
        /// Name of the executable that timed out.
        tool: String,
        /// The bound that was exceeded.
        after: Duration,
    },

    /// The requested bits-per-sample has no raw sample format.
    #[error("Unsupported bit depth: {0} (expected 8, 16, 24 or 32)")]
    InvalidBitDepth(u32),

    /// Settings could not be read or written.
    #[error("Config error: {0}")]
    Config(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

fn describe_exit(code: &Option<i32>, message: &str) -> String {
    let status = match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated without exit code".to_string(),
    };
    if message.trim().is_empty() {
        status
    } else {
        format!("{status}: {}", message.trim())
    }
}

impl Error {
    /// Convenience constructor for [`Error::NotConfigured`].
    pub fn not_configured(tool: impl Into<String>) -> Self {
        Error::NotConfigured { tool: tool.into() }
    }

    /// Convenience constructor for [`Error::StartFailure`].
    pub fn start_failure(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::StartFailure {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::ToolFailed`].
    pub fn tool_failed(tool: impl Into<String>, code: Option<i32>, message: impl Into<String>) -> Self {
        Error::ToolFailed {
            tool: tool.into(),
            code,
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Timeout`].
    pub fn timeout(tool: impl Into<String>, after: Duration) -> Self {
        Error::Timeout {
            tool: tool.into(),
            after,
        }
    }

    /// Whether the tool never ran because it is missing or could not launch.
    ///
    /// Callers use this to disable tool-dependent features rather than retry.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::NotConfigured { .. } | Error::StartFailure { .. })
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
