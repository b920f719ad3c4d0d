//! Autodetection of tool installations.
//!
//! Candidates are probed in a fixed order: the configured directory, the
//! application directory itself, the tool's bundled subdirectories, then the
//! platform's system directories. The first directory holding every required
//! executable wins.

use crate::resolver::PathResolver;
use crate::tool::Tool;

/// Candidate directories for `tool`, in probe order.
///
/// `configured` is always first, even when empty (an empty path resolves to
/// the application directory).
pub fn candidates(resolver: &PathResolver, tool: Tool, configured: &str) -> Vec<String> {
    let mut dirs = Vec::with_capacity(2 + tool.bundled_dirs().len() + 3);
    dirs.push(configured.to_string());
    dirs.push(".".to_string());
    dirs.extend(tool.bundled_dirs().iter().map(|d| d.to_string()));
    dirs.extend(resolver.platform().system_dirs.iter().map(|d| d.to_string()));
    dirs
}

/// Find the first candidate directory where `tool` is fully installed.
///
/// Returns the candidate as written (e.g. `"./ffmpeg/bin"`), not its resolved
/// form, so a persisted result stays relative to the application directory.
pub fn autodetect(resolver: &PathResolver, tool: Tool, configured: &str) -> Option<String> {
    let found = candidates(resolver, tool, configured)
        .into_iter()
        .find(|dir| {
            let present = resolver.exists(dir, tool.required_binaries());
            tracing::debug!("Checking {} in {:?}: {}", tool, dir, present);
            present
        });

    match &found {
        Some(dir) => tracing::info!("Detected {} in {:?}", tool, dir),
        None => tracing::debug!("No {} installation found", tool),
    }

    found
}
