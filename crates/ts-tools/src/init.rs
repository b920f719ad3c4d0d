//! Startup detection of tool installations.

use serde::Serialize;

use crate::registry::ToolRegistry;
use crate::tool::Tool;

/// What [`initialize`] did for one tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DetectReport {
    /// The configured directory was already valid.
    AlreadyConfigured { tool: Tool, directory: String },
    /// A new directory was found and persisted.
    Detected { tool: Tool, directory: String },
    /// No candidate directory holds the tool.
    NotFound { tool: Tool },
}

impl DetectReport {
    pub fn tool(&self) -> Tool {
        match self {
            DetectReport::AlreadyConfigured { tool, .. }
            | DetectReport::Detected { tool, .. }
            | DetectReport::NotFound { tool } => *tool,
        }
    }
}

/// Detect any tool whose configured directory is invalid and persist the hit.
///
/// Intended to run once at startup. Nothing here is an error for the caller:
/// a tool that cannot be found simply stays unconfigured, and a failed write
/// is logged and skipped.
pub fn initialize(registry: &ToolRegistry) -> Vec<DetectReport> {
    Tool::ALL
        .into_iter()
        .map(|tool| initialize_tool(registry, tool))
        .collect()
}

fn initialize_tool(registry: &ToolRegistry, tool: Tool) -> DetectReport {
    if registry.is_configured(tool) {
        let directory = registry.directory(tool);
        tracing::debug!("{} already configured in {:?}", tool, directory);
        return DetectReport::AlreadyConfigured { tool, directory };
    }

    let Some(directory) = registry.autodetect(tool) else {
        tracing::info!("{} not found; features that need it stay disabled", tool);
        return DetectReport::NotFound { tool };
    };

    if let Err(e) = registry.set_directory(tool, &directory) {
        tracing::warn!("Failed to save detected {} directory {:?}: {}", tool, directory, e);
    }
    DetectReport::Detected { tool, directory }
}
