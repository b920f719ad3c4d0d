//! ts-core: shared error type and persisted settings for toolshed.
//!
//! This crate is the foundational dependency for the other ts-* crates. It
//! provides the unified [`Error`] type whose variants keep apart the ways a
//! helper tool can fail, and the [`SettingsStore`] seam through which tool
//! locations and timeouts are read and persisted.

pub mod error;
pub mod settings;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use settings::{MemoryStore, SettingKey, SettingsStore};
