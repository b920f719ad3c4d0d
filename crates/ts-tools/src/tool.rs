//! Static descriptions of the managed tools.
//!
//! Two helpers are managed: the FFmpeg transcoder (which needs both `ffmpeg`
//! and its companion `ffprobe`) and Rhubarb Lip Sync. Everything here is fixed
//! metadata; nothing is probed at runtime.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_core::SettingKey;

/// Video container extensions the transcoder can export.
const FFMPEG_VIDEO_EXTENSIONS: &[&str] = &["gif", "mp4", "webm"];

/// Audio extensions the transcoder can import.
const FFMPEG_AUDIO_EXTENSIONS: &[&str] = &["mp3", "ogg", "flac"];

/// A managed external tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// FFmpeg audio/video transcoder.
    Transcoder,
    /// Rhubarb lip-sync phoneme analyzer.
    LipSync,
}

impl Tool {
    pub const ALL: [Tool; 2] = [Tool::Transcoder, Tool::LipSync];

    /// Identifier used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Transcoder => "transcoder",
            Tool::LipSync => "lipsync",
        }
    }

    /// Executables that must all be present for the tool to count as installed.
    pub fn required_binaries(&self) -> &'static [Binary] {
        match self {
            Tool::Transcoder => &[Binary::Ffmpeg, Binary::Ffprobe],
            Tool::LipSync => &[Binary::Rhubarb],
        }
    }

    /// Bundled install locations, relative to the application directory.
    pub fn bundled_dirs(&self) -> &'static [&'static str] {
        match self {
            Tool::Transcoder => &["./ffmpeg", "./ffmpeg/bin", "./FFmpeg", "./FFmpeg/bin"],
            Tool::LipSync => &["./rhubarb", "./rhubarb/bin", "./Rhubarb-Lip-Sync"],
        }
    }

    /// Settings key holding the tool's directory.
    pub fn path_key(&self) -> SettingKey {
        match self {
            Tool::Transcoder => SettingKey::TranscoderPath,
            Tool::LipSync => SettingKey::LipSyncPath,
        }
    }

    /// Settings key holding the tool's timeout in seconds.
    pub fn timeout_key(&self) -> SettingKey {
        match self {
            Tool::Transcoder => SettingKey::TranscoderTimeout,
            Tool::LipSync => SettingKey::LipSyncTimeout,
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "transcoder" | "ffmpeg" => Ok(Tool::Transcoder),
            "lipsync" | "rhubarb" => Ok(Tool::LipSync),
            other => Err(format!(
                "unknown tool '{other}' (expected transcoder or lipsync)"
            )),
        }
    }
}

/// A single executable belonging to a [`Tool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Binary {
    Ffmpeg,
    Ffprobe,
    Rhubarb,
}

impl Binary {
    /// Executable name without platform suffix.
    pub fn stem(&self) -> &'static str {
        match self {
            Binary::Ffmpeg => "ffmpeg",
            Binary::Ffprobe => "ffprobe",
            Binary::Rhubarb => "rhubarb",
        }
    }

    /// The tool this executable ships with.
    pub fn tool(&self) -> Tool {
        match self {
            Binary::Ffmpeg | Binary::Ffprobe => Tool::Transcoder,
            Binary::Rhubarb => Tool::LipSync,
        }
    }
}

impl fmt::Display for Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}

impl FromStr for Binary {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ffmpeg" => Ok(Binary::Ffmpeg),
            "ffprobe" => Ok(Binary::Ffprobe),
            "rhubarb" => Ok(Binary::Rhubarb),
            other => Err(format!(
                "unknown executable '{other}' (expected ffmpeg, ffprobe or rhubarb)"
            )),
        }
    }
}

/// Video container extensions supported through the transcoder.
#[must_use]
pub fn ffmpeg_video_extensions() -> &'static [&'static str] {
    FFMPEG_VIDEO_EXTENSIONS
}

/// Audio extensions supported through the transcoder.
#[must_use]
pub fn ffmpeg_audio_extensions() -> &'static [&'static str] {
    FFMPEG_AUDIO_EXTENSIONS
}
