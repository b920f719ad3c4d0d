use clap::{Parser, Subcommand};
use std::path::PathBuf;
use ts_tools::{Binary, Tool};

#[derive(Parser)]
#[command(name = "toolshed")]
#[command(author, version, about = "Locate, configure and run external helper tools")]
pub struct Cli {
    /// Path to settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory relative tool paths are anchored at
    #[arg(long, global = true)]
    pub app_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show where each tool is configured and whether it is usable
    CheckTools {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Autodetect tools whose configured directory is invalid and save the result
    Init,

    /// Print the directory autodetection would pick, without saving it
    Detect {
        /// transcoder or lipsync
        tool: Tool,
    },

    /// Set a tool's directory
    SetPath {
        /// transcoder or lipsync
        tool: Tool,

        /// Directory holding the executables (relative paths start with ".")
        dir: String,
    },

    /// Set a tool's timeout in seconds (negative for no limit)
    SetTimeout {
        /// transcoder or lipsync
        tool: Tool,

        #[arg(allow_hyphen_values = true)]
        secs: i64,
    },

    /// Decode an audio file to raw PCM samples with ffmpeg
    DecodeAudio {
        /// Audio file to decode
        #[arg(required = true)]
        input: PathBuf,

        /// File to write the raw samples to (printed as a byte count otherwise)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Sample rate in Hz
        #[arg(long, default_value = "44100")]
        rate: u32,

        /// Bits per sample: 8, 16, 24 or 32
        #[arg(long, default_value = "16")]
        bits: u32,

        /// Channel count
        #[arg(long, default_value = "2")]
        channels: u32,
    },

    /// Run ffmpeg, ffprobe or rhubarb with the configured timeout
    Run {
        /// Executable to run
        binary: Binary,

        /// Arguments passed through to the executable
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Show version information
    Version,
}
