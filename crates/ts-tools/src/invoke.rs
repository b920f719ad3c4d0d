//! Launching tool executables.
//!
//! Every launch re-reads the tool's directory from settings, so a path
//! changed after startup takes effect on the next call.

use std::path::{Path, PathBuf};

use ts_core::{Error, Result};

use crate::process::{InvocationOutcome, ToolProcess};
use crate::registry::ToolRegistry;
use crate::tool::Binary;

/// Raw PCM sample formats FFmpeg can write, keyed by bits per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// Unsigned 8-bit.
    U8,
    /// Signed 16-bit little-endian.
    S16Le,
    /// Signed 24-bit little-endian.
    S24Le,
    /// 32-bit float little-endian.
    F32Le,
}

impl SampleFormat {
    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            8 => Ok(SampleFormat::U8),
            16 => Ok(SampleFormat::S16Le),
            24 => Ok(SampleFormat::S24Le),
            32 => Ok(SampleFormat::F32Le),
            other => Err(Error::InvalidBitDepth(other)),
        }
    }

    /// FFmpeg `-f` muxer name.
    pub fn ffmpeg_name(&self) -> &'static str {
        match self {
            SampleFormat::U8 => "u8",
            SampleFormat::S16Le => "s16le",
            SampleFormat::S24Le => "s24le",
            SampleFormat::F32Le => "f32le",
        }
    }

    pub fn bits(&self) -> u32 {
        match self {
            SampleFormat::U8 => 8,
            SampleFormat::S16Le => 16,
            SampleFormat::S24Le => 24,
            SampleFormat::F32Le => 32,
        }
    }
}

/// Parameters for decoding an audio file to raw samples.
#[derive(Debug, Clone)]
pub struct AudioDecode {
    pub source: PathBuf,
    /// Output path; `-` writes the samples to standard output.
    pub destination: PathBuf,
    pub sample_rate: u32,
    pub bits_per_sample: u32,
    pub channels: u32,
}

/// Build the FFmpeg arguments for an [`AudioDecode`].
///
/// Fails with [`Error::InvalidBitDepth`] for any depth other than
/// 8, 16, 24 or 32.
pub fn audio_decode_args(decode: &AudioDecode) -> Result<Vec<String>> {
    let format = SampleFormat::from_bits(decode.bits_per_sample)?;
    Ok(vec![
        "-y".to_string(),
        "-i".to_string(),
        decode.source.to_string_lossy().to_string(),
        "-f".to_string(),
        format.ffmpeg_name().to_string(),
        "-ac".to_string(),
        decode.channels.to_string(),
        "-ar".to_string(),
        decode.sample_rate.to_string(),
        decode.destination.to_string_lossy().to_string(),
    ])
}

/// A request to run one tool executable.
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    binary: Binary,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    capture_stdout: bool,
}

impl ProcessRequest {
    pub fn new(binary: Binary) -> Self {
        Self {
            binary,
            args: Vec::new(),
            working_dir: None,
            capture_stdout: false,
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, s: impl Into<String>) -> Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Run in `dir` instead of the tool's own directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Keep standard output for [`InvocationOutcome`].
    pub fn capture_stdout(mut self) -> Self {
        self.capture_stdout = true;
        self
    }

    pub fn binary(&self) -> Binary {
        self.binary
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }
}

impl ToolRegistry {
    /// Launch the executable named by `request`.
    ///
    /// Returns [`Error::NotConfigured`] without spawning anything when the
    /// executable is not present in the tool's configured directory. The
    /// working directory defaults to that tool directory.
    pub fn start(&self, request: &ProcessRequest) -> Result<ToolProcess> {
        let tool = request.binary.tool();
        let dir = self.directory(tool);
        let resolver = self.resolver();

        if !resolver.exists(&dir, &[request.binary]) {
            tracing::warn!(
                "{} not found in {} directory {:?}",
                request.binary,
                tool,
                dir
            );
            return Err(Error::not_configured(tool.name()));
        }

        let program = resolver.executable_path(&dir, request.binary);
        let working_dir = match &request.working_dir {
            Some(custom) => custom.clone(),
            None => resolver.resolve(&dir),
        };

        ToolProcess::spawn(
            &program,
            &request.args,
            Some(working_dir.as_path()),
            request.capture_stdout,
        )
    }

    /// Launch FFmpeg to decode `decode.source` into raw samples.
    ///
    /// The bit depth is validated before anything is launched. Standard
    /// output is captured, so with a destination of `-` the decoded samples
    /// come back in [`InvocationOutcome::Success`].
    pub fn start_audio_decode(&self, decode: &AudioDecode) -> Result<ToolProcess> {
        let args = audio_decode_args(decode)?;
        self.start(&ProcessRequest::new(Binary::Ffmpeg).args(args).capture_stdout())
    }

    /// Launch and wait using the tool's configured timeout.
    ///
    /// On timeout the process is killed when the handle is dropped here.
    ///
    /// This blocks the calling thread. From async code, call it inside
    /// `tokio::task::spawn_blocking`; calling it on a runtime worker panics.
    pub fn run(&self, request: &ProcessRequest) -> Result<InvocationOutcome> {
        let mut process = self.start(request)?;
        Ok(process.wait_for(self.timeout(request.binary.tool())))
    }

    /// Decode audio and return the raw samples, using the configured timeout.
    ///
    /// Blocks like [`Self::run`].
    pub fn decode_audio(&self, decode: &AudioDecode) -> Result<Vec<u8>> {
        let mut process = self.start_audio_decode(decode)?;
        let outcome = process.wait_for(self.timeout(Binary::Ffmpeg.tool()));
        outcome.into_result(Binary::Ffmpeg.stem())
    }
}

/// Convenience for callers holding a plain path.
pub fn decode_to_stdout(
    source: &Path,
    sample_rate: u32,
    bits_per_sample: u32,
    channels: u32,
) -> AudioDecode {
    AudioDecode {
        source: source.to_path_buf(),
        destination: PathBuf::from("-"),
        sample_rate,
        bits_per_sample,
        channels,
    }
}
