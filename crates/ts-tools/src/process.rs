//! Launched tool processes and the bounded wait over them.
//!
//! A [`ToolProcess`] owns one child process and a private current-thread
//! tokio runtime. [`ToolProcess::wait_for`] blocks the caller until exactly
//! one of four things happens: the tool exits successfully, the tool fails,
//! the timeout elapses, or (already known at launch) the tool never started.
//!
//! # Timeout policy
//!
//! A timeout ends the *wait*, not the process. After
//! [`InvocationOutcome::Timeout`] the child is still attached to its handle:
//! call [`ToolProcess::wait_for`] again to keep waiting, or
//! [`ToolProcess::kill`] to stop it. Dropping the handle kills the child.

use std::fmt;
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

use ts_core::{Error, Result};

/// How long output readers may keep going once the process has exited.
///
/// A pipe stays open past exit when the tool leaves a background child
/// holding it; whatever arrived within this window is kept.
const OUTPUT_GRACE: Duration = Duration::from_millis(500);

/// How long [`ToolProcess::wait_for`] may block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Wait until the process finishes, however long that takes.
    Unbounded,
    /// Give up waiting after this long.
    After(Duration),
}

impl Timeout {
    /// Interpret a persisted timeout: negative values mean no limit.
    pub fn from_secs(secs: i64) -> Self {
        if secs < 0 {
            Timeout::Unbounded
        } else {
            Timeout::After(Duration::from_secs(secs.unsigned_abs()))
        }
    }

    /// The bound, or `None` if unbounded.
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Timeout::Unbounded => None,
            Timeout::After(d) => Some(*d),
        }
    }

    /// Persisted form: whole seconds, `-1` when unbounded.
    pub fn as_secs(&self) -> i64 {
        match self {
            Timeout::Unbounded => -1,
            Timeout::After(d) => i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
        }
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeout::Unbounded => f.write_str("no limit"),
            Timeout::After(d) => write!(f, "{d:?}"),
        }
    }
}

/// Result of a single wait on a tool process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    /// Exit code 0. `stdout` is empty unless output capture was requested.
    Success { stdout: Vec<u8> },
    /// The tool ran but exited non-zero, was killed by a signal, or the OS
    /// reported an error while waiting on it.
    ToolError {
        code: Option<i32>,
        stdout: Vec<u8>,
        stderr: String,
    },
    /// The bound elapsed first. The process may still be running.
    Timeout { after: Duration },
    /// The process could not be spawned.
    StartFailure { message: String },
}

impl InvocationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InvocationOutcome::Success { .. })
    }

    /// Short machine-friendly label.
    pub fn kind(&self) -> &'static str {
        match self {
            InvocationOutcome::Success { .. } => "success",
            InvocationOutcome::ToolError { .. } => "tool-error",
            InvocationOutcome::Timeout { .. } => "timeout",
            InvocationOutcome::StartFailure { .. } => "start-failure",
        }
    }

    /// Convert into a `Result`, keeping the failure kind in the error variant.
    pub fn into_result(self, tool: &str) -> Result<Vec<u8>> {
        match self {
            InvocationOutcome::Success { stdout } => Ok(stdout),
            InvocationOutcome::ToolError { code, stderr, .. } => {
                Err(Error::tool_failed(tool, code, stderr))
            }
            InvocationOutcome::Timeout { after } => Err(Error::timeout(tool, after)),
            InvocationOutcome::StartFailure { message } => Err(Error::start_failure(tool, message)),
        }
    }
}

/// A launched (or failed-to-launch) tool process.
pub struct ToolProcess {
    name: String,
    state: State,
    // Dropped after `state` so a still-running child is killed while its
    // runtime is alive.
    runtime: Runtime,
}

enum State {
    Running(Running),
    Failed(String),
    Done(InvocationOutcome),
}

struct Running {
    child: Child,
    stdout: Option<Capture>,
    stderr: Option<Capture>,
}

/// Output of one pipe, appended to by a reader task on the process runtime.
struct Capture {
    buf: Arc<Mutex<Vec<u8>>>,
    task: JoinHandle<()>,
}

impl fmt::Debug for ToolProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            State::Running(_) => "running",
            State::Failed(_) => "failed",
            State::Done(outcome) => outcome.kind(),
        };
        f.debug_struct("ToolProcess")
            .field("name", &self.name)
            .field("pid", &self.id())
            .field("state", &state)
            .finish()
    }
}

impl ToolProcess {
    /// Launch `program` with `args`.
    ///
    /// A spawn failure does not make this return `Err`; it is recorded and
    /// reported as [`InvocationOutcome::StartFailure`] by the first wait.
    /// `Err` is only returned when the per-process runtime cannot be built.
    ///
    /// Standard error is always collected; standard output only when
    /// `capture_stdout` is set (otherwise it is discarded).
    pub fn spawn(
        program: &Path,
        args: &[String],
        working_dir: Option<&Path>,
        capture_stdout: bool,
    ) -> Result<Self> {
        let name = program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| program.to_string_lossy().to_string());

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::start_failure(&name, format!("failed to build runtime: {e}")))?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(if capture_stdout {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        tracing::debug!("Launching {} {:?}", program.display(), args);

        let state = {
            let _enter = runtime.enter();
            match cmd.spawn() {
                Ok(mut child) => {
                    let stdout = child.stdout.take().map(|out| Capture::start(&runtime, out));
                    let stderr = child.stderr.take().map(|err| Capture::start(&runtime, err));
                    State::Running(Running {
                        child,
                        stdout,
                        stderr,
                    })
                }
                Err(e) => {
                    tracing::warn!("Failed to start {}: {}", program.display(), e);
                    State::Failed(e.to_string())
                }
            }
        };

        Ok(Self {
            name,
            state,
            runtime,
        })
    }

    /// Executable name, for logs and errors.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// OS process id while the child is running.
    pub fn id(&self) -> Option<u32> {
        match &self.state {
            State::Running(running) => running.child.id(),
            _ => None,
        }
    }

    /// Block until the process finishes or `limit` elapses.
    ///
    /// Exactly one outcome is returned per call. Process exit and timer race
    /// inside a single `select!`; the loser is dropped before this returns, so
    /// no timer or pending notification outlives the call. If both are ready
    /// in the same poll, the exit wins. Once the exit status is known the
    /// outcome is settled from it, even if a background child the tool left
    /// behind still holds its output pipes open.
    ///
    /// Once the process has finished the outcome is cached and returned again
    /// by later calls. After a timeout the process is left running.
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context, like
    /// any blocking tokio call. Async callers should go through
    /// `tokio::task::spawn_blocking`.
    pub fn wait_for(&mut self, limit: Timeout) -> InvocationOutcome {
        let running = match &mut self.state {
            State::Running(running) => running,
            State::Failed(message) => {
                return InvocationOutcome::StartFailure {
                    message: message.clone(),
                }
            }
            State::Done(outcome) => return outcome.clone(),
        };

        let exited = self.runtime.block_on(async {
            match limit.duration() {
                None => Some(running.child.wait().await),
                Some(after) => tokio::select! {
                    biased;
                    status = running.child.wait() => Some(status),
                    _ = tokio::time::sleep(after) => None,
                },
            }
        });

        let Some(status) = exited else {
            tracing::warn!("{} still running after {}", self.name, limit);
            return InvocationOutcome::Timeout {
                after: limit.duration().unwrap_or_default(),
            };
        };

        let outcome = self.runtime.block_on(running.settle(status));
        tracing::debug!("{} finished: {}", self.name, outcome.kind());
        self.state = State::Done(outcome.clone());
        outcome
    }

    /// Kill the process if it is still running.
    ///
    /// The next [`Self::wait_for`] reports the killed process as a
    /// [`InvocationOutcome::ToolError`] without an exit code.
    pub fn kill(&mut self) -> Result<()> {
        if let State::Running(running) = &mut self.state {
            self.runtime.block_on(running.child.kill())?;
            tracing::info!("Killed {}", self.name);
        }
        Ok(())
    }
}

impl Running {
    /// Turn an exit status into the final outcome, collecting captured output.
    ///
    /// The status alone decides the outcome kind; output readers get
    /// [`OUTPUT_GRACE`] to reach end of file before their pipes are dropped.
    async fn settle(&mut self, status: io::Result<ExitStatus>) -> InvocationOutcome {
        let (stdout, stderr) = tokio::join!(
            Capture::settle(self.stdout.take()),
            Capture::settle(self.stderr.take())
        );

        match status {
            Ok(status) if status.success() => InvocationOutcome::Success { stdout },
            Ok(status) => InvocationOutcome::ToolError {
                code: status.code(),
                stdout,
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
            },
            Err(e) => InvocationOutcome::ToolError {
                code: None,
                stdout,
                stderr: format!("failed waiting for process: {e}"),
            },
        }
    }
}

impl Capture {
    fn start<R>(runtime: &Runtime, reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let task = runtime.spawn(drain(reader, Arc::clone(&buf)));
        Self { buf, task }
    }

    async fn settle(capture: Option<Self>) -> Vec<u8> {
        let Some(mut capture) = capture else {
            return Vec::new();
        };

        match tokio::time::timeout(OUTPUT_GRACE, &mut capture.task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::debug!("Output reader task failed: {e}"),
            Err(_) => {
                tracing::debug!(
                    "Output still open {:?} after exit; keeping what arrived",
                    OUTPUT_GRACE
                );
                capture.task.abort();
            }
        }

        let out = std::mem::take(&mut *capture.buf.lock());
        out
    }
}

async fn drain<R: AsyncRead + Unpin>(mut reader: R, buf: Arc<Mutex<Vec<u8>>>) {
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => buf.lock().extend_from_slice(&chunk[..n]),
            Err(e) => {
                tracing::debug!("Failed to read process output: {e}");
                break;
            }
        }
    }
}
