//! Tokio-backed process runner
//!
//! Spawns one stage's command, drains stdout/stderr concurrently so the child
//! never blocks on a full pipe, and enforces the optional stage timeout by
//! terminating the child (SIGTERM first on unix, then a hard kill).

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use crate::error::{TesterError, TesterResult};
use crate::traits::ProcessRunner;
use shared::{ProcessResult, Stage, stage_debug, stage_error, stage_info, stage_warn};

/// Grace period between SIGTERM and a forced kill
const DEFAULT_KILL_GRACE: Duration = Duration::from_millis(500);

/// Real process runner implementation
#[derive(Debug, Clone)]
pub struct TokioProcessRunner {
    /// Directory searched first for stage programs
    tool_dir: Option<PathBuf>,

    /// Timeout applied to stages that do not carry their own
    default_timeout: Option<Duration>,

    kill_grace: Duration,
}

impl TokioProcessRunner {
    /// Create a runner that resolves programs on PATH and never times out
    pub fn new() -> Self {
        Self {
            tool_dir: None,
            default_timeout: None,
            kill_grace: DEFAULT_KILL_GRACE,
        }
    }

    /// Configure tool directory (fluent API)
    pub fn with_tool_dir(mut self, tool_dir: Option<PathBuf>) -> Self {
        self.tool_dir = tool_dir;
        self
    }

    /// Configure default stage timeout (fluent API)
    pub fn with_default_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Configure SIGTERM grace period (fluent API)
    pub fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }

    /// Resolve a bare program name against the tool directory
    fn resolve_program(&self, program: &str) -> PathBuf {
        if let Some(tool_dir) = &self.tool_dir
            && !program.contains(std::path::MAIN_SEPARATOR)
            && !program.contains('/')
        {
            let candidate = tool_dir.join(program);
            if candidate.is_file() {
                return candidate;
            }
        }
        PathBuf::from(program)
    }

    /// Stop the stage's whole process group: SIGTERM, a grace period, then SIGKILL
    ///
    /// `pid` is captured at spawn time; once the child has been reaped tokio
    /// no longer reports it, but its group may still hold live processes.
    async fn terminate(&self, child: &mut Child, pid: Option<u32>, stage: &str) {
        #[cfg(unix)]
        {
            use nix::errno::Errno;
            use nix::sys::signal::{self, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = pid {
                let group = Pid::from_raw(pid as i32);
                match signal::killpg(group, Signal::SIGTERM) {
                    Ok(()) => {
                        if let Ok(Ok(status)) = tokio::time::timeout(self.kill_grace, child.wait()).await {
                            stage_debug!(stage, "🛑 Terminated gracefully ({})", status);
                        }
                    }
                    Err(Errno::ESRCH) => {}
                    Err(e) => {
                        stage_warn!(stage, "⚠️ Failed to send SIGTERM: {}", e);
                    }
                }

                // Anything left in the group ignored SIGTERM or outlived the grace period
                match signal::killpg(group, Signal::SIGKILL) {
                    Ok(()) | Err(Errno::ESRCH) => {}
                    Err(e) => {
                        stage_error!(stage, "❌ Failed to kill process group: {}", e);
                    }
                }
                if let Err(e) = child.wait().await {
                    stage_error!(stage, "❌ Failed to reap stage process: {}", e);
                }
                return;
            }
        }

        stage_warn!(stage, "🔨 Force killing stage process");
        if let Err(e) = child.kill().await {
            stage_error!(stage, "❌ Failed to kill stage process: {}", e);
        }
    }
}

impl Default for TokioProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, stage: &Stage, working_dir: &Path) -> TesterResult<ProcessResult> {
        let program = self.resolve_program(stage.program());

        let mut cmd = Command::new(&program);
        cmd.args(stage.args())
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group, so a timeout reaches everything the tool started
        #[cfg(unix)]
        cmd.process_group(0);

        stage_info!(stage.name(), "🚀 Running: {}", stage.command_line());
        stage_debug!(stage.name(), "📂 Working directory: {}", working_dir.display());

        let started = Instant::now();
        let mut child = cmd.spawn().map_err(|source| TesterError::LaunchFailure {
            stage: stage.name().to_string(),
            program: program.display().to_string(),
            source,
        })?;

        let pid = child.id();
        let mut stdout_task = spawn_capture(child.stdout.take(), stage.name().to_string());
        let mut stderr_task = spawn_capture(child.stderr.take(), stage.name().to_string());

        // The deadline covers the drains too: a leftover process holding a
        // pipe open keeps the stage running
        let collected = match stage.timeout().or(self.default_timeout) {
            Some(limit) => {
                let collect = collect_output(&mut child, &mut stdout_task, &mut stderr_task);
                let waited = tokio::time::timeout(limit, collect).await;
                match waited {
                    Ok(collected) => collected,
                    Err(_) => {
                        stage_warn!(stage.name(), "⏰ Exceeded {:?}, terminating", limit);
                        self.terminate(&mut child, pid, stage.name()).await;
                        stdout_task.abort();
                        stderr_task.abort();
                        return Err(TesterError::TimedOut {
                            stage: stage.name().to_string(),
                            timeout: limit,
                        });
                    }
                }
            }
            None => collect_output(&mut child, &mut stdout_task, &mut stderr_task).await,
        };
        let (status, stdout, stderr) = collected?;
        let elapsed = started.elapsed();

        stage_debug!(
            stage.name(),
            "🏁 Finished with {} in {:?} ({} stdout bytes, {} stderr bytes)",
            status,
            elapsed,
            stdout.len(),
            stderr.len()
        );

        Ok(ProcessResult {
            stdout,
            stderr,
            success: status.success(),
            exit_code: status.code(),
            elapsed,
        })
    }
}

/// Drain a child pipe line by line, tolerating non-UTF-8 bytes
fn spawn_capture<R>(pipe: Option<R>, stage: String) -> JoinHandle<std::io::Result<String>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut captured = String::new();
        let Some(pipe) = pipe else {
            return Ok(captured);
        };

        let mut reader = BufReader::new(pipe);
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line).await? == 0 {
                break;
            }
            let text = String::from_utf8_lossy(&line);
            tracing::trace!(stage = %stage, "{}", text.trim_end());
            captured.push_str(&text);
        }
        Ok(captured)
    })
}

/// Wait for the child to exit and both pipes to reach end of file
async fn collect_output(
    child: &mut Child,
    stdout_task: &mut JoinHandle<std::io::Result<String>>,
    stderr_task: &mut JoinHandle<std::io::Result<String>>,
) -> TesterResult<(ExitStatus, String, String)> {
    let status = child.wait().await?;
    let stdout = join_capture(stdout_task).await?;
    let stderr = join_capture(stderr_task).await?;
    Ok((status, stdout, stderr))
}

async fn join_capture(task: &mut JoinHandle<std::io::Result<String>>) -> TesterResult<String> {
    let captured = task.await.map_err(std::io::Error::other)??;
    Ok(captured)
}
