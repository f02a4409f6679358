//! Shell command executor
//!
//! Runs free-form command strings through the user's shell, the way a
//! terminal would: stderr is folded into stdout, output is captured as text,
//! and a non-zero exit status is reported rather than treated as failure.

use crate::executor::error::ExecutionError;
use serde::Serialize;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info, warn};

/// Marker appended when captured output exceeds the configured limit
pub const TRUNCATION_MARKER: &str = "[output truncated]";

/// Result of a finished shell command
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CommandOutput {
    /// Combined stdout/stderr
    pub output: String,
    /// Exit status (None when terminated by a signal)
    pub exit_code: Option<i32>,
}

/// Resolve the shell used for command strings
///
/// `$SHELL` is used when it is a POSIX-style shell that exists on disk,
/// otherwise `/bin/sh`.
#[cfg(unix)]
pub fn resolve_shell() -> String {
    const POSIX_SHELLS: &[&str] = &["sh", "bash", "zsh", "dash", "ksh"];

    std::env::var("SHELL")
        .ok()
        .filter(|shell| {
            let path = Path::new(shell);
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            POSIX_SHELLS.contains(&name) && path.exists()
        })
        .unwrap_or_else(|| "/bin/sh".to_string())
}

/// Build a command that runs `command` through the shell in `working_dir`
///
/// stdout is piped with stderr redirected into it; stdin is closed.
pub fn shell_command(command: &str, working_dir: &Path) -> Command {
    #[cfg(unix)]
    let mut cmd = {
        let mut cmd = Command::new(resolve_shell());
        cmd.arg("-c").arg(format!("exec 2>&1\n{}", command));
        cmd
    };

    #[cfg(not(unix))]
    let mut cmd = {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(format!("{} 2>&1", command));
        cmd
    };

    cmd.current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);
    cmd
}

/// Decode captured bytes, keeping at most `max_bytes` of them
pub fn truncate_output(bytes: &[u8], max_bytes: usize) -> String {
    if bytes.len() <= max_bytes {
        return String::from_utf8_lossy(bytes).into_owned();
    }

    let mut text = String::from_utf8_lossy(&bytes[..max_bytes]).into_owned();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(TRUNCATION_MARKER);
    text.push('\n');
    text
}

/// Shell executor for `/run`
pub struct ShellExecutor {
    timeout: Duration,
    max_output_bytes: usize,
}

impl ShellExecutor {
    /// Create an executor with the given timeout and output cap
    pub fn new(timeout_secs: u64, max_output_bytes: usize) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
            max_output_bytes,
        }
    }

    /// Run `command` in `working_dir` and capture its combined output
    ///
    /// At most `max_output_bytes` are kept in memory. Output past the cap is
    /// drained and discarded so the process can run to completion; if it is
    /// still running when the timeout expires after the cap was hit, it is
    /// killed and the truncated output is returned with no exit code.
    pub async fn run(
        &self,
        command: &str,
        working_dir: &Path,
    ) -> Result<CommandOutput, ExecutionError> {
        info!(command_len = command.len(), "Running shell command");
        debug!(command = %command, working_dir = %working_dir.display(), "Spawning shell");

        let deadline = Instant::now() + self.timeout;
        let mut child = shell_command(command, working_dir).spawn().map_err(|e| {
            error!(error = %e, "Failed to spawn shell");
            ExecutionError::SpawnFailed(e)
        })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ExecutionError::ProcessFailed("Failed to capture stdout".to_string()))?;

        // One byte past the cap tells us whether truncation happened
        let mut reader = stdout.take(self.max_output_bytes as u64 + 1);
        let mut captured = Vec::new();
        let read = timeout_at(deadline, reader.read_to_end(&mut captured)).await;
        match read {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                let _ = child.kill().await;
                return Err(ExecutionError::SpawnFailed(e));
            }
            Err(_) => return Err(self.timed_out(&mut child).await),
        }
        let truncated = captured.len() > self.max_output_bytes;

        let mut rest = reader.into_inner();
        let finish = async {
            tokio::io::copy(&mut rest, &mut tokio::io::sink()).await?;
            child.wait().await
        };
        let outcome = timeout_at(deadline, finish).await;
        let exit_code = match outcome {
            Ok(Ok(status)) => status.code(),
            Ok(Err(e)) => {
                let _ = child.kill().await;
                return Err(ExecutionError::SpawnFailed(e));
            }
            Err(_) if truncated => {
                warn!(
                    timeout_secs = self.timeout.as_secs(),
                    "Shell command still producing output at timeout, killing"
                );
                let _ = child.kill().await;
                None
            }
            Err(_) => return Err(self.timed_out(&mut child).await),
        };

        info!(
            exit_code = ?exit_code,
            output_len = captured.len(),
            truncated,
            "Shell command finished"
        );
        Ok(CommandOutput {
            output: truncate_output(&captured, self.max_output_bytes),
            exit_code,
        })
    }

    async fn timed_out(&self, child: &mut Child) -> ExecutionError {
        error!(
            timeout_secs = self.timeout.as_secs(),
            "Shell command timed out"
        );
        let _ = child.kill().await;
        ExecutionError::Timeout(self.timeout.as_secs())
    }
}
