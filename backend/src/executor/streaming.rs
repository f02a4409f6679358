//! Streaming shell executor implementation
//!
//! Runs a shell command and forwards its output line-by-line while it runs.

use crate::executor::error::ExecutionError;
use crate::executor::shell::shell_command;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, error, info};

/// Event emitted while a streamed command runs
#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    /// One line of combined stdout/stderr, without its terminator
    Line(String),
    /// The process finished; None when terminated by a signal
    Exited(Option<i32>),
    /// The process could not be awaited or exceeded its timeout
    Failed(String),
}

/// Decode one raw output line, dropping its `\n` or `\r\n` terminator
fn decode_line(raw: &[u8]) -> String {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

/// Streaming shell executor for `/run/stream`
pub struct StreamingShellExecutor {
    /// Overall timeout for the process
    default_timeout: Duration,
}

impl StreamingShellExecutor {
    /// Create a new streaming executor with default timeout
    pub fn new(default_timeout_secs: u64) -> Self {
        Self {
            default_timeout: Duration::from_secs(default_timeout_secs),
        }
    }

    /// Spawn `command` and return a channel receiver that yields its events
    ///
    /// The last event is always `Exited` or `Failed`. Spawn errors are
    /// returned directly.
    pub fn execute_streaming(
        &self,
        command: &str,
        working_dir: &Path,
    ) -> Result<mpsc::Receiver<ShellEvent>, ExecutionError> {
        let (tx, rx) = mpsc::channel(100);
        info!(command_len = command.len(), "Running shell command with streaming");

        let mut child = shell_command(command, working_dir).spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ExecutionError::ProcessFailed("Failed to capture stdout".to_string()))?;

        debug!(pid = ?child.id(), "Spawned shell for streaming");

        let limit = self.default_timeout;
        tokio::spawn(async move {
            let run = async {
                let mut reader = BufReader::new(stdout);
                let mut buf = Vec::new();
                loop {
                    buf.clear();
                    match reader.read_until(b'\n', &mut buf).await {
                        Ok(0) => break,
                        Ok(_) => {
                            if tx.send(ShellEvent::Line(decode_line(&buf))).await.is_err() {
                                // Receiver dropped, stop reading
                                return None;
                            }
                        }
                        Err(e) => return Some(Err(e)),
                    }
                }
                Some(child.wait().await)
            };

            let outcome = timeout(limit, run).await;
            let event = match outcome {
                Ok(None) => {
                    debug!("Stream receiver dropped, killing process");
                    let _ = child.kill().await;
                    return;
                }
                Ok(Some(Ok(status))) => {
                    info!(exit_code = ?status.code(), "Streamed command finished");
                    ShellEvent::Exited(status.code())
                }
                Ok(Some(Err(e))) => {
                    error!(error = %e, "Error reading from or waiting for process");
                    let _ = child.kill().await;
                    ShellEvent::Failed(e.to_string())
                }
                Err(_) => {
                    error!(
                        timeout_secs = limit.as_secs(),
                        "Streamed command timed out"
                    );
                    let _ = child.kill().await;
                    ShellEvent::Failed(ExecutionError::Timeout(limit.as_secs()).to_string())
                }
            };
            let _ = tx.send(event).await;
        });

        Ok(rx)
    }
}
