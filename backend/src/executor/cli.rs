//! CLI executor implementation
//!
//! Runs a program with explicit arguments (no shell) and captures its stdout.
//! Used to drive the assistant program behind `/chat`.

use crate::executor::error::ExecutionError;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error, info};

/// A fully resolved process invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessSpec {
    /// Executable name or path
    pub program: String,
    /// Arguments, passed verbatim
    pub args: Vec<String>,
    /// Extra environment variables
    pub env_vars: Vec<(String, String)>,
    /// Working directory (None = inherit)
    pub working_dir: Option<PathBuf>,
}

impl ProcessSpec {
    /// Create a spec for `program` with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }
}

/// CLI executor for running processes to completion
pub struct CliExecutor {
    /// Default timeout for process execution
    default_timeout: Duration,
}

impl CliExecutor {
    /// Create a new CLI executor with default timeout
    pub fn new(default_timeout_secs: u64) -> Self {
        Self {
            default_timeout: Duration::from_secs(default_timeout_secs),
        }
    }

    /// Get the default timeout duration
    #[cfg(test)]
    pub fn timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Run the process and return its stdout
    ///
    /// # Returns
    /// * `Ok(String)` - The stdout output of a successful run
    /// * `Err(ExecutionError)` - Spawn failure, timeout, non-zero exit or non-UTF-8 output
    pub async fn execute(&self, spec: &ProcessSpec) -> Result<String, ExecutionError> {
        info!(
            program = %spec.program,
            arg_count = spec.args.len(),
            "Executing process"
        );

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        for (key, value) in &spec.env_vars {
            cmd.env(key, value);
        }

        if let Some(work_dir) = &spec.working_dir {
            cmd.current_dir(work_dir);
        }

        debug!(
            program = %spec.program,
            args = ?spec.args,
            working_dir = ?spec.working_dir,
            "Spawning process"
        );

        // Dropping the output future on timeout kills the child (kill_on_drop)
        match timeout(self.default_timeout, cmd.output()).await {
            Ok(Ok(output)) => {
                if output.status.success() {
                    let response = String::from_utf8(output.stdout).map_err(|e| {
                        ExecutionError::InvalidEncoding(format!("Failed to decode stdout: {}", e))
                    })?;

                    info!(
                        program = %spec.program,
                        response_len = response.len(),
                        "Process finished successfully"
                    );

                    Ok(response)
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    let exit_code = output.status.code().unwrap_or(-1);

                    error!(
                        program = %spec.program,
                        exit_code = exit_code,
                        stderr = %stderr,
                        "Process execution failed"
                    );

                    Err(ExecutionError::ProcessFailed(format!(
                        "Process exited with code {}: {}",
                        exit_code,
                        stderr.trim()
                    )))
                }
            }
            Ok(Err(e)) => {
                error!(
                    program = %spec.program,
                    error = %e,
                    "Failed to spawn or execute process"
                );
                Err(ExecutionError::SpawnFailed(e))
            }
            Err(_) => {
                error!(
                    program = %spec.program,
                    timeout_secs = self.default_timeout.as_secs(),
                    "Process execution timed out"
                );
                Err(ExecutionError::Timeout(self.default_timeout.as_secs()))
            }
        }
    }
}
