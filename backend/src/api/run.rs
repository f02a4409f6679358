//! Command execution API handlers
//!
//! Runs shell commands in the workspace, either buffered or streamed using
//! Server-Sent Events (SSE).

use crate::api::streaming::create_sse_stream;
use crate::api::utils::{validate_text, RouterState, MAX_COMMAND_LENGTH};
use crate::error::AppError;
use crate::executor::{CommandOutput, ShellExecutor, StreamingShellExecutor};
use axum::{
    extract::State,
    response::{Json, Response},
};
use serde::Deserialize;
use std::time::Instant;
use tracing::info;

/// Command request
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    /// Shell command line
    pub command: String,
}

/// POST /run - Run a command and return its output
pub async fn run_command(
    State(state): State<RouterState>,
    Json(request): Json<RunRequest>,
) -> Result<Json<CommandOutput>, AppError> {
    validate_text("Command", &request.command, MAX_COMMAND_LENGTH)?;

    let root = state.app_state.read().await.workspace_root().to_path_buf();
    let execution = &state.config.execution;
    let executor = ShellExecutor::new(execution.command_timeout_secs, execution.max_output_bytes);

    let start = Instant::now();
    let result = executor.run(&request.command, &root).await?;
    info!(
        exit_code = ?result.exit_code,
        execution_time_ms = start.elapsed().as_millis() as u64,
        "Command completed"
    );

    Ok(Json(result))
}

/// POST /run/stream - Stream command output using Server-Sent Events
pub async fn run_command_stream(
    State(state): State<RouterState>,
    Json(request): Json<RunRequest>,
) -> Result<Response, AppError> {
    validate_text("Command", &request.command, MAX_COMMAND_LENGTH)?;

    let root = state.app_state.read().await.workspace_root().to_path_buf();
    let executor = StreamingShellExecutor::new(state.config.execution.command_timeout_secs);
    let rx = executor.execute_streaming(&request.command, &root)?;

    create_sse_stream(rx)
}
