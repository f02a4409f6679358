//! Chat engines
//!
//! The gateway does not talk to model providers itself. A [`ChatEngine`]
//! turns one user message into one reply; the default implementation drives
//! an assistant command line program inside the workspace.

use crate::config::ChatConfig;
use crate::error::AppError;
use crate::executor::{CliExecutor, ExecutionError, ProcessSpec};
use crate::state::ModelInfo;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info};

/// Everything an engine needs to answer one message
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    /// The user's message
    pub message: String,
    /// Model selected for this turn
    pub model: ModelInfo,
    /// Working context file names, relative to `workspace_root`
    pub context_files: Vec<String>,
    /// Workspace the assistant operates in
    pub workspace_root: PathBuf,
}

/// Produces assistant replies
#[async_trait]
pub trait ChatEngine: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Answer a single message
    async fn reply(&self, turn: &ChatTurn) -> Result<String, AppError>;
}

/// Engine that runs the configured assistant program once per message
pub struct CliChatEngine {
    config: ChatConfig,
    executor: CliExecutor,
}

impl CliChatEngine {
    /// Create an engine from the chat configuration
    pub fn new(config: ChatConfig) -> Self {
        let executor = CliExecutor::new(config.timeout_secs);
        Self { config, executor }
    }

    /// Build the process invocation for a turn
    ///
    /// Placeholders are substituted per argument; the message is substituted
    /// last so its text is never re-expanded. Context files are appended as
    /// trailing positional arguments after a `--` separator, so a name such as
    /// `-notes.md` is never parsed as an option.
    pub fn build_spec(&self, turn: &ChatTurn) -> ProcessSpec {
        let mut args: Vec<String> = self
            .config
            .args
            .iter()
            .map(|arg| {
                arg.replace("{model}", &turn.model.model)
                    .replace("{provider}", &turn.model.provider)
                    .replace("{message}", &turn.message)
            })
            .collect();
        if !turn.context_files.is_empty() {
            args.push("--".to_string());
            args.extend(turn.context_files.iter().cloned());
        }

        ProcessSpec {
            program: self.config.command.clone(),
            args,
            env_vars: vec![
                ("PAIRGATE_MODEL".to_string(), turn.model.model.clone()),
                ("PAIRGATE_PROVIDER".to_string(), turn.model.provider.clone()),
            ],
            working_dir: Some(turn.workspace_root.clone()),
        }
    }
}

#[async_trait]
impl ChatEngine for CliChatEngine {
    fn name(&self) -> &str {
        &self.config.command
    }

    async fn reply(&self, turn: &ChatTurn) -> Result<String, AppError> {
        let spec = self.build_spec(turn);
        debug!(
            program = %spec.program,
            context_files = turn.context_files.len(),
            "Running assistant"
        );

        match self.executor.execute(&spec).await {
            Ok(stdout) => {
                let reply = stdout.trim_end().to_string();
                info!(reply_len = reply.len(), "Assistant replied");
                Ok(reply)
            }
            Err(e @ ExecutionError::Timeout(_)) => Err(AppError::Execution(e)),
            Err(e) => Err(AppError::ChatFailed(format!(
                "assistant '{}' failed: {}",
                self.config.command, e
            ))),
        }
    }
}
