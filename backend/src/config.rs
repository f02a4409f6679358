//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults. Command-line flags are applied on top in `main.rs`.

use std::env;
use std::path::PathBuf;

/// Prefix shared by every environment variable the gateway reads
pub const ENV_PREFIX: &str = "PAIRGATE_";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Workspace the gateway operates on
    pub workspace: WorkspaceConfig,
    /// Persistence configuration
    pub persistence: PersistenceConfig,
    /// Shell command execution configuration
    pub execution: ExecutionConfig,
    /// Assistant (chat) configuration
    pub chat: ChatConfig,
    /// Model selected at startup
    pub model: ModelConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
}

/// Workspace configuration
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    /// Root directory for files and command execution
    pub root: PathBuf,
}

/// Persistence configuration
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    /// Base directory for settings and the chat transcript database
    pub data_dir: PathBuf,
}

/// Execution configuration
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Timeout for `/run` commands (in seconds)
    pub command_timeout_secs: u64,
    /// Captured output beyond this many bytes is dropped
    pub max_output_bytes: usize,
}

/// Assistant command configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Assistant executable
    pub command: String,
    /// Argument template; `{model}`, `{provider}` and `{message}` are substituted
    pub args: Vec<String>,
    /// Timeout for a single chat exchange (in seconds)
    pub timeout_secs: u64,
}

/// Initial model selection
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Model name (e.g. "gpt-4")
    pub model: String,
    /// Provider name (e.g. "openai")
    pub provider: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            command: "aider".to_string(),
            args: default_chat_args(),
            timeout_secs: 300,
        }
    }
}

fn default_chat_args() -> Vec<String> {
    [
        "--yes",
        "--no-pretty",
        "--no-auto-commits",
        "--model",
        "{model}",
        "--message",
        "{message}",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn var(name: &str) -> Option<String> {
    env::var(format!("{}{}", ENV_PREFIX, name))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    var(name).and_then(|v| v.trim().parse().ok())
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let default_chat = ChatConfig::default();

        Self {
            server: ServerConfig {
                port: parsed_var("PORT").unwrap_or(8080),
                host: var("HOST").unwrap_or_else(|| "localhost".to_string()),
                max_body_bytes: parsed_var("MAX_BODY_BYTES").unwrap_or(10 * 1024 * 1024),
            },
            workspace: WorkspaceConfig {
                root: var("WORKSPACE")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(".")),
            },
            persistence: PersistenceConfig {
                data_dir: var("DATA_DIR").map(PathBuf::from).unwrap_or_else(|| {
                    // Default to ~/.pairgate or current directory
                    if let Some(home) = env::var_os("HOME") {
                        PathBuf::from(home).join(".pairgate")
                    } else {
                        PathBuf::from(".pairgate")
                    }
                }),
            },
            execution: ExecutionConfig {
                command_timeout_secs: parsed_var("COMMAND_TIMEOUT_SECS").unwrap_or(30),
                max_output_bytes: parsed_var("MAX_OUTPUT_BYTES").unwrap_or(1024 * 1024),
            },
            chat: ChatConfig {
                command: var("CHAT_COMMAND").unwrap_or(default_chat.command),
                args: var("CHAT_ARGS")
                    .map(|v| v.split_whitespace().map(str::to_string).collect())
                    .unwrap_or(default_chat.args),
                timeout_secs: parsed_var("CHAT_TIMEOUT_SECS").unwrap_or(default_chat.timeout_secs),
            },
            model: ModelConfig {
                model: var("MODEL").unwrap_or_else(|| "gpt-4".to_string()),
                provider: var("PROVIDER").unwrap_or_else(|| "openai".to_string()),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Location of the persisted gateway settings
    pub fn settings_path(&self) -> PathBuf {
        self.persistence.data_dir.join("settings.json")
    }

    /// Location of the chat transcript database
    pub fn chat_db_path(&self) -> PathBuf {
        self.persistence.data_dir.join("chat.db")
    }
}
