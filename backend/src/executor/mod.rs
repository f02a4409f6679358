//! Process execution module
//!
//! Runs shell commands for `/run` and the assistant program behind `/chat`.
//! It handles process spawning, output capture, timeout management, and error handling.

pub mod cli;
pub mod error;
pub mod shell;
pub mod streaming;

pub use cli::{CliExecutor, ProcessSpec};
pub use error::ExecutionError;
pub use shell::{CommandOutput, ShellExecutor};
pub use streaming::{ShellEvent, StreamingShellExecutor};
