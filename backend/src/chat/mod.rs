//! Chat module
//!
//! Chat engines, edit capture, and the SQLite-backed chat transcript.

pub mod db;
pub mod edits;
pub mod engine;
pub mod models;

pub use db::ChatDb;
pub use edits::ContextSnapshot;
pub use engine::{ChatEngine, ChatTurn, CliChatEngine};
pub use models::{Message, MessageRole};
