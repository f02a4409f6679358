//! pairgate backend library
//!
//! HTTP gateway for an AI pair-programming assistant. The binary in
//! `src/main.rs` parses flags and serves [`api::router`].

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod executor;
pub mod services;
/// Application state management
///
/// Handles the model selection, working context, and settings persistence.
pub mod state;
