//! Chat data models
//!
//! Defines the structures stored in the chat transcript.

use crate::state::ModelInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user
    User,
    /// Message from the assistant
    Assistant,
}

impl MessageRole {
    /// Convert the role to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl From<&str> for MessageRole {
    fn from(s: &str) -> Self {
        match s {
            "assistant" => MessageRole::Assistant,
            _ => MessageRole::User,
        }
    }
}

/// A single transcript entry
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Message {
    /// Unique identifier for the message
    pub id: String,
    /// Role of the message sender, stored as "user" or "assistant"
    pub role: String,
    /// Content of the message
    pub content: String,
    /// Model selected when the message was exchanged
    pub model: String,
    /// Provider of that model
    pub provider: String,
    /// When the message was created (Unix timestamp)
    pub created_at: i64,
}

impl Message {
    /// Create a new message with a fresh id, stamped with the current time
    pub fn new(role: MessageRole, content: String, model: &ModelInfo) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: role.as_str().to_string(),
            content,
            model: model.model.clone(),
            provider: model.provider.clone(),
            created_at: Utc::now().timestamp(),
        }
    }

    /// Get the message role as enum
    pub fn role_enum(&self) -> MessageRole {
        MessageRole::from(self.role.as_str())
    }

    /// Get created_at as DateTime
    pub fn created_at_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.created_at, 0).unwrap_or_else(Utc::now)
    }
}
