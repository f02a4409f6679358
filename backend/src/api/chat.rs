//! Chat API endpoints
//!
//! Flow: user message -> working context snapshot -> chat engine -> edit
//! detection -> transcript -> response.

use crate::api::utils::{validate_text, RouterState, StatusResponse, MAX_MESSAGE_LENGTH};
use crate::chat::{ChatTurn, ContextSnapshot, Message, MessageRole};
use crate::error::AppError;
use crate::services::files::{FileRecord, FileService};
use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Chat request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message
    pub message: String,
    /// Existing workspace files to add to the working context first
    #[serde(default)]
    pub files: Option<Vec<String>>,
}

/// Chat response
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Assistant reply
    pub response: String,
    /// Context files the assistant changed while answering
    pub edits: Vec<FileRecord>,
}

/// Transcript query parameters
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Only return the latest `limit` messages
    pub limit: Option<u32>,
}

/// Transcript response
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Messages, oldest first
    pub messages: Vec<Message>,
}

/// POST /chat - Send a message to the assistant
pub async fn chat(
    State(state): State<RouterState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    validate_text("Message", &request.message, MAX_MESSAGE_LENGTH)?;

    if let Some(names) = &request.files {
        add_existing_files(&state, names).await?;
    }

    let turn = {
        let app_state = state.app_state.read().await;
        ChatTurn {
            message: request.message,
            model: app_state.model().clone(),
            context_files: app_state.context_files().to_vec(),
            workspace_root: app_state.workspace_root().to_path_buf(),
        }
    };

    info!(
        engine = %state.engine.name(),
        model = %turn.model.model,
        message_len = turn.message.len(),
        context_files = turn.context_files.len(),
        "Chat request received"
    );

    let before = ContextSnapshot::capture(&turn.workspace_root, &turn.context_files).await?;
    let reply = state.engine.reply(&turn).await?;
    let after = ContextSnapshot::capture(&turn.workspace_root, &turn.context_files).await?;
    let edits = before.edits(&after, &turn.context_files);

    let user_message = Message::new(MessageRole::User, turn.message.clone(), &turn.model);
    let assistant_message = Message::new(MessageRole::Assistant, reply.clone(), &turn.model);
    state
        .chat_db
        .add_exchange(&user_message, &assistant_message)
        .await?;

    info!(
        response_len = reply.len(),
        edits = edits.len(),
        "Chat response ready"
    );

    Ok(Json(ChatResponse {
        response: reply,
        edits,
    }))
}

/// Add files that already exist in the workspace to the working context
async fn add_existing_files(state: &RouterState, names: &[String]) -> Result<(), AppError> {
    let mut app_state = state.app_state.write().await;
    let root = app_state.workspace_root().to_path_buf();

    let mut resolved = Vec::with_capacity(names.len());
    for name in names {
        let (normalized, path) = FileService::resolve(&root, name)?;
        if !path.is_file() {
            return Err(AppError::FileNotFound(format!(
                "No such file in workspace: {}",
                normalized
            )));
        }
        resolved.push(normalized);
    }

    let mut changed = false;
    for name in &resolved {
        changed |= app_state.add_context_file(name);
    }
    if changed {
        app_state.save()?;
    }
    Ok(())
}

/// GET /chat/history - Get the chat transcript
pub async fn get_history(
    State(state): State<RouterState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, AppError> {
    let messages = state.chat_db.get_messages(query.limit).await?;
    Ok(Json(HistoryResponse { messages }))
}

/// DELETE /chat/history - Clear the chat transcript
pub async fn clear_history(
    State(state): State<RouterState>,
) -> Result<Json<StatusResponse>, AppError> {
    let deleted = state.chat_db.clear().await?;
    Ok(Json(StatusResponse::success(format!(
        "Cleared {} message(s)",
        deleted
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::utils::test_support::{create_test_state, EchoEngine};

    fn request(message: &str, files: Option<Vec<&str>>) -> ChatRequest {
        ChatRequest {
            message: message.to_string(),
            files: files.map(|f| f.into_iter().map(str::to_string).collect()),
        }
    }

    #[tokio::test]
    async fn test_chat_returns_response() {
        let (state, _temp_dir) = create_test_state(EchoEngine { write: None }).await;
        let response = chat(State(state), Json(request("hello", None))).await.unwrap();
        assert_eq!(response.response, "hello (gpt-4)");
        assert!(response.edits.is_empty());
    }

    #[tokio::test]
    async fn test_chat_empty_message() {
        let (state, _temp_dir) = create_test_state(EchoEngine { write: None }).await;
        match chat(State(state), Json(request("  ", None))).await.unwrap_err() {
            AppError::InvalidRequest(_) => {}
            other => panic!("Expected InvalidRequest error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_chat_too_long() {
        let (state, _temp_dir) = create_test_state(EchoEngine { write: None }).await;
        let long = "a".repeat(MAX_MESSAGE_LENGTH + 1);
        assert!(chat(State(state), Json(request(&long, None))).await.is_err());
    }

    #[tokio::test]
    async fn test_chat_reports_edits() {
        let (state, _temp_dir) = create_test_state(EchoEngine {
            write: Some(("lib.rs".to_string(), "pub fn edited() {}".to_string())),
        })
        .await;
        let root = state.app_state.read().await.workspace_root().to_path_buf();
        std::fs::write(root.join("lib.rs"), "pub fn original() {}").unwrap();

        let response = chat(State(state.clone()), Json(request("rename it", Some(vec!["lib.rs"]))))
            .await
            .unwrap();
        assert_eq!(
            response.edits,
            vec![FileRecord {
                name: "lib.rs".to_string(),
                content: "pub fn edited() {}".to_string(),
            }]
        );
        assert_eq!(state.app_state.read().await.context_files(), ["lib.rs"]);
    }

    #[tokio::test]
    async fn test_chat_with_missing_file() {
        let (state, _temp_dir) = create_test_state(EchoEngine { write: None }).await;
        match chat(State(state), Json(request("hi", Some(vec!["nope.rs"]))))
            .await
            .unwrap_err()
        {
            AppError::FileNotFound(_) => {}
            other => panic!("Expected FileNotFound error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_chat_records_history() {
        let (state, _temp_dir) = create_test_state(EchoEngine { write: None }).await;
        chat(State(state.clone()), Json(request("first", None)))
            .await
            .unwrap();
        chat(State(state.clone()), Json(request("second", None)))
            .await
            .unwrap();

        let history = get_history(State(state.clone()), Query(HistoryQuery { limit: None }))
            .await
            .unwrap();
        let contents: Vec<&str> = history.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(
            contents,
            vec!["first", "first (gpt-4)", "second", "second (gpt-4)"]
        );

        let latest = get_history(State(state.clone()), Query(HistoryQuery { limit: Some(1) }))
            .await
            .unwrap();
        assert_eq!(latest.messages.len(), 1);
        assert_eq!(latest.messages[0].content, "second (gpt-4)");

        let cleared = clear_history(State(state.clone())).await.unwrap();
        assert_eq!(cleared.message, "Cleared 4 message(s)");
        let history = get_history(State(state), Query(HistoryQuery { limit: None }))
            .await
            .unwrap();
        assert!(history.messages.is_empty());
    }
}
