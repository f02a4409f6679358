//! End-to-end tests for the HTTP API
//!
//! Each test serves the full router on an ephemeral port and talks to it
//! over HTTP. The assistant is a small `sh` script.

#![cfg(unix)]

use pairgate_backend::api::{self, RouterState};
use pairgate_backend::config::Config;
use serde_json::{json, Value};
use tempfile::TempDir;

/// Replies with the message and overwrites the first context file, if any
///
/// Context files follow a `--` separator, so the first one is `$3`.
const ASSISTANT_SCRIPT: &str = r#"printf 'echo: %s' "$1"
if [ -n "$3" ]; then printf 'edited by assistant' > "$3"; fi"#;

struct TestServer {
    base_url: String,
    workspace: std::path::PathBuf,
    _temp_dir: TempDir,
}

async fn spawn_server() -> TestServer {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("workspace");
    std::fs::create_dir(&workspace).unwrap();

    let mut config = Config::from_env();
    config.workspace.root = workspace.clone();
    config.persistence.data_dir = temp_dir.path().join("data");
    config.execution.command_timeout_secs = 2;
    config.model.model = "gpt-4".to_string();
    config.model.provider = "openai".to_string();
    config.chat.command = "sh".to_string();
    config.chat.args = vec![
        "-c".to_string(),
        ASSISTANT_SCRIPT.to_string(),
        "assistant".to_string(),
        "{message}".to_string(),
    ];
    config.chat.timeout_secs = 10;

    let state = RouterState::initialize(config).await.unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, api::router(state)).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{}", addr),
        workspace,
        _temp_dir: temp_dir,
    }
}

impl TestServer {
    async fn get(&self, path: &str) -> (u16, Value) {
        let response = reqwest::get(format!("{}{}", self.base_url, path))
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    async fn post_text(&self, path: &str, body: Value) -> (u16, String) {
        let response = reqwest::Client::new()
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.text().await.unwrap())
    }

    async fn delete(&self, path: &str) -> (u16, Value) {
        let response = reqwest::Client::new()
            .delete(format!("{}{}", self.base_url, path))
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let response = reqwest::Client::new()
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }
}

#[tokio::test]
async fn test_health() {
    let server = spawn_server().await;
    let (status, body) = server.get("/health").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_chat_round_trip() {
    let server = spawn_server().await;
    let (status, body) = server
        .post("/chat", json!({"message": "How do I write a Python function?"}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["response"], "echo: How do I write a Python function?");
    assert_eq!(body["edits"], json!([]));

    let (status, history) = server.get("/chat/history").await;
    assert_eq!(status, 200);
    assert_eq!(history["messages"].as_array().unwrap().len(), 2);
    assert_eq!(history["messages"][0]["role"], "user");
    assert_eq!(history["messages"][1]["role"], "assistant");
}

#[tokio::test]
async fn test_chat_reports_edits() {
    let server = spawn_server().await;
    let (status, _) = server
        .post(
            "/files",
            json!({"files": [{"name": "example.py", "content": "print('Hello, World!')"}]}),
        )
        .await;
    assert_eq!(status, 200);

    let (status, body) = server
        .post("/chat", json!({"message": "Change the greeting"}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(
        body["edits"],
        json!([{"name": "example.py", "content": "edited by assistant"}])
    );
    assert_eq!(
        std::fs::read_to_string(server.workspace.join("example.py")).unwrap(),
        "edited by assistant"
    );
}

#[tokio::test]
async fn test_files_upsert() {
    let server = spawn_server().await;
    for content in ["print('one')", "print('two')"] {
        let (status, body) = server
            .post(
                "/files",
                json!({"files": [{"name": "example.py", "content": content}]}),
            )
            .await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "success");
    }

    let (status, body) = server.get("/files").await;
    assert_eq!(status, 200);
    assert_eq!(
        body["files"],
        json!([{"name": "example.py", "content": "print('two')"}])
    );
}

#[tokio::test]
async fn test_files_non_utf8_content() {
    let server = spawn_server().await;
    let (status, _) = server
        .post(
            "/files",
            json!({"files": [{"name": "data.bin", "content": ""}]}),
        )
        .await;
    assert_eq!(status, 200);
    std::fs::write(server.workspace.join("data.bin"), [b'o', b'k', 0xff]).unwrap();

    let (status, body) = server.get("/files").await;
    assert_eq!(status, 200);
    assert_eq!(
        body["files"],
        json!([{"name": "data.bin", "content": "ok\u{FFFD}"}])
    );
}

#[tokio::test]
async fn test_drop_file_from_context() {
    let server = spawn_server().await;
    server
        .post(
            "/files",
            json!({"files": [
                {"name": "src/lib.rs", "content": "pub fn a() {}"},
                {"name": "README.md", "content": "# a"}
            ]}),
        )
        .await;

    let (status, body) = server.delete("/files/src/lib.rs").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "success");
    assert!(server.workspace.join("src/lib.rs").exists());

    let (_, body) = server.get("/files").await;
    assert_eq!(body["files"], json!([{"name": "README.md", "content": "# a"}]));

    let (status, body) = server.delete("/files/src/lib.rs").await;
    assert_eq!(status, 404);
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn test_files_reject_escape() {
    let server = spawn_server().await;
    let (status, body) = server
        .post(
            "/files",
            json!({"files": [{"name": "../outside.txt", "content": "x"}]}),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], 400);
    assert!(!server.workspace.parent().unwrap().join("outside.txt").exists());
}

#[tokio::test]
async fn test_run_command() {
    let server = spawn_server().await;
    let (status, body) = server
        .post("/run", json!({"command": "echo out; echo err >&2; exit 2"}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["output"], "out\nerr\n");
    assert_eq!(body["exit_code"], 2);
}

#[tokio::test]
async fn test_run_endless_output_truncated() {
    let server = spawn_server().await;
    let (status, body) = server.post("/run", json!({"command": "yes"})).await;
    assert_eq!(status, 200);
    assert!(body["output"]
        .as_str()
        .unwrap()
        .ends_with("[output truncated]\n"));
    assert_eq!(body["exit_code"], Value::Null);
}

#[tokio::test]
async fn test_run_killed_by_signal() {
    let server = spawn_server().await;
    let (status, body) = server
        .post("/run", json!({"command": "echo before; kill -9 $$"}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["output"], "before\n");
    assert_eq!(body["exit_code"], Value::Null);
}

#[tokio::test]
async fn test_run_stream() {
    let server = spawn_server().await;
    let (status, body) = server
        .post_text(
            "/run/stream",
            json!({"command": "echo one; printf '\\377\\n'; echo two >&2; exit 1"}),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        "data: one\n\ndata: \u{FFFD}\n\ndata: two\n\ndata: [EXIT 1]\n\ndata: [DONE]\n\n"
    );
}

#[tokio::test]
async fn test_run_stream_killed() {
    let server = spawn_server().await;
    let (status, body) = server
        .post_text("/run/stream", json!({"command": "kill -9 $$"}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body, "data: [EXIT killed]\n\ndata: [DONE]\n\n");
}

#[tokio::test]
async fn test_run_timeout() {
    let server = spawn_server().await;
    let (status, body) = server.post("/run", json!({"command": "sleep 10"})).await;
    assert_eq!(status, 408);
    assert_eq!(body["code"], 408);
}

#[tokio::test]
async fn test_run_empty_command() {
    let server = spawn_server().await;
    let (status, _) = server.post("/run", json!({"command": "   "})).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_model_read_after_write() {
    let server = spawn_server().await;
    let (status, body) = server.get("/model").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"model": "gpt-4", "provider": "openai"}));

    let (status, body) = server
        .post("/model", json!({"model": "gpt-3.5-turbo", "provider": "openai"}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Model set to gpt-3.5-turbo (openai)");

    let (_, body) = server.get("/model").await;
    assert_eq!(body, json!({"model": "gpt-3.5-turbo", "provider": "openai"}));
}

#[tokio::test]
async fn test_models_catalog() {
    let server = spawn_server().await;
    let (status, body) = server.get("/models").await;
    assert_eq!(status, 200);
    let gpt4 = body["models"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["name"] == "gpt-4")
        .cloned()
        .unwrap();
    assert_eq!(gpt4["max_context_tokens"], 8192);
}
