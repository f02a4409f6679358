//! API module
//!
//! HTTP handlers for the gateway and the router that wires them together.

pub mod chat;
pub mod files;
pub mod health;
pub mod middleware;
pub mod model;
pub mod run;
pub mod streaming;
pub mod utils;

pub use utils::RouterState;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the gateway router over shared state
pub fn router(state: RouterState) -> Router {
    let body_limit = state.config.server.max_body_bytes;

    Router::new()
        // Health check and hello world
        .route("/", get(health::hello_world))
        .route("/health", get(health::health_check))
        // Chat
        .route("/chat", post(chat::chat))
        .route(
            "/chat/history",
            get(chat::get_history).delete(chat::clear_history),
        )
        // Working context
        .route("/files", get(files::get_files).post(files::set_files))
        .route("/files/*name", delete(files::drop_file))
        // Command execution
        .route("/run", post(run::run_command))
        .route("/run/stream", post(run::run_command_stream))
        // Model selection
        .route("/model", get(model::get_model).post(model::set_model))
        .route("/models", get(model::list_models))
        // Middleware (order matters - request_id should be first)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
