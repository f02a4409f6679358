//! Liveness endpoints

use axum::Json;
use serde::{Deserialize, Serialize};

/// Greeting body
#[derive(Debug, Serialize, Deserialize)]
pub struct HelloResponse {
    #[allow(missing_docs)]
    pub message: String,
    #[allow(missing_docs)]
    pub status: String,
}

/// Health check body
#[derive(Debug, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub message: String,
}

/// GET /
pub async fn hello_world() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "Hello from the pairgate API gateway!".to_string(),
        status: "ok".to_string(),
    })
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: "Gateway is healthy".to_string(),
    })
}
