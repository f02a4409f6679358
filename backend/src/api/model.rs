//! Model selection API handlers

use crate::api::utils::{RouterState, StatusResponse};
use crate::error::AppError;
use crate::state::{KnownModel, ModelInfo, KNOWN_MODELS};
use axum::{extract::State, response::Json};
use serde::Serialize;
use tracing::{debug, info};

/// Model catalog response
#[derive(Debug, Serialize)]
pub struct ModelListResponse {
    /// Known models
    pub models: Vec<KnownModel>,
}

/// GET /model - Current model selection
pub async fn get_model(State(state): State<RouterState>) -> Json<ModelInfo> {
    Json(state.app_state.read().await.model().clone())
}

/// POST /model - Change the model selection
pub async fn set_model(
    State(state): State<RouterState>,
    Json(request): Json<ModelInfo>,
) -> Result<Json<StatusResponse>, AppError> {
    let model = request.validated().map_err(AppError::InvalidRequest)?;
    if model.known().is_none() {
        debug!(model = %model.model, "Model is not in the built-in catalog");
    }

    state
        .app_state
        .write()
        .await
        .update_model(model.clone())?;

    info!(model = %model.model, provider = %model.provider, "Model updated");
    Ok(Json(StatusResponse::success(format!(
        "Model set to {} ({})",
        model.model, model.provider
    ))))
}

/// GET /models - Built-in model catalog
pub async fn list_models() -> Json<ModelListResponse> {
    Json(ModelListResponse {
        models: KNOWN_MODELS.to_vec(),
    })
}
