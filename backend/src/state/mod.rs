// State management module
// Handles gateway state, model catalog, and settings persistence

pub mod app_state;
pub mod model;
pub mod persistence;

pub use app_state::AppState;
pub use model::{KnownModel, ModelInfo, KNOWN_MODELS};
pub use persistence::{GatewaySettings, PersistenceError, SettingsStore};
