//! Model selection types
//!
//! Defines the model/provider pair the assistant runs with and the built-in
//! catalog of known models.

use serde::{Deserialize, Serialize};

/// The model the assistant uses for chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model name (e.g., "gpt-4")
    pub model: String,
    /// Provider serving the model (e.g., "openai")
    pub provider: String,
}

impl ModelInfo {
    /// Create a new model selection
    pub fn new(model: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            provider: provider.into(),
        }
    }

    /// Validate and trim the selection
    /// Returns the normalized selection, or Err with message if invalid
    pub fn validated(self) -> Result<Self, String> {
        let model = self.model.trim();
        let provider = self.provider.trim();
        if model.is_empty() {
            return Err("Model cannot be empty".to_string());
        }
        if provider.is_empty() {
            return Err("Provider cannot be empty".to_string());
        }
        Ok(Self::new(model, provider))
    }

    /// Catalog entry for this model, if it is a known one
    pub fn known(&self) -> Option<&'static KnownModel> {
        lookup(&self.model)
    }
}

/// A model the gateway knows the context window of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KnownModel {
    /// Model name
    pub name: &'static str,
    /// Provider serving the model
    pub provider: &'static str,
    /// Context window size in tokens
    pub max_context_tokens: usize,
}

impl KnownModel {
    const fn new(name: &'static str, provider: &'static str, context_k: usize) -> Self {
        Self {
            name,
            provider,
            max_context_tokens: context_k * 1024,
        }
    }
}

/// Built-in model catalog
pub const KNOWN_MODELS: &[KnownModel] = &[
    KnownModel::new("gpt-4", "openai", 8),
    KnownModel::new("gpt-4-32k", "openai", 32),
    KnownModel::new("gpt-4-32k-0613", "openai", 32),
    KnownModel::new("gpt-3.5-turbo", "openai", 4),
    KnownModel::new("gpt-3.5-turbo-16k", "openai", 16),
];

/// Find a catalog entry by model name
pub fn lookup(name: &str) -> Option<&'static KnownModel> {
    KNOWN_MODELS.iter().find(|m| m.name == name)
}
