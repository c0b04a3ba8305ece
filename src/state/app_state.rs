// Application state shared by all HTTP handlers

use crate::chat::SessionId;
use crate::config::GenerationConfig;
use crate::conversation::{ConversationController, TurnContext, TurnSettings};
use crate::providers::GenerationParams;
use serde::Deserialize;
use tokio::sync::Mutex;

/// Optional per-request overrides of the generation defaults
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsOverride {
    /// Model display name
    #[serde(default)]
    pub model: Option<String>,
    /// Sampling temperature
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Response token limit
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// Main application state
///
/// The chat is single-user; `turn_lock` serializes every operation that
/// writes messages or moves the session pointer.
pub struct AppState {
    /// Conversation controller
    pub controller: ConversationController,
    /// Generation defaults used when a request leaves a setting out
    pub generation: GenerationConfig,
    /// Held for the duration of each mutating operation
    pub turn_lock: Mutex<()>,
}

impl AppState {
    /// Create application state
    pub fn new(controller: ConversationController, generation: GenerationConfig) -> Self {
        Self {
            controller,
            generation,
            turn_lock: Mutex::new(()),
        }
    }

    /// Resolve request overrides against the configured defaults
    pub fn settings(&self, overrides: &SettingsOverride) -> TurnSettings {
        let defaults = self.generation.default_params();
        TurnSettings {
            model: overrides
                .model
                .clone()
                .unwrap_or_else(|| self.generation.default_model.display_name().to_string()),
            params: GenerationParams {
                temperature: overrides.temperature.unwrap_or(defaults.temperature),
                max_tokens: overrides.max_tokens.unwrap_or(defaults.max_tokens),
            },
        }
    }

    /// Build a turn context for a request
    pub fn context(
        &self,
        current_session: Option<SessionId>,
        overrides: &SettingsOverride,
    ) -> TurnContext {
        TurnContext::new(current_session, self.settings(overrides))
    }
}
