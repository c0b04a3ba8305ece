//! Model name to capability mapping

use crate::config::ProviderConfig;
use crate::providers::{
    AnthropicProvider, GenerationCapability, GenerationError, GenerationParams, LlamaProvider,
    ModelChoice, OpenAiProvider,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Text shown to the user when the selected model is not available
pub const INVALID_MODEL_NOTICE: &str = "Error: Invalid model selected.";

/// Result of dispatching a prompt by model name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The capability produced these output parts
    Generated(Vec<String>),
    /// No capability is registered under the requested name; carries the notice text
    InvalidModel(String),
}

/// Fixed mapping from model to generation capability
#[derive(Clone, Default)]
pub struct ModelRegistry {
    capabilities: HashMap<ModelChoice, Arc<dyn GenerationCapability>>,
}

impl ModelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability for a model, replacing any previous one
    pub fn with_capability(
        mut self,
        model: ModelChoice,
        capability: Arc<dyn GenerationCapability>,
    ) -> Self {
        self.capabilities.insert(model, capability);
        self
    }

    /// Wire the three HTTP providers from configuration
    ///
    /// Providers missing an API key are still registered; they fail at call
    /// time with `GenerationError::MissingApiKey`.
    pub fn from_config(config: &ProviderConfig, client: reqwest::Client) -> Self {
        let anthropic = AnthropicProvider::new(
            client.clone(),
            config.anthropic_api_key.clone(),
            config.anthropic_model.clone(),
        );
        let openai = OpenAiProvider::new(
            client.clone(),
            config.openai_api_key.clone(),
            config.openai_model.clone(),
        );
        let llama = LlamaProvider::new(
            client,
            config.llama_base_url.clone(),
            config.llama_model.clone(),
            config.llama_api_key.clone(),
        );

        Self::new()
            .with_capability(ModelChoice::ClaudeSonnet, Arc::new(anthropic))
            .with_capability(ModelChoice::Gpt4Mini, Arc::new(openai))
            .with_capability(ModelChoice::Llama, Arc::new(llama))
    }

    /// Registered models, in picker order
    pub fn models(&self) -> Vec<ModelChoice> {
        ModelChoice::ALL
            .into_iter()
            .filter(|model| self.capabilities.contains_key(model))
            .collect()
    }

    /// Look up the capability registered for a model
    pub fn capability(&self, model: ModelChoice) -> Option<&Arc<dyn GenerationCapability>> {
        self.capabilities.get(&model)
    }

    /// Send a prompt to the capability registered under `model_name`
    ///
    /// An unknown or unregistered name is not an error: it yields
    /// `Dispatch::InvalidModel` so that a bad selection stays distinguishable
    /// from a provider failure.
    pub async fn dispatch(
        &self,
        model_name: &str,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<Dispatch, GenerationError> {
        let capability = model_name
            .parse::<ModelChoice>()
            .ok()
            .and_then(|model| self.capability(model));

        let Some(capability) = capability else {
            tracing::warn!(model = %model_name, "Invalid model selected");
            return Ok(Dispatch::InvalidModel(INVALID_MODEL_NOTICE.to_string()));
        };

        tracing::info!(
            model = %model_name,
            provider = capability.provider(),
            temperature = params.temperature,
            max_tokens = params.max_tokens,
            "Dispatching prompt"
        );

        capability
            .generate(prompt, params)
            .await
            .map(Dispatch::Generated)
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models", &self.models())
            .finish()
    }
}
