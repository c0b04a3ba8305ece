//! Model capability registry
//!
//! Maps each supported model to an external generation capability. Every
//! capability has the same calling contract: prompt, temperature and token
//! limit in, generated text parts out.

pub mod anthropic;
pub mod error;
pub mod llama;
pub mod openai;
pub mod registry;
pub mod types;

pub use anthropic::AnthropicProvider;
pub use error::GenerationError;
pub use llama::LlamaProvider;
pub use openai::OpenAiProvider;
pub use registry::{Dispatch, ModelRegistry, INVALID_MODEL_NOTICE};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Highest accepted token limit for a single response
pub const MAX_TOKENS_LIMIT: u32 = 10_000;

/// The fixed set of models offered in the model picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelChoice {
    /// Anthropic Claude
    #[serde(rename = "Claude 3.5 Sonnet")]
    ClaudeSonnet,
    /// OpenAI chat model
    #[serde(rename = "chatGPT4-mini")]
    Gpt4Mini,
    /// Self-hosted Llama behind an Ollama-compatible server
    #[serde(rename = "LLaMA")]
    Llama,
}

impl ModelChoice {
    /// All models, in picker order
    pub const ALL: [ModelChoice; 3] = [
        ModelChoice::ClaudeSonnet,
        ModelChoice::Gpt4Mini,
        ModelChoice::Llama,
    ];

    /// Name shown in the model picker
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelChoice::ClaudeSonnet => "Claude 3.5 Sonnet",
            ModelChoice::Gpt4Mini => "chatGPT4-mini",
            ModelChoice::Llama => "LLaMA",
        }
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Model name that matches none of the supported models
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown model: {0}")]
pub struct UnknownModel(pub String);

impl FromStr for ModelChoice {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        ModelChoice::ALL
            .into_iter()
            .find(|choice| choice.display_name() == name)
            .ok_or_else(|| UnknownModel(name.to_string()))
    }
}

/// Sampling parameters passed to every capability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Sampling temperature in `[0.0, 1.0]`
    pub temperature: f32,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

impl GenerationParams {
    /// Validate the parameters
    /// Returns Ok(()) if valid, Err with message if invalid
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(format!(
                "Temperature must be between 0.0 and 1.0, got {}",
                self.temperature
            ));
        }
        if self.max_tokens == 0 || self.max_tokens > MAX_TOKENS_LIMIT {
            return Err(format!(
                "Max tokens must be between 1 and {}, got {}",
                MAX_TOKENS_LIMIT, self.max_tokens
            ));
        }
        Ok(())
    }
}

/// An external function that turns a prompt into generated text
///
/// Implementations return the output as one or more parts; callers join them.
#[async_trait]
pub trait GenerationCapability: Send + Sync {
    /// Provider name used in logs and error messages
    fn provider(&self) -> &'static str;

    /// Generate a response for a single prompt
    async fn generate(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<Vec<String>, GenerationError>;
}

/// Check the HTTP status of a provider response and decode its JSON body
pub(crate) async fn read_json_response<T: DeserializeOwned>(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<T, GenerationError> {
    let status = response.status();
    if !status.is_success() {
        let status_code = status.as_u16();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error body".to_string());

        tracing::error!(
            provider = provider,
            status_code = status_code,
            error_body = %error_body,
            "Provider returned error status"
        );

        if status_code == 429 {
            return Err(GenerationError::RateLimited {
                provider,
                body: error_body,
            });
        }

        return Err(GenerationError::Status {
            provider,
            status: status_code,
            body: error_body,
        });
    }

    let response_body = response
        .text()
        .await
        .map_err(|e| GenerationError::Request {
            provider,
            message: format!("Failed to read response body: {}", e),
        })?;

    serde_json::from_str(&response_body).map_err(|e| GenerationError::InvalidResponse {
        provider,
        message: format!("{} - Response body: {}", e, response_body),
    })
}

/// Map a transport failure into a generation error
pub(crate) fn request_error(provider: &'static str, err: reqwest::Error) -> GenerationError {
    GenerationError::Request {
        provider,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_choice_parses_display_names() {
        for choice in ModelChoice::ALL {
            assert_eq!(choice.display_name().parse::<ModelChoice>(), Ok(choice));
        }
        assert_eq!(
            "  LLaMA ".parse::<ModelChoice>(),
            Ok(ModelChoice::Llama)
        );
    }

    #[test]
    fn test_model_choice_rejects_unknown_names() {
        assert_eq!(
            "gpt-5".parse::<ModelChoice>(),
            Err(UnknownModel("gpt-5".to_string()))
        );
        assert!("llama".parse::<ModelChoice>().is_err());
    }

    #[test]
    fn test_model_choice_serializes_as_display_name() {
        let json = serde_json::to_string(&ModelChoice::Gpt4Mini).unwrap();
        assert_eq!(json, "\"chatGPT4-mini\"");
    }

    #[test]
    fn test_generation_params_validation() {
        let valid = GenerationParams {
            temperature: 0.7,
            max_tokens: 4000,
        };
        assert!(valid.validate().is_ok());

        let hot = GenerationParams {
            temperature: 1.5,
            ..valid
        };
        assert!(hot.validate().unwrap_err().contains("Temperature"));

        let none = GenerationParams {
            max_tokens: 0,
            ..valid
        };
        assert!(none.validate().is_err());

        let too_many = GenerationParams {
            max_tokens: MAX_TOKENS_LIMIT + 1,
            ..valid
        };
        assert!(too_many.validate().is_err());
    }
}
