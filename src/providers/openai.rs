//! OpenAI chat completions client

use crate::providers::types::{ChatTurn, OpenAiRequest, OpenAiResponse};
use crate::providers::{
    read_json_response, request_error, GenerationCapability, GenerationError, GenerationParams,
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

const OPENAI_API_BASE_URL: &str = "https://api.openai.com";
const PROVIDER: &str = "OpenAI";

/// Default model used for the chatGPT picker entry
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Chat provider backed by `/v1/chat/completions`
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
}

impl OpenAiProvider {
    /// Create a provider using a shared HTTP client
    pub fn new(client: reqwest::Client, api_key: Option<SecretString>, model: String) -> Self {
        Self {
            client,
            api_key,
            base_url: OPENAI_API_BASE_URL.to_string(),
            model,
        }
    }

    /// Override the base URL (useful for testing or compatible gateways)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl GenerationCapability for OpenAiProvider {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn generate(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<Vec<String>, GenerationError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(GenerationError::MissingApiKey(PROVIDER))?;

        let url = format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        let request_body = OpenAiRequest {
            model: &self.model,
            messages: vec![ChatTurn::user(prompt)],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        tracing::debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            "Calling OpenAI API"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key.expose_secret())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| request_error(PROVIDER, e))?;

        let parsed: OpenAiResponse = read_json_response(PROVIDER, response).await?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::InvalidResponse {
                provider: PROVIDER,
                message: "response contains no choices".to_string(),
            })?;

        let text = choice
            .message
            .content
            .filter(|text| !text.is_empty())
            .ok_or(GenerationError::EmptyResponse(PROVIDER))?;

        tracing::debug!(
            response_len = text.len(),
            finish_reason = ?choice.finish_reason,
            "Received response from OpenAI API"
        );

        Ok(vec![text])
    }
}
