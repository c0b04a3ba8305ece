//! Llama client for an Ollama-compatible generate endpoint
//!
//! The server is usually local and unauthenticated; a bearer key is sent
//! only when one is configured (for hosted gateways).

use crate::providers::types::{LlamaOptions, LlamaRequest, LlamaResponse};
use crate::providers::{
    read_json_response, request_error, GenerationCapability, GenerationError, GenerationParams,
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

const PROVIDER: &str = "LLaMA";

/// Default base URL of a local Ollama server
pub const DEFAULT_LLAMA_BASE_URL: &str = "http://localhost:11434";

/// Default model tag
pub const DEFAULT_LLAMA_MODEL: &str = "llama3";

/// Llama provider backed by `/api/generate`
pub struct LlamaProvider {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
}

impl LlamaProvider {
    /// Create a provider using a shared HTTP client
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        model: String,
        api_key: Option<SecretString>,
    ) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.into(),
            model,
        }
    }
}

#[async_trait]
impl GenerationCapability for LlamaProvider {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn generate(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<Vec<String>, GenerationError> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        let request_body = LlamaRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: LlamaOptions {
                temperature: params.temperature,
                num_predict: params.max_tokens,
            },
        };

        tracing::debug!(
            url = %url,
            model = %self.model,
            prompt_len = prompt.len(),
            "Calling LLaMA server"
        );

        let mut request = self.client.post(&url).json(&request_body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| request_error(PROVIDER, e))?;

        let parsed: LlamaResponse = read_json_response(PROVIDER, response).await?;
        if parsed.response.is_empty() {
            return Err(GenerationError::EmptyResponse(PROVIDER));
        }
        if !parsed.done {
            tracing::warn!("LLaMA server reported an unfinished generation");
        }

        Ok(vec![parsed.response])
    }
}
