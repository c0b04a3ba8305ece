//! Provider wire types
//!
//! Structs that mirror the JSON request and response formats of the
//! supported provider APIs.

use serde::{Deserialize, Serialize};

/// A single chat message in a provider request
#[derive(Serialize, Debug)]
pub struct ChatTurn<'a> {
    /// Speaker role, always "user" for a single-prompt request
    pub role: &'static str,
    /// Prompt text
    pub content: &'a str,
}

impl<'a> ChatTurn<'a> {
    /// A user turn carrying the prompt
    pub fn user(content: &'a str) -> Self {
        Self {
            role: "user",
            content,
        }
    }
}

/// Request body for the Anthropic Messages API
#[derive(Serialize, Debug)]
pub struct AnthropicRequest<'a> {
    /// Model identifier
    pub model: &'a str,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Conversation turns
    pub messages: Vec<ChatTurn<'a>>,
}

/// Response body of the Anthropic Messages API
#[derive(Deserialize, Debug)]
pub struct AnthropicResponse {
    /// Content blocks produced by the model
    #[serde(default)]
    pub content: Vec<AnthropicContentBlock>,
    /// Why the model stopped generating
    #[serde(default)]
    pub stop_reason: Option<String>,
}

/// One content block of an Anthropic response
#[derive(Deserialize, Debug)]
pub struct AnthropicContentBlock {
    /// Block type, "text" for generated text
    #[serde(rename = "type")]
    pub block_type: String,
    /// Text of a "text" block
    #[serde(default)]
    pub text: Option<String>,
}

/// Request body for the OpenAI chat completions API
#[derive(Serialize, Debug)]
pub struct OpenAiRequest<'a> {
    /// Model identifier
    pub model: &'a str,
    /// Conversation turns
    pub messages: Vec<ChatTurn<'a>>,
    /// Sampling temperature
    pub temperature: f32,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

/// Response body of the OpenAI chat completions API
#[derive(Deserialize, Debug)]
pub struct OpenAiResponse {
    /// Candidate completions
    #[serde(default)]
    pub choices: Vec<OpenAiChoice>,
}

/// One completion choice
#[derive(Deserialize, Debug)]
pub struct OpenAiChoice {
    /// Generated assistant message
    pub message: OpenAiMessage,
    /// Why the model stopped generating
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Assistant message inside a choice
#[derive(Deserialize, Debug)]
pub struct OpenAiMessage {
    /// Generated text (absent for tool-call only answers)
    #[serde(default)]
    pub content: Option<String>,
}

/// Request body for an Ollama-compatible generate endpoint
#[derive(Serialize, Debug)]
pub struct LlamaRequest<'a> {
    /// Model tag
    pub model: &'a str,
    /// Prompt text
    pub prompt: &'a str,
    /// Always false; the whole answer is returned in one body
    pub stream: bool,
    /// Sampling options
    pub options: LlamaOptions,
}

/// Sampling options for the generate endpoint
#[derive(Serialize, Debug)]
pub struct LlamaOptions {
    /// Sampling temperature
    pub temperature: f32,
    /// Upper bound on generated tokens
    pub num_predict: u32,
}

/// Response body of the generate endpoint
#[derive(Deserialize, Debug)]
pub struct LlamaResponse {
    /// Generated text
    #[serde(default)]
    pub response: String,
    /// Whether generation completed
    #[serde(default)]
    pub done: bool,
}
