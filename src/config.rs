//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use crate::providers::anthropic::DEFAULT_ANTHROPIC_MODEL;
use crate::providers::llama::{DEFAULT_LLAMA_BASE_URL, DEFAULT_LLAMA_MODEL};
use crate::providers::openai::DEFAULT_OPENAI_MODEL;
use crate::providers::{GenerationParams, ModelChoice};
use anyhow::{anyhow, Context};
use secrecy::SecretString;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Persistence configuration
    pub persistence: PersistenceConfig,
    /// Generation defaults
    pub generation: GenerationConfig,
    /// Provider credentials and endpoints
    pub providers: ProviderConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Persistence configuration
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    /// Base directory for the database and sidecar file
    pub data_dir: PathBuf,
    /// SQLite database holding sessions and messages
    pub db_path: PathBuf,
    /// Sidecar file holding the current session pointer
    pub session_state_path: PathBuf,
}

/// Defaults for the model picker and generation limits
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Model preselected in the picker
    pub default_model: ModelChoice,
    /// Default sampling temperature
    pub default_temperature: f32,
    /// Default response token limit
    pub default_max_tokens: u32,
    /// Upper bound on a single generation call (in seconds)
    pub timeout_secs: u64,
}

impl GenerationConfig {
    /// Default sampling parameters
    pub fn default_params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.default_temperature,
            max_tokens: self.default_max_tokens,
        }
    }

    /// Generation timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Provider credentials and endpoints
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Anthropic API key
    pub anthropic_api_key: Option<SecretString>,
    /// Anthropic model identifier
    pub anthropic_model: String,
    /// OpenAI API key
    pub openai_api_key: Option<SecretString>,
    /// OpenAI model identifier
    pub openai_model: String,
    /// Base URL of the Ollama-compatible Llama server
    pub llama_base_url: String,
    /// Llama model tag
    pub llama_model: String,
    /// Optional bearer key for a hosted Llama gateway
    pub llama_api_key: Option<SecretString>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            openai_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            llama_base_url: DEFAULT_LLAMA_BASE_URL.to_string(),
            llama_model: DEFAULT_LLAMA_MODEL.to_string(),
            llama_api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// Unknown model names and out-of-range generation defaults are rejected
    /// here so that a bad setup fails at startup rather than on first use.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let secret = |key: &str| var(key).map(SecretString::from);

        let data_dir = var("DATA_DIR").map(PathBuf::from).unwrap_or_else(|| {
            // Default to ~/.chat-relay or current directory
            match lookup("HOME") {
                Some(home) => PathBuf::from(home).join(".chat-relay"),
                None => PathBuf::from(".chat-relay"),
            }
        });

        let default_model = match var("DEFAULT_MODEL") {
            Some(name) => name
                .parse::<ModelChoice>()
                .context("DEFAULT_MODEL is not a supported model")?,
            None => ModelChoice::ClaudeSonnet,
        };

        let generation = GenerationConfig {
            default_model,
            default_temperature: parse_or(var("DEFAULT_TEMPERATURE"), 0.7)
                .context("DEFAULT_TEMPERATURE must be a number")?,
            default_max_tokens: parse_or(var("DEFAULT_MAX_TOKENS"), 4000)
                .context("DEFAULT_MAX_TOKENS must be an integer")?,
            timeout_secs: parse_or(var("GENERATION_TIMEOUT_SECS"), 120)
                .context("GENERATION_TIMEOUT_SECS must be an integer")?,
        };
        generation
            .default_params()
            .validate()
            .map_err(|e| anyhow!("Invalid generation defaults: {}", e))?;

        let defaults = ProviderConfig::default();

        Ok(Self {
            server: ServerConfig {
                port: parse_or(var("PORT"), 8080).context("PORT must be a port number")?,
                host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            },
            persistence: PersistenceConfig {
                db_path: var("CHAT_DB_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| data_dir.join("chat_history.db")),
                session_state_path: var("SESSION_STATE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| data_dir.join("session_state.json")),
                data_dir,
            },
            generation,
            providers: ProviderConfig {
                anthropic_api_key: secret("ANTHROPIC_API_KEY"),
                anthropic_model: var("ANTHROPIC_MODEL").unwrap_or(defaults.anthropic_model),
                openai_api_key: secret("OPENAI_API_KEY"),
                openai_model: var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
                llama_base_url: var("LLAMA_BASE_URL").unwrap_or(defaults.llama_base_url),
                llama_model: var("LLAMA_MODEL").unwrap_or(defaults.llama_model),
                llama_api_key: secret("LLAMA_API_KEY"),
            },
        })
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_or<T>(value: Option<String>, default: T) -> Result<T, T::Err>
where
    T: std::str::FromStr,
{
    match value {
        Some(raw) => raw.trim().parse(),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("HOME", "/home/tester")]).unwrap();
        assert_eq!(config.server_addr(), "127.0.0.1:8080");
        assert_eq!(
            config.persistence.db_path,
            PathBuf::from("/home/tester/.chat-relay/chat_history.db")
        );
        assert_eq!(
            config.persistence.session_state_path,
            PathBuf::from("/home/tester/.chat-relay/session_state.json")
        );
        assert_eq!(config.generation.default_model, ModelChoice::ClaudeSonnet);
        assert_eq!(config.generation.default_max_tokens, 4000);
        assert!((config.generation.default_temperature - 0.7).abs() < f32::EPSILON);
        assert!(config.providers.anthropic_api_key.is_none());
        assert_eq!(config.providers.llama_base_url, DEFAULT_LLAMA_BASE_URL);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("DATA_DIR", "/srv/chat"),
            ("DEFAULT_MODEL", "LLaMA"),
            ("DEFAULT_TEMPERATURE", "0.25"),
            ("OPENAI_API_KEY", "sk-abc"),
            ("ANTHROPIC_API_KEY", "  "),
        ])
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.persistence.data_dir, PathBuf::from("/srv/chat"));
        assert_eq!(
            config.persistence.db_path,
            PathBuf::from("/srv/chat/chat_history.db")
        );
        assert_eq!(config.generation.default_model, ModelChoice::Llama);
        assert_eq!(
            config
                .providers
                .openai_api_key
                .as_ref()
                .map(|k| k.expose_secret().to_string()),
            Some("sk-abc".to_string())
        );
        assert!(config.providers.anthropic_api_key.is_none());
    }

    #[test]
    fn test_unknown_default_model_is_rejected() {
        let result = config_from(&[("DEFAULT_MODEL", "GPT-9")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_out_of_range_temperature_is_rejected() {
        let result = config_from(&[("DEFAULT_TEMPERATURE", "3.0")]);
        assert!(result.unwrap_err().to_string().contains("Invalid generation defaults"));
    }

    #[test]
    fn test_debug_output_redacts_keys() {
        let config = config_from(&[("ANTHROPIC_API_KEY", "super-secret")]).unwrap();
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
