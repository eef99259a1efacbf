//! OpenRouter provider (<https://openrouter.ai/>).
//!
//! Talks to any OpenAI-compatible chat-completions endpoint with a blocking
//! client; the base URL is configurable for proxies and self-hosted models.

use super::TextGenerationProvider;
use anyhow::{Result, anyhow};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

const DEFAULT_MODEL: &str = "deepseek/deepseek-chat";

/// Cleaning a table takes longer than a one-word answer.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Zero keeps answers as repeatable as the backend allows.
const DEFAULT_TEMPERATURE: f32 = 0.0;

/// The answer is a whole table, so leave room for it.
const DEFAULT_MAX_TOKENS: u32 = 8192;

const SYSTEM_PROMPT: &str = "You are a meticulous data-cleaning assistant. \
    You answer with CSV only, never with prose.";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<Message>,
}

impl ChatResponse {
    fn into_content(self) -> Option<String> {
        self.choices?
            .into_iter()
            .next()?
            .message
            .map(|m| m.content)
            .filter(|c| !c.trim().is_empty())
    }
}

/// Configuration for the OpenRouter provider.
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// Model identifier (e.g., "deepseek/deepseek-chat", "openai/gpt-4o").
    pub model: String,
    /// Sampling temperature (0.0 - 2.0).
    pub temperature: f32,
    /// Maximum tokens in the response.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Chat-completions endpoint.
    pub base_url: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl OpenRouterConfig {
    /// Create a new configuration builder.
    pub fn builder() -> OpenRouterConfigBuilder {
        OpenRouterConfigBuilder::default()
    }
}

/// Builder for [`OpenRouterConfig`].
#[derive(Default)]
pub struct OpenRouterConfigBuilder {
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout_secs: Option<u64>,
    base_url: Option<String>,
}

impl OpenRouterConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn build(self) -> OpenRouterConfig {
        OpenRouterConfig {
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

/// OpenRouter chat-completions client.
///
/// # Example
///
/// ```rust,ignore
/// use autoclean::ai::{OpenRouterConfig, OpenRouterProvider};
///
/// // Key from OPENROUTER_API_KEY
/// let provider = OpenRouterProvider::from_env()?;
///
/// // Explicit key and model
/// let config = OpenRouterConfig::builder().model("openai/gpt-4o").build();
/// let provider = OpenRouterProvider::with_config("your-api-key", config)?;
/// ```
pub struct OpenRouterProvider {
    api_key: String,
    config: OpenRouterConfig,
    client: Client,
}

static_assertions::assert_impl_all!(OpenRouterProvider: Send, Sync);

impl OpenRouterProvider {
    /// Create a provider with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, OpenRouterConfig::default())
    }

    /// Create a provider reading the key from [`API_KEY_ENV`].
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is unset or empty.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_config(OpenRouterConfig::default())
    }

    pub fn from_env_with_config(config: OpenRouterConfig) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| anyhow!("{} is not set", API_KEY_ENV))?;
        Self::with_config(api_key, config)
    }

    /// Create a provider with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_config(api_key: impl Into<String>, config: OpenRouterConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            api_key: api_key.into(),
            config,
            client,
        })
    }

    fn build_request(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }
}

impl TextGenerationProvider for OpenRouterProvider {
    fn generate(&self, prompt: &str) -> Result<String> {
        let request = self.build_request(prompt);
        debug!(
            "Sending {} prompt characters to {}",
            prompt.len(),
            self.config.model
        );

        let response = self
            .client
            .post(&self.config.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("X-Title", "autoclean")
            .json(&request)
            .send()?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "OpenRouter API Error {}: {}",
                response.status(),
                response.text()?
            ));
        }

        let result: ChatResponse = response.json()?;
        result
            .into_content()
            .ok_or_else(|| anyhow!("No response content from OpenRouter API"))
    }

    fn name(&self) -> &str {
        "OpenRouter"
    }

    fn model(&self) -> Option<&str> {
        Some(&self.config.model)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Response parsing
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_valid_response() {
        let json = r#"{
            "choices": [{
                "message": { "role": "assistant", "content": "a,b\n1,2" }
            }]
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_content().as_deref(), Some("a,b\n1,2"));
    }

    #[test]
    fn test_parse_response_with_empty_choices() {
        let response: ChatResponse = serde_json::from_str(r#"{ "choices": [] }"#).unwrap();
        assert!(response.into_content().is_none());
    }

    #[test]
    fn test_parse_response_with_null_choices() {
        let response: ChatResponse = serde_json::from_str(r#"{ "choices": null }"#).unwrap();
        assert!(response.into_content().is_none());
    }

    #[test]
    fn test_parse_response_with_blank_content() {
        let json = r#"{ "choices": [{ "message": { "role": "assistant", "content": "  " } }] }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(response.into_content().is_none());
    }

    #[test]
    fn test_parse_malformed_json() {
        let result: std::result::Result<ChatResponse, _> = serde_json::from_str("{ not json");
        assert!(result.is_err());
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    #[test]
    fn test_config_defaults() {
        let config = OpenRouterConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_config_builder() {
        let config = OpenRouterConfig::builder()
            .model("openai/gpt-4o")
            .temperature(0.3)
            .max_tokens(1000)
            .timeout_secs(10)
            .base_url("http://localhost:8080/v1/chat/completions")
            .build();

        assert_eq!(config.model, "openai/gpt-4o");
        assert_eq!(config.temperature, 0.3);
        assert_eq!(config.max_tokens, 1000);
        assert_eq!(config.timeout_secs, 10);
        assert!(config.base_url.starts_with("http://localhost"));
    }

    #[test]
    fn test_request_carries_system_and_user_messages() {
        let provider = OpenRouterProvider::new("key").unwrap();
        let request = provider.build_request("clean this");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].content, "clean this");

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("deepseek/deepseek-chat"));
    }

    #[test]
    fn test_provider_metadata() {
        let provider = OpenRouterProvider::new("key").unwrap();
        assert_eq!(provider.name(), "OpenRouter");
        assert_eq!(provider.model(), Some(DEFAULT_MODEL));
    }
}
