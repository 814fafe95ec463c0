//! OpenAI-Compatible Provider
//!
//! Chat Completions API. Works against api.openai.com with `OPENAI_API_KEY`
//! and against GitHub Models with `GITHUB_TOKEN`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::{
    ErrorClassifier, LlmProvider, LlmResponse, ProviderConfig, ResponseMetadata, ResponseTiming,
    TokenUsage,
};
use crate::types::{ErrorCategory, LlmError, Result, WeaveError};

const PROVIDER_NAME: &str = "openai";

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

const GITHUB_MODELS_API_BASE: &str = "https://models.github.ai/inference";
const GITHUB_MODELS_DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Where the API key came from; selects endpoint defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeySource {
    Explicit,
    OpenAi,
    GitHub,
}

/// OpenAI API Provider with secure API key handling
pub struct OpenAiProvider {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let (api_key, source) = Self::resolve_key(config.api_key)?;

        let api_base = config.api_base.unwrap_or_else(|| match source {
            KeySource::GitHub => GITHUB_MODELS_API_BASE.to_string(),
            _ => DEFAULT_API_BASE.to_string(),
        });
        let api_base = api_base.trim_end_matches('/').to_string();

        let model = config.model.unwrap_or_else(|| match source {
            KeySource::GitHub => GITHUB_MODELS_DEFAULT_MODEL.to_string(),
            _ => DEFAULT_MODEL.to_string(),
        });

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WeaveError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            api_base,
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn resolve_key(explicit: Option<SecretString>) -> Result<(SecretString, KeySource)> {
        if let Some(key) = explicit {
            return Ok((key, KeySource::Explicit));
        }
        if let Some(key) = non_empty_env("OPENAI_API_KEY") {
            return Ok((SecretString::from(key), KeySource::OpenAi));
        }
        if let Some(key) = non_empty_env("GITHUB_TOKEN") {
            return Ok((SecretString::from(key), KeySource::GitHub));
        }
        Err(WeaveError::EnhancementUnavailable(
            "No API key found. Set OPENAI_API_KEY or GITHUB_TOKEN".to_string(),
        ))
    }

    fn build_request(&self, system: &str, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, system: &str, prompt: &str) -> Result<LlmResponse> {
        info!(
            "Completing with OpenAI-compatible API (model: {}, temperature: {})",
            self.model, self.temperature
        );

        let start_time = Instant::now();
        let request = self.build_request(system, prompt);
        let url = format!("{}/chat/completions", self.api_base);

        debug!("Sending request to {}", url);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, PROVIDER_NAME))?;

        let elapsed = start_time.elapsed();

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("API error ({}): {}", status, body),
                PROVIDER_NAME,
            )
            .into());
        }

        let response_body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, PROVIDER_NAME))?;

        let usage = response_body
            .usage
            .map(|u| TokenUsage::from_openai(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        let content = response_body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                LlmError::with_provider(
                    ErrorCategory::Transient,
                    "No content in response",
                    PROVIDER_NAME,
                )
            })?;

        Ok(LlmResponse {
            content,
            usage,
            timing: ResponseTiming::from_duration(elapsed),
            metadata: ResponseMetadata {
                model: self.model.clone(),
                provider: PROVIDER_NAME.to_string(),
            },
        })
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explicit_config() -> ProviderConfig {
        ProviderConfig {
            provider: "openai".to_string(),
            api_key: Some(SecretString::from("test-key")),
            ..Default::default()
        }
    }

    #[test]
    fn test_explicit_key_uses_openai_defaults() {
        let provider = OpenAiProvider::new(explicit_config()).unwrap();
        assert_eq!(provider.api_base, DEFAULT_API_BASE);
        assert_eq!(provider.model, DEFAULT_MODEL);
        assert!(!format!("{:?}", provider).contains("test-key"));
    }

    #[test]
    fn test_custom_base_trailing_slash() {
        let config = ProviderConfig {
            api_base: Some("http://localhost:8080/v1/".to_string()),
            model: Some("local-model".to_string()),
            ..explicit_config()
        };
        let provider = OpenAiProvider::new(config).unwrap();
        assert_eq!(provider.api_base, "http://localhost:8080/v1");
        assert_eq!(provider.model(), "local-model");
    }

    #[test]
    fn test_request_shape() {
        let provider = OpenAiProvider::new(explicit_config()).unwrap();
        let request = provider.build_request("system text", "user text");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "user text");
        assert_eq!(json["max_tokens"], 300);
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"choices":[{"message":{"content":"  A helper.  "}}],"usage":{"prompt_tokens":12,"completion_tokens":4}}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("  A helper.  ")
        );
        assert_eq!(parsed.usage.unwrap().completion_tokens, 4);
    }
}
