//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/weavedoc/) and project (.weavedoc/) level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ai::provider::SUPPORTED_PROVIDERS;
use crate::constants::{docs, enhancement, network};
use crate::types::{Result, WeaveError};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project metadata used in generated documents
    pub project: ProjectConfig,

    /// Documentation output settings
    pub documentation: DocumentationConfig,

    /// LLM enhancement settings
    pub llm: LlmConfig,
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `WeaveError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(WeaveError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(WeaveError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if !SUPPORTED_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(WeaveError::Config(format!(
                "Unknown LLM provider: {}. Supported: {}",
                self.llm.provider,
                SUPPORTED_PROVIDERS.join(", ")
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Project Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name (defaults to the analyzed file's stem)
    pub name: Option<String>,

    /// License named in the generated README
    pub license: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: None,
            license: docs::DEFAULT_LICENSE.to_string(),
        }
    }
}

// =============================================================================
// Documentation Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentationConfig {
    /// Directory written by `generate --output` when no path is given
    pub output_dir: PathBuf,

    /// Target language for endpoint usage examples
    pub example_language: String,
}

impl Default for DocumentationConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(docs::DEFAULT_OUTPUT_DIR),
            example_language: docs::DEFAULT_EXAMPLE_LANGUAGE.to_string(),
        }
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Whether generated documents consult the LLM at all
    pub enabled: bool,

    /// Provider name: "openai" or "ollama"
    pub provider: String,

    /// Model name; provider default when unset
    pub model: Option<String>,

    /// Custom API base URL
    pub api_base: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens per completion
    pub max_tokens: usize,

    /// Retries for rate-limit, network and transient failures
    pub max_retries: usize,

    /// Natural language the descriptions are written in
    pub response_language: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "openai".to_string(),
            model: None,
            api_base: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: network::DEFAULT_TEMPERATURE,
            max_tokens: network::DEFAULT_MAX_TOKENS,
            max_retries: enhancement::DEFAULT_MAX_RETRIES,
            response_language: "English".to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.project.license, "MIT");
        assert_eq!(config.documentation.output_dir, PathBuf::from("docs"));
        assert_eq!(config.documentation.example_language, "bash");
        assert!(!config.llm.enabled);
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.timeout_secs, 60);
        assert_eq!(config.llm.max_tokens, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_temperature() {
        let mut config = Config::default();
        config.llm.temperature = 2.5;
        assert!(matches!(config.validate(), Err(WeaveError::Config(_))));
    }

    #[test]
    fn test_validate_timeout() {
        let mut config = Config::default();
        config.llm.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_provider() {
        let mut config = Config::default();
        config.llm.provider = "ollama".to_string();
        assert!(config.validate().is_ok());

        config.llm.provider = "claude-code".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("claude-code"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str("[llm]\nenabled = true\n").unwrap();
        assert!(config.llm.enabled);
        assert_eq!(config.llm.max_retries, 2);
        assert_eq!(config.project.license, "MIT");
    }
}
