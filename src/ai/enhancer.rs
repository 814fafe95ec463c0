//! Enhancement Capability
//!
//! The optional collaborator the synthesizer consults for free-text
//! elaboration. Every operation may fail; callers substitute their own
//! fallback text.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use tracing::{debug, warn};

use super::prompt::PromptBuilder;
use super::provider::{LlmProvider, ProviderConfig, SharedProvider, create_provider};
use crate::config::LlmConfig;
use crate::constants::enhancement as enh_constants;
use crate::types::{CanonicalAnalysis, EndpointInfo, Result, WeaveError};

/// Kind of construct being elaborated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Function,
    Method,
    Class,
    Endpoint,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Function => "function",
            ElementKind::Method => "method",
            ElementKind::Class => "class",
            ElementKind::Endpoint => "API endpoint",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional text-elaboration service
#[async_trait]
pub trait Enhancer: Send + Sync {
    /// Short description of a construct given its minimal textual signature
    async fn enhance(&self, context: &str, kind: ElementKind) -> Result<String>;

    /// Project overview paragraph
    async fn summarize_project(
        &self,
        record: &CanonicalAnalysis,
        project_name: &str,
    ) -> Result<String>;

    /// Usage example for an endpoint in `target_language`
    async fn example(&self, endpoint: &EndpointInfo, target_language: &str) -> Result<String>;
}

// =============================================================================
// LLM-backed Enhancer
// =============================================================================

/// [`Enhancer`] over a text-completion provider, with bounded retries
pub struct LlmEnhancer {
    provider: SharedProvider,
    max_retries: usize,
    response_language: String,
}

impl LlmEnhancer {
    pub fn new(
        provider: SharedProvider,
        max_retries: usize,
        response_language: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            max_retries,
            response_language: response_language.into(),
        }
    }

    /// Build from the `[llm]` config section.
    ///
    /// Fails with `EnhancementUnavailable` when enhancement is disabled.
    pub fn from_config(llm: &LlmConfig) -> Result<Self> {
        if !llm.enabled {
            return Err(WeaveError::EnhancementUnavailable(
                "LLM enhancement is disabled".to_string(),
            ));
        }
        let provider = create_provider(&ProviderConfig::from(llm))?;
        Ok(Self::new(
            provider,
            llm.max_retries,
            llm.response_language.clone(),
        ))
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(enh_constants::BASE_DELAY_MS))
            .with_max_delay(Duration::from_secs(enh_constants::MAX_DELAY_SECS))
            .with_factor(enh_constants::BACKOFF_FACTOR)
            .with_max_times(self.max_retries)
    }

    /// Complete a prompt, retrying recoverable failures
    async fn ask(&self, system: &str, prompt: &str, operation: &str) -> Result<String> {
        let provider: &dyn LlmProvider = self.provider.as_ref();

        let response = (|| async { provider.complete(system, prompt).await })
            .retry(self.backoff())
            .when(|e: &WeaveError| e.is_recoverable())
            .notify(|e: &WeaveError, delay: Duration| {
                warn!("{} failed, retrying in {:?}: {}", operation, delay, e);
            })
            .await?;

        debug!(
            "{}: {} tokens in {}ms ({}/{})",
            operation,
            response.usage.total(),
            response.timing.total_ms,
            response.metadata.provider,
            response.metadata.model
        );

        Ok(response.content)
    }
}

#[async_trait]
impl Enhancer for LlmEnhancer {
    async fn enhance(&self, context: &str, kind: ElementKind) -> Result<String> {
        let language = &self.response_language;
        let system = format!(
            "You are a technical documentation expert. Provide clear, concise descriptions for code elements in {}.",
            language
        );
        let prompt = PromptBuilder::new()
            .text(&format!(
                "Analyze this {} and provide a professional, concise {} description suitable for documentation (2-3 sentences max):",
                kind, language
            ))
            .text(context)
            .text("Provide ONLY the description, no extra formatting.")
            .build();

        self.ask(&system, &prompt, &format!("enhance {}", kind))
            .await
    }

    async fn summarize_project(
        &self,
        record: &CanonicalAnalysis,
        project_name: &str,
    ) -> Result<String> {
        let imports: Vec<&str> = record
            .imports
            .iter()
            .take(enh_constants::MAX_PROMPT_IMPORTS)
            .map(String::as_str)
            .collect();
        let preview = char_prefix(&record.raw_text, enh_constants::CODE_PREVIEW_CHARS);

        let prompt = PromptBuilder::new()
            .section(
                &format!("Generate a professional project description for: {}", project_name),
                "Based on:",
            )
            .context_item("Technologies", &imports.join(", "))
            .context_item("Functions", &record.functions.len().to_string())
            .context_item("Classes", &record.classes.len().to_string())
            .code(record.language.highlight_str(), preview)
            .text(&format!(
                "Write a 2-3 sentence professional description in {} describing what this project does.",
                self.response_language
            ))
            .build();

        self.ask(
            "You are a technical writer. Create engaging project descriptions.",
            &prompt,
            "summarize project",
        )
        .await
    }

    async fn example(&self, endpoint: &EndpointInfo, target_language: &str) -> Result<String> {
        let prompt = PromptBuilder::new()
            .text(&format!(
                "Generate a {} example for this API endpoint:",
                target_language
            ))
            .context_item("Method", endpoint.method.as_str())
            .context_item("Path", &endpoint.path)
            .context_item("Description", &endpoint.description)
            .text(&format!(
                "Provide a working {} example with sample data.",
                target_language
            ))
            .build();

        self.ask(
            "You are an API documentation expert. Provide practical, working code examples.",
            &prompt,
            "endpoint example",
        )
        .await
    }
}

/// First `max_chars` characters of `text`
fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::LlmResponse;
    use crate::analyzer::parser::Language;
    use crate::types::{ErrorCategory, HttpMethod, LlmError};
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails with `failures` errors, then echoes the prompt
    struct ScriptedProvider {
        failures: usize,
        category: ErrorCategory,
        calls: AtomicUsize,
        last_prompt: Mutex<String>,
    }

    impl ScriptedProvider {
        fn new(failures: usize, category: ErrorCategory) -> Arc<Self> {
            Arc::new(Self {
                failures,
                category,
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(String::new()),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn complete(&self, _system: &str, prompt: &str) -> Result<LlmResponse> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = prompt.to_string();
            if call < self.failures {
                return Err(LlmError::new(self.category, "scripted failure").into());
            }
            Ok(LlmResponse::content_only("A concise description."))
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "test"
        }
    }

    fn enhancer(provider: Arc<ScriptedProvider>, retries: usize) -> LlmEnhancer {
        LlmEnhancer::new(provider, retries, "English")
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let provider = ScriptedProvider::new(2, ErrorCategory::Transient);
        let enhancer = enhancer(provider.clone(), 2);

        let text = enhancer
            .enhance("def add(a, b)", ElementKind::Function)
            .await
            .unwrap();
        assert_eq!(text, "A concise description.");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_auth_failure_not_retried() {
        let provider = ScriptedProvider::new(5, ErrorCategory::Auth);
        let enhancer = enhancer(provider.clone(), 3);

        let err = enhancer
            .enhance("class User", ElementKind::Class)
            .await
            .unwrap_err();
        assert!(matches!(err, WeaveError::Llm(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_bounded() {
        let provider = ScriptedProvider::new(10, ErrorCategory::RateLimit);
        let enhancer = enhancer(provider.clone(), 1);

        assert!(
            enhancer
                .enhance("def f()", ElementKind::Function)
                .await
                .is_err()
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_example_prompt_carries_endpoint() {
        let provider = ScriptedProvider::new(0, ErrorCategory::Unknown);
        let enhancer = enhancer(provider.clone(), 0);
        let endpoint = EndpointInfo::new(HttpMethod::Post, "/users/", "Create a user");

        enhancer.example(&endpoint, "python").await.unwrap();
        let prompt = provider.last_prompt.lock().unwrap().clone();
        assert!(prompt.contains("Generate a python example"));
        assert!(prompt.contains("- Method: POST"));
        assert!(prompt.contains("- Path: /users/"));
    }

    #[tokio::test]
    async fn test_summary_prompt_counts() {
        let provider = ScriptedProvider::new(0, ErrorCategory::Unknown);
        let enhancer = enhancer(provider.clone(), 0);
        let mut record = CanonicalAnalysis::empty(Language::Python);
        record.imports.insert("fastapi".to_string());
        record.raw_text = "x".repeat(1000);

        enhancer.summarize_project(&record, "demo").await.unwrap();
        let prompt = provider.last_prompt.lock().unwrap().clone();
        assert!(prompt.contains("for: demo"));
        assert!(prompt.contains("- Technologies: fastapi"));
        assert!(prompt.contains("- Classes: 0"));
        assert!(!prompt.contains(&"x".repeat(201)));
    }

    #[test]
    fn test_disabled_config_is_unavailable() {
        let llm = LlmConfig::default();
        assert!(matches!(
            LlmEnhancer::from_config(&llm),
            Err(WeaveError::EnhancementUnavailable(_))
        ));
    }

    #[test]
    fn test_char_prefix_respects_boundaries() {
        assert_eq!(char_prefix("héllo", 2), "hé");
        assert_eq!(char_prefix("abc", 10), "abc");
    }
}
