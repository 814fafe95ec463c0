//! AI Integration Layer
//!
//! Optional LLM enhancement for generated documentation.

pub mod enhancer;
pub mod prompt;
pub mod provider;
pub mod timeout;

pub use enhancer::{ElementKind, Enhancer, LlmEnhancer};
pub use prompt::{PromptBuilder, PromptSection};
pub use provider::{
    ErrorCategory, ErrorClassifier, LlmError, LlmProvider, LlmResponse, OllamaProvider,
    OpenAiProvider, ProviderConfig, ResponseMetadata, ResponseTiming, SharedProvider, TokenUsage,
    create_provider,
};
pub use timeout::with_timeout;
