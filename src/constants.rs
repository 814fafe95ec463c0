//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Document synthesis constants
pub mod docs {
    /// Maximum classes, functions and endpoints listed in the overview document
    pub const MAX_LISTED_ENTRIES: usize = 5;

    /// Base URL used in fallback curl examples
    pub const EXAMPLE_BASE_URL: &str = "http://localhost:8000";

    /// Default license name
    pub const DEFAULT_LICENSE: &str = "MIT";

    /// Default language for endpoint examples
    pub const DEFAULT_EXAMPLE_LANGUAGE: &str = "bash";

    /// Default output directory for written documents
    pub const DEFAULT_OUTPUT_DIR: &str = "docs";
}

/// Enhancement request constants
pub mod enhancement {
    /// Default maximum retries per request
    pub const DEFAULT_MAX_RETRIES: usize = 2;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 500;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 30;

    /// Backoff multiplier
    pub const BACKOFF_FACTOR: f32 = 2.0;

    /// Characters of source included in the project summary prompt
    pub const CODE_PREVIEW_CHARS: usize = 200;

    /// Imports included in the project summary prompt
    pub const MAX_PROMPT_IMPORTS: usize = 5;
}

/// Network constants
pub mod network {
    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

    /// Default sampling temperature
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    /// Default maximum tokens per completion
    pub const DEFAULT_MAX_TOKENS: usize = 300;
}
