//! weavedoc - Markdown documentation from Python and JavaScript sources
//!
//! Extracts a language-agnostic structural record from a single source file
//! and renders Markdown documents from it.
//!
//! ## Core Features
//!
//! - **Two front-ends**: tree-sitter for Python, pattern scanning for JavaScript
//! - **Canonical record**: functions, classes, imports and HTTP endpoints in source order
//! - **Template documents**: README, API reference, class and function references
//! - **Optional enhancement**: LLM descriptions with fallback to template text
//!
//! ## Quick Start
//!
//! ```ignore
//! use weavedoc::{CodeAnalyzer, DocKind, RenderContext, render};
//!
//! let record = CodeAnalyzer::analyze("app.py")?;
//! let ctx = RenderContext::new("my-service");
//! let readme = render(&DocKind::Readme, &record, &ctx).await;
//! ```
//!
//! ## Modules
//!
//! - [`analyzer`]: Extension dispatch and the two front-ends
//! - [`docs`]: Document synthesis
//! - [`ai`]: Enhancer capability and LLM providers
//! - [`config`]: Layered configuration

pub mod ai;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod constants;
pub mod docs;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{Config, ConfigLoader};

pub use types::{
    CanonicalAnalysis, ClassInfo, EndpointInfo, ErrorCategory, FunctionInfo, HttpMethod,
    MethodInfo, Result, Summary, WeaveError,
};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use analyzer::{CodeAnalyzer, Language};

pub use docs::{ClassDocument, DocKind, DocumentBundle, RenderContext, render, render_bundle};

pub use ai::{ElementKind, Enhancer, LlmEnhancer, LlmProvider, with_timeout};
