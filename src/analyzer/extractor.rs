//! Extractor Facade
//!
//! Dispatches a file to its front-end purely on the extension, before the
//! file is read.

use std::path::Path;

use super::parser::{Language, create_parser};
use crate::types::{CanonicalAnalysis, Result, Summary, WeaveError};

/// Entry point for turning a source file into a [`CanonicalAnalysis`]
pub struct CodeAnalyzer;

impl CodeAnalyzer {
    /// Read and analyze a `.py` or `.js` file.
    ///
    /// Fails with `UnsupportedFileType` for any other extension without
    /// touching the file system.
    pub fn analyze(path: impl AsRef<Path>) -> Result<CanonicalAnalysis> {
        let path = path.as_ref();
        let path_text = path.display().to_string();

        let language = Language::from_path(path).ok_or_else(|| WeaveError::UnsupportedFileType {
            path: path_text.clone(),
            extension: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_string(),
        })?;

        let content = std::fs::read_to_string(path)?;
        tracing::info!("Analyzing {} as {}", path_text, language);

        Self::analyze_source(language, &path_text, &content)
    }

    /// Analyze in-memory source text; `path` is used for error context only
    pub fn analyze_source(
        language: Language,
        path: &str,
        content: &str,
    ) -> Result<CanonicalAnalysis> {
        let parser = create_parser(language)?;
        parser.parse(path, content)
    }

    /// Count projection of a record
    pub fn summarize(analysis: &CanonicalAnalysis) -> Summary {
        Summary::from(analysis)
    }
}
