//! Language Front-End Module
//!
//! Two front-ends produce the same [`CanonicalAnalysis`](crate::types::CanonicalAnalysis):
//!
//! - **Python**: tree-sitter grammar, single tree walk
//! - **JavaScript**: ordered regex rules with brace matching
//!
//! ## Parser Factory
//!
//! ```rust,ignore
//! use weavedoc::analyzer::parser::{Language, create_parser};
//!
//! let parser = create_parser(Language::Python)?;
//! let record = parser.parse("app.py", content)?;
//! ```

pub mod javascript;
pub mod language;
pub mod python;
pub mod scan;
pub mod traits;

pub use javascript::JavaScriptParser;
pub use language::Language;
pub use python::PythonParser;
pub use traits::{Parser, create_ts_parser, first_syntax_error, get_node_text, node_line};

use crate::types::Result;

/// Create the front-end for the given language.
pub fn create_parser(language: Language) -> Result<Box<dyn Parser>> {
    match language {
        Language::Python => Ok(Box::new(PythonParser::new()?)),
        Language::JavaScript => Ok(Box::new(JavaScriptParser::new())),
    }
}
