//! Code Analyzer Module
//!
//! Turns one source file into the language-agnostic canonical record:
//! - Tree-based Python front-end
//! - Pattern-based JavaScript front-end
//! - Extension-dispatching facade

pub mod extractor;
pub mod parser;

pub use extractor::CodeAnalyzer;
pub use parser::Language;
