//! Language Detection Module
//!
//! **Single source of truth** for mapping file extensions to front-ends and
//! for the per-language facts the synthesizer needs (install steps,
//! code-block tag, constructor name).
//!
//! ```rust,ignore
//! use weavedoc::analyzer::parser::Language;
//!
//! assert_eq!(Language::from_path("app.py"), Some(Language::Python));
//! assert_eq!(Language::from_path("notes.txt"), None);
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Language metadata entry
struct LanguageMeta {
    display_name: &'static str,
    highlight_str: &'static str,
    extensions: &'static [&'static str],
    aliases: &'static [&'static str],
    constructor_name: &'static str,
    prerequisite: &'static str,
    install_command: &'static str,
    run_command: &'static str,
}

macro_rules! lang_meta {
    ($display:literal, $highlight:literal, [$($ext:literal),*], [$($alias:literal),*],
     ctor = $ctor:literal, prereq = $prereq:literal, install = $install:literal, run = $run:literal) => {
        LanguageMeta {
            display_name: $display,
            highlight_str: $highlight,
            extensions: &[$($ext),*],
            aliases: &[$($alias),*],
            constructor_name: $ctor,
            prerequisite: $prereq,
            install_command: $install,
            run_command: $run,
        }
    };
}

/// Source languages with a front-end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Python, Language::JavaScript];

    fn meta(&self) -> LanguageMeta {
        match self {
            Language::Python => lang_meta!(
                "Python", "python", ["py"], ["python", "py"],
                ctor = "__init__",
                prereq = "Python 3.8+",
                install = "pip install -r requirements.txt",
                run = "python main.py"
            ),
            Language::JavaScript => lang_meta!(
                "JavaScript", "javascript", ["js"], ["javascript", "js", "node"],
                ctor = "constructor",
                prereq = "Node.js 14+",
                install = "npm install",
                run = "npm start"
            ),
        }
    }

    /// Detect language from a file extension (without the dot, case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.meta().extensions.contains(&ext.as_str()))
    }

    /// Detect language from a path's extension
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn display_name(&self) -> &'static str {
        self.meta().display_name
    }

    /// Identifier for fenced code blocks
    pub fn highlight_str(&self) -> &'static str {
        self.meta().highlight_str
    }

    /// Method name that marks a constructor
    pub fn constructor_name(&self) -> &'static str {
        self.meta().constructor_name
    }

    pub fn prerequisite(&self) -> &'static str {
        self.meta().prerequisite
    }

    pub fn install_command(&self) -> &'static str {
        self.meta().install_command
    }

    pub fn run_command(&self) -> &'static str {
        self.meta().run_command
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.meta().aliases.contains(&lower.as_str()))
            .ok_or_else(|| format!("Unknown language: {}. Valid values: python, javascript", s))
    }
}
