//! Canonical Analysis Record
//!
//! The language-agnostic structural summary of one source file. Both
//! front-ends produce exactly this shape, and the synthesizer consumes it
//! read-only.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::analyzer::parser::Language;

/// Matches a "Returns:" / "Return:" line inside doc text
static RETURNS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Returns?:\s*([^\n]+)").expect("returns pattern is a valid regex")
});

/// Matches `{param}` and `:param` path segments
static PATH_PARAM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(\w+)\}|/:(\w+)").expect("path param pattern is a valid regex")
});

// =============================================================================
// Canonical Record
// =============================================================================

/// Structural facts extracted from one source file.
///
/// Constructed once per extraction call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalAnalysis {
    /// Language the record was extracted from
    pub language: Language,
    /// Free functions, in source order (never includes methods)
    pub functions: Vec<FunctionInfo>,
    /// Classes, in source order
    pub classes: Vec<ClassInfo>,
    /// Distinct import identifiers / module specifiers
    pub imports: BTreeSet<String>,
    /// Recognized HTTP endpoints, in source order
    pub endpoints: Vec<EndpointInfo>,
    /// Top-of-file documentation (empty when absent)
    pub module_doc: String,
    /// Full source text, kept for summary heuristics
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw_text: String,
}

impl CanonicalAnalysis {
    /// Empty record for the given language
    pub fn empty(language: Language) -> Self {
        Self {
            language,
            functions: Vec::new(),
            classes: Vec::new(),
            imports: BTreeSet::new(),
            endpoints: Vec::new(),
            module_doc: String::new(),
            raw_text: String::new(),
        }
    }

    pub fn find_class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn find_function(&self, name: &str) -> Option<&FunctionInfo> {
        self.functions.iter().find(|f| f.name == name)
    }
}

/// A free function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    pub params: Vec<String>,
    /// Attached documentation; empty string when none
    pub doc: String,
    pub is_async: bool,
    /// 1-based source line (tree-based front-end only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<String>,
}

impl FunctionInfo {
    pub fn new(name: impl Into<String>, params: Vec<String>, doc: impl Into<String>) -> Self {
        let doc = doc.into();
        Self {
            name: name.into(),
            params,
            return_description: return_description(&doc),
            doc,
            is_async: false,
            line: None,
            decorators: Vec::new(),
        }
    }

    /// `name(a, b)`
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.params.join(", "))
    }
}

/// A class and its members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub doc: String,
    pub methods: Vec<MethodInfo>,
    /// Field names assigned at class-body scope, first-seen order, no duplicates
    pub properties: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: String::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            superclass: None,
            line: None,
        }
    }

    /// Record a property unless already present
    pub fn add_property(&mut self, name: &str) {
        if !self.properties.iter().any(|p| p == name) {
            self.properties.push(name.to_string());
        }
    }
}

/// A method of a class; the receiver parameter is never listed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    pub params: Vec<String>,
    pub doc: String,
    pub is_private: bool,
    pub is_constructor: bool,
    pub is_async: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<String>,
}

impl MethodInfo {
    pub fn new(
        name: impl Into<String>,
        params: Vec<String>,
        doc: impl Into<String>,
        constructor_name: &str,
    ) -> Self {
        let name = name.into();
        let doc = doc.into();
        Self {
            is_private: name.starts_with('_'),
            is_constructor: name == constructor_name,
            return_description: return_description(&doc),
            name,
            params,
            doc,
            is_async: false,
            line: None,
            decorators: Vec::new(),
        }
    }

    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.params.join(", "))
    }
}

// =============================================================================
// Endpoints
// =============================================================================

/// HTTP verbs recognized in endpoint registrations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "post" => Ok(HttpMethod::Post),
            "put" => Ok(HttpMethod::Put),
            "delete" => Ok(HttpMethod::Delete),
            "patch" => Ok(HttpMethod::Patch),
            _ => Err(format!(
                "Unknown HTTP method: {}. Valid values: get, post, put, delete, patch",
                s
            )),
        }
    }
}

/// An HTTP endpoint registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointInfo {
    pub method: HttpMethod,
    /// Path template, bracketed parameters kept verbatim
    pub path: String,
    pub description: String,
    /// Handler function name when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
}

impl EndpointInfo {
    pub fn new(method: HttpMethod, path: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            description: description.into(),
            handler: None,
        }
    }

    /// Names of `{param}` and `:param` segments, in path order
    pub fn path_params(&self) -> Vec<String> {
        PATH_PARAM_PATTERN
            .captures_iter(&self.path)
            .filter_map(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

// =============================================================================
// Summary
// =============================================================================

/// Count projection of a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub num_functions: usize,
    pub num_classes: usize,
    pub num_imports: usize,
    pub num_endpoints: usize,
    pub has_api_endpoints: bool,
}

impl From<&CanonicalAnalysis> for Summary {
    fn from(analysis: &CanonicalAnalysis) -> Self {
        Self {
            num_functions: analysis.functions.len(),
            num_classes: analysis.classes.len(),
            num_imports: analysis.imports.len(),
            num_endpoints: analysis.endpoints.len(),
            has_api_endpoints: !analysis.endpoints.is_empty(),
        }
    }
}

/// Text following the first "Returns:" line of a docstring, if any
pub fn return_description(doc: &str) -> Option<String> {
    if doc.is_empty() {
        return None;
    }
    RETURNS_PATTERN
        .captures(doc)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_description_multiline() {
        let doc = "Create a user.\n\nReturns:\n    Created user with ID\n";
        assert_eq!(
            return_description(doc).as_deref(),
            Some("Created user with ID")
        );
    }

    #[test]
    fn test_return_description_case_insensitive() {
        assert_eq!(
            return_description("return: the sum").as_deref(),
            Some("the sum")
        );
        assert_eq!(return_description("Adds two numbers."), None);
        assert_eq!(return_description(""), None);
    }

    #[test]
    fn test_path_params() {
        let ep = EndpointInfo::new(HttpMethod::Get, "/users/{user_id}/posts/{post_id}", "");
        assert_eq!(ep.path_params(), vec!["user_id", "post_id"]);

        let express = EndpointInfo::new(HttpMethod::Get, "/api/users/:id", "");
        assert_eq!(express.path_params(), vec!["id"]);

        let plain = EndpointInfo::new(HttpMethod::Post, "/api/users/", "");
        assert!(plain.path_params().is_empty());
    }

    #[test]
    fn test_http_method_serializes_uppercase() {
        let json = serde_json::to_string(&HttpMethod::Delete).unwrap();
        assert_eq!(json, "\"DELETE\"");
        assert_eq!("PATCH".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert!("head".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_method_info_flags() {
        let ctor = MethodInfo::new("__init__", vec!["name".into()], "", "__init__");
        assert!(ctor.is_constructor);
        assert!(ctor.is_private);

        let js_ctor = MethodInfo::new("constructor", vec![], "", "constructor");
        assert!(js_ctor.is_constructor);
        assert!(!js_ctor.is_private);
    }

    #[test]
    fn test_summary_projection() {
        let mut analysis = CanonicalAnalysis::empty(Language::JavaScript);
        analysis.imports.insert("express".into());
        analysis.imports.insert("express".into());
        analysis
            .endpoints
            .push(EndpointInfo::new(HttpMethod::Get, "/health", ""));

        let summary = Summary::from(&analysis);
        assert_eq!(summary.num_imports, 1);
        assert_eq!(summary.num_endpoints, 1);
        assert!(summary.has_api_endpoints);
        assert_eq!(summary.num_functions, 0);
    }

    #[test]
    fn test_add_property_dedupes() {
        let mut class = ClassInfo::new("User");
        class.add_property("name");
        class.add_property("email");
        class.add_property("name");
        assert_eq!(class.properties, vec!["name", "email"]);
    }
}
