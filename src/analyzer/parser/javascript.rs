//! JavaScript Front-End (pattern-based)
//!
//! Approximates the canonical record with ordered textual rules. Never fails
//! on malformed input: a rule that matches nothing contributes nothing.

use std::sync::LazyLock;

use regex::Regex;

use super::scan::{
    Rule, RuleSet, brace_depth_at, clean_doc_block, find_matching_brace, preceding_doc_comment,
    split_params,
};
use super::{Language, Parser};
use crate::types::{
    CanonicalAnalysis, ClassInfo, EndpointInfo, FunctionInfo, HttpMethod, MethodInfo, Result,
};

/// Names the method rule must never report; they are control-flow keywords
/// sharing method-definition syntax
const CONTROL_KEYWORDS: &[&str] = &["if", "for", "while", "switch", "catch"];

static CLASS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"class\s+(\w+)(?:\s+extends\s+(\w+))?\s*\{").expect("class pattern is valid")
});

static METHOD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:async\s+)?(\w+)\s*\(\s*([^)]*)\s*\)\s*\{").expect("method pattern is valid")
});

static FIELD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:static[ \t]+)?(#?[A-Za-z_$][\w$]*)[ \t]*(?:=[^=]|;)")
        .expect("field pattern is valid")
});

static IMPORT_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r#"import\s+.*?\s+from\s+['"]([^'"]+)['"]"#).expect("import pattern is valid"),
        Regex::new(r#"require\(['"]([^'"]+)['"]\)"#).expect("require pattern is valid"),
    ]
});

static ENDPOINT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(\w+)\.(get|post|put|delete|patch)\(\s*['"`](/[^'"`]*)['"`]"#)
        .expect("endpoint pattern is valid")
});

static ASYNC_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\basync\b").expect("async token pattern is valid"));

/// Keywords that can precede `name = value` without being a field
const NON_FIELD_WORDS: &[&str] = &["return", "const", "let", "var", "this"];

pub struct JavaScriptParser {
    function_rules: RuleSet,
}

impl JavaScriptParser {
    pub fn new() -> Self {
        Self {
            function_rules: RuleSet::new(vec![
                Rule::new("named", r"function\s+(\w+)\s*\(\s*([^)]*)\s*\)"),
                Rule::new(
                    "arrow",
                    r"const\s+(\w+)\s*=\s*(?:async\s*)?\(\s*([^)]*)\s*\)\s*=>",
                ),
                Rule::new("async", r"async\s+function\s+(\w+)\s*\(\s*([^)]*)\s*\)"),
            ]),
        }
    }

    fn extract_functions(&self, code: &str) -> Vec<FunctionInfo> {
        self.function_rules
            .scan(code)
            .into_iter()
            .map(|m| {
                let doc = preceding_doc_comment(code, m.span.start);
                let mut function = FunctionInfo::new(m.group(1), split_params(m.group(2)), doc);
                function.is_async = ASYNC_TOKEN.is_match(m.text());
                function
            })
            .collect()
    }

    fn extract_classes(&self, code: &str) -> Vec<ClassInfo> {
        CLASS_PATTERN
            .captures_iter(code)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let mut class = ClassInfo::new(&caps[1]);
                class.superclass = caps.get(2).map(|m| m.as_str().to_string());
                class.doc = preceding_doc_comment(code, whole.start());

                let open = whole.end() - 1;
                let close = find_matching_brace(code, open);
                let body_start = whole.end();
                let body = &code[body_start..close];

                class.methods = extract_methods(code, body, body_start);
                for name in extract_fields(body) {
                    class.add_property(name);
                }
                Some(class)
            })
            .collect()
    }
}

impl Default for JavaScriptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for JavaScriptParser {
    fn parse(&self, path: &str, content: &str) -> Result<CanonicalAnalysis> {
        let mut analysis = CanonicalAnalysis::empty(Language::JavaScript);
        analysis.functions = self.extract_functions(content);
        analysis.classes = self.extract_classes(content);
        analysis.imports = extract_imports(content).into_iter().collect();
        analysis.endpoints = extract_endpoints(content);
        analysis.module_doc = leading_module_doc(content);
        analysis.raw_text = content.to_string();

        tracing::debug!(
            "{}: {} functions, {} classes, {} imports, {} endpoints",
            path,
            analysis.functions.len(),
            analysis.classes.len(),
            analysis.imports.len(),
            analysis.endpoints.len()
        );

        Ok(analysis)
    }

    fn language(&self) -> Language {
        Language::JavaScript
    }
}

/// Methods inside a bounded class body; `body_start` is the body's offset in `code`
fn extract_methods(code: &str, body: &str, body_start: usize) -> Vec<MethodInfo> {
    let constructor = Language::JavaScript.constructor_name();

    METHOD_PATTERN
        .captures_iter(body)
        .filter(|caps| !CONTROL_KEYWORDS.contains(&&caps[1]))
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            // `function name(...) {` inside a method body is a nested declaration
            if follows_function_keyword(body, whole.start()) {
                return None;
            }
            let doc = preceding_doc_comment(code, body_start + whole.start());
            let mut method = MethodInfo::new(&caps[1], split_params(&caps[2]), doc, constructor);
            method.is_async = ASYNC_TOKEN.is_match(whole.as_str());
            Some(method)
        })
        .collect()
}

/// Whether the text before `pos` ends with the standalone word `function`
fn follows_function_keyword(text: &str, pos: usize) -> bool {
    let before = text[..pos].trim_end();
    before.strip_suffix("function").is_some_and(|rest| {
        !rest
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
    })
}

/// Field names declared at depth 0 of a class body
fn extract_fields(body: &str) -> Vec<&str> {
    FIELD_PATTERN
        .captures_iter(body)
        .filter_map(|caps| {
            let name = caps.get(1)?;
            if NON_FIELD_WORDS.contains(&name.as_str()) {
                return None;
            }
            (brace_depth_at(body, name.start()) == 0).then_some(name.as_str())
        })
        .collect()
}

fn extract_imports(code: &str) -> Vec<String> {
    IMPORT_PATTERNS
        .iter()
        .flat_map(|pattern| pattern.captures_iter(code))
        .map(|caps| caps[1].to_string())
        .collect()
}

fn extract_endpoints(code: &str) -> Vec<EndpointInfo> {
    ENDPOINT_PATTERN
        .captures_iter(code)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let method = caps[2].parse::<HttpMethod>().ok()?;
            let description = preceding_doc_comment(code, whole.start());
            Some(EndpointInfo::new(method, &caps[3], description))
        })
        .collect()
}

/// A `/** ... */` block opening the file and separated from the next
/// construct by a blank line
fn leading_module_doc(code: &str) -> String {
    let trimmed = code.trim_start();
    let Some(rest) = trimmed.strip_prefix("/**") else {
        return String::new();
    };
    let Some(close) = rest.find("*/") else {
        return String::new();
    };

    let after = &rest[close + 2..];
    let detached = after.trim().is_empty()
        || after
            .trim_start_matches([' ', '\t'])
            .trim_start_matches('\r')
            .strip_prefix('\n')
            .is_some_and(|next| next.trim_start_matches([' ', '\t', '\r']).starts_with('\n'));

    if detached {
        clean_doc_block(&rest[..close])
    } else {
        String::new()
    }
}
