//! Text Scanning Primitives
//!
//! Building blocks for the pattern-based front-end:
//!
//! - [`find_matching_brace`]: depth-counting delimiter matcher
//! - [`preceding_doc_comment`]: nearest contiguous `/** ... */` block before an offset
//! - [`RuleSet`]: ordered recognizer rules over byte spans with span exclusion
//!
//! None of these understand string or comment literals. An unbalanced brace
//! inside a string shifts the computed extent; that is an accepted accuracy
//! limitation of the pattern-based approach.

use std::ops::Range;

use regex::{Captures, Regex};

/// Block comment open marker for structured docs
const DOC_OPEN: &str = "/**";
/// Block comment close marker
const DOC_CLOSE: &str = "*/";

/// Keywords allowed between a doc comment and the construct it documents
const DOC_GAP_MODIFIERS: &[&str] = &["export", "default", "async", "static"];

// =============================================================================
// Brace Matcher
// =============================================================================

/// Offset of the delimiter closing the one at `open`.
///
/// Counts depth over the identical `open_ch`/`close_ch` pair starting after
/// `open`. Returns `text.len()` when depth never returns to zero.
pub fn find_matching_delimiter(text: &str, open: usize, open_ch: u8, close_ch: u8) -> usize {
    let bytes = text.as_bytes();
    let mut depth = 1usize;

    for (i, &b) in bytes.iter().enumerate().skip(open + 1) {
        if b == open_ch {
            depth += 1;
        } else if b == close_ch {
            depth -= 1;
            if depth == 0 {
                return i;
            }
        }
    }

    text.len()
}

/// [`find_matching_delimiter`] for `{` / `}`
#[inline]
pub fn find_matching_brace(text: &str, open: usize) -> usize {
    find_matching_delimiter(text, open, b'{', b'}')
}

/// Brace depth at `offset`, counted naively from the start of `text`
pub fn brace_depth_at(text: &str, offset: usize) -> i64 {
    text.as_bytes()[..offset.min(text.len())]
        .iter()
        .fold(0i64, |depth, &b| match b {
            b'{' => depth + 1,
            b'}' => depth - 1,
            _ => depth,
        })
}

// =============================================================================
// Doc-Comment Locator
// =============================================================================

/// Cleaned text of the `/** ... */` block immediately preceding `offset`.
///
/// Returns an empty string when there is no block, when the block is
/// unterminated before `offset`, or when anything other than whitespace and
/// modifier keywords separates the block from the construct.
pub fn preceding_doc_comment(text: &str, offset: usize) -> String {
    let offset = offset.min(text.len());
    let Some(head) = text.get(..offset) else {
        return String::new();
    };

    let Some(start) = head.rfind(DOC_OPEN) else {
        return String::new();
    };
    let Some(close_rel) = text[start + DOC_OPEN.len()..].find(DOC_CLOSE) else {
        return String::new();
    };
    let close = start + DOC_OPEN.len() + close_rel;
    let block_end = close + DOC_CLOSE.len();

    if block_end > offset {
        return String::new();
    }

    let gap = &text[block_end..offset];
    if !gap
        .split_whitespace()
        .all(|token| DOC_GAP_MODIFIERS.contains(&token))
    {
        return String::new();
    }

    clean_doc_block(&text[start + DOC_OPEN.len()..close])
}

/// Strip per-line `*` markers and surrounding whitespace from a comment body
pub fn clean_doc_block(body: &str) -> String {
    body.lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

// =============================================================================
// Ordered Recognizer Rules
// =============================================================================

/// A named recognition pattern
#[derive(Debug)]
pub struct Rule {
    pub name: &'static str,
    pattern: Regex,
}

impl Rule {
    /// Build a rule from a pattern that is known to compile
    pub fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).unwrap_or_else(|e| {
                panic!("recognizer rule '{}' has an invalid pattern: {}", name, e)
            }),
        }
    }
}

/// One accepted match of a rule
#[derive(Debug)]
pub struct RuleMatch<'t> {
    pub rule: &'static str,
    pub span: Range<usize>,
    pub captures: Captures<'t>,
}

impl RuleMatch<'_> {
    /// Text of capture group `i`, empty when the group did not participate
    pub fn group(&self, i: usize) -> &str {
        self.captures.get(i).map(|m| m.as_str()).unwrap_or("")
    }

    /// Whole matched text
    pub fn text(&self) -> &str {
        self.group(0)
    }
}

/// Spans already attributed to some rule
#[derive(Debug, Default)]
pub struct SpanSet {
    spans: Vec<Range<usize>>,
}

impl SpanSet {
    pub fn overlaps(&self, span: &Range<usize>) -> bool {
        self.spans
            .iter()
            .any(|s| span.start < s.end && s.start < span.end)
    }

    pub fn insert(&mut self, span: Range<usize>) {
        self.spans.push(span);
    }
}

/// Ordered list of recognizer rules.
///
/// Candidates from every rule are ordered by start offset, then by rule
/// declaration order. A candidate overlapping an accepted span is dropped,
/// so each span is attributed to at most one rule.
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn scan<'t>(&self, text: &'t str) -> Vec<RuleMatch<'t>> {
        let mut candidates: Vec<(usize, RuleMatch<'t>)> = Vec::new();
        for (index, rule) in self.rules.iter().enumerate() {
            for captures in rule.pattern.captures_iter(text) {
                let Some(whole) = captures.get(0) else {
                    continue;
                };
                candidates.push((
                    index,
                    RuleMatch {
                        rule: rule.name,
                        span: whole.range(),
                        captures,
                    },
                ));
            }
        }

        candidates.sort_by_key(|(index, m)| (m.span.start, *index));

        let mut consumed = SpanSet::default();
        let mut accepted = Vec::new();
        for (_, candidate) in candidates {
            if consumed.overlaps(&candidate.span) {
                continue;
            }
            consumed.insert(candidate.span.clone());
            accepted.push(candidate);
        }

        accepted
    }
}

/// Split a parameter-list text on commas; empty text yields no parameters
pub fn split_params(params: &str) -> Vec<String> {
    params
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_matching_brace_skips_nested_pair() {
        let text = "{{}}";
        assert_eq!(find_matching_brace(text, 0), 3);

        let class = "class A { m() { return 1; } }";
        let open = class.find('{').unwrap();
        assert_eq!(find_matching_brace(class, open), class.len() - 1);
    }

    #[test]
    fn test_matching_brace_unbalanced_returns_len() {
        let text = "{ { }";
        assert_eq!(find_matching_brace(text, 0), text.len());
    }

    #[test]
    fn test_matching_brace_ignores_string_contents() {
        // Documented limitation: braces in strings are counted
        let text = "{ let s = \"}\"; }";
        assert_eq!(find_matching_brace(text, 0), 11);
    }

    #[test]
    fn test_brace_depth_at() {
        let text = "a { b { c } d }";
        assert_eq!(brace_depth_at(text, 0), 0);
        assert_eq!(brace_depth_at(text, text.find('b').unwrap()), 1);
        assert_eq!(brace_depth_at(text, text.find('c').unwrap()), 2);
        assert_eq!(brace_depth_at(text, text.find('d').unwrap()), 1);
    }

    #[test]
    fn test_doc_comment_multiline() {
        let text = "/**\n * Adds numbers.\n * @param a first\n */\nfunction add(a, b) {}";
        let offset = text.find("function").unwrap();
        assert_eq!(
            preceding_doc_comment(text, offset),
            "Adds numbers.\n@param a first"
        );
    }

    #[test]
    fn test_doc_comment_single_line() {
        let text = "/** Health check */\napp.get('/health', h);";
        let offset = text.find("app.get").unwrap();
        assert_eq!(preceding_doc_comment(text, offset), "Health check");
    }

    #[test]
    fn test_doc_comment_absent() {
        let text = "// plain comment\nfunction f() {}";
        assert_eq!(preceding_doc_comment(text, text.find("function").unwrap()), "");
    }

    #[test]
    fn test_doc_comment_not_contiguous() {
        let text = "/** Doc for a */\nfunction a() {}\nfunction b() {}";
        let offset = text.rfind("function").unwrap();
        assert_eq!(preceding_doc_comment(text, offset), "");
    }

    #[test]
    fn test_doc_comment_allows_modifiers() {
        let text = "/** Exported */\nexport default async function main() {}";
        let offset = text.find("function").unwrap();
        assert_eq!(preceding_doc_comment(text, offset), "Exported");
    }

    #[test]
    fn test_doc_comment_unterminated() {
        let text = "/** never closed\nfunction f() {}";
        assert_eq!(preceding_doc_comment(text, text.find("function").unwrap()), "");
    }

    #[test]
    fn test_split_params() {
        assert!(split_params("").is_empty());
        assert!(split_params("   ").is_empty());
        assert_eq!(split_params("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(split_params("req, res,"), vec!["req", "res"]);
    }

    #[test]
    fn test_rule_set_first_position_wins() {
        let rules = RuleSet::new(vec![
            Rule::new("named", r"function\s+(\w+)"),
            Rule::new("async", r"async\s+function\s+(\w+)"),
        ]);
        let text = "async function load() {}\nfunction save() {}";
        let matches = rules.scan(text);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].rule, "async");
        assert_eq!(matches[0].group(1), "load");
        assert_eq!(matches[1].rule, "named");
        assert_eq!(matches[1].group(1), "save");
    }

    #[test]
    fn test_rule_set_tie_broken_by_declaration_order() {
        let rules = RuleSet::new(vec![
            Rule::new("first", r"foo(\w*)"),
            Rule::new("second", r"foo\w*"),
        ]);
        let matches = rules.scan("foobar");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].rule, "first");
    }

    proptest! {
        #[test]
        fn prop_matching_brace_lands_on_close(depth in 0usize..20, filler in "[a-z ]{0,8}") {
            let text = format!("{{{}{}{}}}", "{".repeat(depth), filler, "}".repeat(depth));
            let close = find_matching_brace(&text, 0);
            prop_assert_eq!(close, text.len() - 1);
            prop_assert_eq!(&text[close..=close], "}");
        }

        #[test]
        fn prop_clean_doc_never_keeps_delimiters(body in "[a-zA-Z .,\n*]{0,60}") {
            let text = format!("/**{}*/\nfunction f() {{}}", body.replace("*/", ""));
            let offset = text.find("function").unwrap();
            let doc = preceding_doc_comment(&text, offset);
            prop_assert!(!doc.contains("/**"));
            prop_assert!(!doc.contains("*/"));
            prop_assert_eq!(doc.trim(), doc.as_str());
        }
    }
}
