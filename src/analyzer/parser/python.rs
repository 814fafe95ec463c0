//! Python Front-End (tree-based)
//!
//! Parses with tree-sitter-python and walks the tree once. Each function
//! definition is attributed as a method when its statement is a direct child
//! of the body on top of the enclosing-class stack, otherwise as a free
//! function. Nothing is attributed by name, so a free function sharing a
//! method's name stays a free function.

use std::borrow::Cow;

use tree_sitter::Node;

use super::{Language, Parser, create_ts_parser, first_syntax_error, get_node_text, node_line};
use crate::types::{
    CanonicalAnalysis, ClassInfo, EndpointInfo, FunctionInfo, HttpMethod, MethodInfo, Result,
    WeaveError,
};

/// Parameter names treated as the implicit receiver
const RECEIVER_NAMES: &[&str] = &["self", "cls"];

pub struct PythonParser;

impl PythonParser {
    pub fn new() -> Result<Self> {
        // Validate that the grammar loads
        let _ = create_ts_parser(tree_sitter_python::LANGUAGE, "Python")?;
        Ok(Self)
    }
}

impl Parser for PythonParser {
    fn parse(&self, path: &str, content: &str) -> Result<CanonicalAnalysis> {
        let mut parser = create_ts_parser(tree_sitter_python::LANGUAGE, "Python")?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| WeaveError::parse(path, "Failed to parse Python file"))?;
        let root = tree.root_node();

        if let Some(error) = first_syntax_error(root) {
            let pos = error.start_position();
            return Err(WeaveError::parse(
                path,
                format!(
                    "invalid syntax at line {}, column {}",
                    pos.row + 1,
                    pos.column + 1
                ),
            ));
        }

        let mut visitor = Visitor::new(content.as_bytes());
        visitor.analysis.module_doc = block_docstring(root, content.as_bytes());
        visitor.visit_children(root);

        let mut analysis = visitor.analysis;
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
        Language::Python
    }
}

// =============================================================================
// Visitor
// =============================================================================

/// An open class whose body is being walked
struct ClassFrame {
    index: usize,
    body_id: usize,
}

struct Visitor<'a> {
    src: &'a [u8],
    analysis: CanonicalAnalysis,
    class_stack: Vec<ClassFrame>,
}

impl<'a> Visitor<'a> {
    fn new(src: &'a [u8]) -> Self {
        Self {
            src,
            analysis: CanonicalAnalysis::empty(Language::Python),
            class_stack: Vec::new(),
        }
    }

    fn text(&self, node: Node) -> &'a str {
        get_node_text(node, self.src)
    }

    /// Class frame whose body is `parent_id`, if the parent is a class body
    fn owning_class(&self, parent_id: usize) -> Option<usize> {
        self.class_stack
            .last()
            .filter(|frame| frame.body_id == parent_id)
            .map(|frame| frame.index)
    }

    fn visit_children(&mut self, node: Node) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit(child, node.id());
        }
    }

    fn visit(&mut self, node: Node, parent_id: usize) {
        match node.kind() {
            "class_definition" => self.visit_class(node),
            "function_definition" => self.visit_function(node, Vec::new(), parent_id),
            "decorated_definition" => self.visit_decorated(node, parent_id),
            "import_statement" => self.collect_import(node),
            "import_from_statement" | "future_import_statement" => self.collect_from_import(node),
            "expression_statement" => {
                if let Some(index) = self.owning_class(parent_id) {
                    self.collect_property(node, index);
                }
                self.visit_children(node);
            }
            _ => self.visit_children(node),
        }
    }

    fn visit_decorated(&mut self, node: Node, parent_id: usize) {
        let mut cursor = node.walk();
        let decorators: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|c| c.kind() == "decorator")
            .collect();

        let Some(definition) = node.child_by_field_name("definition") else {
            return;
        };

        match definition.kind() {
            // The decorated_definition is the statement the class body owns
            "function_definition" => self.visit_function(definition, decorators, parent_id),
            _ => self.visit(definition, parent_id),
        }
    }

    fn visit_class(&mut self, node: Node) {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };

        if name.is_empty() {
            self.visit_children(body);
            return;
        }

        let mut class = ClassInfo::new(name);
        class.doc = block_docstring(body, self.src);
        class.line = Some(node_line(node));
        class.superclass = node
            .child_by_field_name("superclasses")
            .and_then(|args| first_base_class(args, self.src));

        let index = self.analysis.classes.len();
        self.analysis.classes.push(class);

        self.class_stack.push(ClassFrame {
            index,
            body_id: body.id(),
        });
        self.visit_children(body);
        self.class_stack.pop();
    }

    fn visit_function(&mut self, node: Node, decorators: Vec<Node>, parent_id: usize) {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let body = node.child_by_field_name("body");

        if !name.is_empty() {
            let doc = body
                .map(|b| block_docstring(b, self.src))
                .unwrap_or_default();
            let params = node
                .child_by_field_name("parameters")
                .map(|p| parameter_names(p, self.src))
                .unwrap_or_default();
            let is_async = node.child(0).is_some_and(|c| c.kind() == "async");
            let line = Some(node_line(node));
            let decorator_names: Vec<String> = decorators
                .iter()
                .filter_map(|d| decorator_name(*d, self.src))
                .collect();

            for decorator in &decorators {
                self.analysis
                    .endpoints
                    .extend(route_endpoints(*decorator, self.src, &doc, &name));
            }

            match self.owning_class(parent_id) {
                Some(index) => {
                    let params = strip_receiver(params);
                    let mut method =
                        MethodInfo::new(name, params, doc, Language::Python.constructor_name());
                    method.is_async = is_async;
                    method.line = line;
                    method.decorators = decorator_names;
                    self.analysis.classes[index].methods.push(method);
                }
                None => {
                    let mut function = FunctionInfo::new(name, params, doc);
                    function.is_async = is_async;
                    function.line = line;
                    function.decorators = decorator_names;
                    self.analysis.functions.push(function);
                }
            }
        }

        if let Some(body) = body {
            self.visit_children(body);
        }
    }

    fn collect_import(&mut self, node: Node) {
        let mut cursor = node.walk();
        let names: Vec<String> = node
            .children_by_field_name("name", &mut cursor)
            .filter_map(|n| imported_name(n, self.src))
            .collect();
        self.analysis.imports.extend(names);
    }

    fn collect_from_import(&mut self, node: Node) {
        let module = match node.kind() {
            "future_import_statement" => "__future__".to_string(),
            _ => node
                .child_by_field_name("module_name")
                .map(|m| self.text(m).to_string())
                .unwrap_or_default(),
        };

        let mut cursor = node.walk();
        let mut names: Vec<String> = node
            .children_by_field_name("name", &mut cursor)
            .filter_map(|n| imported_name(n, self.src))
            .collect();

        let mut cursor = node.walk();
        if node
            .named_children(&mut cursor)
            .any(|c| c.kind() == "wildcard_import")
        {
            names.push("*".to_string());
        }

        for name in names {
            self.analysis
                .imports
                .insert(format!("from {} import {}", module, name));
        }
    }

    fn collect_property(&mut self, statement: Node, class_index: usize) {
        let Some(assignment) = statement.named_child(0) else {
            return;
        };
        if assignment.kind() != "assignment" || assignment.child_by_field_name("type").is_some() {
            return;
        }
        let Some(left) = assignment.child_by_field_name("left") else {
            return;
        };
        let Some(right) = assignment.child_by_field_name("right") else {
            return;
        };
        // `a = b = 1` has more than one target
        if left.kind() != "identifier" || right.kind() == "assignment" {
            return;
        }

        let name = self.text(left);
        if !name.is_empty() {
            self.analysis.classes[class_index].add_property(name);
        }
    }
}

// =============================================================================
// Node Helpers
// =============================================================================

/// Docstring of a module or block: its first statement when that is a bare string
fn block_docstring(block: Node, src: &[u8]) -> String {
    let mut cursor = block.walk();
    let Some(first) = block
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment")
    else {
        return String::new();
    };

    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return String::new();
    }
    match first.named_child(0) {
        Some(string) if string.kind() == "string" => {
            let literal = get_node_text(string, src);
            string_literal_value(literal)
                .map(|value| clean_docstring(&value))
                .unwrap_or_default()
        }
        _ => String::new(),
    }
}

/// Contents of a plain string literal; `None` for f-strings and bytes.
///
/// Backslash escapes are decoded unless the literal is raw.
fn string_literal_value(literal: &str) -> Option<Cow<'_, str>> {
    let prefix_len = literal
        .find(|c: char| c == '"' || c == '\'')
        .unwrap_or(literal.len());
    let prefix = literal[..prefix_len].to_ascii_lowercase();
    if prefix.contains('f') || prefix.contains('b') {
        return None;
    }
    let raw = prefix.contains('r');

    let quoted = &literal[prefix_len..];
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if quoted.len() >= 2 * quote.len() && quoted.starts_with(quote) && quoted.ends_with(quote)
        {
            let body = &quoted[quote.len()..quoted.len() - quote.len()];
            return Some(if raw { Cow::Borrowed(body) } else { unescape(body) });
        }
    }
    None
}

/// Decode the common single-character escapes and line continuations
fn unescape(body: &str) -> Cow<'_, str> {
    if !body.contains('\\') {
        return Cow::Borrowed(body);
    }

    let mut decoded = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            decoded.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => decoded.push('\n'),
            Some('t') => decoded.push('\t'),
            Some('r') => decoded.push('\r'),
            Some('\\') => decoded.push('\\'),
            Some('\'') => decoded.push('\''),
            Some('"') => decoded.push('"'),
            Some('\n') => {}
            // Unknown escapes stay verbatim
            Some(other) => {
                decoded.push('\\');
                decoded.push(other);
            }
            None => decoded.push('\\'),
        }
    }
    Cow::Owned(decoded)
}

/// Normalize docstring indentation: trim the first line, remove the common
/// indent of the rest, drop leading and trailing blank lines.
pub fn clean_docstring(raw: &str) -> String {
    let expanded = raw.replace('\t', "        ");
    let lines: Vec<&str> = expanded.lines().collect();
    if lines.is_empty() {
        return String::new();
    }

    let margin = lines[1..]
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<&str> = Vec::with_capacity(lines.len());
    cleaned.push(lines[0].trim());
    for line in &lines[1..] {
        if line.trim().is_empty() {
            cleaned.push("");
        } else {
            cleaned.push(line.get(margin..).unwrap_or(line.trim_start()).trim_end());
        }
    }

    while cleaned.last().is_some_and(|l| l.is_empty()) {
        cleaned.pop();
    }
    let first_content = cleaned.iter().position(|l| !l.is_empty()).unwrap_or(0);
    cleaned[first_content..].join("\n")
}

/// Plain parameter names, skipping `*args`, `**kwargs` and separators
fn parameter_names(params: Node, src: &[u8]) -> Vec<String> {
    let mut cursor = params.walk();
    params
        .named_children(&mut cursor)
        .filter_map(|param| {
            let ident = match param.kind() {
                "identifier" => Some(param),
                "typed_parameter" => param.named_child(0).filter(|n| n.kind() == "identifier"),
                "default_parameter" | "typed_default_parameter" => param
                    .child_by_field_name("name")
                    .filter(|n| n.kind() == "identifier"),
                _ => None,
            }?;
            let name = get_node_text(ident, src);
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

/// Drop the leading receiver parameter of a method
fn strip_receiver(mut params: Vec<String>) -> Vec<String> {
    if params
        .first()
        .is_some_and(|p| RECEIVER_NAMES.contains(&p.as_str()))
    {
        params.remove(0);
    }
    params
}

/// `dotted.name` of an import target, unaliased
fn imported_name(node: Node, src: &[u8]) -> Option<String> {
    let target = match node.kind() {
        "aliased_import" => node.child_by_field_name("name")?,
        _ => node,
    };
    let text = get_node_text(target, src);
    (!text.is_empty()).then(|| text.to_string())
}

fn first_base_class(arguments: Node, src: &[u8]) -> Option<String> {
    let mut cursor = arguments.walk();
    arguments
        .named_children(&mut cursor)
        .find(|a| matches!(a.kind(), "identifier" | "attribute"))
        .map(|a| get_node_text(a, src).to_string())
}

/// Expression of a decorator (the node after `@`)
fn decorator_expression(decorator: Node) -> Option<Node> {
    let mut cursor = decorator.walk();
    decorator
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment")
}

/// Decorator name: the callee for call decorators, else the whole expression
fn decorator_name(decorator: Node, src: &[u8]) -> Option<String> {
    let expr = decorator_expression(decorator)?;
    let target = match expr.kind() {
        "call" => expr.child_by_field_name("function")?,
        _ => expr,
    };
    let text = get_node_text(target, src);
    (!text.is_empty()).then(|| text.to_string())
}

/// Endpoints registered by `receiver.verb("/path")` or
/// `receiver.route("/path", methods=[...])` decorators
fn route_endpoints(decorator: Node, src: &[u8], doc: &str, handler: &str) -> Vec<EndpointInfo> {
    let Some(call) = decorator_expression(decorator).filter(|e| e.kind() == "call") else {
        return Vec::new();
    };
    let Some(function) = call
        .child_by_field_name("function")
        .filter(|f| f.kind() == "attribute")
    else {
        return Vec::new();
    };
    let Some(attribute) = function.child_by_field_name("attribute") else {
        return Vec::new();
    };
    let Some(arguments) = call.child_by_field_name("arguments") else {
        return Vec::new();
    };

    let mut cursor = arguments.walk();
    let args: Vec<Node> = arguments.named_children(&mut cursor).collect();

    let Some(path) = args
        .iter()
        .find(|a| a.kind() == "string")
        .and_then(|s| string_literal_value(get_node_text(*s, src)))
        .filter(|p| p.starts_with('/'))
    else {
        return Vec::new();
    };

    let verb = get_node_text(attribute, src);
    let methods = if verb == "route" {
        route_methods(&args, src)
    } else {
        match verb.parse::<HttpMethod>() {
            Ok(method) => vec![method],
            Err(_) => return Vec::new(),
        }
    };

    methods
        .into_iter()
        .map(|method| {
            let mut endpoint = EndpointInfo::new(method, path.as_ref(), doc);
            endpoint.handler = Some(handler.to_string());
            endpoint
        })
        .collect()
}

/// HTTP verbs from a `methods=[...]` keyword argument; GET when absent
fn route_methods(args: &[Node], src: &[u8]) -> Vec<HttpMethod> {
    let listed = args
        .iter()
        .filter(|a| a.kind() == "keyword_argument")
        .find(|a| {
            a.child_by_field_name("name")
                .is_some_and(|n| get_node_text(n, src) == "methods")
        })
        .and_then(|a| a.child_by_field_name("value"))
        .map(|value| {
            let mut cursor = value.walk();
            value
                .named_children(&mut cursor)
                .filter(|v| v.kind() == "string")
                .filter_map(|v| string_literal_value(get_node_text(v, src)))
                .filter_map(|m| m.parse::<HttpMethod>().ok())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    if listed.is_empty() {
        vec![HttpMethod::Get]
    } else {
        listed
    }
}
