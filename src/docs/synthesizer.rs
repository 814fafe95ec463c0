//! Document Synthesizer
//!
//! Renders Markdown from a [`CanonicalAnalysis`]. Every section is total:
//! empty collections produce a fixed sentence under the heading instead of
//! dropping it. An [`Enhancer`] may add free text; any failure or timeout
//! falls back to the template wording.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use super::technology;
use crate::ai::{ElementKind, Enhancer, with_timeout};
use crate::analyzer::parser::Language;
use crate::constants::{docs, network};
use crate::types::{CanonicalAnalysis, ClassInfo, EndpointInfo, FunctionInfo, MethodInfo, Result};

/// Which document to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocKind {
    Readme,
    Api,
    Class(String),
    Function(String),
    All,
}

/// Inputs shared by every section of one render call
#[derive(Clone)]
pub struct RenderContext<'a> {
    pub project_name: String,
    pub license: String,
    pub example_language: String,
    pub enhancer: Option<&'a dyn Enhancer>,
    /// Upper bound for each enhancement request
    pub timeout: Duration,
}

impl<'a> RenderContext<'a> {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            license: docs::DEFAULT_LICENSE.to_string(),
            example_language: docs::DEFAULT_EXAMPLE_LANGUAGE.to_string(),
            enhancer: None,
            timeout: Duration::from_secs(network::DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = license.into();
        self
    }

    pub fn with_example_language(mut self, language: impl Into<String>) -> Self {
        self.example_language = language.into();
        self
    }

    pub fn with_enhancer(mut self, enhancer: &'a dyn Enhancer) -> Self {
        self.enhancer = Some(enhancer);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run one enhancement request; `None` means use the template text
    async fn bounded<F>(&self, future: F, operation: &str) -> Option<String>
    where
        F: Future<Output = Result<String>>,
    {
        match with_timeout(self.timeout, future, operation).await {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => {
                warn!("{} returned empty text, using template", operation);
                None
            }
            Err(e) => {
                warn!("{} failed, using template: {}", operation, e);
                None
            }
        }
    }

    async fn describe(&self, context: &str, kind: ElementKind) -> Option<String> {
        let enhancer = self.enhancer?;
        self.bounded(enhancer.enhance(context, kind), &format!("enhance {}", kind))
            .await
    }

    async fn overview(&self, record: &CanonicalAnalysis) -> Option<String> {
        let enhancer = self.enhancer?;
        self.bounded(
            enhancer.summarize_project(record, &self.project_name),
            "summarize project",
        )
        .await
    }

    async fn example(&self, endpoint: &EndpointInfo) -> Option<String> {
        let enhancer = self.enhancer?;
        self.bounded(
            enhancer.example(endpoint, &self.example_language),
            "endpoint example",
        )
        .await
    }
}

/// Render one document kind.
///
/// Without an enhancer this performs no I/O and is deterministic.
pub async fn render(kind: &DocKind, record: &CanonicalAnalysis, ctx: &RenderContext<'_>) -> String {
    debug!("Rendering {:?} for {}", kind, ctx.project_name);
    match kind {
        DocKind::Readme => render_readme(record, ctx).await,
        DocKind::Api => render_api(record, ctx).await,
        DocKind::Class(name) => match record.find_class(name) {
            Some(class) => render_class(class, ctx).await,
            None => format!("# {}\n\nClass not found.\n", name),
        },
        DocKind::Function(name) => match record.find_function(name) {
            Some(func) => render_function(func, ctx).await,
            None => format!("### {}\n\nFunction not found.\n", name),
        },
        DocKind::All => super::render_bundle(record, ctx).await.combined(),
    }
}

// =============================================================================
// Overview
// =============================================================================

pub(crate) async fn render_readme(record: &CanonicalAnalysis, ctx: &RenderContext<'_>) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", ctx.project_name));

    let description = match ctx.overview(record).await {
        Some(text) => text,
        None => first_paragraph(&record.module_doc)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Project: {}", ctx.project_name)),
    };
    output.push_str("## Overview\n\n");
    output.push_str(&format!("{}\n\n", description));

    output.push_str("## Technologies\n\n");
    for tech in technology::detect(&record.imports) {
        output.push_str(&format!("- **{}** - {}\n", tech.label, tech.description));
    }
    output.push('\n');

    output.push_str("## Project Structure\n\n");
    output.push_str("### Classes\n\n");
    if record.classes.is_empty() {
        output.push_str("No classes found.\n");
    }
    for class in record.classes.iter().take(docs::MAX_LISTED_ENTRIES) {
        output.push_str(&format!(
            "- **{}** - {}\n",
            class.name,
            first_line(&class.doc).unwrap_or("Class")
        ));
    }
    output.push('\n');

    output.push_str("### Functions\n\n");
    if record.functions.is_empty() {
        output.push_str("No functions found.\n");
    }
    for func in record.functions.iter().take(docs::MAX_LISTED_ENTRIES) {
        output.push_str(&format!(
            "- **{}** - {}\n",
            func.signature(),
            first_line(&func.doc).unwrap_or("Function")
        ));
    }
    output.push('\n');

    let language = record.language;
    output.push_str("## Installation\n\n");
    output.push_str("### Prerequisites\n\n");
    output.push_str(&format!("- {}\n\n", language.prerequisite()));
    output.push_str("### Steps\n\n");
    output.push_str("```bash\n");
    output.push_str("# 1. Install dependencies\n");
    output.push_str(&format!("{}\n\n", language.install_command()));
    output.push_str("# 2. Run the project\n");
    output.push_str(&format!("{}\n", language.run_command()));
    output.push_str("```\n\n");

    output.push_str("## Usage\n\n");
    output.push_str(&format!("```{}\n", language.highlight_str()));
    output.push_str(&usage_snippet(record));
    output.push_str("```\n\n");

    output.push_str("## API Endpoints\n\n");
    if record.endpoints.is_empty() {
        output.push_str("No API endpoints found.\n");
    }
    for endpoint in record.endpoints.iter().take(docs::MAX_LISTED_ENTRIES) {
        output.push_str(&format!(
            "- `{} {}` - {}\n",
            endpoint.method, endpoint.path, endpoint.description
        ));
    }
    output.push('\n');

    output.push_str("## License\n\n");
    output.push_str(&format!("{} License\n", ctx.license));

    output
}

/// Basic usage code built from the first public class or function
fn usage_snippet(record: &CanonicalAnalysis) -> String {
    let language = record.language;
    let comment = comment_prefix(language);
    let mut snippet = format!("{} Basic usage\n", comment);

    let class = record.classes.iter().find(|c| !c.name.starts_with('_'));
    if let Some(class) = class {
        let args = class
            .methods
            .iter()
            .find(|m| m.is_constructor)
            .map(|m| m.params.join(", "))
            .unwrap_or_default();
        let method = class
            .methods
            .iter()
            .find(|m| !m.is_constructor && !m.is_private);

        match language {
            Language::Python => {
                snippet.push_str(&format!("obj = {}({})\n", class.name, args));
                if let Some(method) = method {
                    let call = if method.is_async { "await " } else { "" };
                    snippet.push_str(&format!("result = {}obj.{}\n", call, method.signature()));
                }
            }
            Language::JavaScript => {
                snippet.push_str(&format!("const obj = new {}({});\n", class.name, args));
                if let Some(method) = method {
                    let call = if method.is_async { "await " } else { "" };
                    snippet.push_str(&format!(
                        "const result = {}obj.{};\n",
                        call,
                        method.signature()
                    ));
                }
            }
        }
        return snippet;
    }

    if let Some(func) = record.functions.iter().find(|f| !f.name.starts_with('_')) {
        let call = if func.is_async { "await " } else { "" };
        match language {
            Language::Python => {
                snippet.push_str(&format!("result = {}{}\n", call, func.signature()));
            }
            Language::JavaScript => {
                snippet.push_str(&format!("const result = {}{};\n", call, func.signature()));
            }
        }
        return snippet;
    }

    snippet.push_str(&format!("{} See the source for entry points\n", comment));
    snippet
}

fn comment_prefix(language: Language) -> &'static str {
    match language {
        Language::Python => "#",
        Language::JavaScript => "//",
    }
}

// =============================================================================
// Endpoint Reference
// =============================================================================

pub(crate) async fn render_api(record: &CanonicalAnalysis, ctx: &RenderContext<'_>) -> String {
    let mut output = String::from("# API Documentation\n\n");

    if record.endpoints.is_empty() {
        output.push_str("No API endpoints found.\n");
        return output;
    }

    output.push_str("## Endpoints\n\n");

    let mut sections = Vec::with_capacity(record.endpoints.len());
    for endpoint in &record.endpoints {
        sections.push(render_endpoint(endpoint, ctx).await);
    }
    output.push_str(&sections.join("---\n\n"));

    output
}

async fn render_endpoint(endpoint: &EndpointInfo, ctx: &RenderContext<'_>) -> String {
    let mut section = String::new();
    let method = endpoint.method;
    let path = &endpoint.path;

    section.push_str(&format!("### {} {}\n\n", method, path));
    if endpoint.description.is_empty() {
        section.push_str(&format!("Endpoint {} {}\n\n", method, path));
    } else {
        section.push_str(&format!("{}\n\n", endpoint.description));
    }

    if let Some(handler) = &endpoint.handler {
        section.push_str(&format!("**Handler:** `{}`\n\n", handler));
    }

    section.push_str("**Parameters:**\n\n");
    let params = endpoint.path_params();
    if params.is_empty() {
        section.push_str("- No path parameters\n");
    }
    for param in params {
        section.push_str(&format!("- `{}` (string): Path parameter\n", param));
    }
    section.push('\n');

    section.push_str("**Response:**\n\n");
    section.push_str("```json\n{\n  \"status\": \"success\",\n  \"data\": {}\n}\n```\n\n");

    let example = match ctx.example(endpoint).await {
        Some(text) => text,
        None => format!(
            "```bash\ncurl -X {} {}{}\n```",
            method,
            docs::EXAMPLE_BASE_URL,
            path
        ),
    };
    section.push_str("**Example:**\n\n");
    section.push_str(&format!("{}\n\n", example));

    section
}

// =============================================================================
// Class Reference
// =============================================================================

pub(crate) async fn render_class(class: &ClassInfo, ctx: &RenderContext<'_>) -> String {
    let mut output = format!("# {}\n\n", class.name);

    if let Some(base) = &class.superclass {
        output.push_str(&format!("**Extends:** `{}`\n\n", base));
    }

    let description = if class.doc.is_empty() {
        ctx.describe(&format!("class {}", class.name), ElementKind::Class)
            .await
            .unwrap_or_else(|| "No description available.".to_string())
    } else {
        class.doc.clone()
    };
    output.push_str("## Description\n\n");
    output.push_str(&format!("{}\n\n", description));

    output.push_str("## Properties\n\n");
    if class.properties.is_empty() {
        output.push_str("No properties found.\n");
    }
    for property in &class.properties {
        output.push_str(&format!("- `{}`\n", property));
    }
    output.push('\n');

    output.push_str("## Methods\n\n");
    if class.methods.is_empty() {
        output.push_str("No methods found.\n");
        return output;
    }
    for method in &class.methods {
        output.push_str(&render_method(class, method, ctx).await);
    }

    output
}

async fn render_method(class: &ClassInfo, method: &MethodInfo, ctx: &RenderContext<'_>) -> String {
    let mut section = String::new();

    if method.is_constructor {
        section.push_str(&format!(
            "### {}({})\n\n",
            class.name,
            method.params.join(", ")
        ));
        section.push_str("Class constructor.\n\n");
    } else {
        let prefix = if method.is_async { "async " } else { "" };
        section.push_str(&format!("### {}{}\n\n", prefix, method.signature()));
    }

    if !method.doc.is_empty() {
        section.push_str(&format!("{}\n\n", method.doc));
    } else if !method.is_constructor
        && let Some(text) = ctx
            .describe(
                &format!("method {}.{}", class.name, method.signature()),
                ElementKind::Method,
            )
            .await
    {
        section.push_str(&format!("{}\n\n", text));
    }

    push_parameters(&mut section, &method.params);
    push_returns(&mut section, method.return_description.as_deref());

    section
}

// =============================================================================
// Function Reference
// =============================================================================

pub(crate) async fn render_function(func: &FunctionInfo, ctx: &RenderContext<'_>) -> String {
    let mut output = String::new();
    let prefix = if func.is_async { "async " } else { "" };
    output.push_str(&format!("### {}{}\n\n", prefix, func.signature()));

    let description = if func.doc.is_empty() {
        ctx.describe(&format!("function {}", func.signature()), ElementKind::Function)
            .await
            .unwrap_or_else(|| "No description available.".to_string())
    } else {
        func.doc.clone()
    };
    output.push_str(&format!("{}\n\n", description));

    push_parameters(&mut output, &func.params);
    push_returns(&mut output, func.return_description.as_deref());

    output
}

/// `# Functions` followed by every function reference
pub(crate) async fn render_functions(record: &CanonicalAnalysis, ctx: &RenderContext<'_>) -> String {
    let mut output = String::from("# Functions\n\n");
    if record.functions.is_empty() {
        output.push_str("No functions found.\n");
        return output;
    }

    let mut sections = Vec::with_capacity(record.functions.len());
    for func in &record.functions {
        sections.push(render_function(func, ctx).await);
    }
    output.push_str(&sections.join(""));
    output
}

fn push_parameters(output: &mut String, params: &[String]) {
    if params.is_empty() {
        return;
    }
    output.push_str("**Parameters:**\n\n");
    for param in params {
        output.push_str(&format!("- `{}` - Parameter\n", param));
    }
    output.push('\n');
}

fn push_returns(output: &mut String, returns: Option<&str>) {
    if let Some(returns) = returns {
        output.push_str(&format!("**Returns:** {}\n\n", returns));
    }
}

fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|l| !l.is_empty())
}

fn first_paragraph(text: &str) -> Option<&str> {
    text.split("\n\n").map(str::trim).find(|p| !p.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HttpMethod, WeaveError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns fixed text for every request
    struct StubEnhancer {
        calls: AtomicUsize,
    }

    impl StubEnhancer {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Enhancer for StubEnhancer {
        async fn enhance(&self, context: &str, _kind: ElementKind) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("Enhanced: {}", context))
        }

        async fn summarize_project(
            &self,
            _record: &CanonicalAnalysis,
            project_name: &str,
        ) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{} does useful things.", project_name))
        }

        async fn example(&self, endpoint: &EndpointInfo, _target: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("```bash\nhttp {} :8000{}\n```", endpoint.method, endpoint.path))
        }
    }

    struct FailingEnhancer;

    #[async_trait]
    impl Enhancer for FailingEnhancer {
        async fn enhance(&self, _context: &str, _kind: ElementKind) -> Result<String> {
            Err(WeaveError::EnhancementUnavailable("offline".to_string()))
        }

        async fn summarize_project(&self, _: &CanonicalAnalysis, _: &str) -> Result<String> {
            Err(WeaveError::LlmApi("boom".to_string()))
        }

        async fn example(&self, _: &EndpointInfo, _: &str) -> Result<String> {
            Err(WeaveError::EnhancementUnavailable("offline".to_string()))
        }
    }

    struct SlowEnhancer;

    #[async_trait]
    impl Enhancer for SlowEnhancer {
        async fn enhance(&self, _context: &str, _kind: ElementKind) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("too late".to_string())
        }

        async fn summarize_project(&self, _: &CanonicalAnalysis, _: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("too late".to_string())
        }

        async fn example(&self, _: &EndpointInfo, _: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("too late".to_string())
        }
    }

    fn sample_record() -> CanonicalAnalysis {
        let mut record = CanonicalAnalysis::empty(Language::Python);
        record.imports.insert("fastapi".to_string());

        let mut class = ClassInfo::new("UserService");
        class.doc = "Manages users.\n\nLonger text.".to_string();
        class.add_property("debug");
        class.methods.push(MethodInfo::new(
            "__init__",
            vec!["db".to_string()],
            "",
            "__init__",
        ));
        class.methods.push(MethodInfo::new(
            "create",
            vec!["name".to_string()],
            "Create a user.\n\nReturns: The new user",
            "__init__",
        ));
        record.classes.push(class);

        record.functions.push(FunctionInfo::new(
            "add",
            vec!["a".to_string(), "b".to_string()],
            "Add two numbers.",
        ));
        record.functions.push(FunctionInfo::new("helper", Vec::new(), ""));

        let mut endpoint = EndpointInfo::new(HttpMethod::Get, "/users/{user_id}", "Fetch a user");
        endpoint.handler = Some("get_user".to_string());
        record.endpoints.push(endpoint);
        record
    }

    #[tokio::test]
    async fn test_empty_record_keeps_headings() {
        let record = CanonicalAnalysis::empty(Language::Python);
        let ctx = RenderContext::new("demo");

        let readme = render(&DocKind::Readme, &record, &ctx).await;
        assert!(readme.starts_with("# demo\n"));
        assert!(readme.contains("## Overview\n\nProject: demo\n"));
        assert!(readme.contains("- **Python/JavaScript** - Programming language"));
        assert!(readme.contains("### Classes\n\nNo classes found.\n"));
        assert!(readme.contains("### Functions\n\nNo functions found.\n"));
        assert!(readme.contains("pip install -r requirements.txt"));
        assert!(readme.contains("See the source for entry points"));
        assert!(readme.contains("## API Endpoints\n\nNo API endpoints found.\n"));
        assert!(readme.ends_with("## License\n\nMIT License\n"));

        let api = render(&DocKind::Api, &record, &ctx).await;
        assert_eq!(api, "# API Documentation\n\nNo API endpoints found.\n");
    }

    #[tokio::test]
    async fn test_readme_section_order() {
        let record = sample_record();
        let readme = render(&DocKind::Readme, &record, &RenderContext::new("demo")).await;

        let headings = [
            "# demo",
            "## Overview",
            "## Technologies",
            "## Project Structure",
            "## Installation",
            "## Usage",
            "## API Endpoints",
            "## License",
        ];
        let positions: Vec<usize> = headings
            .iter()
            .map(|h| readme.find(h).unwrap_or_else(|| panic!("missing {}", h)))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        assert!(readme.contains("- **Fastapi** - "));
        assert!(readme.contains("- **UserService** - Manages users.\n"));
        assert!(readme.contains("- **add(a, b)** - Add two numbers.\n"));
        assert!(readme.contains("- **helper()** - Function\n"));
        assert!(readme.contains("- `GET /users/{user_id}` - Fetch a user\n"));
        assert!(readme.contains("obj = UserService(db)\nresult = obj.create(name)\n"));
    }

    #[tokio::test]
    async fn test_overview_lists_at_most_five() {
        let mut record = CanonicalAnalysis::empty(Language::JavaScript);
        for i in 0..8 {
            record.classes.push(ClassInfo::new(format!("C{}", i)));
        }
        let readme = render(&DocKind::Readme, &record, &RenderContext::new("demo")).await;

        let listed: Vec<&str> = readme
            .lines()
            .filter(|l| l.starts_with("- **C"))
            .collect();
        assert_eq!(
            listed,
            vec![
                "- **C0** - Class",
                "- **C1** - Class",
                "- **C2** - Class",
                "- **C3** - Class",
                "- **C4** - Class"
            ]
        );
        assert!(readme.contains("npm install"));
        assert!(readme.contains("const obj = new C0();"));
    }

    fn numbered_record() -> CanonicalAnalysis {
        let mut record = CanonicalAnalysis::empty(Language::Python);
        for i in 0..8 {
            record
                .functions
                .push(FunctionInfo::new(format!("f{}", i), Vec::new(), ""));
            record.endpoints.push(EndpointInfo::new(
                HttpMethod::Get,
                format!("/r{}", i),
                format!("Route {}", i),
            ));
        }
        record
    }

    #[tokio::test]
    async fn test_readme_caps_functions_and_endpoints() {
        let record = numbered_record();
        let readme = render(&DocKind::Readme, &record, &RenderContext::new("demo")).await;

        let functions: Vec<&str> = readme
            .lines()
            .filter(|l| l.starts_with("- **f"))
            .collect();
        assert_eq!(
            functions,
            vec![
                "- **f0()** - Function",
                "- **f1()** - Function",
                "- **f2()** - Function",
                "- **f3()** - Function",
                "- **f4()** - Function"
            ]
        );

        let endpoints: Vec<&str> = readme
            .lines()
            .filter(|l| l.starts_with("- `GET /r"))
            .collect();
        assert_eq!(
            endpoints,
            vec![
                "- `GET /r0` - Route 0",
                "- `GET /r1` - Route 1",
                "- `GET /r2` - Route 2",
                "- `GET /r3` - Route 3",
                "- `GET /r4` - Route 4"
            ]
        );
    }

    #[tokio::test]
    async fn test_api_lists_every_endpoint() {
        let record = numbered_record();
        let api = render(&DocKind::Api, &record, &RenderContext::new("demo")).await;

        let headings: Vec<&str> = api.lines().filter(|l| l.starts_with("### ")).collect();
        let expected: Vec<String> = (0..8).map(|i| format!("### GET /r{}", i)).collect();
        assert_eq!(headings, expected);
        assert_eq!(api.matches("---\n").count(), 7);
    }

    #[tokio::test]
    async fn test_module_doc_overview() {
        let mut record = CanonicalAnalysis::empty(Language::Python);
        record.module_doc = "Billing helpers.\n\nDetails follow.".to_string();
        let readme = render(&DocKind::Readme, &record, &RenderContext::new("demo")).await;
        assert!(readme.contains("## Overview\n\nBilling helpers.\n\n"));
    }

    #[tokio::test]
    async fn test_api_reference() {
        let mut record = sample_record();
        record
            .endpoints
            .push(EndpointInfo::new(HttpMethod::Post, "/users", ""));
        let api = render(&DocKind::Api, &record, &RenderContext::new("demo")).await;

        assert!(api.contains("## Endpoints\n\n### GET /users/{user_id}\n\nFetch a user\n"));
        assert!(api.contains("**Handler:** `get_user`"));
        assert!(api.contains("- `user_id` (string): Path parameter"));
        assert!(api.contains("### POST /users\n\nEndpoint POST /users\n"));
        assert!(api.contains("- No path parameters"));
        assert!(api.contains("curl -X GET http://localhost:8000/users/{user_id}"));
        assert!(api.contains("\"status\": \"success\""));
        assert_eq!(api.matches("---\n").count(), 1);
    }

    #[tokio::test]
    async fn test_class_reference() {
        let record = sample_record();
        let doc = render(
            &DocKind::Class("UserService".to_string()),
            &record,
            &RenderContext::new("demo"),
        )
        .await;

        assert!(doc.starts_with("# UserService\n\n## Description\n\nManages users."));
        assert!(doc.contains("## Properties\n\n- `debug`\n"));
        assert!(doc.contains("### UserService(db)\n\nClass constructor.\n"));
        assert!(doc.contains("### create(name)\n\nCreate a user."));
        assert!(doc.contains("- `name` - Parameter"));
        assert!(doc.contains("**Returns:** The new user"));
    }

    #[tokio::test]
    async fn test_empty_class_reference() {
        let mut record = CanonicalAnalysis::empty(Language::JavaScript);
        let mut class = ClassInfo::new("Admin");
        class.superclass = Some("User".to_string());
        record.classes.push(class);

        let doc = render(
            &DocKind::Class("Admin".to_string()),
            &record,
            &RenderContext::new("demo"),
        )
        .await;
        assert!(doc.contains("**Extends:** `User`"));
        assert!(doc.contains("No description available."));
        assert!(doc.contains("No properties found."));
        assert!(doc.contains("No methods found."));
    }

    #[tokio::test]
    async fn test_unknown_names() {
        let record = sample_record();
        let ctx = RenderContext::new("demo");

        let class = render(&DocKind::Class("Missing".to_string()), &record, &ctx).await;
        assert_eq!(class, "# Missing\n\nClass not found.\n");

        let func = render(&DocKind::Function("nope".to_string()), &record, &ctx).await;
        assert!(func.contains("Function not found."));
    }

    #[tokio::test]
    async fn test_function_reference() {
        let record = sample_record();
        let ctx = RenderContext::new("demo");

        let doc = render(&DocKind::Function("add".to_string()), &record, &ctx).await;
        assert!(doc.starts_with("### add(a, b)\n\nAdd two numbers.\n"));
        assert!(doc.contains("**Parameters:**\n\n- `a` - Parameter\n- `b` - Parameter\n"));

        let bare = render(&DocKind::Function("helper".to_string()), &record, &ctx).await;
        assert_eq!(bare, "### helper()\n\nNo description available.\n\n");
    }

    #[tokio::test]
    async fn test_all_concatenates_in_order() {
        let record = sample_record();
        let doc = render(&DocKind::All, &record, &RenderContext::new("demo")).await;

        assert!(doc.starts_with("# demo\n"));
        let api = doc.find("\n# API Documentation\n").unwrap();
        let class = doc.find("\n# UserService\n").unwrap();
        let functions = doc.find("\n# Functions\n").unwrap();
        assert!(api < class && class < functions);
        assert!(doc.contains("### helper()"));
    }

    #[tokio::test]
    async fn test_render_is_idempotent() {
        let record = sample_record();
        let ctx = RenderContext::new("demo");
        let first = render(&DocKind::All, &record, &ctx).await;
        let second = render(&DocKind::All, &record, &ctx).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_enhancer_is_additive() {
        let record = sample_record();
        let stub = StubEnhancer::new();
        let plain_ctx = RenderContext::new("demo");
        let ctx = RenderContext::new("demo").with_enhancer(&stub);

        let readme = render(&DocKind::Readme, &record, &ctx).await;
        assert!(readme.contains("## Overview\n\ndemo does useful things.\n"));

        // Documented functions keep their own text
        let add = render(&DocKind::Function("add".to_string()), &record, &ctx).await;
        assert_eq!(
            add,
            render(&DocKind::Function("add".to_string()), &record, &plain_ctx).await
        );

        let helper = render(&DocKind::Function("helper".to_string()), &record, &ctx).await;
        assert!(helper.contains("Enhanced: function helper()"));

        let api = render(&DocKind::Api, &record, &ctx).await;
        assert!(api.contains("http GET :8000/users/{user_id}"));
        assert!(!api.contains("curl -X"));
        assert!(stub.calls.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn test_failing_enhancer_falls_back() {
        let record = sample_record();
        let plain = RenderContext::new("demo");
        let failing = FailingEnhancer;
        let ctx = RenderContext::new("demo").with_enhancer(&failing);

        assert_eq!(
            render(&DocKind::All, &record, &ctx).await,
            render(&DocKind::All, &record, &plain).await
        );
    }

    #[tokio::test]
    async fn test_slow_enhancer_times_out() {
        let record = CanonicalAnalysis::empty(Language::Python);
        let slow = SlowEnhancer;
        let ctx = RenderContext::new("demo")
            .with_enhancer(&slow)
            .with_timeout(Duration::from_millis(20));

        let readme = render(&DocKind::Readme, &record, &ctx).await;
        assert!(readme.contains("Project: demo"));
    }

    #[test]
    fn test_first_line_skips_blank() {
        assert_eq!(first_line("\n  Hello\nWorld"), Some("Hello"));
        assert_eq!(first_line(""), None);
    }
}
