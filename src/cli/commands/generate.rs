//! Generate Command
//!
//! Render Markdown documentation for one source file.
//!
//! Usage:
//!   weavedoc generate <FILE> [-k readme|api|class|function|all] [--name NAME]
//!                    [--project-name NAME] [-o DIR] [--llm | --no-llm]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use crate::ai::{Enhancer, LlmEnhancer};
use crate::analyzer::CodeAnalyzer;
use crate::cli::Output;
use crate::config::Config;
use crate::docs::{DocKind, RenderContext, render, render_bundle};
use crate::types::{Result, WeaveError};

/// Options collected from the command line
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub file: PathBuf,
    pub kind: String,
    pub name: Option<String>,
    pub project_name: Option<String>,
    pub output: Option<PathBuf>,
    /// `Some(true)` for `--llm`, `Some(false)` for `--no-llm`, else config
    pub llm: Option<bool>,
}

/// Map `--kind` and `--name` onto a [`DocKind`]
pub fn parse_kind(kind: &str, name: Option<&str>) -> Result<DocKind> {
    let require_name = |what: &str| {
        name.map(str::to_string).ok_or_else(|| {
            WeaveError::Config(format!("--name is required for --kind {}", what))
        })
    };

    match kind.to_lowercase().as_str() {
        "readme" => Ok(DocKind::Readme),
        "api" => Ok(DocKind::Api),
        "class" => Ok(DocKind::Class(require_name("class")?)),
        "function" => Ok(DocKind::Function(require_name("function")?)),
        "all" => Ok(DocKind::All),
        other => Err(WeaveError::Config(format!(
            "Invalid kind '{}'. Valid values: readme, api, class, function, all",
            other
        ))),
    }
}

/// Project name: flag, then config, then the file stem
fn resolve_project_name(options: &GenerateOptions, config: &Config) -> String {
    options
        .project_name
        .clone()
        .or_else(|| config.project.name.clone())
        .or_else(|| {
            options
                .file
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "project".to_string())
}

/// Build the enhancer when requested; unavailability is never fatal
fn build_enhancer(options: &GenerateOptions, config: &Config) -> Option<LlmEnhancer> {
    if !options.llm.unwrap_or(config.llm.enabled) {
        return None;
    }

    let mut llm = config.llm.clone();
    llm.enabled = true;
    match LlmEnhancer::from_config(&llm) {
        Ok(enhancer) => {
            info!("LLM enhancement enabled ({})", llm.provider);
            Some(enhancer)
        }
        Err(e) => {
            warn!("LLM enhancement unavailable, using templates: {}", e);
            None
        }
    }
}

pub async fn run(options: GenerateOptions, config: &Config) -> Result<()> {
    let kind = parse_kind(&options.kind, options.name.as_deref())?;
    let record = CodeAnalyzer::analyze(&options.file)?;

    let enhancer = build_enhancer(&options, config);
    let mut ctx = RenderContext::new(resolve_project_name(&options, config))
        .with_license(config.project.license.clone())
        .with_example_language(config.documentation.example_language.clone())
        .with_timeout(Duration::from_secs(config.llm.timeout_secs));
    if let Some(enhancer) = &enhancer {
        ctx = ctx.with_enhancer(enhancer as &dyn Enhancer);
    }

    let Some(dir) = options.output.as_deref() else {
        print!("{}", render(&kind, &record, &ctx).await);
        return Ok(());
    };

    let written = match &kind {
        DocKind::All => render_bundle(&record, &ctx).await.write_to(dir)?,
        single => {
            let path = dir.join(document_path(single));
            let content = render(single, &record, &ctx).await;
            write_document(&path, &content)?;
            vec![path]
        }
    };

    let out = Output::new();
    for path in &written {
        out.success(&format!("Wrote {}", path.display()));
    }
    Ok(())
}

/// Location of a single document relative to the output directory
fn document_path(kind: &DocKind) -> PathBuf {
    match kind {
        DocKind::Readme | DocKind::All => PathBuf::from("README.md"),
        DocKind::Api => PathBuf::from("API.md"),
        DocKind::Class(name) => Path::new("classes").join(format!("{}.md", name)),
        DocKind::Function(name) => Path::new("functions").join(format!("{}.md", name)),
    }
}

fn write_document(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SOURCE: &str = r#"
class Cart:
    """Shopping cart."""

    def __init__(self, owner):
        self.owner = owner

    def add(self, item):
        pass


def checkout(cart):
    """Finish the order."""
    pass
"#;

    fn options(file: PathBuf, kind: &str) -> GenerateOptions {
        GenerateOptions {
            file,
            kind: kind.to_string(),
            name: None,
            project_name: None,
            output: None,
            llm: Some(false),
        }
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("README", None).unwrap(), DocKind::Readme);
        assert_eq!(
            parse_kind("class", Some("Cart")).unwrap(),
            DocKind::Class("Cart".to_string())
        );
        assert!(parse_kind("class", None).is_err());
        assert!(parse_kind("wiki", None).is_err());
    }

    #[test]
    fn test_project_name_resolution() {
        let mut config = Config::default();
        let mut opts = options(PathBuf::from("src/shop.py"), "readme");
        assert_eq!(resolve_project_name(&opts, &config), "shop");

        config.project.name = Some("Configured".to_string());
        assert_eq!(resolve_project_name(&opts, &config), "Configured");

        opts.project_name = Some("Flag".to_string());
        assert_eq!(resolve_project_name(&opts, &config), "Flag");
    }

    #[test]
    fn test_no_llm_skips_enhancer() {
        let mut config = Config::default();
        config.llm.enabled = true;
        let opts = options(PathBuf::from("a.py"), "readme");
        assert!(build_enhancer(&opts, &config).is_none());
    }

    #[tokio::test]
    async fn test_writes_bundle() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("shop.py");
        fs::write(&file, SOURCE).unwrap();
        let out_dir = temp.path().join("out");

        let mut opts = options(file, "all");
        opts.output = Some(out_dir.clone());
        run(opts, &Config::default()).await.unwrap();

        let readme = fs::read_to_string(out_dir.join("README.md")).unwrap();
        assert!(readme.starts_with("# shop\n"));
        let class = fs::read_to_string(out_dir.join("classes/Cart.md")).unwrap();
        assert!(class.contains("### Cart(owner)"));
        assert!(out_dir.join("FUNCTIONS.md").exists());
    }

    #[tokio::test]
    async fn test_writes_single_function() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("shop.py");
        fs::write(&file, SOURCE).unwrap();
        let out_dir = temp.path().join("out");

        let mut opts = options(file, "function");
        opts.name = Some("checkout".to_string());
        opts.output = Some(out_dir.clone());
        run(opts, &Config::default()).await.unwrap();

        let doc = fs::read_to_string(out_dir.join("functions/checkout.md")).unwrap();
        assert!(doc.starts_with("### checkout(cart)\n\nFinish the order."));
    }
}
