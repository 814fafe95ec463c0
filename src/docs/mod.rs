//! Markdown document synthesis from a canonical record.

pub mod synthesizer;
pub mod technology;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

pub use synthesizer::{DocKind, RenderContext, render};

use crate::types::{CanonicalAnalysis, Result, Summary};

/// Reference document for one class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDocument {
    pub class_name: String,
    pub content: String,
}

/// Every document derivable from one record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentBundle {
    pub readme: String,
    pub api: String,
    pub classes: Vec<ClassDocument>,
    pub functions: String,
    pub summary: Summary,
}

impl DocumentBundle {
    /// Overview, endpoint reference, class references, then functions
    pub fn combined(&self) -> String {
        let mut parts: Vec<&str> = vec![self.readme.trim_end(), self.api.trim_end()];
        parts.extend(self.classes.iter().map(|c| c.content.trim_end()));
        parts.push(self.functions.trim_end());

        let mut output = parts.join("\n\n");
        output.push('\n');
        output
    }

    /// Write `README.md`, `API.md`, `classes/<Class>.md` and `FUNCTIONS.md`
    /// under `dir`, returning the written paths.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        let mut write = |path: PathBuf, content: &str| -> Result<()> {
            fs::write(&path, content)?;
            written.push(path);
            Ok(())
        };

        write(dir.join("README.md"), &self.readme)?;
        write(dir.join("API.md"), &self.api)?;

        if !self.classes.is_empty() {
            let class_dir = dir.join("classes");
            fs::create_dir_all(&class_dir)?;
            for class in &self.classes {
                write(
                    class_dir.join(format!("{}.md", class.class_name)),
                    &class.content,
                )?;
            }
        }

        write(dir.join("FUNCTIONS.md"), &self.functions)?;

        info!("Wrote {} documents to {}", written.len(), dir.display());
        Ok(written)
    }
}

/// Render every document for `record`
pub async fn render_bundle(record: &CanonicalAnalysis, ctx: &RenderContext<'_>) -> DocumentBundle {
    let readme = synthesizer::render_readme(record, ctx).await;
    let api = synthesizer::render_api(record, ctx).await;

    let mut classes = Vec::with_capacity(record.classes.len());
    for class in &record.classes {
        classes.push(ClassDocument {
            class_name: class.name.clone(),
            content: synthesizer::render_class(class, ctx).await,
        });
    }

    let functions = synthesizer::render_functions(record, ctx).await;

    DocumentBundle {
        readme,
        api,
        classes,
        functions,
        summary: Summary::from(record),
    }
}
