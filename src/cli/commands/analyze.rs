//! Analyze Command
//!
//! Extract the canonical record of one source file and print it.
//!
//! Usage:
//!   weavedoc analyze <FILE> [-f text|json|yaml]

use std::path::Path;

use tracing::debug;

use super::OutputFormat;
use crate::analyzer::CodeAnalyzer;
use crate::cli::Output;
use crate::types::{CanonicalAnalysis, Result};

pub fn run(path: &Path, format: OutputFormat) -> Result<()> {
    let record = CodeAnalyzer::analyze(path)?;
    debug!(
        "Analyzed {}: {} functions, {} classes, {} endpoints",
        path.display(),
        record.functions.len(),
        record.classes.len(),
        record.endpoints.len()
    );

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&record)?),
        OutputFormat::Text => print_text(path, &record),
    }
    Ok(())
}

fn print_text(path: &Path, record: &CanonicalAnalysis) {
    let out = Output::new();
    out.header(&format!("{} ({})", path.display(), record.language));

    if let Some(doc) = record.module_doc.lines().next().filter(|l| !l.is_empty()) {
        println!("{}", doc);
    }

    out.section(&format!("Functions ({})", record.functions.len()));
    for func in &record.functions {
        let prefix = if func.is_async { "async " } else { "" };
        println!("  {}{}", prefix, func.signature());
    }

    out.section(&format!("Classes ({})", record.classes.len()));
    for class in &record.classes {
        match &class.superclass {
            Some(base) => println!("  {} extends {}", class.name, base),
            None => println!("  {}", class.name),
        }
        for method in &class.methods {
            println!("    .{}", method.signature());
        }
        if !class.properties.is_empty() {
            println!("    properties: {}", class.properties.join(", "));
        }
    }

    out.section(&format!("Imports ({})", record.imports.len()));
    for import in &record.imports {
        println!("  {}", import);
    }

    out.section(&format!("Endpoints ({})", record.endpoints.len()));
    for endpoint in &record.endpoints {
        match &endpoint.handler {
            Some(handler) => println!("  {} {} -> {}", endpoint.method, endpoint.path, handler),
            None => println!("  {} {}", endpoint.method, endpoint.path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WeaveError;
    use tempfile::TempDir;

    #[test]
    fn test_run_each_format() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app.py");
        std::fs::write(&path, "import os\n\ndef main():\n    pass\n").unwrap();

        for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Yaml] {
            assert!(run(&path, format).is_ok());
        }
    }

    #[test]
    fn test_run_unsupported() {
        let err = run(Path::new("notes.txt"), OutputFormat::Text).unwrap_err();
        assert!(matches!(err, WeaveError::UnsupportedFileType { .. }));
    }
}
