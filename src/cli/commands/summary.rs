//! Summary Command
//!
//! Print the count projection of one source file.

use std::path::Path;

use super::OutputFormat;
use crate::analyzer::CodeAnalyzer;
use crate::cli::Output;
use crate::types::{Result, Summary};

pub fn run(path: &Path, format: OutputFormat) -> Result<()> {
    let record = CodeAnalyzer::analyze(path)?;
    let summary = CodeAnalyzer::summarize(&record);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&summary)?),
        OutputFormat::Text => print_text(path, &summary),
    }
    Ok(())
}

fn print_text(path: &Path, summary: &Summary) {
    let out = Output::new();
    out.header(&format!("Summary: {}", path.display()));
    out.field("Functions", summary.num_functions);
    out.field("Classes", summary.num_classes);
    out.field("Imports", summary.num_imports);
    out.field("Endpoints", summary.num_endpoints);
    out.field(
        "API",
        if summary.has_api_endpoints { "yes" } else { "no" },
    );
}
