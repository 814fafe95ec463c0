//! Config Command
//!
//! Manage weavedoc configuration.
//!
//! Usage:
//!   weavedoc config show [-f text|json]
//!   weavedoc config path
//!   weavedoc config init [--force]

use std::path::Path;

use super::OutputFormat;
use crate::cli::Output;
use crate::config::{Config, ConfigLoader};
use crate::types::Result;

/// Show the merged effective configuration
pub fn show(config: &Config, format: OutputFormat) -> Result<()> {
    let as_json = format == OutputFormat::Json;
    print!("{}", ConfigLoader::render(config, as_json)?);
    if as_json {
        println!();
    }
    Ok(())
}

/// Show configuration file locations
pub fn path(explicit: Option<&Path>) -> Result<()> {
    let out = Output::new();
    out.header("Configuration files");

    match ConfigLoader::global_config_path() {
        Some(global) => out.field("Global", describe(&global)),
        None => out.field("Global", "(cannot determine config directory)"),
    }
    out.field("Project", describe(&ConfigLoader::project_config_path()));
    if let Some(path) = explicit {
        out.field("Explicit", describe(path));
    }
    out.field("Env", "WEAVEDOC_* (e.g. WEAVEDOC_LLM_PROVIDER)");
    Ok(())
}

fn describe(path: &Path) -> String {
    let state = if path.exists() { "exists" } else { "not found" };
    format!("{} ({})", path.display(), state)
}

/// Initialize project configuration in the current directory
pub fn init(force: bool) -> Result<()> {
    let root = std::env::current_dir()?;
    let project_name = root
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("project")
        .to_string();

    let path = ConfigLoader::init_project(&root, Some(&project_name), force)?;

    let out = Output::new();
    out.success("Initialized project configuration");
    out.field("Project", &project_name);
    out.field("Config", path.display());
    Ok(())
}
