//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/weavedoc/config.toml)
//! 3. Project config (.weavedoc/config.toml)
//! 4. Explicit `--config` file
//! 5. Environment variables (WEAVEDOC_* prefix)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{Result, WeaveError};

const ENV_PREFIX: &str = "WEAVEDOC_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with the full resolution chain:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::load_with(None)
    }

    /// Load configuration, merging `explicit` after the project file
    pub fn load_with(explicit: Option<&Path>) -> Result<Config> {
        if let Some(path) = explicit
            && !path.exists()
        {
            return Err(WeaveError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let figment = Self::figment(
            Self::global_config_path().as_deref(),
            &Self::project_config_path(),
            explicit,
        );
        Self::extract(figment)
    }

    /// Load configuration from a specific file only (no env, no global)
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path));
        Self::extract(figment)
    }

    fn figment(global: Option<&Path>, project: &Path, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        if let Some(path) = explicit {
            debug!("Loading config from: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        // e.g. WEAVEDOC_LLM_MODEL -> llm.model
        figment.merge(Env::prefixed(ENV_PREFIX).split('_').lowercase(true))
    }

    fn extract(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .extract()
            .map_err(|e| WeaveError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/weavedoc/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("weavedoc"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    /// Get project config directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".weavedoc")
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Effective configuration as pretty TOML or JSON
    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| WeaveError::Config(e.to_string()))
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a default project config under `root`.
    ///
    /// An existing file is kept unless `force` is set.
    pub fn init_project(root: &Path, name: Option<&str>, force: bool) -> Result<PathBuf> {
        let dir = root.join(Self::project_dir());
        fs::create_dir_all(&dir)?;

        let config_path = dir.join("config.toml");
        if config_path.exists() && !force {
            info!("Project config exists: {}", config_path.display());
            return Ok(config_path);
        }

        fs::write(&config_path, Self::default_project_config(name))?;
        info!("Created project config: {}", config_path.display());
        Ok(config_path)
    }

    /// Generate default project config content (TOML)
    fn default_project_config(name: Option<&str>) -> String {
        let name_line = match name {
            Some(n) => format!("name = \"{}\"", n.replace('"', "\\\"")),
            None => "# name = \"my-project\"".to_string(),
        };
        format!(
            r#"# weavedoc project configuration
# Values here override ~/.config/weavedoc/config.toml.

[project]
{}
license = "MIT"

[documentation]
output_dir = "docs"
example_language = "bash"

# API keys are read from OPENAI_API_KEY or GITHUB_TOKEN, never from this file.
[llm]
enabled = false
provider = "openai"
# model = "gpt-4o-mini"
timeout_secs = 60
temperature = 0.7
max_tokens = 300
max_retries = 2
response_language = "English"
"#,
            name_line
        )
    }
}
