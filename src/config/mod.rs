//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/weavedoc/config.toml)
//! 3. Project config (.weavedoc/config.toml)
//! 4. Explicit `--config` file
//! 5. Environment variables (WEAVEDOC_*)
//! 6. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
