//! Command-line surface: subcommand handlers and console styling.

pub mod commands;
pub mod ui;

pub use commands::OutputFormat;
pub use ui::Output;
