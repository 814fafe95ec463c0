use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weavedoc::cli::OutputFormat;
use weavedoc::cli::commands::{analyze, config, generate, summary};
use weavedoc::config::ConfigLoader;

/// Parse output format, rejecting anything `allowed` does not list
fn parse_format(s: &str, allowed: &[OutputFormat]) -> Result<OutputFormat, String> {
    let format: OutputFormat = s.parse()?;
    if allowed.contains(&format) {
        Ok(format)
    } else {
        let names: Vec<_> = allowed.iter().map(|f| f.as_str()).collect();
        Err(format!(
            "Invalid format '{}'. Valid values: {}",
            s,
            names.join(", ")
        ))
    }
}

fn parse_record_format(s: &str) -> Result<OutputFormat, String> {
    parse_format(s, &[OutputFormat::Text, OutputFormat::Json, OutputFormat::Yaml])
}

fn parse_text_or_json(s: &str) -> Result<OutputFormat, String> {
    parse_format(s, &[OutputFormat::Text, OutputFormat::Json])
}

#[derive(Parser)]
#[command(name = "weavedoc")]
#[command(
    version,
    about = "Markdown documentation from Python and JavaScript sources"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true, help = "Explicit config file (TOML)")]
    config: Option<PathBuf>,

    #[arg(long, short, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the structural record of a source file
    Analyze {
        #[arg(help = "Python (.py) or JavaScript (.js) file")]
        file: PathBuf,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            value_parser = parse_record_format,
            help = "Output format: text, json, yaml"
        )]
        format: OutputFormat,
    },

    /// Print element counts for a source file
    Summary {
        #[arg(help = "Python (.py) or JavaScript (.js) file")]
        file: PathBuf,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            value_parser = parse_text_or_json,
            help = "Output format: text, json"
        )]
        format: OutputFormat,
    },

    /// Render Markdown documentation
    Generate {
        #[arg(help = "Python (.py) or JavaScript (.js) file")]
        file: PathBuf,
        #[arg(
            short = 'k',
            long,
            default_value = "readme",
            help = "Document kind: readme, api, class, function, all"
        )]
        kind: String,
        #[arg(long, help = "Class or function name for --kind class|function")]
        name: Option<String>,
        #[arg(long, help = "Project name (default: config, then file stem)")]
        project_name: Option<String>,
        #[arg(long, short, help = "Write files under this directory instead of stdout")]
        output: Option<PathBuf>,
        #[arg(long, conflicts_with = "no_llm", help = "Enhance descriptions with an LLM")]
        llm: bool,
        #[arg(long = "no-llm", help = "Template output only")]
        no_llm: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            value_parser = parse_text_or_json,
            help = "Output format: text (TOML), json"
        )]
        format: OutputFormat,
    },
    /// Show configuration file paths
    Path,
    /// Create .weavedoc/config.toml in the current directory
    Init {
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!(
            "\n{}",
            console::style("weavedoc encountered an unexpected error:").red().bold()
        );
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "{}",
                console::style(format!(
                    "Location: {}:{}:{}",
                    location.file(),
                    location.line(),
                    location.column()
                ))
                .dim()
            );
        }

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            weavedoc::cli::Output::new().error(&format!("Error: {}", e));
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Analyze { file, format } => {
            analyze::run(&file, format)?;
        }
        Commands::Summary { file, format } => {
            summary::run(&file, format)?;
        }
        Commands::Generate {
            file,
            kind,
            name,
            project_name,
            output,
            llm,
            no_llm,
        } => {
            let settings = ConfigLoader::load_with(cli.config.as_deref())?;
            let llm = match (llm, no_llm) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let options = generate::GenerateOptions {
                file,
                kind,
                name,
                project_name,
                output,
                llm,
            };

            let rt = Runtime::new()?;
            rt.block_on(generate::run(options, &settings))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                let settings = ConfigLoader::load_with(cli.config.as_deref())?;
                config::show(&settings, format)?;
            }
            ConfigAction::Path => {
                config::path(cli.config.as_deref())?;
            }
            ConfigAction::Init { force } => {
                config::init(force)?;
            }
        },
    }

    Ok(())
}
