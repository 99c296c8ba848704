//! api-tools: API compatibility checks for versioned components
//!
//! Compares the API of workspace components against a baseline and reports
//! breakage, illegal API use, version numbering and since-tag problems.

#![allow(clippy::needless_pass_by_value)]

use anyhow::{bail, Context, Result};
use api_tools::{
    cli::{self, CheckConfig, CheckPaths, FiltersFormat},
    config::{AppConfig, ConfigPreset},
    pipeline::exit_codes,
    reports::ReportFormat,
};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "api-tools")]
#[command(version)]
#[command(about = "API compatibility, usage and version checks for components", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success (or no --fail-on-error)
    1  Error problems reported with --fail-on-error
    3  Error occurred

EXAMPLES:
    # Full check of every workspace component
    api-tools check --baseline baseline.json --workspace workspace.json

    # Incremental check of one component after a compile
    api-tools check --baseline baseline.json --workspace workspace.json \\
        --component org.example.core --changed bin/org/example/Api.class

    # SARIF for code scanning
    api-tools check --baseline baseline.json --workspace workspace.json -o sarif -O api.sarif")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output (also respects `NO_COLOR` env)
    #[arg(long, global = true)]
    no_color: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `check` subcommand
#[derive(Parser)]
struct CheckArgs {
    /// Baseline profile snapshot holding the reference components
    #[arg(long)]
    baseline: PathBuf,

    /// Workspace profile snapshot holding the components to check
    #[arg(long)]
    workspace: PathBuf,

    /// Component to check (repeatable; all workspace components if omitted)
    #[arg(long = "component")]
    components: Vec<String>,

    /// Changed class file (repeatable); makes the build incremental
    #[arg(long)]
    changed: Vec<PathBuf>,

    /// Source index snapshot for problem locations and since tags
    #[arg(long)]
    sources: Option<PathBuf>,

    /// Output format
    #[arg(short, long)]
    output: Option<ReportFormat>,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Configuration preset (default, strict, lenient) used instead of the config file
    #[arg(long)]
    preset: Option<String>,

    /// Compare changed types in parallel
    #[arg(long)]
    parallel: bool,

    /// Skip the illegal API use scan
    #[arg(long)]
    no_usage_check: bool,

    /// Exit with code 1 if any problem is an error
    #[arg(long)]
    fail_on_error: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check components against a baseline
    Check(CheckArgs),

    /// List the accepted problems of a component
    Filters {
        /// Component archive (.jar) or project folder
        location: PathBuf,

        /// Component id (defaults to the archive or folder name)
        #[arg(long)]
        component_id: Option<String>,

        /// Listing format
        #[arg(long, value_enum, default_value = "text")]
        format: FiltersFormat,

        /// Output file path (stdout if not specified)
        #[arg(short = 'O', long)]
        output_file: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate JSON Schema for the config file format
    ConfigSchema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print the discovered config file
    Path,
    /// Generate an example .api-tools.yaml in the current directory
    Init,
    /// List the configuration presets
    Presets,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match run(cli) {
        Ok(exit_codes::SUCCESS) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_codes::ERROR);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Check(args) => {
            let mut app = match args.preset.as_deref() {
                Some(name) => match ConfigPreset::from_name(name) {
                    Some(preset) => AppConfig::from_preset(preset),
                    None => bail!("Unknown preset: {name}. Valid options: default, strict, lenient"),
                },
                None => api_tools::config::load_or_default(cli.config.as_deref()).0,
            };
            let overrides = AppConfig::builder()
                .parallel_compare(args.parallel)
                .check_api_usage(!args.no_usage_check)
                .output_format(args.output.unwrap_or_default())
                .output_file(args.output_file)
                .quiet(cli.quiet)
                .build();
            app.merge(&overrides);

            cli::run_check(CheckConfig {
                paths: CheckPaths {
                    workspace: args.workspace,
                    baseline: args.baseline,
                    sources: args.sources,
                },
                components: args.components,
                changed: args.changed,
                app,
                fail_on_error: args.fail_on_error,
                no_color: cli.no_color,
            })
        }

        Commands::Filters {
            location,
            component_id,
            format,
            output_file,
        } => cli::run_filters(location, component_id, format, output_file),

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "api-tools", &mut io::stdout());
            Ok(exit_codes::SUCCESS)
        }

        Commands::ConfigSchema { output } => {
            let schema = api_tools::config::generate_json_schema();
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => println!("{schema}"),
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Config { action } => {
            match action {
                ConfigAction::Show => {
                    let (config, loaded_from) =
                        api_tools::config::load_or_default(cli.config.as_deref());
                    match &loaded_from {
                        Some(path) => eprintln!("# Loaded from: {}", path.display()),
                        None => eprintln!("# No config file found; showing defaults"),
                    }
                    let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
                    print!("{yaml}");
                }
                ConfigAction::Path => {
                    match api_tools::config::discover_config_file(cli.config.as_deref()) {
                        Some(path) => eprintln!("Active config file: {}", path.display()),
                        None => eprintln!("No config file found."),
                    }
                }
                ConfigAction::Init => {
                    let target = std::env::current_dir()
                        .context("cannot determine current directory")?
                        .join(api_tools::config::DEFAULT_CONFIG_FILE);
                    if target.exists() {
                        bail!(
                            "{} already exists. Remove it first to re-initialize.",
                            target.display()
                        );
                    }
                    std::fs::write(&target, api_tools::config::generate_full_example_config())
                        .with_context(|| format!("failed to write {}", target.display()))?;
                    eprintln!("Created {}", target.display());
                }
                ConfigAction::Presets => {
                    for preset in ConfigPreset::all() {
                        println!("{:<8} {}", preset.name(), preset.description());
                    }
                }
            }
            Ok(exit_codes::SUCCESS)
        }
    }
}
