//! # schemac
//!
//! Generate derived C++ operations from annotated headers.
//!
//! ## Usage
//!
//! ```bash
//! # Generate from two headers to stdout
//! schemac generate --include engine/types.h game/scene.h
//!
//! # Generate to a file, with the schema as JSON alongside
//! schemac generate -I include/*.h -O generated/serializer.h -J generated/schema.json
//!
//! # Watch mode for development
//! schemac generate --watch
//!
//! # Dry run to preview changes
//! schemac generate --dry-run
//!
//! # Initialize configuration
//! schemac init
//!
//! # Check that generated output is up-to-date
//! schemac check --path generated/serializer.h
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use schemac_cli::{
    config::{CliArgs, Config, ConfigManager, CONFIG_FILENAME},
    error::CliError,
    pipeline::{Pipeline, RunReport},
    watcher::FileWatcher,
    writer::{FileWriter, WriteResult},
};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "SCHEMAC_LOG";

#[derive(Parser)]
#[command(name = "schemac")]
#[command(author, version, about = "Generate derived C++ operations from annotated headers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan headers and generate the derived operations
    Generate {
        /// Header files or glob patterns, scanned in order
        #[arg(short = 'I', long, num_args = 1..)]
        include: Vec<String>,

        /// Generated header (stdout when omitted)
        #[arg(short = 'O', long)]
        output: Option<PathBuf>,

        /// Also write the scanned schema as JSON
        #[arg(short = 'J', long)]
        json: Option<PathBuf>,

        /// Leave the invocation out of the output banner
        #[arg(long)]
        no_banner: bool,

        /// Enable debug logging
        #[arg(short = 'V', long)]
        verbose: bool,

        /// Fail immediately (for testing build integration)
        #[arg(short = 'E', long)]
        error: bool,

        /// Watch the inputs and regenerate on change
        #[arg(short = 'W', long)]
        watch: bool,

        /// Preview output without writing files
        #[arg(long)]
        dry_run: bool,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Initialize a new schemac configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = CONFIG_FILENAME)]
        output: PathBuf,

        /// Overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Check that a generated header is up-to-date
    Check {
        /// Path to the generated header
        #[arg(short, long)]
        path: PathBuf,

        /// Header files or glob patterns, scanned in order
        #[arg(short = 'I', long, num_args = 1..)]
        include: Vec<String>,

        /// Enable debug logging
        #[arg(short = 'V', long)]
        verbose: bool,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Generate {
            include,
            output,
            json,
            no_banner,
            verbose,
            error,
            watch,
            dry_run,
            config,
        } => {
            init_logging(verbose);
            if error {
                return Err(CliError::Forced);
            }

            let args = CliArgs {
                include,
                output,
                json,
                banner: no_banner.then_some(false),
            };
            cmd_generate(config.as_deref(), &args, watch, dry_run)
        }

        Commands::Init { output, force } => {
            init_logging(false);
            cmd_init(&output, force)
        }

        Commands::Check {
            path,
            include,
            verbose,
            config,
        } => {
            init_logging(verbose);
            let args = CliArgs {
                include,
                ..Default::default()
            };
            cmd_check(&path, config.as_deref(), &args)
        }
    }
}

/// Install the tracing subscriber; logs go to stderr.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>, args: &CliArgs) -> Result<Config, CliError> {
    let config = ConfigManager::load(path)?;
    Ok(ConfigManager::merge_cli_args(config, args))
}

/// Generate command implementation.
fn cmd_generate(
    config_path: Option<&Path>,
    args: &CliArgs,
    watch: bool,
    dry_run: bool,
) -> Result<(), CliError> {
    let config = load_config(config_path, args)?;
    let pipeline = Pipeline::new(config);
    let writer = FileWriter::new(dry_run);

    if watch {
        run_watch_mode(&pipeline, &writer)
    } else {
        run_generate(&pipeline, &writer)
    }
}

/// Run generation once.
fn run_generate(pipeline: &Pipeline, writer: &FileWriter) -> Result<(), CliError> {
    eprintln!("{}", "Scanning headers...".cyan());

    let report = pipeline.run(writer)?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &RunReport) {
    eprintln!(
        "  Scanned {} header(s): {} enum(s), {} struct(s)",
        report.inputs.len().to_string().green(),
        report.enums.to_string().green(),
        report.structs.to_string().green()
    );

    print_write(&report.output);
    if let Some(json) = &report.json {
        print_write(json);
    }
}

fn print_write(result: &WriteResult) {
    match result {
        WriteResult::Written { path, bytes } => {
            eprintln!(
                "{} Written {} bytes to {}",
                "✓".green(),
                bytes,
                path.display()
            );
        }
        WriteResult::Stdout { bytes } => {
            eprintln!("{} Written {} bytes to stdout", "✓".green(), bytes);
        }
        WriteResult::DryRun { content, path } => {
            let target = path
                .as_deref()
                .map_or_else(|| "stdout".to_string(), |p| p.display().to_string());
            eprintln!("{} Would write to {}:", "[dry-run]".yellow(), target);
            eprintln!("{}", "─".repeat(60).dimmed());
            println!("{}", content);
            eprintln!("{}", "─".repeat(60).dimmed());
        }
    }
}

/// Run in watch mode.
fn run_watch_mode(pipeline: &Pipeline, writer: &FileWriter) -> Result<(), CliError> {
    let inputs = pipeline.inputs()?;

    eprintln!("{}", "Starting watch mode...".cyan());
    for input in &inputs {
        eprintln!("  Watching: {}", input.display());
    }
    eprintln!("  Press Ctrl+C to stop\n");

    // Initial generation
    if let Err(e) = run_generate(pipeline, writer) {
        print_error(&e);
    }

    let watcher = FileWatcher::new(&inputs);
    let (_debouncer, rx) = watcher.watch()?;

    eprintln!("\n{}", "Watching for changes...".cyan());

    while let Ok(event) = rx.recv() {
        if event.is_error() {
            eprintln!(
                "{} {}",
                "Watch error:".red(),
                event.error_message().unwrap_or("Unknown error")
            );
            continue;
        }

        if let Some(path) = event.path() {
            eprintln!("\n{} {}", "File changed:".cyan(), path.display());
        }

        // Regenerate the whole batch
        if let Err(e) = run_generate(pipeline, writer) {
            print_error(&e);
        }

        eprintln!("\n{}", "Watching for changes...".cyan());
    }

    Ok(())
}

/// Init command implementation.
fn cmd_init(output: &Path, force: bool) -> Result<(), CliError> {
    ConfigManager::init(output, force)?;

    eprintln!(
        "{} Created configuration file: {}",
        "✓".green(),
        output.display()
    );

    Ok(())
}

/// Check command implementation.
fn cmd_check(path: &Path, config_path: Option<&Path>, args: &CliArgs) -> Result<(), CliError> {
    eprintln!("{}", "Checking generated output...".cyan());

    let config = load_config(config_path, args)?;
    match Pipeline::new(config).check(path) {
        Ok(()) => {
            eprintln!("{} {} is up-to-date", "✓".green(), path.display());
            Ok(())
        }
        Err(e @ CliError::Validation(_)) => {
            eprintln!("{} {} is out of date", "✗".red(), path.display());
            eprintln!("  Run 'schemac generate' to update");
            Err(e)
        }
        Err(e) => Err(e),
    }
}

/// Print an error with formatting.
fn print_error(error: &CliError) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}
