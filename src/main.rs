use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use sheetcheck::cli;
use sheetcheck::config::CheckerConfig;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "sheetcheck")]
#[command(about = "Check that every sheet named in a manifest sheet exists and is visible")]
#[command(long_about = "sheetcheck - Sheet reference checker for .xlsx workbooks

Reads the sheet names listed in the manifest sheet (one per row, below a
header row), looks each one up in the same workbook and annotates the row:

  visible sheet            -> message cleared, highlight cleared
  missing or hidden sheet  -> warning message, row highlighted

COMMANDS:
  check   - Check a workbook and write the annotations back
  config  - Print the effective configuration

The written workbook is rebuilt from cell values, formulas, sheet visibility
and the highlight fills. Other cell styles, column widths and charts are not
carried over, so the input is only overwritten with --in-place.

EXAMPLES:
  sheetcheck check book.xlsx -o checked.xlsx  # write to a copy
  sheetcheck check book.xlsx --in-place       # overwrite the input
  sheetcheck check book.xlsx --json -n        # JSON outcome, no write
  sheetcheck --config checker.yaml check book.xlsx")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML file overriding the built-in configuration
    #[arg(short, long, global = true, env = "SHEETCHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Name of the manifest sheet
    #[arg(short, long, global = true, env = "SHEETCHECK_SHEET")]
    sheet: Option<String>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check sheet references and annotate the manifest sheet
    Check {
        /// Path to the workbook (.xlsx)
        file: PathBuf,

        /// Write the annotated workbook here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite the input workbook (cell styles outside the highlight are lost)
        #[arg(long, conflicts_with = "output")]
        in_place: bool,

        /// Run the check without writing the workbook
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Print the run outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as YAML
    Config,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "sheetcheck=debug"
    } else {
        "sheetcheck=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Returns whether the run ended in a success outcome
fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = CheckerConfig::resolve(cli.config.as_deref(), cli.sheet)
        .context("Invalid configuration")?;

    match cli.command {
        Commands::Check {
            file,
            output,
            in_place,
            dry_run,
            json,
        } => {
            let outcome = cli::check(file.clone(), output, in_place, dry_run, json, &config)
                .with_context(|| format!("Check of {} aborted", file.display()))?;
            Ok(outcome.is_success())
        }

        Commands::Config => {
            cli::show_config(&config)?;
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
