//! The tlbridge Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions. File access goes through `crate::io`; fatal
//! errors are rendered with miette and turn into exit status 1.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Command, DiagnosticsFormat, MarkupAction, TlbridgeArgs};
use crate::config::Config;
use crate::errors::{config_error, io_error, print_error, ConvertError};
use crate::io::{self as files, Direction};
use crate::markup;
use crate::pipeline::ConversionPipeline;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = TlbridgeArgs::parse();
    init_tracing(args.verbose, args.quiet);

    match dispatch(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            print_error(e);
            process::exit(1);
        }
    }
}

/// Runs the selected subcommand. `Ok(false)` means the command completed but
/// some input failed or `verify` found differences.
fn dispatch(args: &TlbridgeArgs) -> Result<bool, ConvertError> {
    match &args.command {
        Command::ToXml { inputs, output } => {
            let pipeline = build_pipeline(args)?;
            convert_all(inputs, output.as_deref(), Direction::ToDocument, |input, target| {
                convert_to_document(&pipeline, input, target, args.diagnostics)
            })
        }
        Command::ToCsv { inputs, output } => {
            let pipeline = build_pipeline(args)?;
            convert_all(inputs, output.as_deref(), Direction::ToTable, |input, target| {
                convert_to_table(&pipeline, input, target, args.diagnostics)
            })
        }
        Command::Verify { file } => verify(&build_pipeline(args)?, file, args.diagnostics),
        Command::Markup { action } => {
            let (file, encode) = match action {
                MarkupAction::Encode { file } => (file, true),
                MarkupAction::Decode { file } => (file, false),
            };
            let input = read_input(file.as_deref())?;
            let result = if encode {
                markup::encode(&input)
            } else {
                markup::decode(&input)
            };
            println!("{result}");
            Ok(true)
        }
    }
}

// ============================================================================
// SUBCOMMANDS
// ============================================================================

fn convert_all<F>(
    inputs: &[PathBuf],
    explicit_output: Option<&Path>,
    direction: Direction,
    mut convert: F,
) -> Result<bool, ConvertError>
where
    F: FnMut(&Path, &Path) -> Result<usize, ConvertError>,
{
    let paths = files::discover_inputs(inputs, direction);
    if explicit_output.is_some() && paths.len() != 1 {
        return Err(config_error(format!(
            "--output needs exactly one input file, found {}",
            paths.len()
        )));
    }
    if paths.is_empty() {
        tracing::warn!("no .{} files found", direction.input_extension());
    }

    let mut all_ok = true;
    for input in &paths {
        let target = explicit_output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| files::default_output_path(input, direction));
        match convert(input, &target) {
            Ok(testcases) => output::print_converted(input, &target, testcases),
            Err(e) => {
                print_error(e);
                all_ok = false;
            }
        }
    }
    Ok(all_ok)
}

fn convert_to_document(
    pipeline: &ConversionPipeline,
    input: &Path,
    target: &Path,
    format: DiagnosticsFormat,
) -> Result<usize, ConvertError> {
    let mut table = files::read_table(input)?;
    let conversion = pipeline.rows_to_document(&table.output)?;
    table.diagnostics.extend(conversion.diagnostics);
    output::print_diagnostics(input, &table.diagnostics, format);
    files::write_document(target, &conversion.output)?;
    Ok(conversion.testcases)
}

fn convert_to_table(
    pipeline: &ConversionPipeline,
    input: &Path,
    target: &Path,
    format: DiagnosticsFormat,
) -> Result<usize, ConvertError> {
    let text = files::read_document(input)?;
    let conversion = pipeline.document_to_rows_named(&text, &input.display().to_string())?;
    output::print_diagnostics(input, &conversion.diagnostics, format);
    files::write_table(target, &conversion.output)?;
    Ok(conversion.testcases)
}

fn verify(
    pipeline: &ConversionPipeline,
    file: &Path,
    format: DiagnosticsFormat,
) -> Result<bool, ConvertError> {
    let mut table = files::read_table(file)?;
    let round_trip = pipeline.round_trip(&table.output)?;
    table.diagnostics.extend(round_trip.diagnostics);
    output::print_diagnostics(file, &table.diagnostics, format);

    let before = pipeline.outline(&table.output)?.join("\n");
    let after = pipeline.outline(&round_trip.output)?.join("\n");
    let changed = output::print_changes(&before, &after);
    output::print_verdict(!changed);
    Ok(!changed)
}

// ============================================================================
// HELPERS
// ============================================================================

/// Builds the pipeline from configuration file and flags; flags win.
fn build_pipeline(args: &TlbridgeArgs) -> Result<ConversionPipeline, ConvertError> {
    let cwd = std::env::current_dir().map_err(|err| io_error(".", err))?;
    let mut config = Config::discover(args.config.as_deref(), &cwd)?;
    if let Some(labels) = args.labels {
        config.labels = labels;
    }
    Ok(ConversionPipeline::new(config.schema()))
}

fn read_input(file: Option<&Path>) -> Result<String, ConvertError> {
    match file {
        Some(path) => files::read_text(path),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|err| io_error("<stdin>", err))?;
            Ok(buffer)
        }
    }
}

/// Logs go to stderr. `RUST_LOG` wins over `-v`; `-q` turns logging off.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "off",
        (false, 0) => "error",
        (false, 1) => "warn",
        (false, 2) => "info",
        (false, 3) => "debug",
        (false, _) => "trace",
    };
    let filter = if quiet {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
