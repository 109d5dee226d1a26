//! Defines the command-line arguments and subcommands for the tlbridge CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::schema::LabelPreset;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "tlbridge",
    version,
    about = "Convert TestLink test cases between CSV and XML."
)]
pub struct TlbridgeArgs {
    #[command(subcommand)]
    pub command: Command,

    /// YAML configuration file (defaults to ./tlbridge.yaml when present).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Header label preset, overriding the configuration file.
    #[arg(long, global = true, value_enum)]
    pub labels: Option<LabelPreset>,

    /// How recoverable diagnostics are reported.
    #[arg(long, global = true, value_enum, default_value_t = DiagnosticsFormat::Text)]
    pub diagnostics: DiagnosticsFormat,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Silence logging.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert CSV files to TestLink XML.
    ToXml {
        /// CSV files, or directories searched for *.csv.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output file; only valid with a single input file.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Convert TestLink XML files to CSV.
    ToCsv {
        /// XML files, or directories searched for *.xml.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output file; only valid with a single input file.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Convert a CSV file to XML and back, and show what changed.
    Verify {
        /// The CSV file to check.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Run the text markup codec.
    Markup {
        #[command(subcommand)]
        action: MarkupAction,
    },
}

/// Direction of the `markup` subcommand.
#[derive(Debug, Subcommand)]
pub enum MarkupAction {
    /// Plain text to markup.
    Encode {
        /// Input file; reads stdin when omitted.
        file: Option<PathBuf>,
    },
    /// Markup to plain text.
    Decode {
        /// Input file; reads stdin when omitted.
        file: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DiagnosticsFormat {
    Text,
    Json,
}
