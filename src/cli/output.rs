//! Handles all user-facing output for the CLI.
//!
//! Results go to stdout, diagnostics to stderr (or stdout as JSON lines when
//! requested). Color is only used when stdout is a terminal.

use std::io::Write;
use std::path::Path;

use difference::{Changeset, Difference};
use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::diagnostics::{Diagnostic, Diagnostics};

use super::args::DiagnosticsFormat;

// ============================================================================
// CORE OUTPUT FUNCTIONS: User-facing CLI output utilities
// ============================================================================

/// Reports a finished file conversion.
pub fn print_converted(input: &Path, output: &Path, testcases: usize) {
    let mut stdout = StandardStream::stdout(color_choice());
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = write!(stdout, "converted");
    let _ = stdout.reset();
    let _ = writeln!(
        stdout,
        " {} -> {} ({} test case{})",
        input.display(),
        output.display(),
        testcases,
        if testcases == 1 { "" } else { "s" }
    );
}

/// Prints the diagnostics collected for one input file.
pub fn print_diagnostics(source: &Path, diagnostics: &Diagnostics, format: DiagnosticsFormat) {
    if diagnostics.is_empty() {
        return;
    }
    match format {
        DiagnosticsFormat::Text => print_text_diagnostics(source, diagnostics),
        DiagnosticsFormat::Json => print_json_diagnostics(source, diagnostics),
    }
}

/// Prints a line diff; returns whether anything differed.
pub fn print_changes(before: &str, after: &str) -> bool {
    let changeset = Changeset::new(before, after, "\n");
    let mut stdout = StandardStream::stdout(color_choice());
    print_diff(&mut stdout, &changeset.diffs);
    let _ = stdout.reset();
    changeset.distance != 0
}

/// One-line verdict for `verify`.
pub fn print_verdict(stable: bool) {
    let mut stdout = StandardStream::stdout(color_choice());
    let (color, text) = if stable {
        (Color::Green, "round trip preserved every test case and step")
    } else {
        (Color::Red, "round trip changed the table")
    };
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = writeln!(stdout, "{text}");
    let _ = stdout.reset();
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn color_choice() -> ColorChoice {
    if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

fn print_text_diagnostics(source: &Path, diagnostics: &Diagnostics) {
    let choice = if atty::is(atty::Stream::Stderr) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stderr = StandardStream::stderr(choice);
    for diagnostic in diagnostics {
        let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
        let _ = write!(stderr, "warning[{}]", diagnostic.code());
        let _ = stderr.reset();
        let _ = writeln!(stderr, " {}: {}", source.display(), diagnostic);
    }
}

#[derive(Serialize)]
struct DiagnosticReport<'a> {
    file: String,
    diagnostics: &'a [Diagnostic],
}

fn print_json_diagnostics(source: &Path, diagnostics: &Diagnostics) {
    let report = DiagnosticReport {
        file: source.display().to_string(),
        diagnostics: diagnostics.as_slice(),
    };
    match serde_json::to_string(&report) {
        Ok(line) => println!("{line}"),
        Err(err) => tracing::error!(%err, "could not serialize diagnostics"),
    }
}

fn print_diff(stdout: &mut StandardStream, diffs: &[Difference]) {
    for diff in diffs {
        match diff {
            Difference::Same(ref x) => {
                let _ = stdout.reset();
                for line in x.lines() {
                    let _ = writeln!(stdout, " {line}");
                }
            }
            Difference::Add(ref x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
                for line in x.lines() {
                    let _ = writeln!(stdout, "+{line}");
                }
            }
            Difference::Rem(ref x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
                for line in x.lines() {
                    let _ = writeln!(stdout, "-{line}");
                }
            }
        }
    }
}
