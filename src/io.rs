//! File collaborators used by the command line: CSV and document files,
//! default output names and input discovery.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::errors::{empty_dataset, io_error, ConvertError, ErrorKind};
use crate::pipeline::Conversion;
use crate::table::Row;

/// Which way a file is being converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// CSV in, document out.
    ToDocument,
    /// Document in, CSV out.
    ToTable,
}

impl Direction {
    /// Extension of the files this direction reads.
    pub const fn input_extension(self) -> &'static str {
        match self {
            Direction::ToDocument => "csv",
            Direction::ToTable => "xml",
        }
    }
}

// ============================================================================
// TEXT
// ============================================================================

/// Reads a file as UTF-8, dropping a leading BOM and replacing invalid bytes.
pub fn read_text(path: &Path) -> Result<String, ConvertError> {
    let bytes = fs::read(path).map_err(|err| io_error(path.display(), err))?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text.as_ref()).to_string())
}

pub fn write_text(path: &Path, text: &str) -> Result<(), ConvertError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| io_error(parent.display(), err))?;
    }
    fs::write(path, text).map_err(|err| io_error(path.display(), err))
}

pub fn read_document(path: &Path) -> Result<String, ConvertError> {
    read_text(path)
}

pub fn write_document(path: &Path, text: &str) -> Result<(), ConvertError> {
    write_text(path, text)
}

// ============================================================================
// TABLES
// ============================================================================

/// Reads a CSV file into rows, header first.
pub fn read_table(path: &Path) -> Result<Conversion<Vec<Row>>, ConvertError> {
    parse_table(&read_text(path)?)
}

/// Parses CSV text into rows, header first.
///
/// Records whose width differs from the header are padded with blank cells
/// or cut to the header width, with a `RowWidthMismatch` diagnostic. Every
/// record stays in place, so a row's position is its record number.
pub fn parse_table(content: &str) -> Result<Conversion<Vec<Row>>, ConvertError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(content.as_bytes());

    let mut rows: Vec<Row> = Vec::new();
    let mut diagnostics = Diagnostics::new();
    for (position, record) in reader.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let mut row: Row = record.iter().map(str::to_string).collect();

        if let Some(header) = rows.first() {
            if row.len() != header.len() {
                diagnostics.push(Diagnostic::RowWidthMismatch {
                    line: position + 1,
                    expected: header.len(),
                    found: row.len(),
                });
                row.resize(header.len(), String::new());
            }
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(ConvertError::new(ErrorKind::MissingHeaderRow));
    }
    if rows.len() < 2 {
        return Err(empty_dataset());
    }

    tracing::debug!(rows = rows.len(), "read table");
    Ok(Conversion {
        output: rows,
        testcases: 0,
        diagnostics,
    })
}

/// Writes rows as CSV with every cell quoted.
pub fn write_table(path: &Path, rows: &[Row]) -> Result<(), ConvertError> {
    write_text(path, &table_to_string(rows)?)
}

pub fn table_to_string(rows: &[Row]) -> Result<String, ConvertError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row).map_err(csv_error)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| csv_message(err.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn csv_error(err: csv::Error) -> ConvertError {
    csv_message(err.to_string()).with_cause(err)
}

fn csv_message(message: String) -> ConvertError {
    ConvertError::new(ErrorKind::Csv { message })
}

// ============================================================================
// PATHS
// ============================================================================

/// `cases.csv` becomes `cases_converted.xml`; `cases.xml` becomes `cases.csv`.
pub fn default_output_path(input: &Path, direction: Direction) -> PathBuf {
    match direction {
        Direction::ToDocument => {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            input.with_file_name(format!("{stem}_converted.xml"))
        }
        Direction::ToTable => input.with_extension("csv"),
    }
}

/// Expands directories into the files they contain with the direction's
/// input extension. Files named explicitly are kept as given.
pub fn discover_inputs(inputs: &[PathBuf], direction: Direction) -> Vec<PathBuf> {
    let extension = direction.input_extension();
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        let mut found: Vec<PathBuf> = WalkDir::new(input)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!(%err, "skipping unreadable directory entry");
                    None
                }
            })
            .filter(|e| {
                e.file_type().is_file()
                    && e.path()
                        .extension()
                        .map(|ext| ext.eq_ignore_ascii_case(extension))
                        .unwrap_or(false)
            })
            .map(|e| e.path().to_path_buf())
            .collect();
        found.sort();
        files.extend(found);
    }
    files
}
