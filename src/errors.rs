//! tlbridge Error Handling
//!
//! Fatal errors abort a whole conversion. Every one of them is a `ConvertError`
//! carrying a typed `ErrorKind`, an optional source location inside the input
//! text, a stable diagnostic code and the underlying cause, if any.
//! Recoverable problems are not errors; see `crate::diagnostics`.

use std::{error::Error as StdError, fmt, sync::Arc};

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use thiserror::Error;

/// Boxed underlying cause kept for `Error::source`.
pub type Cause = Box<dyn StdError + Send + Sync + 'static>;

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// Named input text an error can point into.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    pub fn from_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Convert to NamedSource for use with miette error reporting
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

// ============================================================================
// ERROR KINDS
// ============================================================================

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("missing required header(s): {}", .names.join(", "))]
    MissingRequiredHeader { names: Vec<String> },

    #[error("the table has no data rows")]
    EmptyDataset,

    #[error("the table has no header row")]
    MissingHeaderRow,

    #[error("invalid document: {message}")]
    InvalidDocument {
        message: String,
        offset: Option<usize>,
    },

    #[error("cannot access '{path}': {message}")]
    Io { path: String, message: String },

    #[error("malformed CSV: {message}")]
    Csv { message: String },

    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl ErrorKind {
    /// Pipeline phase the error belongs to, used in diagnostic codes.
    pub const fn phase(&self) -> &'static str {
        match self {
            Self::MissingRequiredHeader { .. } | Self::MissingHeaderRow => "header",
            Self::EmptyDataset => "table",
            Self::InvalidDocument { .. } => "ingest",
            Self::Io { .. } | Self::Csv { .. } => "io",
            Self::Config { .. } => "config",
        }
    }

    /// Get error code suffix for diagnostic codes
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::MissingRequiredHeader { .. } => "missing_required_header",
            Self::EmptyDataset => "empty_dataset",
            Self::MissingHeaderRow => "missing_header_row",
            Self::InvalidDocument { .. } => "invalid_document",
            Self::Io { .. } => "io",
            Self::Csv { .. } => "csv",
            Self::Config { .. } => "config",
        }
    }

    fn default_help(&self) -> Option<String> {
        match self {
            Self::MissingRequiredHeader { .. } => Some(
                "header labels are matched exactly; pick the matching preset with --labels or override labels in the config file"
                    .into(),
            ),
            Self::EmptyDataset => Some("add at least one data row below the header".into()),
            Self::MissingHeaderRow => Some("the first CSV record must be the header row".into()),
            Self::InvalidDocument { .. } => {
                Some("the input must be a well-formed TestLink XML export".into())
            }
            Self::Io { .. } | Self::Csv { .. } | Self::Config { .. } => None,
        }
    }

    fn primary_label(&self) -> &'static str {
        match self {
            Self::InvalidDocument { .. } => "parsing failed here",
            _ => "here",
        }
    }
}

// ============================================================================
// CONVERT ERROR
// ============================================================================

/// Where in the input the error happened.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
}

/// Diagnostic enhancement data
#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

/// The single fatal error type.
#[derive(Debug)]
pub struct ConvertError {
    pub kind: ErrorKind,
    pub source_info: Option<SourceInfo>,
    pub diagnostic_info: DiagnosticInfo,
    cause: Option<Cause>,
}

impl ConvertError {
    pub fn new(kind: ErrorKind) -> Self {
        let diagnostic_info = DiagnosticInfo {
            help: kind.default_help(),
            error_code: format!("tlbridge::{}::{}", kind.phase(), kind.code_suffix()),
        };
        Self {
            kind,
            source_info: None,
            diagnostic_info,
            cause: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.diagnostic_info.help = Some(help.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn with_source(mut self, source: &SourceContext, span: SourceSpan) -> Self {
        self.source_info = Some(SourceInfo {
            source: source.to_named_source(),
            primary_span: span,
        });
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn code(&self) -> &str {
        &self.diagnostic_info.error_code
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl StdError for ConvertError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

impl Diagnostic for ConvertError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let info = self.source_info.as_ref()?;
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.kind.primary_label().to_string()),
            info.primary_span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.source_info
            .as_ref()
            .map(|info| &*info.source as &dyn miette::SourceCode)
    }
}

// ============================================================================
// CONSTRUCTORS
// ============================================================================

/// Context-aware error creation for code that works on a named input text.
pub trait ErrorReporting {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> ConvertError;

    fn invalid_document(&self, message: impl Into<String>, offset: usize) -> ConvertError {
        self.report(
            ErrorKind::InvalidDocument {
                message: message.into(),
                offset: Some(offset),
            },
            SourceSpan::from(offset..offset),
        )
    }
}

impl ErrorReporting for SourceContext {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> ConvertError {
        let span = clamp_span(span, self.content.len());
        ConvertError::new(kind).with_source(self, span)
    }
}

fn clamp_span(span: SourceSpan, len: usize) -> SourceSpan {
    let start = span.offset().min(len);
    let end = (span.offset() + span.len()).min(len);
    SourceSpan::from(start..end)
}

pub fn missing_required_header(names: Vec<String>) -> ConvertError {
    ConvertError::new(ErrorKind::MissingRequiredHeader { names })
}

pub fn empty_dataset() -> ConvertError {
    ConvertError::new(ErrorKind::EmptyDataset)
}

pub fn io_error(path: impl fmt::Display, cause: std::io::Error) -> ConvertError {
    ConvertError::new(ErrorKind::Io {
        path: path.to_string(),
        message: cause.to_string(),
    })
    .with_cause(cause)
}

pub fn config_error(message: impl Into<String>) -> ConvertError {
    ConvertError::new(ErrorKind::Config {
        message: message.into(),
    })
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Prints a ConvertError with full miette diagnostics
pub fn print_error(error: ConvertError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}
