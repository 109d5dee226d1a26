//! Recoverable conversion diagnostics.
//!
//! A diagnostic records a unit of input that was skipped or is incomplete.
//! Conversions collect them in order and return them next to their output;
//! how they are shown is up to the caller.

use std::fmt;

use serde::Serialize;

/// A single recoverable problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A data row had neither an ID nor a test case name.
    RowDroppedNoKey { line: usize },
    /// A row group could not become a test case.
    TestcaseBuildFailure { group_key: String, field: String },
    /// A step row has an empty action or expected result.
    StepDataMissing {
        group_key: String,
        step_number: String,
        line: usize,
    },
    /// A CSV record has a different cell count than the header and was
    /// padded or cut to fit it.
    RowWidthMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },
}

impl Diagnostic {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::RowDroppedNoKey { .. } => "row_dropped_no_key",
            Self::TestcaseBuildFailure { .. } => "testcase_build_failure",
            Self::StepDataMissing { .. } => "step_data_missing",
            Self::RowWidthMismatch { .. } => "row_width_mismatch",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowDroppedNoKey { line } => {
                write!(f, "line {line}: row has neither an ID nor a test case name, skipped")
            }
            Self::TestcaseBuildFailure { group_key, field } => {
                write!(f, "test case {group_key}: required field '{field}' is empty, skipped")
            }
            Self::StepDataMissing {
                group_key,
                step_number,
                line,
            } => write!(
                f,
                "line {line}: step {step_number} of {group_key} has an empty action or expected result"
            ),
            Self::RowWidthMismatch {
                line,
                expected,
                found,
            } => write!(
                f,
                "line {line}: {found} cells where the header has {expected}, fitted to the header"
            ),
        }
    }
}

/// Ordered collector of diagnostics for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(code = diagnostic.code(), "{diagnostic}");
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
