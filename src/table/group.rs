//! Row grouping.
//!
//! Data rows are gathered into groups keyed by ID, or by test case name when
//! the ID is blank. Groups keep the order in which their keys first appear.

use std::collections::HashMap;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::schema::Field;

use super::{non_empty_cell, HeaderIndex, Row};

/// A data row together with its 1-based position in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupedRow<'a> {
    pub line: usize,
    pub cells: &'a [String],
}

/// Rows that make up one test case. Only `group_rows` builds groups, and
/// never an empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowGroup<'a> {
    key: String,
    rows: Vec<GroupedRow<'a>>,
}

impl<'a> RowGroup<'a> {
    /// `ID_<id>` or `NAME_<name>`.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn rows(&self) -> &[GroupedRow<'a>] {
        &self.rows
    }

    /// The row supplying test-case level fields.
    pub fn first(&self) -> &GroupedRow<'a> {
        &self.rows[0]
    }
}

/// Groups the data rows of `rows`; `rows[0]` is the header and is skipped.
///
/// Rows with neither an ID nor a name are dropped with a `RowDroppedNoKey`
/// diagnostic.
pub fn group_rows<'a>(
    rows: &'a [Row],
    index: &HeaderIndex,
    diagnostics: &mut Diagnostics,
) -> Vec<RowGroup<'a>> {
    let mut groups: Vec<RowGroup<'a>> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (offset, row) in rows.iter().enumerate().skip(1) {
        let line = offset + 1;
        let Some(key) = group_key(row, index) else {
            diagnostics.push(Diagnostic::RowDroppedNoKey { line });
            continue;
        };

        let grouped = GroupedRow { line, cells: row };
        match positions.get(&key) {
            Some(&position) => groups[position].rows.push(grouped),
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push(RowGroup {
                    key,
                    rows: vec![grouped],
                });
            }
        }
    }

    tracing::debug!(groups = groups.len(), rows = rows.len().saturating_sub(1), "grouped rows");
    groups
}

fn group_key(row: &[String], index: &HeaderIndex) -> Option<String> {
    if let Some(id) = non_empty_cell(row, index.get(Field::Id)) {
        return Some(format!("ID_{id}"));
    }
    non_empty_cell(row, index.get(Field::TestCaseName)).map(|name| format!("NAME_{name}"))
}
