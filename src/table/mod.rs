//! Tabular side of the conversion: header resolution, row grouping and
//! building test-case trees from row groups.

pub mod builder;
pub mod group;
pub mod header;

pub use builder::build_testcase;
pub use group::{group_rows, GroupedRow, RowGroup};
pub use header::{resolve_optional, resolve_required, HeaderIndex};

/// One record of the table, cells in header order.
pub type Row = Vec<String>;

/// Trimmed cell at `index`, or `None` when the column is absent or the row is
/// too short to reach it.
pub(crate) fn cell(row: &[String], index: Option<usize>) -> Option<&str> {
    index.and_then(|i| row.get(i)).map(|value| value.trim())
}

/// Like `cell`, but absent and blank cells both read as `None`.
pub(crate) fn non_empty_cell(row: &[String], index: Option<usize>) -> Option<&str> {
    cell(row, index).filter(|value| !value.is_empty())
}
