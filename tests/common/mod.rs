//! # tlbridge test fixtures
//!
//! Builders for header-aligned tables, shared by the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tlbridge::{Field, Row, Schema};

/// Builds a table with the full header of `schema`, one row at a time.
pub struct TableBuilder {
    header: Row,
    rows: Vec<Row>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::with_schema(&Schema::default())
    }

    pub fn with_schema(schema: &Schema) -> Self {
        Self {
            header: schema.header_row(),
            rows: Vec::new(),
        }
    }

    /// Appends a row; unnamed cells stay empty.
    pub fn row(mut self, cells: &[(Field, &str)]) -> Self {
        let mut row = vec![String::new(); self.header.len()];
        for (field, value) in cells {
            row[field.index()] = value.to_string();
        }
        self.rows.push(row);
        self
    }

    /// Sets a column looked up by header label on the last row.
    pub fn set(mut self, label: &str, value: &str) -> Self {
        let column = self
            .header
            .iter()
            .position(|cell| cell == label)
            .unwrap_or_else(|| panic!("no column labelled {label}"));
        let row = self.rows.last_mut().expect("set() needs a row");
        row[column] = value.to_string();
        self
    }

    pub fn build(self) -> Vec<Row> {
        let mut table = vec![self.header];
        table.extend(self.rows);
        table
    }
}

/// The login test case used across the suites: a header row and two steps.
pub fn login_table() -> Vec<Row> {
    TableBuilder::new()
        .row(&[
            (Field::Id, "7"),
            (Field::ExternalId, "TC-7"),
            (Field::TestCaseName, "Login"),
            (Field::Version, "3"),
            (Field::Summary, "Checks login\n\n\nwith a valid user"),
            (Field::Importance, "1"),
            (Field::Preconditions, "・user exists\n・app running"),
            (Field::Status, "1"),
        ])
        .set("AutomationEnabled", "yes")
        .row(&[
            (Field::Id, "7"),
            (Field::StepNumber, "1"),
            (Field::Action, "Open the login page"),
            (Field::ExpectedResult, "Form is shown"),
            (Field::ExecutionType, "1"),
        ])
        .row(&[
            (Field::Id, "7"),
            (Field::StepNumber, "2"),
            (Field::Action, "Submit credentials"),
            (Field::ExpectedResult, "Home page"),
            (Field::ExecutionType, "2"),
        ])
        .row(&[
            (Field::TestCaseName, "Logout"),
            (Field::Version, "1"),
            (Field::Summary, "Leaves"),
            (Field::Importance, "2"),
            (Field::ExecutionType, "1"),
        ])
        .build()
}

/// Writes `rows` as CSV into `dir` and returns the path.
pub fn write_csv(dir: &Path, name: &str, rows: &[Row]) -> PathBuf {
    let path = dir.join(name);
    tlbridge::io::write_table(&path, rows).expect("write fixture table");
    path
}
