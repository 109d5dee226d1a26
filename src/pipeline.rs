//! Conversion pipeline.
//!
//! Both directions take already materialized input (rows or document text)
//! and return the converted output with the diagnostics collected on the way.
//! Nothing here touches the file system.

use crate::diagnostics::Diagnostics;
use crate::document::{self, Node, Tag};
use crate::errors::{empty_dataset, ConvertError};
use crate::schema::{Field, Schema};
use crate::table::{self, group_rows, non_empty_cell, HeaderIndex, Row};

/// Output of one conversion plus what was skipped along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion<T> {
    pub output: T,
    /// Test cases written (rows to document) or read (document to rows).
    pub testcases: usize,
    pub diagnostics: Diagnostics,
}

/// Converts between rows and documents for one schema.
#[derive(Debug, Clone, Default)]
pub struct ConversionPipeline {
    schema: Schema,
}

impl ConversionPipeline {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Rows to document text. `rows[0]` is the header row.
    pub fn rows_to_document(&self, rows: &[Row]) -> Result<Conversion<String>, ConvertError> {
        let Conversion {
            output: root,
            testcases,
            diagnostics,
        } = self.rows_to_tree(rows)?;
        Ok(Conversion {
            output: document::serialize(&root),
            testcases,
            diagnostics,
        })
    }

    /// Rows to the `testcases` node tree, without serializing it.
    pub fn rows_to_tree(&self, rows: &[Row]) -> Result<Conversion<Node>, ConvertError> {
        if rows.len() < 2 {
            return Err(empty_dataset());
        }
        let index = HeaderIndex::resolve(&rows[0], &self.schema)?;

        let mut diagnostics = Diagnostics::new();
        let groups = group_rows(rows, &index, &mut diagnostics);

        let mut root = Node::new(Tag::TestCases);
        for group in &groups {
            if let Some(testcase) =
                table::build_testcase(group, &index, &self.schema, &mut diagnostics)
            {
                root.push(testcase);
            }
        }

        let testcases = root.children.len();
        tracing::debug!(
            groups = groups.len(),
            testcases,
            skipped = diagnostics.len(),
            "built test case tree"
        );
        Ok(Conversion {
            output: root,
            testcases,
            diagnostics,
        })
    }

    /// Document text to rows, header row first.
    pub fn document_to_rows(&self, text: &str) -> Result<Conversion<Vec<Row>>, ConvertError> {
        self.document_to_rows_named(text, "<document>")
    }

    /// Like `document_to_rows`, naming the source in error reports.
    pub fn document_to_rows_named(
        &self,
        text: &str,
        source_name: &str,
    ) -> Result<Conversion<Vec<Row>>, ConvertError> {
        let repaired = document::repair(text);
        let located = document::locate_root(&repaired, source_name)?;
        let testcases = located
            .root
            .descendants()
            .filter(|node| node.tag == Tag::TestCase)
            .count();

        let mut output = vec![self.schema.header_row()];
        output.extend(document::flatten(
            &located.root,
            &located.suite_name,
            &self.schema,
        ));
        Ok(Conversion {
            output,
            testcases,
            diagnostics: Diagnostics::new(),
        })
    }

    /// Rows to document and back again, in memory.
    pub fn round_trip(&self, rows: &[Row]) -> Result<Conversion<Vec<Row>>, ConvertError> {
        let forward = self.rows_to_document(rows)?;
        let mut back = self.document_to_rows(&forward.output)?;
        let mut diagnostics = forward.diagnostics;
        diagnostics.extend(back.diagnostics);
        back.diagnostics = diagnostics;
        Ok(back)
    }

    /// One line per test case and one per step, built from the columns that
    /// must survive a round trip unchanged: ID, Version, TestCaseName,
    /// Importance, StepNumber and ExecutionType.
    pub fn outline(&self, rows: &[Row]) -> Result<Vec<String>, ConvertError> {
        if rows.is_empty() {
            return Err(empty_dataset());
        }
        let index = HeaderIndex::resolve(&rows[0], &self.schema)?;
        let groups = group_rows(rows, &index, &mut Diagnostics::new());
        let value = |row: &[String], field: Field| {
            non_empty_cell(row, index.get(field))
                .unwrap_or_default()
                .to_string()
        };

        let mut lines = Vec::new();
        for group in &groups {
            let first = group.first().cells;
            let steps: Vec<_> = group
                .rows()
                .iter()
                .filter(|row| !value(row.cells, Field::StepNumber).is_empty())
                .collect();

            let mut line = format!(
                "{} | {} | {} | {}",
                value(first, Field::Id),
                value(first, Field::Version),
                value(first, Field::TestCaseName),
                value(first, Field::Importance),
            );
            if steps.is_empty() {
                line.push_str(&format!(" | {}", value(first, Field::ExecutionType)));
            }
            lines.push(line);

            for step in steps {
                lines.push(format!(
                    "    step {} | {}",
                    value(step.cells, Field::StepNumber),
                    value(step.cells, Field::ExecutionType),
                ));
            }
        }
        Ok(lines)
    }
}
