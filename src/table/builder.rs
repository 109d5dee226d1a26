//! Turns one row group into a `testcase` node.
//!
//! The first row of a group supplies the test-case level fields. Every row
//! with a step number contributes one step, in row order.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::document::{Node, Tag};
use crate::markup;
use crate::schema::{Field, Schema};

use super::{cell, non_empty_cell, GroupedRow, HeaderIndex, RowGroup};

const DEFAULT_VERSION: &str = "1";
const DEFAULT_IMPORTANCE: &str = "2";
const DEFAULT_EXECUTION_TYPE: &str = "1";

/// Fields checked on the first row, in reporting order.
const MANDATORY: [Field; 5] = [
    Field::TestCaseName,
    Field::Version,
    Field::Summary,
    Field::Importance,
    Field::ExecutionType,
];

/// Builds the `testcase` node for `group`.
///
/// Returns `None` and records a `TestcaseBuildFailure` when a mandatory field
/// is empty. Steps with an empty action or expected result are still emitted
/// but reported as `StepDataMissing`.
pub fn build_testcase(
    group: &RowGroup<'_>,
    index: &HeaderIndex,
    schema: &Schema,
    diagnostics: &mut Diagnostics,
) -> Option<Node> {
    let first = group.first().cells;
    let has_steps = group
        .rows()
        .iter()
        .any(|row| non_empty_cell(row.cells, index.get(Field::StepNumber)).is_some());

    if let Some(field) = first_missing(first, index, has_steps) {
        diagnostics.push(Diagnostic::TestcaseBuildFailure {
            group_key: group.key().to_string(),
            field: schema.label(field).to_string(),
        });
        return None;
    }

    let text = |field: Field| cell(first, index.get(field)).unwrap_or_default();
    let optional = |field: Field| non_empty_cell(first, index.get(field));

    let mut testcase = Node::new(Tag::TestCase).with_attr("name", text(Field::TestCaseName));
    if let Some(id) = optional(Field::Id) {
        testcase.set_attr("internalid", id);
    }

    if let Some(external_id) = optional(Field::ExternalId) {
        testcase.push(Node::leaf(Tag::ExternalId, external_id));
    }
    testcase.push(Node::leaf(
        Tag::Version,
        cell(first, index.get(Field::Version)).unwrap_or(DEFAULT_VERSION),
    ));
    testcase.push(Node::leaf(Tag::Summary, markup::encode(text(Field::Summary))));
    testcase.push(Node::leaf(
        Tag::Preconditions,
        markup::encode(text(Field::Preconditions)),
    ));
    if !has_steps {
        testcase.push(Node::leaf(
            Tag::ExecutionType,
            optional(Field::ExecutionType).unwrap_or(DEFAULT_EXECUTION_TYPE),
        ));
    }
    testcase.push(Node::leaf(
        Tag::Importance,
        optional(Field::Importance).unwrap_or(DEFAULT_IMPORTANCE),
    ));

    for (field, tag) in [
        (Field::EstimatedDuration, Tag::EstimatedExecDuration),
        (Field::Status, Tag::Status),
        (Field::Open, Tag::IsOpen),
        (Field::Active, Tag::Active),
    ] {
        if let Some(value) = optional(field) {
            testcase.push(Node::leaf(tag, value));
        }
    }

    let mut steps = Node::new(Tag::Steps);
    for row in group.rows() {
        if let Some(step) = build_step(row, group.key(), index, diagnostics) {
            steps.push(step);
        }
    }
    testcase.push(steps);

    if let Some(custom_fields) = build_custom_fields(first, index) {
        testcase.push(custom_fields);
    }

    Some(testcase)
}

fn first_missing(first: &[String], index: &HeaderIndex, has_steps: bool) -> Option<Field> {
    MANDATORY.into_iter().find(|&field| {
        if field == Field::ExecutionType && has_steps {
            return false;
        }
        non_empty_cell(first, index.get(field)).is_none()
    })
}

fn build_step(
    row: &GroupedRow<'_>,
    group_key: &str,
    index: &HeaderIndex,
    diagnostics: &mut Diagnostics,
) -> Option<Node> {
    let step_number = non_empty_cell(row.cells, index.get(Field::StepNumber))?;
    let action = cell(row.cells, index.get(Field::Action)).unwrap_or_default();
    let expected = cell(row.cells, index.get(Field::ExpectedResult)).unwrap_or_default();

    if action.is_empty() || expected.is_empty() {
        diagnostics.push(Diagnostic::StepDataMissing {
            group_key: group_key.to_string(),
            step_number: step_number.to_string(),
            line: row.line,
        });
    }

    let execution_type = non_empty_cell(row.cells, index.get(Field::ExecutionType))
        .unwrap_or(DEFAULT_EXECUTION_TYPE);

    Some(
        Node::new(Tag::Step)
            .with_child(Node::leaf(Tag::StepNumber, step_number))
            .with_child(Node::leaf(Tag::Actions, markup::encode(action)))
            .with_child(Node::leaf(Tag::ExpectedResults, markup::encode(expected)))
            .with_child(Node::leaf(Tag::ExecutionType, execution_type)),
    )
}

fn build_custom_fields(first: &[String], index: &HeaderIndex) -> Option<Node> {
    let mut container = Node::new(Tag::CustomFields);
    for (name, position) in index.custom_fields() {
        if let Some(value) = non_empty_cell(first, *position) {
            container.push(
                Node::new(Tag::CustomField)
                    .with_child(Node::leaf(Tag::Name, name.as_str()))
                    .with_child(Node::leaf(Tag::Value, value)),
            );
        }
    }
    (!container.children.is_empty()).then_some(container)
}
