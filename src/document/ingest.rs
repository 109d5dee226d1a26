//! Document ingestion: locating the test-case container and flattening the
//! test cases below it into rows.

use std::collections::HashMap;

use crate::errors::ConvertError;
use crate::markup;
use crate::schema::{Field, Schema};
use crate::table::Row;

use super::{parse_document, Node, Tag};

/// How far into the text the container probes look, in characters.
const PROBE_WINDOW: usize = 200;

/// The element test cases are collected from, and its suite name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedRoot {
    pub root: Node,
    pub suite_name: String,
}

/// Parses `text` and picks the container element.
///
/// A `<testsuite ` or `<testcases>` tag near the start of the text means the
/// document element is the container, whatever its tag. Otherwise the first
/// `testsuite` descendant is used, then the first `testcases` descendant,
/// then the document element itself. The suite name is only taken from a
/// `testsuite` container.
pub fn locate_root(text: &str, source_name: &str) -> Result<LocatedRoot, ConvertError> {
    let head: String = text.chars().take(PROBE_WINDOW).collect();
    let document = parse_document(text, source_name)?;

    let root = if head.contains("<testsuite ") || head.contains("<testcases>") {
        document
    } else {
        select_descendant(document, &[Tag::TestSuite, Tag::TestCases])
    };

    let suite_name = match root.tag {
        Tag::TestSuite => root.attr("name").unwrap_or_default().to_string(),
        _ => String::new(),
    };
    tracing::debug!(root = %root.tag, suite = %suite_name, "located test case container");

    Ok(LocatedRoot { root, suite_name })
}

fn select_descendant(document: Node, tags: &[Tag]) -> Node {
    match tags.iter().find_map(|tag| document.path_to(tag)) {
        Some(path) => document.into_subtree(&path),
        None => document,
    }
}

/// Flattens every `testcase` below `root` into rows in standard column order,
/// followed by the schema's custom fields.
pub fn flatten(root: &Node, suite_name: &str, schema: &Schema) -> Vec<Row> {
    let mut rows = Vec::new();
    for testcase in root.descendants().filter(|node| node.tag == Tag::TestCase) {
        flatten_testcase(testcase, suite_name, schema, &mut rows);
    }
    tracing::debug!(rows = rows.len(), "flattened test cases");
    rows
}

fn flatten_testcase(testcase: &Node, suite_name: &str, schema: &Schema, rows: &mut Vec<Row>) {
    let mut base = vec![String::new(); Field::COUNT];
    let mut set = |field: Field, value: String| base[field.index()] = value;

    set(Field::Id, testcase.attr("internalid").unwrap_or_default().to_string());
    set(Field::TestCaseName, testcase.attr("name").unwrap_or_default().to_string());
    set(Field::ExternalId, child_text(testcase, &Tag::ExternalId));
    set(Field::Version, child_text(testcase, &Tag::Version));
    set(Field::Summary, markup::decode(&child_text(testcase, &Tag::Summary)));
    set(Field::Importance, child_text(testcase, &Tag::Importance));
    set(
        Field::Preconditions,
        markup::decode(&child_text(testcase, &Tag::Preconditions)),
    );
    set(
        Field::EstimatedDuration,
        child_text(testcase, &Tag::EstimatedExecDuration),
    );
    set(Field::Status, child_text(testcase, &Tag::Status));
    set(Field::Active, child_text(testcase, &Tag::Active));
    set(Field::Open, child_text(testcase, &Tag::IsOpen));
    set(Field::ParentSuite, suite_name.to_string());

    let custom = custom_values(testcase, schema);
    base.extend(custom);

    let steps: Vec<&Node> = testcase
        .child(&Tag::Steps)
        .map(|steps| steps.children_tagged(&Tag::Step).collect())
        .unwrap_or_default();

    if steps.is_empty() {
        let mut row = base;
        row[Field::ExecutionType.index()] = child_text(testcase, &Tag::ExecutionType);
        rows.push(row);
        return;
    }

    for step in steps {
        let mut row = base.clone();
        row[Field::StepNumber.index()] = child_text(step, &Tag::StepNumber);
        row[Field::Action.index()] = markup::decode(&child_text(step, &Tag::Actions));
        row[Field::ExpectedResult.index()] =
            markup::decode(&child_text(step, &Tag::ExpectedResults));
        row[Field::ExecutionType.index()] = child_text(step, &Tag::ExecutionType);
        rows.push(row);
    }
}

/// Declared custom-field values in declared order; unset ones are empty.
fn custom_values(testcase: &Node, schema: &Schema) -> Vec<String> {
    let mut found: HashMap<String, String> = HashMap::new();
    if let Some(container) = testcase.child(&Tag::CustomFields) {
        for field in container.children_tagged(&Tag::CustomField) {
            let name = child_text(field, &Tag::Name);
            if name.is_empty() {
                continue;
            }
            if !schema.custom_fields().contains(&name) {
                tracing::debug!(%name, "ignoring undeclared custom field");
                continue;
            }
            found.insert(name, child_text(field, &Tag::Value));
        }
    }

    schema
        .custom_fields()
        .iter()
        .map(|name| found.remove(name).unwrap_or_default())
        .collect()
}

/// Trimmed text of the first `tag` child with CDATA markers removed.
fn child_text(node: &Node, tag: &Tag) -> String {
    node.child(tag)
        .map(|child| markup::strip_cdata(child.text.trim()).trim().to_string())
        .unwrap_or_default()
}
