//! Rows -> document -> rows through `ConversionPipeline`.

mod common;

use common::{login_table, TableBuilder};
use tlbridge::document::{parse_document, Tag};
use tlbridge::io::{parse_table, table_to_string};
use tlbridge::{
    ConversionPipeline, Diagnostic, ErrorKind, Field, LabelPreset, Row, Schema,
};

fn column(rows: &[Row], field: Field) -> Vec<&str> {
    rows.iter().skip(1).map(|r| r[field.index()].as_str()).collect()
}

#[test]
fn round_trip_preserves_identity_and_steps() {
    let pipeline = ConversionPipeline::default();
    let conversion = pipeline.round_trip(&login_table()).unwrap();
    let rows = &conversion.output;

    assert!(conversion.diagnostics.is_empty());
    assert_eq!(rows[0], Schema::default().header_row());
    assert_eq!(column(rows, Field::Id), ["7", "7", ""]);
    assert_eq!(column(rows, Field::Version), ["3", "3", "1"]);
    assert_eq!(column(rows, Field::Importance), ["1", "1", "2"]);
    assert_eq!(column(rows, Field::StepNumber), ["1", "2", ""]);
    assert_eq!(column(rows, Field::ExecutionType), ["1", "2", "1"]);
    assert_eq!(column(rows, Field::TestCaseName), ["Login", "Login", "Logout"]);
}

#[test]
fn round_trip_normalizes_long_text() {
    let conversion = ConversionPipeline::default()
        .round_trip(&login_table())
        .unwrap();
    let login = &conversion.output[1];
    assert_eq!(login[Field::Summary.index()], "Checks login\nwith a valid user");
    assert_eq!(login[Field::Preconditions.index()], "・user exists\n・app running");
    assert_eq!(login[Field::Action.index()], "Open the login page");
}

#[test]
fn custom_fields_survive_round_trip() {
    let conversion = ConversionPipeline::default()
        .round_trip(&login_table())
        .unwrap();
    let header = &conversion.output[0];
    let enabled = header.iter().position(|h| h == "AutomationEnabled").unwrap();
    let action = header.iter().position(|h| h == "AutomationAction").unwrap();

    assert_eq!(conversion.output[1][enabled], "yes");
    assert_eq!(conversion.output[2][enabled], "yes");
    assert_eq!(conversion.output[1][action], "");
    assert_eq!(conversion.output[3][enabled], "");
}

#[test]
fn keyless_rows_never_become_testcases() {
    let table = TableBuilder::new()
        .row(&[(Field::Summary, "no key at all"), (Field::Version, "1")])
        .row(&[
            (Field::TestCaseName, "Keyed"),
            (Field::Version, "1"),
            (Field::Summary, "s"),
            (Field::Importance, "2"),
            (Field::ExecutionType, "1"),
        ])
        .row(&[(Field::Action, "orphan step"), (Field::StepNumber, "1")])
        .build();

    let conversion = ConversionPipeline::default().rows_to_document(&table).unwrap();
    assert_eq!(conversion.testcases, 1);
    assert_eq!(
        conversion.diagnostics.into_vec(),
        vec![
            Diagnostic::RowDroppedNoKey { line: 2 },
            Diagnostic::RowDroppedNoKey { line: 4 },
        ]
    );
    assert!(!conversion.output.contains("no key at all"));
    assert!(!conversion.output.contains("orphan step"));
}

#[test]
fn step_rows_drop_testcase_execution_type() {
    let table = TableBuilder::new()
        .row(&[
            (Field::Id, "7"),
            (Field::TestCaseName, "T"),
            (Field::Version, "1"),
            (Field::Summary, "s"),
            (Field::Importance, "2"),
        ])
        .row(&[
            (Field::Id, "7"),
            (Field::StepNumber, "1"),
            (Field::Action, "a"),
            (Field::ExpectedResult, "b"),
        ])
        .row(&[
            (Field::Id, "7"),
            (Field::StepNumber, "2"),
            (Field::Action, "c"),
            (Field::ExpectedResult, "d"),
        ])
        .build();

    let conversion = ConversionPipeline::default().rows_to_tree(&table).unwrap();
    let testcase = &conversion.output.children[0];
    assert!(testcase.child(&Tag::ExecutionType).is_none());
    let steps = testcase.child(&Tag::Steps).unwrap();
    let numbers: Vec<_> = steps
        .children
        .iter()
        .map(|s| s.child(&Tag::StepNumber).unwrap().text.as_str())
        .collect();
    assert_eq!(numbers, ["1", "2"]);
}

#[test]
fn document_output_is_well_formed() {
    let conversion = ConversionPipeline::default()
        .rows_to_document(&login_table())
        .unwrap();
    assert!(conversion
        .output
        .starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testcases>"));
    let root = parse_document(&conversion.output, "generated.xml").unwrap();
    assert_eq!(root.tag, Tag::TestCases);
    assert_eq!(root.children.len(), 2);
}

#[test]
fn missing_headers_are_reported_together() {
    let table = vec![
        vec!["TestCaseName".to_string(), "Summary".to_string()],
        vec!["x".to_string(), "y".to_string()],
    ];
    let err = ConversionPipeline::default()
        .rows_to_document(&table)
        .unwrap_err();
    match err.kind {
        ErrorKind::MissingRequiredHeader { names } => assert_eq!(
            names,
            [
                "Version",
                "Importance",
                "StepNumber",
                "Action",
                "ExpectedResult",
                "ExecutionType"
            ]
        ),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn japanese_labels_round_trip() {
    let schema = Schema::new(LabelPreset::Japanese);
    let table = TableBuilder::with_schema(&schema)
        .row(&[
            (Field::Id, "1"),
            (Field::TestCaseName, "ログイン"),
            (Field::Version, "1"),
            (Field::Summary, "概要"),
            (Field::Importance, "2"),
            (Field::ExecutionType, "1"),
        ])
        .build();

    let pipeline = ConversionPipeline::new(schema.clone());
    let conversion = pipeline.round_trip(&table).unwrap();
    assert_eq!(conversion.output[0][3], "テストケース名");
    assert_eq!(conversion.output[1][Field::TestCaseName.index()], "ログイン");
    assert_eq!(conversion.output[1][Field::Summary.index()], "概要");
}

#[test]
fn outline_is_stable_across_round_trip() {
    let pipeline = ConversionPipeline::default();
    let table = login_table();
    let back = pipeline.round_trip(&table).unwrap();
    assert_eq!(pipeline.outline(&table).unwrap(), pipeline.outline(&back.output).unwrap());
}

#[test]
fn diagnostic_lines_are_csv_record_numbers() {
    let table = TableBuilder::new()
        .row(&[(Field::Summary, "keyless")])
        .row(&[
            (Field::TestCaseName, "Kept"),
            (Field::Version, "1"),
            (Field::Summary, "s"),
            (Field::Importance, "2"),
            (Field::ExecutionType, "1"),
        ])
        .build();
    let mut lines: Vec<String> = table_to_string(&table)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    lines.insert(1, "\"short\",\"row\"".to_string());
    let csv = lines.join("\n");

    let mut parsed = parse_table(&csv).unwrap();
    let conversion = ConversionPipeline::default()
        .rows_to_document(&parsed.output)
        .unwrap();
    parsed.diagnostics.extend(conversion.diagnostics);

    let width = table[0].len();
    assert_eq!(
        parsed.diagnostics.into_vec(),
        vec![
            Diagnostic::RowWidthMismatch {
                line: 2,
                expected: width,
                found: 2,
            },
            Diagnostic::RowDroppedNoKey { line: 3 },
            Diagnostic::TestcaseBuildFailure {
                group_key: "ID_short".into(),
                field: "TestCaseName".into(),
            },
        ]
    );
    assert_eq!(conversion.testcases, 1);
}
