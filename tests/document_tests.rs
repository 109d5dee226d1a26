//! Document serializing, repair and ingestion through the public API.

use tlbridge::document::{flatten, locate_root, parse_document, repair, serialize, Node, Tag};
use tlbridge::{ConversionPipeline, ErrorKind, Field, Schema};

fn testcase_with_steps(steps: usize) -> Node {
    let mut container = Node::new(Tag::Steps);
    for n in 1..=steps {
        container.push(
            Node::new(Tag::Step)
                .with_child(Node::leaf(Tag::StepNumber, n.to_string()))
                .with_child(Node::leaf(Tag::Actions, format!("<p>action {n}</p>")))
                .with_child(Node::leaf(Tag::ExpectedResults, format!("<p>result {n}</p>")))
                .with_child(Node::leaf(Tag::ExecutionType, "1")),
        );
    }
    Node::new(Tag::TestCase)
        .with_attr("name", "Search")
        .with_attr("internalid", "12")
        .with_child(Node::leaf(Tag::Version, "4"))
        .with_child(Node::leaf(Tag::Summary, "<p>Finds things</p>"))
        .with_child(Node::leaf(Tag::Importance, "3"))
        .with_child(container)
}

#[test]
fn two_steps_flatten_to_two_rows() {
    let root = Node::new(Tag::TestCases).with_child(testcase_with_steps(2));
    let rows = flatten(&root, "", &Schema::default());

    assert_eq!(rows.len(), 2);
    for field in [Field::Id, Field::Version, Field::TestCaseName, Field::Summary, Field::Importance] {
        assert_eq!(rows[0][field.index()], rows[1][field.index()], "{field:?}");
    }
    assert_eq!(rows[0][Field::StepNumber.index()], "1");
    assert_eq!(rows[1][Field::StepNumber.index()], "2");
    assert_eq!(rows[0][Field::Action.index()], "action 1");
    assert_eq!(rows[1][Field::ExpectedResult.index()], "result 2");
}

#[test]
fn testcase_without_steps_container_flattens_to_one_row() {
    let testcase = Node::new(Tag::TestCase)
        .with_attr("name", "Plain")
        .with_child(Node::leaf(Tag::ExecutionType, "2"));
    let root = Node::new(Tag::TestCases).with_child(testcase);
    let rows = flatten(&root, "Suite", &Schema::default());

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row[Field::ExecutionType.index()], "2");
    assert_eq!(row[Field::ParentSuite.index()], "Suite");
    for field in [Field::StepNumber, Field::Action, Field::ExpectedResult] {
        assert_eq!(row[field.index()], "");
    }
}

#[test]
fn repair_collapses_nested_blocks() {
    assert_eq!(
        repair("<![CDATA[ <![CDATA[hello]]> ]]>"),
        "<![CDATA[hello]]>"
    );
}

#[test]
fn serialized_cdata_stays_well_formed() {
    let root = Node::new(Tag::TestCases).with_child(
        Node::new(Tag::TestCase)
            .with_attr("name", "x")
            .with_child(Node::leaf(Tag::Summary, "a ]]> b")),
    );
    let text = serialize(&root);
    assert!(text.contains("<![CDATA[a ]]]]><![CDATA[> b]]>"));

    let parsed = parse_document(&text, "out.xml").unwrap();
    let summary = parsed.find_descendant(&Tag::Summary).unwrap();
    assert_eq!(summary.text, "a ]]> b");
}

#[test]
fn serialize_then_parse_preserves_the_tree() {
    let root = Node::new(Tag::TestCases).with_child(testcase_with_steps(3));
    let parsed = parse_document(&serialize(&root), "out.xml").unwrap();

    let steps = parsed.find_descendant(&Tag::Steps).unwrap();
    assert_eq!(steps.children.len(), 3);
    assert_eq!(
        parsed.find_descendant(&Tag::TestCase).unwrap().attr("internalid"),
        Some("12")
    );
}

#[test]
fn suite_root_names_every_row() {
    let text = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuite name="Checkout">
	<testcase name="Pay"><version>1</version><execution_type>1</execution_type></testcase>
	<testsuite name="Nested">
		<testcase name="Refund"><version>1</version><execution_type>2</execution_type></testcase>
	</testsuite>
</testsuite>"#;
    let located = locate_root(text, "suite.xml").unwrap();
    assert_eq!(located.suite_name, "Checkout");

    let rows = flatten(&located.root, &located.suite_name, &Schema::default());
    let names: Vec<_> = rows.iter().map(|r| r[Field::TestCaseName.index()].as_str()).collect();
    assert_eq!(names, ["Pay", "Refund"]);
    assert!(rows.iter().all(|r| r[Field::ParentSuite.index()] == "Checkout"));
}

#[test]
fn wrapped_document_is_found_by_fallback_search() {
    let text = format!(
        "<?xml version=\"1.0\"?>\n<!-- {} -->\n<export><meta/><testcases>\
         <testcase name=\"Deep\"><execution_type>1</execution_type></testcase>\
         </testcases></export>",
        "x".repeat(300)
    );
    let conversion = ConversionPipeline::default().document_to_rows(&text).unwrap();
    assert_eq!(conversion.output.len(), 2);
    assert_eq!(conversion.output[1][Field::TestCaseName.index()], "Deep");
    assert_eq!(conversion.output[1][Field::ParentSuite.index()], "");
}

#[test]
fn double_wrapped_export_is_repaired_before_parsing() {
    let text = "<testcases><testcase name=\"d\"><summary><![CDATA[<![CDATA[<p>hi</p>]]>]]></summary>\
                <execution_type>1</execution_type></testcase></testcases>";
    let conversion = ConversionPipeline::default().document_to_rows(text).unwrap();
    assert_eq!(conversion.output[1][Field::Summary.index()], "hi");
}

#[test]
fn truncated_document_is_invalid() {
    let err = ConversionPipeline::default()
        .document_to_rows("<testsuite name=\"cut\"><testcase name=\"a\"><version>1</ver")
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidDocument { .. }));
    assert_eq!(err.code(), "tlbridge::ingest::invalid_document");
}
