//! Node tree to document text.

use std::fmt::Write as _;

use super::Node;

pub const PROLOGUE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

const INDENT: &str = "\t";

/// Serializes `root` with the prologue, one element per line, tab indented.
///
/// Lines that end up whitespace-only are dropped; there is no trailing newline.
pub fn serialize(root: &Node) -> String {
    let mut body = String::new();
    write_node(root, 0, &mut body);

    let mut out = String::with_capacity(PROLOGUE.len() + body.len() + 1);
    out.push_str(PROLOGUE);
    for line in body.lines().filter(|line| !line.trim().is_empty()) {
        out.push('\n');
        out.push_str(line);
    }
    out
}

fn write_node(node: &Node, depth: usize, out: &mut String) {
    let indent = INDENT.repeat(depth);
    let tag = node.tag.as_str();

    out.push_str(&indent);
    out.push('<');
    out.push_str(tag);
    for (name, value) in &node.attributes {
        // Writing into a String cannot fail.
        let _ = write!(out, " {name}=\"{}\"", escape_attribute(value));
    }

    let has_children = !node.children.is_empty();
    let has_text = !node.text.trim().is_empty();
    if !has_children && !has_text {
        let _ = write!(out, "></{tag}>");
        return;
    }
    out.push('>');

    if !node.text.is_empty() {
        if node.tag.is_cdata_wrapped() && !has_children {
            write_cdata(&node.text, out);
        } else {
            out.push_str(&escape_text(&node.text));
        }
    }

    if has_children {
        out.push('\n');
        for child in &node.children {
            write_node(child, depth + 1, out);
            out.push('\n');
        }
        out.push_str(&indent);
    }
    let _ = write!(out, "</{tag}>");
}

fn write_cdata(text: &str, out: &mut String) {
    out.push_str("<![CDATA[");
    out.push_str(&text.replace("]]>", "]]]]><![CDATA[>"));
    out.push_str("]]>");
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Tag;

    #[test]
    fn empty_elements_are_explicit() {
        let root = Node::new(Tag::TestCases).with_child(Node::leaf(Tag::Status, "  "));
        assert_eq!(
            serialize(&root),
            format!("{PROLOGUE}\n<testcases>\n\t<status></status>\n</testcases>")
        );
    }

    #[test]
    fn long_text_is_wrapped_in_cdata() {
        let node = Node::leaf(Tag::Summary, "<p>a & b</p>");
        assert_eq!(
            serialize(&node),
            format!("{PROLOGUE}\n<summary><![CDATA[<p>a & b</p>]]></summary>")
        );
    }

    #[test]
    fn cdata_terminator_is_split() {
        let node = Node::leaf(Tag::Actions, "x ]]> y");
        let out = serialize(&node);
        assert!(out.ends_with("<actions><![CDATA[x ]]]]><![CDATA[> y]]></actions>"));
        // Exactly one literal terminator per CDATA section.
        assert_eq!(out.matches("<![CDATA[").count(), out.matches("]]>").count());
    }

    #[test]
    fn plain_text_and_attributes_are_escaped() {
        let node = Node::leaf(Tag::Version, "1 < 2 & \"q\"").with_attr("name", "a \"b\" <c>");
        let out = serialize(&node);
        assert!(out.ends_with(
            "<version name=\"a &quot;b&quot; &lt;c&gt;\">1 &lt; 2 &amp; \"q\"</version>"
        ));
    }

    #[test]
    fn nested_children_are_indented() {
        let root = Node::new(Tag::TestCases).with_child(
            Node::new(Tag::TestCase)
                .with_attr("name", "t")
                .with_child(Node::leaf(Tag::Version, "1"))
                .with_child(Node::new(Tag::Steps)),
        );
        let expected = [
            PROLOGUE,
            "<testcases>",
            "\t<testcase name=\"t\">",
            "\t\t<version>1</version>",
            "\t\t<steps></steps>",
            "\t</testcase>",
            "</testcases>",
        ]
        .join("\n");
        assert_eq!(serialize(&root), expected);
    }

    #[test]
    fn multiline_text_keeps_its_lines() {
        let node = Node::leaf(Tag::Summary, "<p>a</p>\n\n<p>b</p>");
        let out = serialize(&node);
        assert_eq!(out.lines().count(), 3);
        assert!(out.contains("<p>a</p>\n<p>b</p>"));
    }
}
