//! Hierarchical document model for TestLink XML.
//!
//! A document is a tree of `Node`s. Tags TestLink defines are a closed enum;
//! anything else is kept as `Tag::Other` so foreign elements survive parsing.

// ============================================================================
// IMPORTS
// ============================================================================

use std::fmt;

pub mod ingest;
pub mod parse;
pub mod repair;
pub mod serialize;

pub use ingest::{flatten, locate_root, LocatedRoot};
pub use parse::parse_document;
pub use repair::repair;
pub use serialize::serialize;

// ============================================================================
// TAGS
// ============================================================================

/// Element name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    TestSuite,
    TestCases,
    TestCase,
    ExternalId,
    Version,
    Summary,
    Preconditions,
    ExecutionType,
    Importance,
    EstimatedExecDuration,
    Status,
    IsOpen,
    Active,
    Steps,
    Step,
    StepNumber,
    Actions,
    ExpectedResults,
    CustomFields,
    CustomField,
    Name,
    Value,
    Details,
    Other(String),
}

impl Tag {
    pub fn from_name(name: &str) -> Self {
        match name {
            "testsuite" => Tag::TestSuite,
            "testcases" => Tag::TestCases,
            "testcase" => Tag::TestCase,
            "externalid" => Tag::ExternalId,
            "version" => Tag::Version,
            "summary" => Tag::Summary,
            "preconditions" => Tag::Preconditions,
            "execution_type" => Tag::ExecutionType,
            "importance" => Tag::Importance,
            "estimated_exec_duration" => Tag::EstimatedExecDuration,
            "status" => Tag::Status,
            "is_open" => Tag::IsOpen,
            "active" => Tag::Active,
            "steps" => Tag::Steps,
            "step" => Tag::Step,
            "step_number" => Tag::StepNumber,
            "actions" => Tag::Actions,
            "expectedresults" => Tag::ExpectedResults,
            "custom_fields" => Tag::CustomFields,
            "custom_field" => Tag::CustomField,
            "name" => Tag::Name,
            "value" => Tag::Value,
            "details" => Tag::Details,
            other => Tag::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Tag::TestSuite => "testsuite",
            Tag::TestCases => "testcases",
            Tag::TestCase => "testcase",
            Tag::ExternalId => "externalid",
            Tag::Version => "version",
            Tag::Summary => "summary",
            Tag::Preconditions => "preconditions",
            Tag::ExecutionType => "execution_type",
            Tag::Importance => "importance",
            Tag::EstimatedExecDuration => "estimated_exec_duration",
            Tag::Status => "status",
            Tag::IsOpen => "is_open",
            Tag::Active => "active",
            Tag::Steps => "steps",
            Tag::Step => "step",
            Tag::StepNumber => "step_number",
            Tag::Actions => "actions",
            Tag::ExpectedResults => "expectedresults",
            Tag::CustomFields => "custom_fields",
            Tag::CustomField => "custom_field",
            Tag::Name => "name",
            Tag::Value => "value",
            Tag::Details => "details",
            Tag::Other(name) => name,
        }
    }

    /// Long-text elements whose content is written as CDATA.
    pub fn is_cdata_wrapped(&self) -> bool {
        matches!(
            self,
            Tag::Summary | Tag::Preconditions | Tag::Actions | Tag::ExpectedResults | Tag::Details
        )
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// NODES
// ============================================================================

/// One element: tag, ordered attributes, leading text and owned children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub tag: Tag,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attributes: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// A childless element holding `text`.
    pub fn leaf(tag: Tag, text: impl Into<String>) -> Self {
        Self::new(tag).with_text(text)
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Sets an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First direct child with `tag`.
    pub fn child(&self, tag: &Tag) -> Option<&Node> {
        self.children.iter().find(|child| child.tag == *tag)
    }

    /// Direct children with `tag`, in order.
    pub fn children_tagged<'a>(&'a self, tag: &'a Tag) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |child| child.tag == *tag)
    }

    /// All nodes below this one in document order, excluding itself.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// First descendant with `tag` in document order.
    pub fn find_descendant(&self, tag: &Tag) -> Option<&Node> {
        self.descendants().find(|node| node.tag == *tag)
    }

    /// Child-index path to the first descendant with `tag`.
    pub fn path_to(&self, tag: &Tag) -> Option<Vec<usize>> {
        for (index, child) in self.children.iter().enumerate() {
            if child.tag == *tag {
                return Some(vec![index]);
            }
            if let Some(mut rest) = child.path_to(tag) {
                rest.insert(0, index);
                return Some(rest);
            }
        }
        None
    }

    /// Consumes the tree and returns the subtree at `path`. An index past the
    /// end stops the descent at the node reached so far.
    pub fn into_subtree(self, path: &[usize]) -> Node {
        path.iter().fold(self, |mut node, &index| {
            if index < node.children.len() {
                node.children.swap_remove(index)
            } else {
                node
            }
        })
    }
}

/// Pre-order iterator over a node's descendants.
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
