//! Document text to node tree, on top of `quick_xml`'s event reader.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::errors::{ConvertError, ErrorReporting, SourceContext};

use super::{Node, Tag};

/// Parses `text` into its document element.
///
/// Comments, processing instructions, the declaration and DOCTYPE are
/// skipped. An element keeps only the text that precedes its first child.
pub fn parse_document(text: &str, source_name: &str) -> Result<Node, ConvertError> {
    let source = SourceContext::from_file(source_name, text);
    let mut reader = Reader::from_str(text);
    reader.trim_text(false);

    let mut tree = TreeBuilder::default();
    loop {
        let offset = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let node = open_element(&e, &source, offset)?;
                tree.open(node, &source, offset)?;
            }
            Ok(Event::Empty(e)) => {
                let node = open_element(&e, &source, offset)?;
                tree.open(node, &source, offset)?;
                tree.close(&source, offset)?;
            }
            Ok(Event::End(_)) => tree.close(&source, offset)?,
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|err| {
                    source
                        .invalid_document(err.to_string(), offset)
                        .with_cause(err)
                })?;
                tree.text(&text, &source, offset)?;
            }
            Ok(Event::CData(e)) => {
                let raw = e.into_inner();
                tree.text(&String::from_utf8_lossy(&raw), &source, offset)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                let at = reader.buffer_position();
                return Err(source.invalid_document(err.to_string(), at).with_cause(err));
            }
        }
    }

    tree.finish(&source)
}

fn open_element(
    start: &BytesStart<'_>,
    source: &SourceContext,
    offset: usize,
) -> Result<Node, ConvertError> {
    let name = start.name();
    let mut node = Node::new(Tag::from_name(&String::from_utf8_lossy(name.as_ref())));

    for attr in start.attributes() {
        let attr = attr.map_err(|err| {
            source
                .invalid_document(err.to_string(), offset)
                .with_cause(err)
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|err| {
            source
                .invalid_document(err.to_string(), offset)
                .with_cause(err)
        })?;
        node.set_attr(key, value.into_owned());
    }
    Ok(node)
}

/// Stack of open elements plus the finished document element.
#[derive(Default)]
struct TreeBuilder {
    open: Vec<Node>,
    root: Option<Node>,
}

impl TreeBuilder {
    fn open(&mut self, node: Node, source: &SourceContext, offset: usize) -> Result<(), ConvertError> {
        if self.open.is_empty() && self.root.is_some() {
            return Err(source.invalid_document(
                format!("second document element '{}'", node.tag),
                offset,
            ));
        }
        self.open.push(node);
        Ok(())
    }

    fn close(&mut self, source: &SourceContext, offset: usize) -> Result<(), ConvertError> {
        let node = self
            .open
            .pop()
            .ok_or_else(|| source.invalid_document("closing tag without an open element", offset))?;
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root = Some(node),
        }
        Ok(())
    }

    fn text(&mut self, text: &str, source: &SourceContext, offset: usize) -> Result<(), ConvertError> {
        match self.open.last_mut() {
            Some(parent) => {
                if parent.children.is_empty() {
                    parent.text.push_str(text);
                }
                Ok(())
            }
            None if text.trim().is_empty() => Ok(()),
            None => Err(source.invalid_document("text outside the document element", offset)),
        }
    }

    fn finish(mut self, source: &SourceContext) -> Result<Node, ConvertError> {
        let end = source.content.len();
        if let Some(unclosed) = self.open.pop() {
            return Err(source.invalid_document(
                format!("unclosed element '{}'", unclosed.tag),
                end,
            ));
        }
        self.root
            .take()
            .ok_or_else(|| source.invalid_document("no document element", end))
    }
}
