//! SVG parser producing a [`Document`].

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::WatermarkError;
use super::tree::{Document, Element, Node};

/// Parse an XML document into a node tree.
///
/// # Errors
///
/// Returns an error for malformed XML, mismatched or unclosed tags, a
/// missing root element, or text outside the root element.
pub(crate) fn parse(xml: &str) -> Result<Document, WatermarkError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut prolog = Vec::new();
    let mut epilog = Vec::new();
    let mut open: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let node = match reader.read_event()? {
            Event::Start(e) => {
                open.push(decode_element(&e)?);
                continue;
            }
            Event::Empty(e) => Node::Element(decode_element(&e)?),
            Event::End(_) => match open.pop() {
                Some(element) => Node::Element(element),
                None => return Err(WatermarkError::Malformed("unexpected end tag")),
            },
            Event::Text(e) => Node::Text(text(&e)),
            Event::GeneralRef(e) => Node::Text(format!("&{};", text(&e))),
            Event::CData(e) => Node::CData(text(&e)),
            Event::Comment(e) => Node::Comment(text(&e)),
            Event::PI(e) => Node::Instruction(text(&e)),
            Event::DocType(e) => Node::DocType(text(&e)),
            Event::Decl(_) => continue,
            Event::Eof => break,
        };

        if let Some(parent) = open.last_mut() {
            append(parent, node);
            continue;
        }

        match (node, root.is_some()) {
            (Node::Element(element), false) => root = Some(element),
            (Node::Element(_), true) => {
                return Err(WatermarkError::Malformed("more than one root element"));
            }
            (Node::Text(content), _) if !content.trim().is_empty() => {
                return Err(WatermarkError::Malformed("text outside root element"));
            }
            (node, false) => prolog.push(node),
            (node, true) => epilog.push(node),
        }
    }

    if !open.is_empty() {
        return Err(WatermarkError::Malformed("unclosed element"));
    }
    let root = root.ok_or(WatermarkError::Malformed("no root element"))?;

    Ok(Document {
        prolog,
        root,
        epilog,
    })
}

fn decode_element(e: &BytesStart) -> Result<Element, WatermarkError> {
    let mut element = Element::new(text(e.name().as_ref()));
    for attr in e.attributes() {
        let attr = attr?;
        element
            .attrs
            .push((text(attr.key.as_ref()), text(&attr.value)));
    }
    Ok(element)
}

/// Merge adjacent text so entity references stay inside their text run.
fn append(parent: &mut Element, node: Node) {
    if let (Node::Text(more), Some(Node::Text(existing))) = (&node, parent.children.last_mut()) {
        existing.push_str(more);
        return;
    }
    parent.children.push(node);
}

/// Input is `&str`, so every slice the reader hands out is valid UTF-8.
fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
