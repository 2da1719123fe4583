//! Serialize a [`Document`] back to XML text.

use super::tree::{Document, Element, Node};

/// Declaration written in front of every serialized document.
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#;

/// Serialize a document, starting with a UTF-8 XML declaration.
pub(crate) fn serialize(doc: &Document) -> String {
    let mut out = String::with_capacity(8192);
    out.push_str(XML_DECLARATION);
    for node in &doc.prolog {
        serialize_node(node, &mut out);
    }
    serialize_element(&doc.root, &mut out);
    for node in &doc.epilog {
        serialize_node(node, &mut out);
    }
    out
}

fn serialize_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(element) => serialize_element(element, out),
        Node::Text(text) => out.push_str(text),
        Node::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        Node::CData(text) => {
            out.push_str("<![CDATA[");
            out.push_str(text);
            out.push_str("]]>");
        }
        Node::Instruction(text) => {
            out.push_str("<?");
            out.push_str(text);
            out.push_str("?>");
        }
        Node::DocType(text) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(text);
            out.push('>');
        }
    }
}

fn serialize_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);

    for (key, value) in &element.attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        // Values from single-quoted attributes may hold a bare `"`
        if value.contains('"') {
            out.push_str(&value.replace('"', "&quot;"));
        } else {
            out.push_str(value);
        }
        out.push('"');
    }

    if element.children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in &element.children {
        serialize_node(child, out);
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}
