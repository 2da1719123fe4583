//! Node tree for SVG documents.
//!
//! Text and attribute values are kept in their escaped source form, so
//! nodes the compositor does not touch serialize back byte for byte.

/// Element with ordered attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Element {
    /// Qualified tag name (`svg`, `g`, `svg:g`).
    pub name: String,
    /// Attributes in document order; values are raw (still escaped).
    pub attrs: Vec<(String, String)>,
    /// Child nodes in document order.
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Tag name without namespace prefix.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// Raw value of an attribute.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, keeping its position if it already exists.
    ///
    /// `value` is written as-is and must not need escaping.
    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => self.attrs.push((key.to_owned(), value)),
        }
    }

    /// Child elements, skipping text and markup nodes.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Mutable child elements.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }
}

/// Any node of the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Node {
    Element(Element),
    /// Character data, escaped.
    Text(String),
    /// Comment body without `<!--`/`-->`.
    Comment(String),
    /// CDATA body without its delimiters.
    CData(String),
    /// Processing instruction body without `<?`/`?>`.
    Instruction(String),
    /// Doctype body after `<!DOCTYPE `.
    DocType(String),
}

impl Node {
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// Parsed document: root element plus the markup around it.
///
/// The XML declaration is not kept; the serializer writes its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Document {
    pub prolog: Vec<Node>,
    pub root: Element,
    pub epilog: Vec<Node>,
}
