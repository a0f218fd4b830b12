//! Generic XML nodes.
//!
//! Vendor extensions and schema elements the model does not interpret are
//! kept as raw nodes and written back unchanged. The same tree type is what
//! the XML reader and writer exchange with the model layer.

use serde::{Deserialize, Serialize};

/// A node inside an element or a document prolog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum XmlNode {
    Element(XmlElement),
    /// Character data, unescaped.
    Text(String),
    Comment(String),
    ProcessingInstruction {
        /// PI target, e.g. `xml-stylesheet`.
        target: String,
        /// Everything after the target.
        data: String,
    },
}

impl XmlNode {
    /// The element inside this node, if it is one.
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlNode::Element(element) => Some(element),
            _ => None,
        }
    }
}

impl From<XmlElement> for XmlNode {
    fn from(element: XmlElement) -> Self {
        XmlNode::Element(element)
    }
}

/// An element with its qualified name, attributes in document order, and
/// children.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct XmlElement {
    /// Qualified name as written, e.g. `ipxact:field`.
    pub name: String,
    /// Attributes as `(qualified name, value)` pairs.
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order.
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        XmlElement {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create an element holding a single text node.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = XmlElement::new(name);
        element.children.push(XmlNode::Text(text.into()));
        element
    }

    /// Builder form of [`XmlElement::set_attribute`].
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Namespace prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Attribute value by qualified name, falling back to local name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .or_else(|| self.attributes.iter().find(|(key, _)| local_name(key) == name))
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing one with the same name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Concatenated text of the direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                XmlNode::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Child elements in order.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// First child element with the given local name.
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.elements().find(|element| element.local_name() == local)
    }

    /// Child elements with the given local name.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |element| element.local_name() == local)
    }

    /// Text of the first child element with the given local name.
    pub fn child_text(&self, local: &str) -> Option<String> {
        self.child(local).map(XmlElement::text)
    }

    /// Append a child element.
    pub fn push(&mut self, element: XmlElement) {
        self.children.push(XmlNode::Element(element));
    }

    /// Append a text child element when `text` is non-empty.
    pub fn push_text_element(&mut self, name: impl Into<String>, text: &str) {
        if !text.is_empty() {
            self.push(XmlElement::with_text(name, text));
        }
    }

    /// Whether the element has no attributes and no children.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty()
    }

    /// Structural equality that ignores attribute order and
    /// whitespace-only text nodes.
    pub fn equivalent(&self, other: &XmlElement) -> bool {
        if self.name != other.name {
            return false;
        }
        let mut mine = self.attributes.clone();
        let mut theirs = other.attributes.clone();
        mine.sort();
        theirs.sort();
        if mine != theirs {
            return false;
        }
        let significant = |node: &&XmlNode| !matches!(node, XmlNode::Text(t) if t.trim().is_empty());
        let mine: Vec<&XmlNode> = self.children.iter().filter(significant).collect();
        let theirs: Vec<&XmlNode> = other.children.iter().filter(significant).collect();
        mine.len() == theirs.len()
            && mine.iter().zip(&theirs).all(|(a, b)| match (a, b) {
                (XmlNode::Element(a), XmlNode::Element(b)) => a.equivalent(b),
                (XmlNode::Text(a), XmlNode::Text(b)) => a.trim() == b.trim(),
                (a, b) => a == b,
            })
    }
}

/// Strip the namespace prefix from a qualified name.
pub fn local_name(qualified: &str) -> &str {
    qualified
        .split_once(':')
        .map_or(qualified, |(_, local)| local)
}
