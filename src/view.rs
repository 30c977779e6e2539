//! Typed UI node trees.
//!
//! Region content is built as a [`Node`] tree instead of string templates.
//! Text and attribute values are escaped when the tree is serialised, so
//! backend-supplied strings can never inject markup.
#![allow(
    clippy::ref_patterns,
    reason = "node payloads are borrowed through dereferenced matches"
)]

use core::fmt::Write as _;

/// Elements serialised without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "meta", "link"];

/// A node in a UI tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element with attributes and children.
    Element(Element),
    /// A text run.
    Text(String),
}

impl Node {
    /// Creates a text node.
    #[inline]
    #[must_use]
    pub fn text<T: Into<String>>(text: T) -> Self {
        Self::Text(text.into())
    }

    /// Returns the element, if this node is one.
    #[inline]
    #[must_use]
    pub const fn as_element(&self) -> Option<&Element> {
        match *self {
            Self::Element(ref element) => Some(element),
            Self::Text(_) => None,
        }
    }

    /// Returns the element mutably, if this node is one.
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match *self {
            Self::Element(ref mut element) => Some(element),
            Self::Text(_) => None,
        }
    }

    /// Concatenated text of this node and all descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    /// Appends this subtree's text to `out`.
    fn collect_text(&self, out: &mut String) {
        match *self {
            Self::Text(ref text) => out.push_str(text),
            Self::Element(ref element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Finds the first element in this subtree with the given `id`.
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.as_element().and_then(|element| element.find_by_id(id))
    }

    /// Serialises the subtree as escaped HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    /// Appends this subtree's HTML to `out`.
    fn write_html(&self, out: &mut String) {
        match *self {
            Self::Text(ref text) => escape_into(out, text),
            Self::Element(ref element) => element.write_html(out),
        }
    }
}

impl From<Element> for Node {
    #[inline]
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<&str> for Node {
    #[inline]
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Node {
    #[inline]
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// An element: tag, ordered attributes and children.
///
/// # Examples
///
/// ```
/// use fintrack_rs::view::{Element, Node};
///
/// let node: Node = Element::new("p").class("lead").text("1 < 2").into();
/// assert_eq!(node.to_html(), r#"<p class="lead">1 &lt; 2</p>"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name.
    tag: &'static str,
    /// Attributes in insertion order.
    attrs: Vec<(String, String)>,
    /// Child nodes.
    children: Vec<Node>,
}

impl Element {
    /// Creates an empty element.
    #[inline]
    #[must_use]
    pub const fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Returns the tag name.
    #[inline]
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        self.tag
    }

    /// Returns the children.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Sets an attribute, replacing an existing one with the same name.
    #[must_use]
    pub fn attr<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.set_attr(name.into(), value.into());
        self
    }

    /// Sets the `id` attribute.
    #[inline]
    #[must_use]
    pub fn id<T: Into<String>>(self, id: T) -> Self {
        self.attr("id", id)
    }

    /// Adds space-separated classes to the `class` attribute.
    #[must_use]
    pub fn class(mut self, classes: &str) -> Self {
        let merged = match self.get_attr("class") {
            Some(existing) if !existing.is_empty() => format!("{existing} {classes}"),
            Some(_) | None => classes.to_owned(),
        };
        self.set_attr("class".to_owned(), merged);
        self
    }

    /// Appends a child.
    #[inline]
    #[must_use]
    pub fn child<N: Into<Node>>(mut self, child: N) -> Self {
        self.children.push(child.into());
        self
    }

    /// Appends several children.
    #[inline]
    #[must_use]
    pub fn children_from<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Appends a text child.
    #[inline]
    #[must_use]
    pub fn text<T: Into<String>>(self, text: T) -> Self {
        self.child(Node::Text(text.into()))
    }

    /// Returns an attribute value.
    #[must_use]
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|pair| pair.0 == name)
            .map(|pair| pair.1.as_str())
    }

    /// Returns the `id` attribute.
    #[inline]
    #[must_use]
    pub fn element_id(&self) -> Option<&str> {
        self.get_attr("id")
    }

    /// Whether the `class` attribute lists `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|name| name == class))
    }

    /// Finds the first element in this subtree (self included) with `id`.
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&Self> {
        if self.element_id() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_by_id(id))
    }

    /// Removes the first descendant element with `id`. Returns whether one
    /// was removed.
    pub fn remove_by_id(&mut self, id: &str) -> bool {
        if let Some(index) = self
            .children
            .iter()
            .position(|child| child.as_element().and_then(Self::element_id) == Some(id))
        {
            drop(self.children.remove(index));
            return true;
        }
        self.children.iter_mut().any(|child| match *child {
            Node::Element(ref mut element) => element.remove_by_id(id),
            Node::Text(_) => false,
        })
    }

    /// Iterates over every element in this subtree (self included),
    /// depth first.
    #[must_use]
    pub fn descendants(&self) -> Vec<&Self> {
        let mut out = vec![self];
        for child in &self.children {
            if let Node::Element(ref element) = *child {
                out.extend(element.descendants());
            }
        }
        out
    }

    /// Serialises the element as escaped HTML.
    #[inline]
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    /// Inserts or replaces an attribute.
    fn set_attr(&mut self, name: String, value: String) {
        if let Some(slot) = self.attrs.iter_mut().find(|pair| pair.0 == name) {
            slot.1 = value;
        } else {
            self.attrs.push((name, value));
        }
    }

    /// Appends this element's HTML to `out`.
    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        for (name, value) in &self.attrs {
            _ = write!(out, " {name}=\"");
            escape_into(out, value);
            out.push('"');
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&self.tag) {
            return;
        }
        for child in &self.children {
            child.write_html(out);
        }
        _ = write!(out, "</{}>", self.tag);
    }
}

/// Appends `text` to `out` with HTML special characters escaped.
fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
}

/// Escapes HTML special characters in `text`.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text);
    out
}
