//! Minimal HTML element tree — the boundary type between the document
//! pipeline and the label engine.
//!
//! The engine does not parse Markdown or HTML; the surrounding pipeline
//! hands it a tree of [`Element`]s, the engine mutates that tree (label
//! spans, classes, inline styles), and the pipeline serializes the result.
//! A small [`Element::to_html`] serializer is provided for pipelines and
//! tests that want string output directly.
//!
//! # Example
//!
//! ```
//! use ordo::dom::Element;
//!
//! let list = Element::new("ol")
//!     .with_child(Element::new("li").with_text("First"))
//!     .with_child(Element::new("li").with_text("Second"));
//! assert_eq!(list.to_html(), "<ol><li>First</li><li>Second</li></ol>");
//! ```

/// A child of an [`Element`]: either a nested element or a text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// One element in the document tree.
///
/// Attributes keep insertion order; `class` and `style` have dedicated
/// append helpers because the label engine only ever adds to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Element {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    // -- Fluent construction (pipelines and tests) ----------------------

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    // -- Attribute access -----------------------------------------------

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(existing) = self.attrs.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = value;
        } else {
            self.attrs.push((name, value));
        }
    }

    /// Append to the `class` attribute, space-separated.
    pub fn add_class(&mut self, class: &str) {
        match self.attr("class") {
            Some(existing) => {
                let merged = format!("{existing} {class}");
                self.set_attr("class", merged);
            }
            None => self.set_attr("class", class),
        }
    }

    /// Append a declaration to the `style` attribute, `;`-separated.
    pub fn append_style(&mut self, declaration: &str) {
        match self.attr("style") {
            Some(existing) => {
                let merged = format!("{existing};{declaration}");
                self.set_attr("style", merged);
            }
            None => self.set_attr("style", declaration),
        }
    }

    // -- Traversal ------------------------------------------------------

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// Concatenated text of this subtree, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => el.collect_text(out),
            }
        }
    }

    // -- Serialization --------------------------------------------------

    /// Serialize this subtree as an HTML fragment. Attribute values and
    /// text runs are escaped.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_html(value));
            out.push('"');
        }
        out.push('>');
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(&escape_html(text)),
                Node::Element(el) => el.write_html(out),
            }
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

/// Escape HTML special characters.
fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
