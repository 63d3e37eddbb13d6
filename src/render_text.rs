//! Literal-text rendering backend.
//!
//! Computes labels at compile time and writes them into the tree as
//! `<span class="ordo-label">…</span>` elements, so the output needs no
//! stylesheet support beyond hiding native list markers on labelled
//! containers.

use crate::dom::{Element, Node};
use crate::{LABEL_CLASS, LABELLED_CLASS};

/// Insert the rendered label as the element's first child.
pub fn insert_label(element: &mut Element, label: &str) {
    let span = Element::new("span")
        .with_attr("class", LABEL_CLASS)
        .with_text(label);
    element.children.insert(0, Node::Element(span));
}

/// Mark a list container as labelled so stylesheets can suppress its
/// native markers.
pub fn mark_container(container: &mut Element) {
    container.add_class(LABELLED_CLASS);
}
