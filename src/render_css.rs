//! Stylesheet-counter rendering backend.
//!
//! Instead of writing literal label text into the tree, this backend tags
//! list containers with generated classes and emits the CSS rules that make
//! the browser do the counting: `counter-reset` on the container,
//! `counter-increment` and `::before content` on its items. The
//! [`StylesheetSink`] collects rules for the document's generated
//! stylesheet, deduplicating so sibling containers that share a labeller
//! contribute their rules once.

use rustc_hash::FxHashSet;

use crate::labeller::Labeller;
use crate::{LABELLED_CLASS, NO_LABEL_CLASS};

/// Accumulates generated CSS rules, ignoring exact duplicates.
#[derive(Debug, Default)]
pub struct StylesheetSink {
    rules: String,
    seen: FxHashSet<String>,
}

impl StylesheetSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule unless the identical rule was already emitted.
    pub fn push(&mut self, rule: &str) {
        if self.seen.insert(rule.to_string()) {
            self.rules.push_str(rule);
            self.rules.push('\n');
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The accumulated stylesheet fragment, in emission order.
    pub fn finish(self) -> String {
        self.rules
    }
}

/// The rule that suppresses native list markers on labelled lists,
/// emitted once per stylesheet.
pub fn base_rule(sink: &mut StylesheetSink) {
    sink.push(&format!(".{LABELLED_CLASS}>li{{list-style-type:none;}}"));
}

/// Rules for a labelled list container: reset the container's counter,
/// increment it per item, and render the composed label before each item.
/// Counterless templates (plain bullets) skip the counter bookkeeping and
/// only emit the `content` rule.
pub fn container_rules(sink: &mut StylesheetSink, labeller: &Labeller) {
    let Some(class) = labeller.stylesheet_class() else {
        return;
    };
    if labeller.template().counter.is_some() {
        sink.push(&format!(".{class}{{counter-reset:{class};}}"));
        sink.push(&format!(
            ".{class}>li:not(.{NO_LABEL_CLASS}){{counter-increment:{class};}}"
        ));
    }
    sink.push(&format!(
        ".{class}>li:not(.{NO_LABEL_CLASS})::before{{content:{};}}",
        labeller.render_counter_expr()
    ));
}

/// Rules for a mid-list relabelling: from the overriding item onwards,
/// items carry the new labeller's class, count on the new counter and show
/// the new label. The selectors nest under the container class so they
/// out-cascade the container's own item rules.
pub fn item_override_rules(sink: &mut StylesheetSink, container_class: &str, labeller: &Labeller) {
    let Some(class) = labeller.stylesheet_class() else {
        return;
    };
    if labeller.template().counter.is_some() {
        sink.push(&format!(
            ".{container_class}>li.{class}{{counter-increment:{class};}}"
        ));
    }
    sink.push(&format!(
        ".{container_class}>li.{class}::before{{content:{};}}",
        labeller.render_counter_expr()
    ));
}

/// Quote a string as a CSS string literal, escaping `\` and `"`.
/// Empty strings produce an empty token so callers can omit them from
/// composed expressions.
pub(crate) fn css_str(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
