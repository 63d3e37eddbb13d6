//! Labellers: the stateful counting nodes behind every rendered label.
//!
//! A [`Labeller`] tracks one counting sequence within one hierarchical
//! path — "the `h2`s under the current `h1`", "the items of this nested
//! list". Rendering composes the parent chain from the root down, either
//! as literal text ([`Labeller::render_text`]) or as a CSS counter
//! expression ([`Labeller::render_counter_expr`]).
//!
//! The [`LabellerFactory`] deduplicates labellers by structural signature:
//! two elements whose template lineage is identical share the *same*
//! labeller instance, which is how a single running count spans sibling
//! elements without any global state in the driver. The factory owns the
//! labeller graph for one compilation pass and must be rebuilt per pass so
//! stylesheet-id allocation restarts deterministically.

use std::cell::{Cell, RefCell};
use std::collections::hash_map::Entry;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::counter::CounterType;
use crate::render_css::css_str;
use crate::template::LabelTemplate;

/// Prefix for generated stylesheet class / counter names.
const STYLESHEET_CLASS_PREFIX: &str = "ordo-label";

/// One counting sequence within one hierarchical path.
///
/// Created by [`LabellerFactory::get`]; mutated (count overwritten or
/// incremented, children reset) as the driver walks the document; lives
/// for the duration of one compilation pass.
#[derive(Debug)]
pub struct Labeller {
    element_type: String,
    template: LabelTemplate,
    parent: Option<Rc<Labeller>>,
    count: Cell<u32>,
    stylesheet_id: Option<u32>,
    children: RefCell<Vec<Weak<Labeller>>>,
}

impl Labeller {
    /// Construct a detached labeller. Most callers should go through
    /// [`LabellerFactory::get`] so that structural sharing applies.
    pub fn new(
        element_type: &str,
        template: LabelTemplate,
        parent: Option<Rc<Labeller>>,
        stylesheet_id: Option<u32>,
    ) -> Self {
        Labeller {
            element_type: element_type.to_ascii_lowercase(),
            template,
            parent,
            count: Cell::new(0),
            stylesheet_id,
            children: RefCell::new(Vec::new()),
        }
    }

    /// Canonical lowercase tag of the element kind this labeller counts.
    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    pub fn template(&self) -> &LabelTemplate {
        &self.template
    }

    pub fn parent(&self) -> Option<&Rc<Labeller>> {
        self.parent.as_ref()
    }

    pub fn count(&self) -> u32 {
        self.count.get()
    }

    pub fn set_count(&self, count: u32) {
        self.count.set(count);
    }

    pub fn increment(&self) {
        self.count.set(self.count.get() + 1);
    }

    /// Register a nested labeller for reset notification. No uniqueness
    /// check: avoiding duplicates is the caller's responsibility.
    pub fn add_child(&self, child: &Rc<Labeller>) {
        self.children.borrow_mut().push(Rc::downgrade(child));
    }

    /// Restart this labeller's counting scope: zero the counts of every
    /// registered descendant, then drop the registrations so stale
    /// counters cannot leak into the next subtree.
    pub fn reset_children(&self) {
        for child in self.children.borrow().iter() {
            if let Some(child) = child.upgrade() {
                child.set_count(0);
                child.reset_children();
            }
        }
        self.children.borrow_mut().clear();
    }

    /// Stylesheet class name (doubling as the CSS counter name), or `None`
    /// for labellers that only ever render as literal text.
    pub fn stylesheet_class(&self) -> Option<String> {
        self.stylesheet_id
            .map(|id| format!("{STYLESHEET_CLASS_PREFIX}{id}"))
    }

    /// Render the full label as literal text: `prefix + core + suffix`.
    pub fn render_text(&self) -> String {
        format!(
            "{}{}{}",
            self.template.prefix,
            self.text_core(),
            self.template.suffix
        )
    }

    /// The composed numbering core, root-to-self, without prefix/suffix.
    ///
    /// Each level contributes its own formatted count, joined to the level
    /// above by its own separator. Levels without a counter contribute
    /// neither a segment nor a separator; if *this* labeller has no
    /// counter the core is empty (only prefix/suffix survive).
    fn text_core(&self) -> String {
        if self.template.counter.is_none() {
            return String::new();
        }

        // Collected self-to-root, emitted root-to-self.
        let mut parts: Vec<(String, &str)> = Vec::new();
        let mut node: Option<&Labeller> = Some(self);
        while let Some(labeller) = node {
            if let Some(counter) = &labeller.template.counter {
                parts.push((
                    counter.format(labeller.count.get()),
                    labeller.template.separator.as_str(),
                ));
            }
            node = labeller.parent.as_deref();
        }

        let mut out = String::new();
        for index in (0..parts.len()).rev() {
            out.push_str(&parts[index].0);
            if index > 0 {
                out.push_str(parts[index - 1].1);
            }
        }
        out
    }

    /// Render the label as a CSS `content` expression equivalent to
    /// [`Labeller::render_text`], with `counter()` references for every
    /// level that has a stylesheet id. Levels without one embed their
    /// current literal core as a quoted string constant, allowing mixed
    /// static/dynamic composition (e.g. a text-rendered heading number
    /// inside a counter-rendered list label).
    pub fn render_counter_expr(&self) -> String {
        let mut tokens: Vec<String> = Vec::new();
        push_token(&mut tokens, css_str(&self.template.prefix));
        self.expr_core(&mut tokens);
        push_token(&mut tokens, css_str(&self.template.suffix));
        if tokens.is_empty() {
            // `content:` requires at least one value.
            return "\"\"".to_string();
        }
        tokens.join(" ")
    }

    fn expr_core(&self, tokens: &mut Vec<String>) {
        if self.template.counter.is_none() {
            return;
        }

        // Collected self-to-root; a static level swallows its whole
        // remaining ancestry as one quoted literal.
        let mut parts: Vec<(String, &str)> = Vec::new();
        let mut node: Option<&Labeller> = Some(self);
        while let Some(labeller) = node {
            let Some(counter) = &labeller.template.counter else {
                node = labeller.parent.as_deref();
                continue;
            };
            match (labeller.stylesheet_class(), counter.css_style()) {
                (Some(class), Some(style)) => {
                    parts.push((
                        format!("counter({class},{style})"),
                        labeller.template.separator.as_str(),
                    ));
                    node = labeller.parent.as_deref();
                }
                _ => {
                    parts.push((
                        css_str(&labeller.text_core()),
                        labeller.template.separator.as_str(),
                    ));
                    node = None;
                }
            }
        }

        for index in (0..parts.len()).rev() {
            push_token(tokens, parts[index].0.clone());
            if index > 0 {
                push_token(tokens, css_str(parts[index - 1].1));
            }
        }
    }
}

fn push_token(tokens: &mut Vec<String>, token: String) {
    if !token.is_empty() {
        tokens.push(token);
    }
}

/// Structural signature of one labeller: its own template surface plus the
/// counter types of the entire ancestor lineage. Signature equality is what
/// makes sibling elements share a labeller, and what keeps elements with
/// differing ancestries apart even when their own template matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LabellerKey {
    counter: Option<CounterType>,
    stylesheet: bool,
    prefix: String,
    suffix: String,
    lineage: Vec<(Option<CounterType>, String)>,
}

/// Compilation-pass-scoped cache of labellers keyed by structural
/// signature. Stylesheet ids are allocated monotonically from 0 and never
/// reused within a pass.
#[derive(Debug, Default)]
pub struct LabellerFactory {
    labellers: FxHashMap<LabellerKey, Rc<Labeller>>,
    next_stylesheet_id: u32,
}

impl LabellerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the labeller for a structural signature, creating it on first
    /// sight. On every call — hit or miss — the returned labeller's count
    /// is overwritten with `count`, and it is registered as a child of
    /// `parent` when one is given.
    pub fn get(
        &mut self,
        element_type: &str,
        template: &LabelTemplate,
        parent: Option<&Rc<Labeller>>,
        count: u32,
        stylesheet: bool,
    ) -> Rc<Labeller> {
        let mut lineage = Vec::new();
        let mut node: Option<&Labeller> = parent.map(Rc::as_ref);
        while let Some(ancestor) = node {
            lineage.push((ancestor.template.counter.clone(), template.separator.clone()));
            node = ancestor.parent.as_deref();
        }

        let key = LabellerKey {
            counter: template.counter.clone(),
            stylesheet,
            prefix: template.prefix.clone(),
            suffix: template.suffix.clone(),
            lineage,
        };

        let labeller = match self.labellers.entry(key) {
            Entry::Occupied(entry) => Rc::clone(entry.get()),
            Entry::Vacant(entry) => {
                let stylesheet_id = if stylesheet {
                    let id = self.next_stylesheet_id;
                    self.next_stylesheet_id += 1;
                    Some(id)
                } else {
                    None
                };
                trace!(element_type, ?stylesheet_id, "new labeller");
                let labeller = Rc::new(Labeller::new(
                    element_type,
                    template.clone(),
                    parent.cloned(),
                    stylesheet_id,
                ));
                Rc::clone(entry.insert(labeller))
            }
        };

        labeller.set_count(count);
        if let Some(parent) = parent {
            parent.add_child(&labeller);
        }
        labeller
    }
}
