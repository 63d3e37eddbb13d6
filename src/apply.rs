//! The label-assignment driver: one depth-first, document-order pass over
//! the element tree.
//!
//! For every heading and list the driver resolves the applicable template
//! (explicit `data-label` directive, positional inheritance from the
//! enclosing chain, or the configured default), fetches the shared
//! labeller for that structural position from the factory, advances its
//! count, and renders — literal text spans, or generated classes plus CSS
//! counter rules, depending on [`RenderMode`]. Headings always render as
//! text; CSS counters cannot span sibling subtrees the way heading
//! numbering requires.
//!
//! The driver is strictly single-threaded and owns all mutable state for
//! one compilation pass; run one driver per document (or per variant
//! build) and discard it afterwards.

use std::rc::Rc;

use tracing::debug;

use crate::config::{LabelsConfig, RenderMode};
use crate::dom::{Element, Node};
use crate::labeller::{Labeller, LabellerFactory};
use crate::render_css::{self, StylesheetSink};
use crate::render_text;
use crate::template::{ParentRef, TemplateChain, TemplateError, TemplateParser};
use crate::{LABEL_DIRECTIVE, NO_LABEL_CLASS, NO_LABEL_DIRECTIVE};

/// What a labelling pass hands back to the document pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelOutput {
    /// Generated stylesheet fragment; empty in text mode.
    pub css: String,
}

/// Label every heading and list in the tree according to `config`.
///
/// Configured chains are parsed before the traversal starts, so
/// configuration errors surface first; malformed per-element directives
/// abort the pass with the same error type.
pub fn apply(root: &mut Element, config: &LabelsConfig) -> Result<LabelOutput, TemplateError> {
    debug!(mode = ?config.render, "labelling pass");
    let mut driver = Driver::new(config)?;
    driver.visit(root)?;
    Ok(LabelOutput {
        css: driver.sink.finish(),
    })
}

/// One entry of the scope stack: a labeller plus its position in the chain
/// it came from, so descendants can inherit positionally. Heading entries
/// record their level; list entries are popped when their subtree ends.
struct ScopeEntry {
    labeller: Rc<Labeller>,
    chain: Rc<TemplateChain>,
    index: usize,
    h_level: Option<u8>,
}

struct Driver {
    parser: TemplateParser,
    factory: LabellerFactory,
    stack: Vec<ScopeEntry>,
    sink: StylesheetSink,
    mode: RenderMode,
    h_chain: Option<Rc<TemplateChain>>,
    h_level: u8,
    ol_chain: Option<Rc<TemplateChain>>,
    ul_chain: Option<Rc<TemplateChain>>,
}

impl Driver {
    fn new(config: &LabelsConfig) -> Result<Self, TemplateError> {
        let mut parser = TemplateParser::new();
        let parse_chain = |parser: &mut TemplateParser,
                           value: &Option<crate::ConfigValue<String>>|
         -> Result<Option<Rc<TemplateChain>>, TemplateError> {
            value
                .as_ref()
                .map(|v| parser.parse(&v.resolve()))
                .transpose()
        };

        let h_chain = parse_chain(&mut parser, &config.h_labels)?;
        let ol_chain = parse_chain(&mut parser, &config.ol_labels)?;
        let ul_chain = parse_chain(&mut parser, &config.ul_labels)?;

        Ok(Driver {
            parser,
            factory: LabellerFactory::new(),
            stack: Vec::new(),
            sink: StylesheetSink::new(),
            mode: config.render,
            h_chain,
            h_level: config.h_level,
            ol_chain,
            ul_chain,
        })
    }

    fn visit(&mut self, element: &mut Element) -> Result<(), TemplateError> {
        let tag = element.tag.to_ascii_lowercase();
        if let Some(level) = heading_level(&tag) {
            self.visit_heading(element, level)
        } else if tag == "ol" || tag == "ul" {
            self.visit_list(element, &tag)
        } else {
            self.visit_children(element)
        }
    }

    fn visit_children(&mut self, element: &mut Element) -> Result<(), TemplateError> {
        for child in element.child_elements_mut() {
            self.visit(child)?;
        }
        Ok(())
    }

    // -- Headings -------------------------------------------------------

    fn visit_heading(&mut self, element: &mut Element, level: u8) -> Result<(), TemplateError> {
        // A heading at level N ends every deeper heading scope.
        while self
            .stack
            .last()
            .is_some_and(|e| e.h_level.is_some_and(|l| l > level))
        {
            self.stack.pop();
        }

        let directive = element.attr(LABEL_DIRECTIVE).map(str::to_owned);
        let suppress = element.has_attr(NO_LABEL_DIRECTIVE);

        let entry_index = match self.stack.iter().rposition(|e| e.h_level == Some(level)) {
            Some(index) => {
                if let Some(source) = &directive {
                    // An explicit directive on a sibling replaces the
                    // labeller (and the chain its descendants inherit).
                    let chain = self.parser.parse(source)?;
                    if let Some(template) = chain.level(0).cloned() {
                        let parent = self.stack[index].labeller.parent().cloned();
                        let labeller =
                            self.factory
                                .get(&element.tag, &template, parent.as_ref(), 0, false);
                        self.stack[index] = ScopeEntry {
                            labeller,
                            chain,
                            index: 0,
                            h_level: Some(level),
                        };
                    }
                }
                Some(index)
            }
            None => {
                let resolved = match &directive {
                    Some(source) => Some((self.parser.parse(source)?, 0)),
                    None => self.inherited_heading_chain(level),
                }
                .or_else(|| {
                    (level == self.h_level)
                        .then(|| self.h_chain.clone().map(|chain| (chain, 0)))
                        .flatten()
                });

                match resolved {
                    Some((chain, index)) => {
                        let Some(template) = chain.level(index).cloned() else {
                            return Ok(());
                        };
                        let parent = self.find_parent(template.parent);
                        let labeller =
                            self.factory
                                .get(&element.tag, &template, parent.as_ref(), 0, false);
                        self.stack.push(ScopeEntry {
                            labeller,
                            chain,
                            index,
                            h_level: Some(level),
                        });
                        Some(self.stack.len() - 1)
                    }
                    None => None,
                }
            }
        };

        if let Some(index) = entry_index {
            let labeller = self.stack[index].labeller.clone();
            if !suppress {
                labeller.increment();
                // A new sibling heading restarts everything nested
                // beneath the previous one.
                labeller.reset_children();
                render_text::insert_label(element, &labeller.render_text());
            }
        }

        // Headings are leaves as far as labelling is concerned.
        Ok(())
    }

    /// Positional inheritance for a heading: the heading one level
    /// shallower hands down the next link of its chain.
    fn inherited_heading_chain(&self, level: u8) -> Option<(Rc<TemplateChain>, usize)> {
        let entry = self
            .stack
            .iter()
            .rev()
            .find(|e| e.h_level == Some(level - 1))?;
        entry
            .chain
            .level(entry.index + 1)
            .is_some()
            .then(|| (entry.chain.clone(), entry.index + 1))
    }

    // -- Lists ----------------------------------------------------------

    fn visit_list(&mut self, element: &mut Element, tag: &str) -> Result<(), TemplateError> {
        let directive = element.attr(LABEL_DIRECTIVE).map(str::to_owned);

        let resolved = match &directive {
            Some(source) => Some((self.parser.parse(source)?, 0)),
            None => self.inherited_list_chain(tag),
        }
        .or_else(|| {
            // The configured chain applies to topmost lists only: any list
            // scope already on the stack means we are nested.
            let topmost = !self.stack.iter().any(|e| e.h_level.is_none());
            let configured = if tag == "ol" {
                &self.ol_chain
            } else {
                &self.ul_chain
            };
            topmost
                .then(|| configured.clone().map(|chain| (chain, 0)))
                .flatten()
        });

        let Some((chain, index)) = resolved else {
            return self.visit_children(element);
        };
        let Some(template) = chain.level(index).cloned() else {
            return self.visit_children(element);
        };

        let stylesheet = self.mode == RenderMode::Css;
        let parent = self.find_parent(template.parent);
        let mut current = self
            .factory
            .get(tag, &template, parent.as_ref(), 0, stylesheet);

        let mark = self.stack.len();
        self.stack.push(ScopeEntry {
            labeller: current.clone(),
            chain,
            index,
            h_level: None,
        });

        match self.mode {
            RenderMode::Text => render_text::mark_container(element),
            RenderMode::Css => {
                render_text::mark_container(element);
                if let Some(class) = current.stylesheet_class() {
                    element.add_class(&class);
                }
                render_css::base_rule(&mut self.sink);
                render_css::container_rules(&mut self.sink, &current);
            }
        }
        let container_class = current.stylesheet_class();

        // Items relabelled by a mid-list directive (and every item after
        // them) carry the new labeller's class in CSS mode.
        let mut override_class: Option<String> = None;

        for node in element.children.iter_mut() {
            let Node::Element(item) = node else { continue };
            if !item.tag.eq_ignore_ascii_case("li") {
                continue;
            }

            if let Some(source) = item.attr(LABEL_DIRECTIVE).map(str::to_owned) {
                let chain = self.parser.parse(&source)?;
                if let Some(template) = chain.level(0).cloned() {
                    let parent = current.parent().cloned();
                    let next = self
                        .factory
                        .get(tag, &template, parent.as_ref(), 0, stylesheet);
                    if stylesheet {
                        if let (Some(container_class), Some(class)) =
                            (&container_class, next.stylesheet_class())
                        {
                            render_css::item_override_rules(&mut self.sink, container_class, &next);
                            if next.template().counter.is_some() {
                                item.append_style(&format!("counter-reset:{class}"));
                            }
                            override_class = Some(class);
                        }
                    }
                    if let Some(last) = self.stack.last_mut() {
                        *last = ScopeEntry {
                            labeller: next.clone(),
                            chain,
                            index: 0,
                            h_level: None,
                        };
                    }
                    current = next;
                }
            }

            if item.has_attr(NO_LABEL_DIRECTIVE) {
                // Suppressed items render nothing and do not consume a
                // count; the class keeps them out of the CSS counter
                // selectors too.
                item.add_class(NO_LABEL_CLASS);
            } else {
                current.increment();
                match self.mode {
                    RenderMode::Text => {
                        render_text::insert_label(item, &current.render_text());
                    }
                    RenderMode::Css => {
                        if let Some(class) = &override_class {
                            item.add_class(class);
                        }
                    }
                }
            }

            self.visit_children(item)?;
        }

        // Drop this list's scope along with any heading scopes opened
        // inside it.
        self.stack.truncate(mark);
        Ok(())
    }

    /// Positional inheritance for a list: the nearest enclosing list of
    /// the same tag hands down the next link of its chain.
    fn inherited_list_chain(&self, tag: &str) -> Option<(Rc<TemplateChain>, usize)> {
        let entry = self
            .stack
            .iter()
            .rev()
            .find(|e| e.h_level.is_none() && e.labeller.element_type() == tag)?;
        entry
            .chain
            .level(entry.index + 1)
            .is_some()
            .then(|| (entry.chain.clone(), entry.index + 1))
    }

    // -- Shared ---------------------------------------------------------

    /// Find the nearest labeller on the stack matching a template's parent
    /// reference.
    fn find_parent(&self, parent: Option<ParentRef>) -> Option<Rc<Labeller>> {
        let parent = parent?;
        self.stack
            .iter()
            .rev()
            .find(|e| match parent {
                ParentRef::Any => true,
                ParentRef::List => matches!(e.labeller.element_type(), "ol" | "ul"),
                ParentRef::Heading(None) => heading_level(e.labeller.element_type()).is_some(),
                ParentRef::Heading(Some(wanted)) => {
                    heading_level(e.labeller.element_type()) == Some(wanted)
                }
            })
            .map(|e| e.labeller.clone())
    }
}

fn heading_level(tag: &str) -> Option<u8> {
    let mut chars = tag.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('h'), Some(digit), None) => {
            let level = digit.to_digit(10)?;
            (1..=6).contains(&level).then_some(level as u8)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LABEL_CLASS;
    use pretty_assertions::assert_eq;

    fn li(text: &str) -> Element {
        Element::new("li").with_text(text)
    }

    /// All rendered label texts, in document order.
    fn labels(root: &Element) -> Vec<String> {
        let mut out = Vec::new();
        collect_labels(root, &mut out);
        out
    }

    fn collect_labels(element: &Element, out: &mut Vec<String>) {
        if element.tag == "span" && element.attr("class") == Some(LABEL_CLASS) {
            out.push(element.text_content());
        }
        for child in element.child_elements() {
            collect_labels(child, out);
        }
    }

    fn text_config(ol: &str) -> LabelsConfig {
        LabelsConfig {
            ol_labels: Some(ol.into()),
            ..LabelsConfig::default()
        }
    }

    #[test]
    fn unconfigured_tree_is_left_untouched() {
        let mut tree = Element::new("div")
            .with_child(Element::new("h1").with_text("A"))
            .with_child(Element::new("ol").with_child(li("x")));
        let before = tree.clone();

        let output = apply(&mut tree, &LabelsConfig::default()).unwrap();
        assert_eq!(tree, before);
        assert_eq!(output.css, "");
    }

    #[test]
    fn sibling_items_share_a_running_count() {
        let mut tree = Element::new("ol")
            .with_child(li("a"))
            .with_child(li("b"))
            .with_child(li("c"));
        apply(&mut tree, &text_config("1.")).unwrap();
        assert_eq!(labels(&tree), ["1.", "2.", "3."]);
    }

    #[test]
    fn chain_without_wildcard_leaves_deeper_lists_unlabelled() {
        let mut tree = Element::new("ol").with_child(
            li("a").with_child(Element::new("ol").with_child(li("aa").with_child(
                Element::new("ol").with_child(li("aaa")),
            ))),
        );
        apply(&mut tree, &text_config("1.,(a)")).unwrap();
        // Two configured levels; the third list is beyond the chain.
        assert_eq!(labels(&tree), ["1.", "(a)"]);
    }

    #[test]
    fn suppressed_items_do_not_consume_counts() {
        let mut tree = Element::new("ol")
            .with_child(li("a"))
            .with_child(li("b").with_attr(NO_LABEL_DIRECTIVE, ""))
            .with_child(li("c"));
        apply(&mut tree, &text_config("1.")).unwrap();
        assert_eq!(labels(&tree), ["1.", "2."]);
    }

    #[test]
    fn item_directive_restarts_numbering_with_the_new_template() {
        let mut tree = Element::new("ol")
            .with_child(li("a"))
            .with_child(li("b"))
            .with_child(li("c").with_attr(LABEL_DIRECTIVE, "I."))
            .with_child(li("d"));
        apply(&mut tree, &text_config("1.")).unwrap();
        assert_eq!(labels(&tree), ["1.", "2.", "I.", "II."]);
    }

    #[test]
    fn list_directive_overrides_the_configured_chain() {
        let mut tree = Element::new("ol")
            .with_attr(LABEL_DIRECTIVE, "(a)")
            .with_child(li("x"))
            .with_child(li("y"));
        apply(&mut tree, &text_config("1.")).unwrap();
        assert_eq!(labels(&tree), ["(a)", "(b)"]);
    }

    #[test]
    fn configured_chain_skips_nested_lists_of_the_other_kind() {
        // A ul nested inside a labelled ol is not "topmost", so the
        // configured ul chain does not reach it.
        let mut config = text_config("1.");
        config.ul_labels = Some("•".into());
        let mut tree = Element::new("ol").with_child(
            li("a").with_child(Element::new("ul").with_child(li("inner"))),
        );
        apply(&mut tree, &config).unwrap();
        assert_eq!(labels(&tree), ["1."]);
    }

    #[test]
    fn unordered_bullets_rotate_by_depth() {
        let mut config = LabelsConfig::default();
        config.ul_labels = Some("▪,•".into());
        let mut tree = Element::new("ul")
            .with_child(li("a").with_child(Element::new("ul").with_child(li("aa"))))
            .with_child(li("b"));
        apply(&mut tree, &config).unwrap();
        assert_eq!(labels(&tree), ["▪", "•", "▪"]);
    }

    #[test]
    fn malformed_config_fails_before_traversal() {
        let mut tree = Element::new("ol").with_child(li("a"));
        let err = apply(&mut tree, &text_config("1.,zz.")).unwrap_err();
        assert!(matches!(err, TemplateError::UnknownCounterStyle { .. }));
        // The tree must not have been half-labelled.
        assert_eq!(labels(&tree), Vec::<String>::new());
    }

    #[test]
    fn malformed_item_directive_aborts_the_pass() {
        let mut tree = Element::new("ol")
            .with_child(li("a"))
            .with_child(li("b").with_attr(LABEL_DIRECTIVE, "??!1!zz"));
        let err = apply(&mut tree, &text_config("1.")).unwrap_err();
        assert!(matches!(err, TemplateError::Parse { .. }));
    }

    #[test]
    fn heading_levels_parse_strictly() {
        assert_eq!(heading_level("h1"), Some(1));
        assert_eq!(heading_level("h6"), Some(6));
        assert_eq!(heading_level("h7"), None);
        assert_eq!(heading_level("h12"), None);
        assert_eq!(heading_level("header"), None);
        assert_eq!(heading_level("p"), None);
    }
}
