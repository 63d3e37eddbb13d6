//! `ordo` — hierarchical label and numbering engine for Markdown-to-HTML
//! document builds.
//!
//! A document pipeline hands `ordo` an element tree; `ordo` walks it once,
//! in document order, and labels headings and lists according to
//! template chains like `"H.1 ,*"` ("decimal, dot-separated, repeated for
//! every depth"). Labels are written either as literal text spans or as
//! generated CSS counter rules, and individual elements can override or
//! suppress their label with `data-label` / `data-label-none` directives.
//!
//! # Quick start
//!
//! ```
//! use ordo::{Element, LabelsConfig};
//!
//! let mut doc = Element::new("div")
//!     .with_child(Element::new("h1").with_text("Intro"))
//!     .with_child(Element::new("h1").with_text("Methods"));
//!
//! let mut config = LabelsConfig::default();
//! config.h_labels = Some("H.1 ,*".into());
//!
//! let output = ordo::apply(&mut doc, &config).unwrap();
//! assert!(output.css.is_empty()); // text mode: labels are in the tree
//! assert_eq!(
//!     doc.to_html(),
//!     "<div><h1><span class=\"ordo-label\">1 </span>Intro</h1>\
//!      <h1><span class=\"ordo-label\">2 </span>Methods</h1></div>"
//! );
//! ```

pub mod apply;
pub mod config;
pub mod counter;
pub mod dom;
pub mod labeller;
pub mod render_css;
pub mod render_text;
pub mod template;

pub use apply::{LabelOutput, apply};
pub use config::{ConfigValue, LabelsConfig, RenderMode};
pub use counter::CounterType;
pub use dom::{Element, Node};
pub use labeller::{Labeller, LabellerFactory};
pub use render_css::StylesheetSink;
pub use template::{LabelTemplate, ParentRef, TemplateChain, TemplateError, TemplateParser};

/// Class marking labelled list containers (suppresses native markers).
pub const LABELLED_CLASS: &str = "ordo-labelled";

/// Class of the generated label `<span>` in text rendering.
pub const LABEL_CLASS: &str = "ordo-label";

/// Class marking suppressed items, excluded from CSS counter selectors.
pub const NO_LABEL_CLASS: &str = "ordo-no-label";

/// Attribute carrying an explicit per-element template chain.
pub const LABEL_DIRECTIVE: &str = "data-label";

/// Attribute suppressing one element's label without disturbing its
/// siblings' numbering.
pub const NO_LABEL_DIRECTIVE: &str = "data-label-none";
