//! Build-script configuration surface for the label engine.
//!
//! A [`LabelsConfig`] carries the default template chains per element kind
//! and the rendering mode. It deserializes straight out of the build
//! script's TOML:
//!
//! ```
//! let config: ordo::LabelsConfig = toml::from_str(r#"
//!     h_labels = "H.1 ,*"
//!     h_level = 1
//!     ol_labels = "L.1 ,*"
//!     render = "css"
//! "#).unwrap();
//! assert_eq!(config.h_level, 1);
//! ```
//!
//! Build scripts may also compute values at configuration time; the
//! [`ConfigValue`] variant keeps literal and computed settings apart and
//! resolves the latter exactly once, at the point of use.

use std::fmt;
use std::rc::Rc;

use serde::Deserialize;

/// A configuration value that is either written down or produced by a
/// build-script callback.
pub enum ConfigValue<T> {
    Literal(T),
    Computed(Rc<dyn Fn() -> T>),
}

impl<T: Clone> ConfigValue<T> {
    /// Construct a computed value from a callback.
    pub fn computed(f: impl Fn() -> T + 'static) -> Self {
        ConfigValue::Computed(Rc::new(f))
    }

    /// Resolve to a concrete value, invoking the callback if needed.
    pub fn resolve(&self) -> T {
        match self {
            ConfigValue::Literal(value) => value.clone(),
            ConfigValue::Computed(f) => f(),
        }
    }
}

impl<T> From<T> for ConfigValue<T> {
    fn from(value: T) -> Self {
        ConfigValue::Literal(value)
    }
}

impl From<&str> for ConfigValue<String> {
    fn from(value: &str) -> Self {
        ConfigValue::Literal(value.to_string())
    }
}

impl<T: Clone> Clone for ConfigValue<T> {
    fn clone(&self) -> Self {
        match self {
            ConfigValue::Literal(value) => ConfigValue::Literal(value.clone()),
            ConfigValue::Computed(f) => ConfigValue::Computed(Rc::clone(f)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ConfigValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            ConfigValue::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ConfigValue<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        T::deserialize(deserializer).map(ConfigValue::Literal)
    }
}

/// How labels reach the output document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Compute labels at build time and embed them as text spans.
    #[default]
    Text,
    /// Tag containers with generated classes and emit CSS counter rules;
    /// headings still receive text spans.
    Css,
}

/// Default template chains and rendering mode for one compilation pass.
///
/// `None` chains leave the corresponding element kind unlabelled unless a
/// per-element directive says otherwise.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LabelsConfig {
    /// Heading chain, applied at headings of level `h_level`.
    pub h_labels: Option<ConfigValue<String>>,
    /// Heading level at which `h_labels` kicks in (1–6).
    pub h_level: u8,
    /// Chain for topmost ordered lists.
    pub ol_labels: Option<ConfigValue<String>>,
    /// Chain for topmost unordered lists.
    pub ul_labels: Option<ConfigValue<String>>,
    pub render: RenderMode,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        LabelsConfig {
            h_labels: None,
            h_level: 1,
            ol_labels: None,
            ul_labels: None,
            render: RenderMode::Text,
        }
    }
}
