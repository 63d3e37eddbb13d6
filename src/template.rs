//! Label templates and the compact template-chain notation.
//!
//! A template chain describes how successive nesting levels of one element
//! kind are numbered. It is written as a comma-separated list of per-level
//! templates, optionally terminated by `*` ("repeat the last level for
//! unlimited depth"):
//!
//! ```text
//! H.1 ,*          headings: 1 , 1.1 , 1.2 , 2 , ...
//! 1.,(a),(i)      lists: 1.  then (a)  then (i), nothing deeper
//! "Chapter "1:    quoted literals may contain any character
//! ```
//!
//! Each level template is `prefix [ (parent separator)? counter suffix ]`.
//! `counter` is a counter-style name or one of the abbreviations `1`, `a`,
//! `A`, `i`, `I`. An optional parent reference before it (`X` for any
//! labelled ancestor, `L` for a list, `H` or `H1`–`H6` for a heading) pulls
//! the ancestor's core label in front of this level's own number, joined by
//! the separator literal. Unquoted literals are runs of characters that are
//! neither ASCII alphanumerics nor commas; quoted literals (`'…'` or `"…"`,
//! doubled quote to escape) admit everything.
//!
//! # Example
//!
//! ```
//! use ordo::template::TemplateParser;
//!
//! let mut parser = TemplateParser::new();
//! let chain = parser.parse("H.1 ,*").unwrap();
//! assert_eq!(chain.len(), 1);
//! assert!(chain.repeats());
//! assert_eq!(chain.level(0).unwrap().suffix, " ");
//! assert!(chain.level(7).is_some());
//! ```

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::counter::CounterType;

/// Which ancestor labeller a template pulls its parent segment from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentRef {
    /// `X` — the nearest labelled ancestor of any kind.
    Any,
    /// `L` — the nearest labelled list (`ol` or `ul`).
    List,
    /// `H` — the nearest labelled heading; `H3` — specifically an `h3`.
    Heading(Option<u8>),
}

/// How one nesting level renders its label.
///
/// Immutable once parsed. `counter == None` means the level has no
/// numbering: only `prefix` and `suffix` are rendered (used for plain
/// bullet markers and for `no-label` suppression).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelTemplate {
    pub counter: Option<CounterType>,
    pub prefix: String,
    /// Join string between the parent's rendering and this level's own.
    pub separator: String,
    pub suffix: String,
    pub parent: Option<ParentRef>,
}

impl LabelTemplate {
    fn literal(prefix: String) -> Self {
        LabelTemplate {
            counter: None,
            prefix,
            separator: String::new(),
            suffix: String::new(),
            parent: None,
        }
    }
}

/// A parsed template chain: one template per nesting depth, optionally
/// repeating the last one indefinitely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateChain {
    levels: Vec<LabelTemplate>,
    repeat_last: bool,
}

impl TemplateChain {
    /// The template for a 0-based nesting depth, or `None` once the chain
    /// is exhausted (no wildcard). A parsed chain always has at least one
    /// level, so `level(0)` is always `Some`.
    pub fn level(&self, depth: usize) -> Option<&LabelTemplate> {
        if depth < self.levels.len() {
            self.levels.get(depth)
        } else if self.repeat_last {
            self.levels.last()
        } else {
            None
        }
    }

    /// Number of explicitly written levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Whether the chain ends with the `*` wildcard.
    pub fn repeats(&self) -> bool {
        self.repeat_last
    }
}

/// Errors raised while parsing template-chain notation.
///
/// All variants carry the offending configuration string so the build
/// pipeline can point the user at the bad setting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("parse error in label template \"{template}\" at offset {offset}")]
    Parse { template: String, offset: usize },

    #[error("unknown counter style \"{style}\" in label template \"{template}\"")]
    UnknownCounterStyle { template: String, style: String },

    #[error("\"*\" must be the final element of the template chain \"{template}\"")]
    MisplacedWildcard { template: String },

    #[error("unterminated quoted literal in label template \"{template}\"")]
    UnterminatedQuote { template: String },
}

/// Parser for template-chain notation, caching parsed chains by source
/// string so repeated directives are parsed once per compilation pass.
#[derive(Debug, Default)]
pub struct TemplateParser {
    cache: FxHashMap<String, Rc<TemplateChain>>,
}

impl TemplateParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a template chain, returning a cached chain when the same
    /// source string was seen before.
    pub fn parse(&mut self, source: &str) -> Result<Rc<TemplateChain>, TemplateError> {
        if let Some(chain) = self.cache.get(source) {
            return Ok(chain.clone());
        }

        let segments = split_chain(source)?;
        let mut levels = Vec::new();
        let mut repeat_last = false;

        for (index, (offset, segment)) in segments.iter().enumerate() {
            if segment.trim() == "*" {
                if index + 1 != segments.len() || levels.is_empty() {
                    return Err(TemplateError::MisplacedWildcard {
                        template: source.to_string(),
                    });
                }
                repeat_last = true;
            } else {
                levels.push(parse_level(source, *offset, segment)?);
            }
        }

        let chain = Rc::new(TemplateChain {
            levels,
            repeat_last,
        });
        self.cache.insert(source.to_string(), chain.clone());
        Ok(chain)
    }
}

/// Split chain notation on commas, ignoring commas inside quoted literals.
/// Returns each segment with its character offset in the source.
fn split_chain(source: &str) -> Result<Vec<(usize, String)>, TemplateError> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut start = 0usize;
    let mut quote: Option<char> = None;

    for (pos, c) in source.chars().enumerate() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    current.push(c);
                }
                ',' => {
                    segments.push((start, std::mem::take(&mut current)));
                    start = pos + 1;
                }
                _ => current.push(c),
            },
        }
    }
    if quote.is_some() {
        return Err(TemplateError::UnterminatedQuote {
            template: source.to_string(),
        });
    }
    segments.push((start, current));
    Ok(segments)
}

/// Parse one level template out of a chain segment.
fn parse_level(source: &str, base: usize, segment: &str) -> Result<LabelTemplate, TemplateError> {
    let chars: Vec<char> = segment.chars().collect();
    let mut pos = 0;

    while pos < chars.len() && chars[pos].is_whitespace() {
        pos += 1;
    }

    let prefix = scan_literal(source, &chars, &mut pos)?;
    if pos == chars.len() {
        return Ok(LabelTemplate::literal(prefix));
    }

    // Optional parent reference. `X`, `L` and `H` never begin a counter
    // style name, so a single-character lookahead is unambiguous.
    let parent = match chars[pos] {
        'X' => {
            pos += 1;
            Some(ParentRef::Any)
        }
        'L' => {
            pos += 1;
            Some(ParentRef::List)
        }
        'H' => {
            pos += 1;
            let level = chars.get(pos).and_then(|c| c.to_digit(10)).and_then(|d| {
                (1..=6).contains(&d).then(|| {
                    pos += 1;
                    d as u8
                })
            });
            Some(ParentRef::Heading(level))
        }
        _ => None,
    };

    let separator = if parent.is_some() {
        scan_literal(source, &chars, &mut pos)?
    } else {
        String::new()
    };

    let name_start = pos;
    while pos < chars.len() && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '-') {
        pos += 1;
    }
    if name_start == pos {
        return Err(TemplateError::Parse {
            template: source.to_string(),
            offset: base + pos,
        });
    }
    let name: String = chars[name_start..pos].iter().collect();
    let counter =
        CounterType::from_name(&name).ok_or_else(|| TemplateError::UnknownCounterStyle {
            template: source.to_string(),
            style: name,
        })?;

    let suffix = scan_literal(source, &chars, &mut pos)?;
    if pos != chars.len() {
        return Err(TemplateError::Parse {
            template: source.to_string(),
            offset: base + pos,
        });
    }

    Ok(LabelTemplate {
        counter: Some(counter),
        prefix,
        separator,
        suffix,
        parent,
    })
}

/// Scan a (possibly quoted) literal run. Stops at ASCII alphanumerics and
/// commas outside quotes; doubled quotes inside a quoted run escape the
/// quote character itself.
fn scan_literal(
    source: &str,
    chars: &[char],
    pos: &mut usize,
) -> Result<String, TemplateError> {
    let mut out = String::new();
    while *pos < chars.len() {
        let c = chars[*pos];
        if c == '\'' || c == '"' {
            *pos += 1;
            loop {
                match chars.get(*pos) {
                    None => {
                        return Err(TemplateError::UnterminatedQuote {
                            template: source.to_string(),
                        });
                    }
                    Some(&q) if q == c => {
                        if chars.get(*pos + 1) == Some(&c) {
                            out.push(c);
                            *pos += 2;
                        } else {
                            *pos += 1;
                            break;
                        }
                    }
                    Some(&other) => {
                        out.push(other);
                        *pos += 1;
                    }
                }
            }
        } else if c.is_ascii_alphanumeric() || c == ',' {
            break;
        } else {
            out.push(c);
            *pos += 1;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Rc<TemplateChain> {
        TemplateParser::new().parse(source).unwrap()
    }

    #[test]
    fn heading_chain_with_wildcard() {
        let chain = parse("H.1 ,*");
        assert_eq!(chain.len(), 1);
        assert!(chain.repeats());

        let level = chain.level(0).unwrap();
        assert_eq!(level.counter, Some(CounterType::Decimal));
        assert_eq!(level.prefix, "");
        assert_eq!(level.separator, ".");
        assert_eq!(level.suffix, " ");
        assert_eq!(level.parent, Some(ParentRef::Heading(None)));

        // Wildcard: deeper levels reuse the last explicit template.
        assert_eq!(chain.level(5), chain.level(0));
    }

    #[test]
    fn list_chain_with_three_levels() {
        let chain = parse("1.,(a),(i)");
        assert_eq!(chain.len(), 3);
        assert!(!chain.repeats());

        let first = chain.level(0).unwrap();
        assert_eq!(first.counter, Some(CounterType::Decimal));
        assert_eq!(first.suffix, ".");
        assert_eq!(first.parent, None);

        let second = chain.level(1).unwrap();
        assert_eq!(second.counter, Some(CounterType::LowerAlpha));
        assert_eq!(second.prefix, "(");
        assert_eq!(second.suffix, ")");

        let third = chain.level(2).unwrap();
        assert_eq!(third.counter, Some(CounterType::LowerRoman));

        // No wildcard: the chain is exhausted beyond its last level.
        assert_eq!(chain.level(3), None);
    }

    #[test]
    fn parent_references() {
        assert_eq!(parse("X.1").level(0).unwrap().parent, Some(ParentRef::Any));
        assert_eq!(parse("L.1").level(0).unwrap().parent, Some(ParentRef::List));
        assert_eq!(
            parse("H3-1").level(0).unwrap().parent,
            Some(ParentRef::Heading(Some(3)))
        );
        assert_eq!(parse("H3-1").level(0).unwrap().separator, "-");
    }

    #[test]
    fn counter_style_full_names() {
        let chain = parse("lower-roman.");
        assert_eq!(chain.level(0).unwrap().counter, Some(CounterType::LowerRoman));
        assert_eq!(chain.level(0).unwrap().suffix, ".");
    }

    #[test]
    fn bullet_chain_is_prefix_only() {
        let chain = parse("▪,•,◦");
        assert_eq!(chain.len(), 3);
        let first = chain.level(0).unwrap();
        assert_eq!(first.counter, None);
        assert_eq!(first.prefix, "▪");
        assert_eq!(first.suffix, "");
    }

    #[test]
    fn quoted_prefix_admits_alphanumerics() {
        let chain = parse("\"Chapter \"1:");
        let level = chain.level(0).unwrap();
        assert_eq!(level.prefix, "Chapter ");
        assert_eq!(level.counter, Some(CounterType::Decimal));
        assert_eq!(level.suffix, ":");
    }

    #[test]
    fn doubled_quote_escapes_the_quote() {
        let chain = parse("'it''s '1");
        assert_eq!(chain.level(0).unwrap().prefix, "it's ");
    }

    #[test]
    fn quoted_literal_protects_commas() {
        let chain = parse("'a, b'1");
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.level(0).unwrap().prefix, "a, b");
    }

    #[test]
    fn leading_whitespace_is_skipped_trailing_binds_to_suffix() {
        let chain = parse("1., (a) ");
        assert_eq!(chain.level(1).unwrap().prefix, "(");
        assert_eq!(chain.level(1).unwrap().suffix, ") ");
    }

    #[test]
    fn empty_template_is_all_literal() {
        let chain = parse("");
        assert_eq!(chain.len(), 1);
        let level = chain.level(0).unwrap();
        assert_eq!(level.counter, None);
        assert_eq!(level.prefix, "");
    }

    #[test]
    fn unknown_counter_style_is_rejected() {
        let err = TemplateParser::new().parse("z.").unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnknownCounterStyle {
                template: "z.".to_string(),
                style: "z".to_string(),
            }
        );
        assert!(err.to_string().contains("z."));
    }

    #[test]
    fn parent_without_counter_is_rejected() {
        let err = TemplateParser::new().parse("L.").unwrap_err();
        assert!(matches!(err, TemplateError::Parse { .. }));
    }

    #[test]
    fn wildcard_must_be_last() {
        let err = TemplateParser::new().parse("1.,*,a.").unwrap_err();
        assert!(matches!(err, TemplateError::MisplacedWildcard { .. }));

        let err = TemplateParser::new().parse("*").unwrap_err();
        assert!(matches!(err, TemplateError::MisplacedWildcard { .. }));
    }

    #[test]
    fn unterminated_quote_is_rejected() {
        let err = TemplateParser::new().parse("'oops").unwrap_err();
        assert!(matches!(err, TemplateError::UnterminatedQuote { .. }));
    }

    #[test]
    fn trailing_garbage_is_a_parse_error() {
        // An alphanumeric run after the suffix cannot belong to a literal.
        let err = TemplateParser::new().parse("a.i").unwrap_err();
        assert!(matches!(err, TemplateError::Parse { .. }));
    }

    #[test]
    fn parser_caches_by_source_string() {
        let mut parser = TemplateParser::new();
        let first = parser.parse("H.1 ,*").unwrap();
        let second = parser.parse("H.1 ,*").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn error_messages_name_the_offending_template() {
        let err = TemplateParser::new().parse("1.,zz.").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("1.,zz."));
        assert!(message.contains("zz"));
    }
}
