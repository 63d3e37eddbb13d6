//! Counter styles: how a 1-based count is formatted into label text.
//!
//! Each [`CounterType`] knows how to format an integer (`format`) and which
//! native CSS counter-style identifier it corresponds to (`css_style`), so
//! the same template can drive both compile-time text labels and generated
//! `counter()` expressions.

/// A numbering system for one level of a label template.
///
/// "No numbering at all" is expressed as `Option<CounterType>::None` on the
/// template, not as a variant here, so `format` stays total.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CounterType {
    /// 1, 2, 3, …
    Decimal,
    /// 1, 10, 11, 100, …
    Binary,
    /// 1, …, 7, 10, 11, …
    Octal,
    /// 1, …, 9, a, b, …
    LowerHexadecimal,
    /// 1, …, 9, A, B, …
    UpperHexadecimal,
    /// a, b, …, z, aa, ab, … (bijective base-26)
    LowerAlpha,
    /// A, B, …, Z, AA, AB, …
    UpperAlpha,
    /// α, β, …, ω, αα, … (bijective base-24)
    LowerGreek,
    /// i, ii, iii, iv, … (subtractive notation)
    LowerRoman,
    /// I, II, III, IV, …
    UpperRoman,
    /// Always the same literal marker, regardless of count ("•", "§", …).
    Fixed(String),
}

impl CounterType {
    /// Resolve a counter-style name from template notation.
    ///
    /// Accepts the single-character abbreviations used in compact template
    /// chains (`1`, `a`, `A`, `i`, `I`), the full CSS counter-style names
    /// (`decimal`, `lower-roman`, …, including the `lower-latin` /
    /// `upper-latin` aliases), and the fixed marker names `disc`, `circle`
    /// and `square`.
    pub fn from_name(name: &str) -> Option<CounterType> {
        let counter = match name {
            "1" | "decimal" => CounterType::Decimal,
            "binary" => CounterType::Binary,
            "octal" => CounterType::Octal,
            "lower-hexadecimal" => CounterType::LowerHexadecimal,
            "upper-hexadecimal" => CounterType::UpperHexadecimal,
            "a" | "lower-alpha" | "lower-latin" => CounterType::LowerAlpha,
            "A" | "upper-alpha" | "upper-latin" => CounterType::UpperAlpha,
            "lower-greek" => CounterType::LowerGreek,
            "i" | "lower-roman" => CounterType::LowerRoman,
            "I" | "upper-roman" => CounterType::UpperRoman,
            "disc" => CounterType::Fixed("•".to_string()),
            "circle" => CounterType::Fixed("◦".to_string()),
            "square" => CounterType::Fixed("▪".to_string()),
            _ => return None,
        };
        Some(counter)
    }

    /// Format a 1-based count in this numbering system.
    ///
    /// Total, pure and deterministic for all `n >= 1`; callers guarantee
    /// `n >= 1`. Roman numerals above 3999 extend with repeated `m`
    /// (`4000` → `mmmm`) rather than failing.
    pub fn format(&self, n: u32) -> String {
        match self {
            CounterType::Decimal => n.to_string(),
            CounterType::Binary => format!("{n:b}"),
            CounterType::Octal => format!("{n:o}"),
            CounterType::LowerHexadecimal => format!("{n:x}"),
            CounterType::UpperHexadecimal => format!("{n:X}"),
            CounterType::LowerAlpha => bijective_latin(n, b'a'),
            CounterType::UpperAlpha => bijective_latin(n, b'A'),
            CounterType::LowerGreek => bijective_greek(n),
            CounterType::LowerRoman => roman(n),
            CounterType::UpperRoman => roman(n).to_uppercase(),
            CounterType::Fixed(text) => text.clone(),
        }
    }

    /// The native CSS counter-style identifier for this numbering system.
    ///
    /// `Fixed` has no counter-style equivalent and returns `None`, which
    /// forces inline-text embedding when building counter expressions.
    pub fn css_style(&self) -> Option<&'static str> {
        match self {
            CounterType::Decimal => Some("decimal"),
            CounterType::Binary => Some("binary"),
            CounterType::Octal => Some("octal"),
            CounterType::LowerHexadecimal => Some("lower-hexadecimal"),
            CounterType::UpperHexadecimal => Some("upper-hexadecimal"),
            CounterType::LowerAlpha => Some("lower-alpha"),
            CounterType::UpperAlpha => Some("upper-alpha"),
            CounterType::LowerGreek => Some("lower-greek"),
            CounterType::LowerRoman => Some("lower-roman"),
            CounterType::UpperRoman => Some("upper-roman"),
            CounterType::Fixed(_) => None,
        }
    }
}

/// Bijective base-26 over the latin alphabet: 1→a, 26→z, 27→aa, 28→ab.
///
/// This is not decimal-with-substituted-digits; there is no zero symbol.
fn bijective_latin(mut n: u32, first: u8) -> String {
    let mut digits = Vec::new();
    while n > 0 {
        n -= 1;
        digits.push((first + (n % 26) as u8) as char);
        n /= 26;
    }
    digits.iter().rev().collect()
}

const GREEK: [char; 24] = [
    'α', 'β', 'γ', 'δ', 'ε', 'ζ', 'η', 'θ', 'ι', 'κ', 'λ', 'μ', 'ν', 'ξ', 'ο', 'π', 'ρ', 'σ',
    'τ', 'υ', 'φ', 'χ', 'ψ', 'ω',
];

fn bijective_greek(mut n: u32) -> String {
    let mut digits = Vec::new();
    while n > 0 {
        n -= 1;
        digits.push(GREEK[(n % 24) as usize]);
        n /= 24;
    }
    digits.iter().rev().collect()
}

const ROMAN: [(u32, &str); 13] = [
    (1000, "m"),
    (900, "cm"),
    (500, "d"),
    (400, "cd"),
    (100, "c"),
    (90, "xc"),
    (50, "l"),
    (40, "xl"),
    (10, "x"),
    (9, "ix"),
    (5, "v"),
    (4, "iv"),
    (1, "i"),
];

fn roman(mut n: u32) -> String {
    let mut out = String::new();
    for (weight, symbol) in ROMAN {
        while n >= weight {
            out.push_str(symbol);
            n -= weight;
        }
    }
    out
}
