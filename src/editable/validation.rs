//! Input validation for color entries.
//!
//! A [`ValidationPolicy`] decides, per entry kind, which typed characters are
//! accepted (and how they are normalized), how long the text may grow, and how
//! the whole text is parsed into a [`CanonicalValue`] when the entry commits.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Leading marker of a hex color
pub const HEX_MARKER: char = '#';

/// Kind of value an entry holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Free-form text
    Text,
    /// Comma/space separated integers
    Integer,
    /// Comma/space separated decimals
    Float,
    /// Hexadecimal color (`#RRGGBB`)
    Hex,
}

/// Letter case hex digits are normalized to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HexCase {
    #[default]
    Upper,
    Lower,
}

impl HexCase {
    pub fn apply(self, ch: char) -> char {
        match self {
            HexCase::Upper => ch.to_ascii_uppercase(),
            HexCase::Lower => ch.to_ascii_lowercase(),
        }
    }
}

/// Parsed, normalized value of a committed entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CanonicalValue {
    Text(String),
    Integers(Vec<i64>),
    Floats(Vec<f64>),
    Color([u8; 3]),
}

/// Why a commit was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidValue {
    #[error("entry is empty")]
    Empty,
    #[error("could not parse component {0:?}")]
    Malformed(String),
    #[error("expected {expected} components, found {found}")]
    ComponentCount { expected: usize, found: usize },
    #[error("component {value} outside {min}..={max}")]
    OutOfRange { value: f64, min: f64, max: f64 },
    #[error("hex color needs 3 or 6 digits, found {0}")]
    HexDigits(usize),
}

/// Per-kind acceptance, length and parse rules.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationPolicy {
    pub kind: EntryKind,

    /// Maximum length in bytes (None = unlimited)
    pub max_length: Option<usize>,

    /// Case hex digits are normalized to
    pub hex_case: HexCase,

    /// Prepend the marker when the first digit goes into an empty hex entry
    pub hex_prefix: bool,

    /// Required number of numeric components (None = any)
    pub components: Option<usize>,

    /// Inclusive bounds for every numeric component
    pub bounds: Option<(f64, f64)>,
}

impl ValidationPolicy {
    fn for_kind(kind: EntryKind, max_length: usize) -> Self {
        Self {
            kind,
            max_length: Some(max_length),
            hex_case: HexCase::Upper,
            hex_prefix: true,
            components: None,
            bounds: None,
        }
    }

    /// Free text (HSV/HSL strings with degree and percent signs)
    pub fn text() -> Self {
        Self::for_kind(EntryKind::Text, 64)
    }

    /// Integer list
    pub fn integer() -> Self {
        Self::for_kind(EntryKind::Integer, 16)
    }

    /// Decimal list
    pub fn float() -> Self {
        Self::for_kind(EntryKind::Float, 32)
    }

    /// Hex color, `#RRGGBB`
    pub fn hex() -> Self {
        Self::for_kind(EntryKind::Hex, 7)
    }

    /// Three integer channels in 0..=255
    pub fn rgb_integer() -> Self {
        Self::integer().with_components(3).with_bounds(0.0, 255.0)
    }

    /// Three float channels in 0.0..=1.0
    pub fn rgb_float() -> Self {
        Self::float().with_components(3).with_bounds(0.0, 1.0)
    }

    pub fn with_max_length(mut self, max_length: Option<usize>) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_hex_case(mut self, hex_case: HexCase) -> Self {
        self.hex_case = hex_case;
        self
    }

    pub fn with_hex_prefix(mut self, hex_prefix: bool) -> Self {
        self.hex_prefix = hex_prefix;
        self
    }

    pub fn with_components(mut self, components: usize) -> Self {
        self.components = Some(components);
        self
    }

    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.bounds = Some((min, max));
        self
    }

    /// Decide whether `ch` may be inserted between `before` and `after`.
    ///
    /// Returns the normalized character, or None to drop it silently.
    pub fn accept(&self, ch: char, before: &str, after: &str) -> Option<char> {
        match self.kind {
            EntryKind::Text => (!ch.is_control()).then_some(ch),
            EntryKind::Integer => (ch.is_ascii_digit() || is_separator(ch)).then_some(ch),
            EntryKind::Float => {
                if ch == '.' {
                    let head = before.rsplit(is_separator).next().unwrap_or("");
                    let tail = after.split(is_separator).next().unwrap_or("");
                    (!head.contains('.') && !tail.contains('.')).then_some(ch)
                } else {
                    (ch.is_ascii_digit() || is_separator(ch)).then_some(ch)
                }
            }
            EntryKind::Hex => {
                let marker_follows = before.is_empty() && after.starts_with(HEX_MARKER);
                if ch == HEX_MARKER {
                    (before.is_empty() && !after.starts_with(HEX_MARKER)).then_some(ch)
                } else if ch.is_ascii_hexdigit() && !marker_follows {
                    Some(self.hex_case.apply(ch))
                } else {
                    None
                }
            }
        }
    }

    /// Marker to prepend before an accepted character typed into an empty entry
    pub fn marker_for(&self, accepted: char, entry_is_empty: bool) -> Option<char> {
        let wants_marker = self.kind == EntryKind::Hex
            && self.hex_prefix
            && entry_is_empty
            && accepted != HEX_MARKER;
        wants_marker.then_some(HEX_MARKER)
    }

    /// Check if inserting `insert_len` bytes would exceed max length
    pub fn exceeds_max_length(&self, current_len: usize, insert_len: usize) -> bool {
        match self.max_length {
            Some(max) => current_len + insert_len > max,
            None => false,
        }
    }

    /// Parse committed text into its canonical value
    pub fn parse(&self, text: &str) -> Result<CanonicalValue, InvalidValue> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(InvalidValue::Empty);
        }

        match self.kind {
            EntryKind::Text => Ok(CanonicalValue::Text(trimmed.to_string())),
            EntryKind::Integer => {
                let values = components(trimmed)
                    .map(|c| {
                        c.parse::<i64>()
                            .map_err(|_| InvalidValue::Malformed(c.to_string()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                self.check_count(values.len())?;
                for value in &values {
                    self.check_bounds(*value as f64)?;
                }
                Ok(CanonicalValue::Integers(values))
            }
            EntryKind::Float => {
                let values = components(trimmed)
                    .map(|c| match c.parse::<f64>() {
                        Ok(v) if v.is_finite() => Ok(v),
                        _ => Err(InvalidValue::Malformed(c.to_string())),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                self.check_count(values.len())?;
                for value in &values {
                    self.check_bounds(*value)?;
                }
                Ok(CanonicalValue::Floats(
                    values.into_iter().map(round_thousandths).collect(),
                ))
            }
            EntryKind::Hex => parse_hex(trimmed).map(CanonicalValue::Color),
        }
    }

    /// Display text for a canonical value
    pub fn format(&self, value: &CanonicalValue) -> String {
        match value {
            CanonicalValue::Text(text) => text.clone(),
            CanonicalValue::Integers(values) => values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            CanonicalValue::Floats(values) => values
                .iter()
                .map(|v| format!("{:.3}", v))
                .collect::<Vec<_>>()
                .join(", "),
            CanonicalValue::Color([r, g, b]) => {
                let hex = match self.hex_case {
                    HexCase::Upper => format!("{:02X}{:02X}{:02X}", r, g, b),
                    HexCase::Lower => format!("{:02x}{:02x}{:02x}", r, g, b),
                };
                if self.hex_prefix {
                    format!("{}{}", HEX_MARKER, hex)
                } else {
                    hex
                }
            }
        }
    }

    fn check_count(&self, found: usize) -> Result<(), InvalidValue> {
        match self.components {
            Some(expected) if expected != found => {
                Err(InvalidValue::ComponentCount { expected, found })
            }
            _ => Ok(()),
        }
    }

    fn check_bounds(&self, value: f64) -> Result<(), InvalidValue> {
        match self.bounds {
            Some((min, max)) if value < min || value > max => {
                Err(InvalidValue::OutOfRange { value, min, max })
            }
            _ => Ok(()),
        }
    }
}

fn is_separator(ch: char) -> bool {
    ch == ',' || ch == ' '
}

fn components(text: &str) -> impl Iterator<Item = &str> {
    text.split(is_separator).filter(|c| !c.is_empty())
}

fn round_thousandths(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn parse_hex(text: &str) -> Result<[u8; 3], InvalidValue> {
    let digits: String = text
        .chars()
        .filter(|ch| !is_separator(*ch))
        .collect();
    let digits = digits.strip_prefix(HEX_MARKER).unwrap_or(digits.as_str());

    if let Some(bad) = digits.chars().find(|ch| !ch.is_ascii_hexdigit()) {
        return Err(InvalidValue::Malformed(bad.to_string()));
    }

    let expanded = match digits.len() {
        6 => digits.to_string(),
        3 => digits.chars().flat_map(|ch| [ch, ch]).collect(),
        n => return Err(InvalidValue::HexDigits(n)),
    };

    let channel = |i: usize| {
        u8::from_str_radix(&expanded[i..i + 2], 16)
            .map_err(|_| InvalidValue::Malformed(expanded[i..i + 2].to_string()))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}
