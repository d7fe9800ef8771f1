//! Formatter chain for staged values
//!
//! Formatters are string transforms applied to a staged value before the
//! check chain runs and before conversion. They are attached per argument
//! and applied in registration order, optionally scoped to map keys, map
//! values, or one positional element of a list token.

pub mod transforms;

pub use transforms::{custom, lowercase, uppercase};

/// Which part of a staged element a formatter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatScope {
    /// Every staged element (and both halves of a pair).
    All,
    /// Map keys only. Legal for map kinds.
    Key,
    /// Map values only. Legal for map kinds.
    Value,
    /// The element at this zero-based position within one list token.
    /// Legal for sequence kinds.
    Position(usize),
}

impl FormatScope {
    /// Short label used in the introspection listing.
    pub fn label(self) -> String {
        match self {
            FormatScope::All => "all".to_string(),
            FormatScope::Key => "key".to_string(),
            FormatScope::Value => "value".to_string(),
            FormatScope::Position(i) => format!("position {i}"),
        }
    }
}

/// A string transform applied before checks and conversion.
pub trait Formatter {
    /// Transform one staged string.
    fn apply(&self, input: &str) -> String;

    /// Human-readable description used in the introspection listing.
    fn describe(&self) -> String;
}

/// A formatter together with the scope it applies to.
pub struct ScopedFormatter {
    pub scope: FormatScope,
    pub formatter: Box<dyn Formatter>,
}

impl ScopedFormatter {
    /// Description of this entry for the introspection listing.
    pub fn describe(&self) -> String {
        match self.scope {
            FormatScope::All => self.formatter.describe(),
            _ => format!("{} ({})", self.formatter.describe(), self.scope.label()),
        }
    }
}

/// Apply every matching formatter to `input`, in registration order.
///
/// `key_value` selects Key/Value scoped entries; `position` selects
/// positionally scoped entries. `All` entries always run.
pub fn apply_chain(
    chain: &[ScopedFormatter],
    input: &str,
    key_value: Option<FormatScope>,
    position: Option<usize>,
) -> String {
    let mut current = input.to_string();
    for entry in chain {
        let matches = match entry.scope {
            FormatScope::All => true,
            FormatScope::Key => key_value == Some(FormatScope::Key),
            FormatScope::Value => key_value == Some(FormatScope::Value),
            FormatScope::Position(i) => position == Some(i),
        };
        if matches {
            current = entry.formatter.apply(&current);
        }
    }
    current
}
