//! Type-erased destination interface
//!
//! [`ValueSink`] is the capability surface the parsing engine drives. The
//! engine only ever asks a sink what it can do (`kind`, `accepts_pairs`,
//! `supports_negation`) and tells it to convert-and-store one element.
//! Which configuration calls are legal for a given argument is decided from
//! [`SinkKind`] at setup time, never at parse time.

use std::fmt;

/// The closed set of destination kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    /// Single value, overwritten on reassignment.
    Scalar,
    /// Single `Option<T>` value, `Some` once assigned.
    Optional,
    /// Ordered `Vec<T>` accumulating every element.
    Sequence,
    /// Sorted `BTreeSet<T>`, silently deduplicating.
    Set,
    /// Sorted `BTreeMap<K, V>`, overwriting duplicate keys by default.
    Map,
    /// Sorted `BTreeMap<K, Vec<V>>`, accumulating values per key.
    Multimap,
    /// User-supplied callable invoked once per element.
    Callable,
}

impl SinkKind {
    /// Whether this kind holds more than one element.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            SinkKind::Sequence | SinkKind::Set | SinkKind::Map | SinkKind::Multimap
        )
    }

    /// Whether elements are key/value pairs.
    pub fn accepts_pairs(self) -> bool {
        matches!(self, SinkKind::Map | SinkKind::Multimap)
    }

    /// Whether element order inside the destination can be rearranged.
    ///
    /// The multimap keeps per-key insertion order, so sorting is rejected
    /// for it at setup time.
    pub fn is_sortable(self) -> bool {
        matches!(self, SinkKind::Sequence | SinkKind::Set | SinkKind::Map)
    }

    /// Lowercase label used in error messages and listings.
    pub fn label(self) -> &'static str {
        match self {
            SinkKind::Scalar => "scalar",
            SinkKind::Optional => "optional",
            SinkKind::Sequence => "sequence",
            SinkKind::Set => "set",
            SinkKind::Map => "map",
            SinkKind::Multimap => "multimap",
            SinkKind::Callable => "callable",
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure while converting and storing one element.
///
/// The sink does not know which argument it is bound to; the engine wraps
/// these into [`crate::error::ParseError`] with the argument name attached.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignError {
    /// The element (or pair key/value) is not convertible to the element type.
    Convert {
        value: String,
        expected: &'static str,
    },
    /// A duplicate key or element arrived while unique assignment is active.
    Duplicate(String),
    /// The user-supplied callable rejected the element.
    Rejected { value: String, reason: String },
}

/// Type-erased destination storage driven by the parsing engine.
///
/// One element passes through `assign` (or `assign_pair` for map kinds)
/// after the formatter and check chains have run. Implementations convert
/// the staged string to the element type and write the caller's storage.
pub trait ValueSink {
    /// Which destination kind this sink is.
    fn kind(&self) -> SinkKind;

    /// Human-readable element type name (key type for map kinds).
    fn element_type(&self) -> &'static str;

    /// Convert one staged element and store it.
    ///
    /// `unique` turns duplicate elements into [`AssignError::Duplicate`]
    /// instead of the kind's default overwrite/accumulate behavior.
    fn assign(&mut self, element: &str, unique: bool) -> Result<(), AssignError>;

    /// Convert one staged key/value pair and store it. Map kinds only.
    fn assign_pair(&mut self, key: &str, value: &str, unique: bool) -> Result<(), AssignError> {
        let _ = unique;
        Err(AssignError::Rejected {
            value: format!("{key}/{value}"),
            reason: "destination does not accept pairs".to_string(),
        })
    }

    /// Remove all stored elements.
    fn clear(&mut self);

    /// Number of elements currently held.
    fn len(&self) -> usize;

    /// Whether the destination currently holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rearrange stored elements into sorted order. No-op for kinds that
    /// are already sorted.
    fn sort(&mut self) {}

    /// Whether the stored value can be semantically negated (inversion).
    fn supports_negation(&self) -> bool {
        false
    }

    /// String forms of the held elements (keys for map kinds), used by
    /// cross-argument constraints and the introspection listing.
    fn string_elements(&self) -> Vec<String>;
}
