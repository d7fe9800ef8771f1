//! Concrete destination sinks
//!
//! One sink per destination kind, each wrapping a caller-owned storage
//! handle. The constructors at the bottom of this module are the public
//! surface: they box the sink for registration with
//! [`crate::registry::ArgRegistry::add`].
//!
//! Sinks keep a shadow list of the staged string forms they assigned. The
//! shadow feeds cross-argument constraints and the introspection listing
//! without requiring `Display` on element types.

use crate::value::convert::FromArgValue;
use crate::value::sink::{AssignError, SinkKind, ValueSink};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

/// Caller-owned destination storage shared with the engine.
pub type Handle<T> = Rc<RefCell<T>>;

fn convert<T: FromArgValue>(element: &str) -> Result<T, AssignError> {
    T::from_arg_value(element).ok_or_else(|| AssignError::Convert {
        value: element.to_string(),
        expected: T::type_name(),
    })
}

// ---------------------------------------------------------------------------
// Scalar
// ---------------------------------------------------------------------------

/// Single-value destination; reassignment overwrites.
pub struct ScalarSink<T: FromArgValue> {
    dest: Handle<T>,
    raw: Option<String>,
}

impl<T: FromArgValue> ValueSink for ScalarSink<T> {
    fn kind(&self) -> SinkKind {
        SinkKind::Scalar
    }

    fn element_type(&self) -> &'static str {
        T::type_name()
    }

    fn assign(&mut self, element: &str, _unique: bool) -> Result<(), AssignError> {
        let value = convert::<T>(element)?;
        *self.dest.borrow_mut() = value;
        self.raw = Some(element.to_string());
        Ok(())
    }

    fn clear(&mut self) {
        self.raw = None;
    }

    fn len(&self) -> usize {
        usize::from(self.raw.is_some())
    }

    fn supports_negation(&self) -> bool {
        // Only a boolean value has a meaningful negation.
        T::type_name() == "bool"
    }

    fn string_elements(&self) -> Vec<String> {
        self.raw.iter().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Optional
// ---------------------------------------------------------------------------

/// `Option<T>` destination; `Some` once a value arrives.
pub struct OptionalSink<T: FromArgValue> {
    dest: Handle<Option<T>>,
    raw: Option<String>,
}

impl<T: FromArgValue> ValueSink for OptionalSink<T> {
    fn kind(&self) -> SinkKind {
        SinkKind::Optional
    }

    fn element_type(&self) -> &'static str {
        T::type_name()
    }

    fn assign(&mut self, element: &str, _unique: bool) -> Result<(), AssignError> {
        let value = convert::<T>(element)?;
        *self.dest.borrow_mut() = Some(value);
        self.raw = Some(element.to_string());
        Ok(())
    }

    fn clear(&mut self) {
        *self.dest.borrow_mut() = None;
        self.raw = None;
    }

    fn len(&self) -> usize {
        usize::from(self.dest.borrow().is_some())
    }

    fn string_elements(&self) -> Vec<String> {
        self.raw.iter().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Sequence
// ---------------------------------------------------------------------------

/// `Vec<T>` destination accumulating every element in arrival order.
pub struct SequenceSink<T: FromArgValue + PartialOrd> {
    dest: Handle<Vec<T>>,
    raw: Vec<String>,
}

impl<T: FromArgValue + PartialOrd> ValueSink for SequenceSink<T> {
    fn kind(&self) -> SinkKind {
        SinkKind::Sequence
    }

    fn element_type(&self) -> &'static str {
        T::type_name()
    }

    fn assign(&mut self, element: &str, unique: bool) -> Result<(), AssignError> {
        if unique && self.raw.iter().any(|r| r == element) {
            return Err(AssignError::Duplicate(element.to_string()));
        }
        let value = convert::<T>(element)?;
        self.dest.borrow_mut().push(value);
        self.raw.push(element.to_string());
        Ok(())
    }

    fn clear(&mut self) {
        self.dest.borrow_mut().clear();
        self.raw.clear();
    }

    fn len(&self) -> usize {
        self.dest.borrow().len()
    }

    fn sort(&mut self) {
        self.dest
            .borrow_mut()
            .sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        self.raw.sort();
    }

    fn string_elements(&self) -> Vec<String> {
        self.raw.clone()
    }
}

// ---------------------------------------------------------------------------
// Set
// ---------------------------------------------------------------------------

/// `BTreeSet<T>` destination; duplicates are dropped silently unless unique
/// assignment turns them into errors.
pub struct SetSink<T: FromArgValue + Ord> {
    dest: Handle<BTreeSet<T>>,
    raw: Vec<String>,
}

impl<T: FromArgValue + Ord> ValueSink for SetSink<T> {
    fn kind(&self) -> SinkKind {
        SinkKind::Set
    }

    fn element_type(&self) -> &'static str {
        T::type_name()
    }

    fn assign(&mut self, element: &str, unique: bool) -> Result<(), AssignError> {
        let value = convert::<T>(element)?;
        let inserted = self.dest.borrow_mut().insert(value);
        if inserted {
            self.raw.push(element.to_string());
        } else if unique {
            return Err(AssignError::Duplicate(element.to_string()));
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.dest.borrow_mut().clear();
        self.raw.clear();
    }

    fn len(&self) -> usize {
        self.dest.borrow().len()
    }

    fn string_elements(&self) -> Vec<String> {
        self.raw.clone()
    }
}

// ---------------------------------------------------------------------------
// Map
// ---------------------------------------------------------------------------

/// `BTreeMap<K, V>` destination; a duplicate key overwrites unless unique
/// assignment turns it into an error.
pub struct MapSink<K: FromArgValue + Ord, V: FromArgValue> {
    dest: Handle<BTreeMap<K, V>>,
    raw_keys: Vec<String>,
}

impl<K: FromArgValue + Ord, V: FromArgValue> ValueSink for MapSink<K, V> {
    fn kind(&self) -> SinkKind {
        SinkKind::Map
    }

    fn element_type(&self) -> &'static str {
        K::type_name()
    }

    fn assign(&mut self, element: &str, _unique: bool) -> Result<(), AssignError> {
        Err(AssignError::Convert {
            value: element.to_string(),
            expected: "key/value pair",
        })
    }

    fn assign_pair(&mut self, key: &str, value: &str, unique: bool) -> Result<(), AssignError> {
        let k = convert::<K>(key)?;
        let v = convert::<V>(value)?;
        let previous = self.dest.borrow_mut().insert(k, v);
        match previous {
            Some(_) if unique => Err(AssignError::Duplicate(key.to_string())),
            Some(_) => Ok(()), // silent overwrite, shadow already holds the key
            None => {
                self.raw_keys.push(key.to_string());
                Ok(())
            }
        }
    }

    fn clear(&mut self) {
        self.dest.borrow_mut().clear();
        self.raw_keys.clear();
    }

    fn len(&self) -> usize {
        self.dest.borrow().len()
    }

    fn string_elements(&self) -> Vec<String> {
        self.raw_keys.clone()
    }
}

// ---------------------------------------------------------------------------
// Multimap
// ---------------------------------------------------------------------------

/// `BTreeMap<K, Vec<V>>` destination accumulating values per key in arrival
/// order.
pub struct MultimapSink<K: FromArgValue + Ord, V: FromArgValue> {
    dest: Handle<BTreeMap<K, Vec<V>>>,
    raw_keys: Vec<String>,
    raw_pairs: Vec<(String, String)>,
}

impl<K: FromArgValue + Ord, V: FromArgValue> ValueSink for MultimapSink<K, V> {
    fn kind(&self) -> SinkKind {
        SinkKind::Multimap
    }

    fn element_type(&self) -> &'static str {
        K::type_name()
    }

    fn assign(&mut self, element: &str, _unique: bool) -> Result<(), AssignError> {
        Err(AssignError::Convert {
            value: element.to_string(),
            expected: "key/value pair",
        })
    }

    fn assign_pair(&mut self, key: &str, value: &str, unique: bool) -> Result<(), AssignError> {
        let pair = (key.to_string(), value.to_string());
        if unique && self.raw_pairs.contains(&pair) {
            return Err(AssignError::Duplicate(key.to_string()));
        }
        let k = convert::<K>(key)?;
        let v = convert::<V>(value)?;
        let mut dest = self.dest.borrow_mut();
        let slot = dest.entry(k).or_default();
        if slot.is_empty() {
            self.raw_keys.push(key.to_string());
        }
        slot.push(v);
        self.raw_pairs.push(pair);
        Ok(())
    }

    fn clear(&mut self) {
        self.dest.borrow_mut().clear();
        self.raw_keys.clear();
        self.raw_pairs.clear();
    }

    fn len(&self) -> usize {
        self.raw_pairs.len()
    }

    fn string_elements(&self) -> Vec<String> {
        self.raw_keys.clone()
    }
}

// ---------------------------------------------------------------------------
// Callable
// ---------------------------------------------------------------------------

/// Destination that hands each staged element to a user closure instead of
/// storing it.
pub struct CallableSink {
    f: Box<dyn FnMut(&str) -> Result<(), String>>,
    raw: Vec<String>,
}

impl ValueSink for CallableSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Callable
    }

    fn element_type(&self) -> &'static str {
        "string"
    }

    fn assign(&mut self, element: &str, unique: bool) -> Result<(), AssignError> {
        if unique && self.raw.iter().any(|r| r == element) {
            return Err(AssignError::Duplicate(element.to_string()));
        }
        (self.f)(element).map_err(|reason| AssignError::Rejected {
            value: element.to_string(),
            reason,
        })?;
        self.raw.push(element.to_string());
        Ok(())
    }

    fn clear(&mut self) {
        self.raw.clear();
    }

    fn len(&self) -> usize {
        self.raw.len()
    }

    fn string_elements(&self) -> Vec<String> {
        self.raw.clone()
    }
}

// ---------------------------------------------------------------------------
// Constructors
// ---------------------------------------------------------------------------

/// Bind a single-value destination.
pub fn scalar<T: FromArgValue>(dest: Handle<T>) -> Box<dyn ValueSink> {
    Box::new(ScalarSink { dest, raw: None })
}

/// Bind an `Option<T>` destination.
pub fn optional<T: FromArgValue>(dest: Handle<Option<T>>) -> Box<dyn ValueSink> {
    Box::new(OptionalSink { dest, raw: None })
}

/// Bind a `Vec<T>` destination.
pub fn sequence<T: FromArgValue + PartialOrd>(dest: Handle<Vec<T>>) -> Box<dyn ValueSink> {
    Box::new(SequenceSink {
        dest,
        raw: Vec::new(),
    })
}

/// Bind a `BTreeSet<T>` destination.
pub fn set<T: FromArgValue + Ord>(dest: Handle<BTreeSet<T>>) -> Box<dyn ValueSink> {
    Box::new(SetSink {
        dest,
        raw: Vec::new(),
    })
}

/// Bind a `BTreeMap<K, V>` destination.
pub fn map<K, V>(dest: Handle<BTreeMap<K, V>>) -> Box<dyn ValueSink>
where
    K: FromArgValue + Ord,
    V: FromArgValue,
{
    Box::new(MapSink {
        dest,
        raw_keys: Vec::new(),
    })
}

/// Bind a `BTreeMap<K, Vec<V>>` multimap destination.
pub fn multimap<K, V>(dest: Handle<BTreeMap<K, Vec<V>>>) -> Box<dyn ValueSink>
where
    K: FromArgValue + Ord,
    V: FromArgValue,
{
    Box::new(MultimapSink {
        dest,
        raw_keys: Vec::new(),
        raw_pairs: Vec::new(),
    })
}

/// Bind a callable invoked once per staged element.
pub fn callable<F>(f: F) -> Box<dyn ValueSink>
where
    F: FnMut(&str) -> Result<(), String> + 'static,
{
    Box::new(CallableSink {
        f: Box::new(f),
        raw: Vec::new(),
    })
}
