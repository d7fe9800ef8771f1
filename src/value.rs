//! Value conversion and destination binding
//!
//! This module provides the typed storage abstraction behind every argument:
//! string values from the command line are converted to the destination's
//! element type and written into caller-owned storage.
//!
//! The engine never sees concrete destination types. It drives a boxed
//! [`ValueSink`] capability object, and each destination kind (scalar,
//! optional, sequence, set, map, multimap, callable) provides its own
//! implementation. Caller storage is shared through `Rc<RefCell<_>>` handles,
//! so the caller keeps full ownership and reads the destination after
//! parsing completes.

pub mod convert;
pub mod sink;
pub mod sinks;

pub use convert::FromArgValue;
pub use sink::{AssignError, SinkKind, ValueSink};
pub use sinks::{
    callable, map, multimap, optional, scalar, sequence, set, Handle,
};
