//! # argot
//!
//! A declarative command-line argument parsing and validation engine:
//! arguments are registered against typed, caller-owned destinations, then
//! one synchronous evaluation drives a tokenizing state machine through the
//! command line, applying per-argument formatter chains, check chains,
//! container-aware assignment, cardinality limits, and cross-argument
//! constraints.
//!
//! ## Quick tour
//!
//! ```ignore
//! use argot::{ArgRegistry, check::range, value::{scalar, sequence}};
//! use std::{cell::RefCell, rc::Rc};
//!
//! let count = Rc::new(RefCell::new(0_i32));
//! let files = Rc::new(RefCell::new(Vec::<String>::new()));
//!
//! let mut args = ArgRegistry::new();
//! args.add("n,count", scalar(count.clone()), "how many")?
//!     .add_check(range(1.0, 100.0))?
//!     .set_is_mandatory()?;
//! args.add("-", sequence(files.clone()), "input files")?;
//!
//! args.parse_tokens(&["-n", "3", "a.txt", "b.txt"])?;
//! assert_eq!(*count.borrow(), 3);
//! ```
//!
//! ## Token grammar
//!
//! ```text
//! short-arg   := '-' NAME1 [ more-flags | attached-value ]
//! long-arg    := '--' NAME [ '=' value ]
//! free-escape := '--'            ; forces the next token to be literal
//! inversion   := '!'             ; applies to the next argument only
//! list-value  := element (LISTSEP element)*
//! pair-value  := key PAIRSEP value
//! ```
//!
//! ## Error taxonomy
//!
//! Structural declaration problems raise [`SetupError`] from the
//! configuration call that caused them. Everything discovered while
//! consuming a token stream raises [`ParseError`]; the first failure aborts
//! the evaluation and destinations written by earlier tokens keep their
//! values.

pub mod check;
pub mod constraint;
pub mod error;
pub mod format;
pub mod parser;
pub mod registry;
pub mod report;
pub mod testing;
pub mod value;

pub use error::{CheckViolation, ConstraintViolation, ParseError, SetupError};
pub use parser::{ControlBlock, ControlHandler};
pub use registry::{ArgRegistry, ArgSpec, ValueMode};
pub use report::ArgReport;
