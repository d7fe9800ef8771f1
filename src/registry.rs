//! Argument registry
//!
//! The addressable set of arguments built declaratively before parsing.
//! [`ArgRegistry::add`] registers a descriptor under a name specification
//! and hands back a mutable handle for fluent configuration:
//!
//! ```ignore
//! let mut args = ArgRegistry::new();
//! args.add("n,count", scalar(count.clone()), "how many")?
//!     .add_check(range(1.0, 100.0))?
//!     .set_is_mandatory()?;
//! args.parse_tokens(&argv)?;
//! ```
//!
//! Name specifications are compact spec strings:
//! `"v"` (short), `"verbose"` (long), `"v,verbose"` (both), `"-"` (the
//! single free-value slot). Duplicate names, a second free-value slot, and
//! collisions with enabled built-ins are setup errors.

pub mod spec;

pub use spec::{ArgSpec, ValueMode};

use crate::constraint::Constraint;
use crate::error::SetupError;
use crate::parser::ControlBlock;
use crate::value::{Handle, ValueSink};
use once_cell::sync::Lazy;
use std::cell::RefCell;
use std::rc::Rc;

/// Names reserved by the built-in help flag.
static RESERVED_HELP_NAMES: Lazy<Vec<&'static str>> = Lazy::new(|| vec!["h", "help"]);

/// Parsed form of a name specification string.
struct NameSpec {
    short: Option<char>,
    long: Option<String>,
    free: bool,
}

impl NameSpec {
    /// Parse `"v"`, `"verbose"`, `"v,verbose"`, or `"-"`.
    fn parse(spec: &str) -> Result<Self, SetupError> {
        if spec == "-" {
            return Ok(NameSpec {
                short: None,
                long: None,
                free: true,
            });
        }
        let mut short = None;
        let mut long = None;
        let parts: Vec<&str> = spec.split(',').collect();
        if parts.is_empty() || parts.len() > 2 {
            return Err(SetupError::BadNameSpec(spec.to_string()));
        }
        for part in parts {
            if part.is_empty() || !valid_name(part) {
                return Err(SetupError::BadNameSpec(spec.to_string()));
            }
            let mut chars = part.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => {
                    if short.replace(c).is_some() {
                        return Err(SetupError::BadNameSpec(spec.to_string()));
                    }
                }
                _ => {
                    if long.replace(part.to_string()).is_some() {
                        return Err(SetupError::BadNameSpec(spec.to_string()));
                    }
                }
            }
        }
        Ok(NameSpec {
            short,
            long,
            free: false,
        })
    }
}

fn valid_name(part: &str) -> bool {
    !part.starts_with('-')
        && part
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// The registry of argument descriptors plus parse-wide configuration
/// (constraints, control handler, sentinel behavior, built-ins).
///
/// Built once, read-only during parsing. Parsing itself borrows the
/// registry exclusively, which is the non-reentrancy guard: a second parse
/// cannot start while one is in flight.
pub struct ArgRegistry {
    pub(crate) specs: Vec<ArgSpec>,
    pub(crate) constraints: Vec<Box<dyn Constraint>>,
    pub(crate) control: Option<ControlBlock>,
    pub(crate) end_values_enabled: bool,
    help_flag: Option<Handle<bool>>,
    pub(crate) max_bracket_depth: usize,
}

impl ArgRegistry {
    /// Create an empty registry with no built-ins enabled.
    pub fn new() -> Self {
        ArgRegistry {
            specs: Vec::new(),
            constraints: Vec::new(),
            control: None,
            end_values_enabled: false,
            help_flag: None,
            max_bracket_depth: 0,
        }
    }

    /// Register an argument under `names` and return its descriptor for
    /// fluent configuration.
    pub fn add(
        &mut self,
        names: &str,
        sink: Box<dyn ValueSink>,
        description: &str,
    ) -> Result<&mut ArgSpec, SetupError> {
        let parsed = NameSpec::parse(names)?;
        if parsed.free && self.specs.iter().any(|s| s.free) {
            return Err(SetupError::FreeValueTaken);
        }
        if let Some(short) = parsed.short {
            self.check_collision(&short.to_string())?;
        }
        if let Some(long) = &parsed.long {
            self.check_collision(long)?;
        }
        self.specs.push(ArgSpec::new(
            parsed.short,
            parsed.long,
            parsed.free,
            sink,
            description,
        ));
        let index = self.specs.len() - 1;
        Ok(&mut self.specs[index])
    }

    fn check_collision(&self, name: &str) -> Result<(), SetupError> {
        for existing in &self.specs {
            if existing.matches_name(name) {
                return Err(if existing.builtin {
                    SetupError::ReservedName(name.to_string())
                } else {
                    SetupError::DuplicateName(name.to_string())
                });
            }
        }
        Ok(())
    }

    /// Enable the built-in help flag, reserving `-h` / `--help`. The flag
    /// itself is hidden; rendering help text is the caller's concern.
    pub fn enable_help(&mut self) -> Result<(), SetupError> {
        for name in RESERVED_HELP_NAMES.iter() {
            self.check_collision(name)?;
        }
        let flag: Handle<bool> = Rc::new(RefCell::new(false));
        let spec = self.add("h,help", crate::value::scalar(flag.clone()), "show help")?;
        spec.builtin = true;
        spec.set_hidden();
        self.help_flag = Some(flag);
        Ok(())
    }

    /// Whether the built-in help flag was used in the most recent parse.
    pub fn help_requested(&self) -> bool {
        self.help_flag
            .as_ref()
            .map(|flag| *flag.borrow())
            .unwrap_or(false)
    }

    /// Recognize the `--endvalues` sentinel that terminates multi-value
    /// continuation.
    pub fn enable_end_values(&mut self) {
        self.end_values_enabled = true;
    }

    /// Register the bracket/control token pair and its callbacks.
    pub fn set_control_handler(&mut self, control: ControlBlock) {
        self.control = Some(control);
    }

    /// Register a cross-argument constraint. Every referenced argument must
    /// already be registered.
    pub fn add_constraint(&mut self, constraint: Box<dyn Constraint>) -> Result<(), SetupError> {
        for name in constraint.names() {
            if !self.specs.iter().any(|s| s.matches_name(&name)) {
                return Err(SetupError::UnknownConstraintArg(name));
            }
        }
        self.constraints.push(constraint);
        Ok(())
    }

    /// Look up a descriptor by short or long name (no dashes) or `"-"` for
    /// the free-value slot.
    pub fn spec(&self, name: &str) -> Option<&ArgSpec> {
        self.specs.iter().find(|s| s.matches_name(name))
    }

    /// All registered descriptors in registration order.
    pub fn specs(&self) -> &[ArgSpec] {
        &self.specs
    }

    /// Deepest bracket nesting seen in the most recent parse.
    pub fn max_bracket_depth(&self) -> usize {
        self.max_bracket_depth
    }

    /// Reset storage owned by enabled built-ins at the start of a parse.
    pub(crate) fn reset_builtins(&mut self) {
        if let Some(flag) = &self.help_flag {
            *flag.borrow_mut() = false;
        }
    }

    pub(crate) fn find_short(&self, c: char) -> Option<usize> {
        self.specs.iter().position(|s| s.short == Some(c))
    }

    pub(crate) fn find_long(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.long.as_deref() == Some(name))
    }

    pub(crate) fn free_index(&self) -> Option<usize> {
        self.specs.iter().position(|s| s.free)
    }
}

impl Default for ArgRegistry {
    fn default() -> Self {
        Self::new()
    }
}
