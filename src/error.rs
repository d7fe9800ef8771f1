//! Error taxonomy for the argument engine
//!
//! Failures split into two families with different lifecycles:
//!
//! - [`SetupError`] is raised synchronously from registry and configuration
//!   calls when the requested configuration is structurally invalid. A setup
//!   error is always fatal to the call that produced it and is never retried.
//! - [`ParseError`] is raised while a token stream is being evaluated. The
//!   first parse error aborts the whole evaluation; destinations already
//!   written by earlier tokens are left in place (no rollback).
//!
//! Every variant carries the offending argument name and value so callers can
//! discriminate the failure cause without string matching.

use crate::check::CheckCategory;
use crate::value::SinkKind;
use std::fmt;

/// Error raised by registry and descriptor configuration calls.
///
/// Setup errors indicate a structural problem in how the argument set was
/// declared, not a problem with any command line.
#[derive(Debug, Clone, PartialEq)]
pub enum SetupError {
    /// A short or long name is already registered.
    DuplicateName(String),
    /// The name collides with an enabled built-in (e.g. help).
    ReservedName(String),
    /// A free-value descriptor is already registered.
    FreeValueTaken,
    /// The name specification string could not be parsed.
    BadNameSpec(String),
    /// A configuration call does not apply to the bound destination kind.
    NotApplicable {
        call: &'static str,
        name: String,
        kind: SinkKind,
    },
    /// A check of an exclusive category is already attached.
    ConflictingCheck {
        name: String,
        category: CheckCategory,
    },
    /// List and pair separators for the same argument must differ.
    SeparatorClash { name: String, sep: char },
    /// The bracket specification must be exactly two characters.
    BadPairBrackets { name: String, brackets: String },
    /// `set_clear_before_assign` requires the optional value mode.
    ClearRequiresOptional(String),
    /// Inversion was allowed on a destination that cannot be negated.
    InversionUnsupported(String),
    /// `set_sort_data` on an unordered container kind.
    SortUnsupported(String),
    /// A mandatory marker on a pure flag is contradictory.
    MandatoryFlag(String),
    /// Cardinality must be at least one.
    BadCardinality { name: String, limit: usize },
    /// The value mode cannot be applied to the bound destination kind.
    BadValueMode { name: String, kind: SinkKind },
    /// A regex pattern failed to compile.
    BadPattern { pattern: String, detail: String },
    /// A constraint referenced an argument that is not registered.
    UnknownConstraintArg(String),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::DuplicateName(name) => {
                write!(f, "argument name '{name}' is already registered")
            }
            SetupError::ReservedName(name) => {
                write!(f, "argument name '{name}' is reserved by an enabled built-in")
            }
            SetupError::FreeValueTaken => {
                write!(f, "a free-value argument is already registered")
            }
            SetupError::BadNameSpec(spec) => {
                write!(f, "invalid argument name specification '{spec}'")
            }
            SetupError::NotApplicable { call, name, kind } => {
                write!(f, "{call} does not apply to {name} ({} destination)", kind.label())
            }
            SetupError::ConflictingCheck { name, category } => {
                write!(f, "{name} already carries a {} check", category.label())
            }
            SetupError::SeparatorClash { name, sep } => {
                write!(f, "list and pair separators for {name} must differ (both '{sep}')")
            }
            SetupError::BadPairBrackets { name, brackets } => {
                write!(f, "pair brackets for {name} must be exactly two characters, got '{brackets}'")
            }
            SetupError::ClearRequiresOptional(name) => {
                write!(f, "clear-before-assign on {name} requires the optional value mode")
            }
            SetupError::InversionUnsupported(name) => {
                write!(f, "{name} cannot be negated, inversion is not allowed")
            }
            SetupError::SortUnsupported(name) => {
                write!(f, "{name} is bound to an unordered container, sorting is not allowed")
            }
            SetupError::MandatoryFlag(name) => {
                write!(f, "{name} takes no value and cannot be mandatory")
            }
            SetupError::BadCardinality { name, limit } => {
                write!(f, "cardinality limit {limit} for {name} must be at least 1")
            }
            SetupError::BadValueMode { name, kind } => {
                write!(f, "value mode does not apply to {name} ({} destination)", kind.label())
            }
            SetupError::BadPattern { pattern, detail } => {
                write!(f, "invalid pattern '{pattern}': {detail}")
            }
            SetupError::UnknownConstraintArg(name) => {
                write!(f, "constraint references unregistered argument '{name}'")
            }
        }
    }
}

impl std::error::Error for SetupError {}

/// A failed per-argument check, tagged with the check family that rejected
/// the value.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckViolation {
    /// Display name of the offending argument.
    pub name: String,
    /// The staged (already formatted) value that failed.
    pub value: String,
    /// Which check family rejected the value.
    pub category: CheckCategory,
    /// Human-readable description of the rejection.
    pub detail: String,
}

impl fmt::Display for CheckViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "value '{}' for {} failed {} check: {}",
            self.value,
            self.name,
            self.category.label(),
            self.detail
        )
    }
}

/// A violated cross-argument rule, reported after the token stream is
/// exhausted.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintViolation {
    /// Description of the violated rule (e.g. `disjoint(left; right)`).
    pub rule: String,
    /// Display names of the offending arguments.
    pub names: Vec<String>,
    /// Human-readable description of the violation.
    pub detail: String,
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "constraint {} violated by {}: {}",
            self.rule,
            self.names.join(", "),
            self.detail
        )
    }
}

/// Error raised while evaluating a command-line token stream.
///
/// The first parse error aborts the evaluation. Destinations written before
/// the failing token keep their values.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A token looked like an option but matched no registered name.
    UnknownArgument(String),
    /// A free value arrived and no free-value argument is registered.
    UnexpectedFreeValue(String),
    /// An argument requiring a value reached the next argument (or the end
    /// of the stream) without one.
    MissingValue(String),
    /// A value was attached to an argument that takes none.
    UnexpectedValue { name: String, value: String },
    /// A map element did not match the configured pair format.
    MalformedPair {
        name: String,
        element: String,
        expected: String,
    },
    /// Inversion was requested for an argument that disallows it.
    InversionNotSupported(String),
    /// An inversion marker was not followed by an argument.
    MalformedControl(String),
    /// The value is not convertible to the destination's element type.
    TypeMismatch {
        name: String,
        value: String,
        expected: &'static str,
    },
    /// A per-argument check rejected the value.
    Check(CheckViolation),
    /// The argument was used more often than its cardinality limit allows.
    Cardinality { name: String, limit: usize },
    /// A duplicate key or element arrived on a unique destination.
    Duplicate { name: String, value: String },
    /// A cross-argument constraint was violated.
    Constraint(ConstraintViolation),
    /// A mandatory argument never appeared on the command line.
    MissingMandatory(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnknownArgument(token) => write!(f, "unknown argument '{token}'"),
            ParseError::UnexpectedFreeValue(token) => {
                write!(f, "unexpected free value '{token}'")
            }
            ParseError::MissingValue(name) => write!(f, "missing value for {name}"),
            ParseError::UnexpectedValue { name, value } => {
                write!(f, "{name} takes no value, got '{value}'")
            }
            ParseError::MalformedPair {
                name,
                element,
                expected,
            } => write!(f, "malformed pair '{element}' for {name}, expected {expected}"),
            ParseError::InversionNotSupported(name) => {
                write!(f, "{name} does not allow inversion")
            }
            ParseError::MalformedControl(token) => {
                write!(f, "inversion marker must precede an argument, got '{token}'")
            }
            ParseError::TypeMismatch {
                name,
                value,
                expected,
            } => write!(f, "value '{value}' for {name} is not a valid {expected}"),
            ParseError::Check(violation) => violation.fmt(f),
            ParseError::Cardinality { name, limit } => {
                write!(f, "{name} used more than {limit} time(s)")
            }
            ParseError::Duplicate { name, value } => {
                write!(f, "duplicate value '{value}' for {name}")
            }
            ParseError::Constraint(violation) => violation.fmt(f),
            ParseError::MissingMandatory(name) => {
                write!(f, "mandatory argument {name} is missing")
            }
        }
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_error_display() {
        let err = SetupError::DuplicateName("verbose".to_string());
        assert_eq!(format!("{err}"), "argument name 'verbose' is already registered");

        let err = SetupError::SeparatorClash {
            name: "--map".to_string(),
            sep: ',',
        };
        assert_eq!(
            format!("{err}"),
            "list and pair separators for --map must differ (both ',')"
        );
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::TypeMismatch {
            name: "-i".to_string(),
            value: "3.5".to_string(),
            expected: "integer",
        };
        assert_eq!(format!("{err}"), "value '3.5' for -i is not a valid integer");

        let err = ParseError::MissingValue("--output".to_string());
        assert_eq!(format!("{err}"), "missing value for --output");
    }

    #[test]
    fn test_check_violation_display() {
        let violation = CheckViolation {
            name: "-n".to_string(),
            value: "5".to_string(),
            category: CheckCategory::Bounds,
            detail: "below lower bound 10".to_string(),
        };
        assert_eq!(
            format!("{violation}"),
            "value '5' for -n failed bounds check: below lower bound 10"
        );
    }

    #[test]
    fn test_constraint_violation_display() {
        let violation = ConstraintViolation {
            rule: "disjoint(-l; -r)".to_string(),
            names: vec!["-l".to_string(), "-r".to_string()],
            detail: "both contain '4'".to_string(),
        };
        let rendered = format!("{violation}");
        assert!(rendered.contains("disjoint"));
        assert!(rendered.contains("-l, -r"));
    }
}
