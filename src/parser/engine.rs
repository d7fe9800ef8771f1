//! The parse drive loop
//!
//! `parse_tokens` walks the token stream with an index-based state machine.
//! Transient per-call state lives in [`ParseState`]: the descriptor awaiting
//! a value, the pending inversion marker, the literal-escape flag, the
//! multi-value continuation target, and the explicit bracket stack.
//!
//! Ordering per token: formatter chain, then check chain, then conversion
//! and assignment. After the stream is exhausted: optional-value
//! completion, data sorting, cross-argument constraints, and finally
//! mandatory completeness. The first failure aborts the call; destinations
//! written by earlier tokens are not rolled back.

use crate::check::{Check, CheckFailure};
use crate::constraint::ConstraintContext;
use crate::error::{CheckViolation, ParseError};
use crate::format::{apply_chain, FormatScope};
use crate::parser::tokens::{classify, TokenClass};
use crate::registry::spec::{ArgSpec, ValueMode};
use crate::registry::ArgRegistry;
use crate::value::AssignError;

/// Transient state of one `parse_tokens` call.
#[derive(Default)]
struct ParseState {
    /// Descriptor awaiting a value, and whether the value is required.
    pending: Option<Pending>,
    /// An inversion marker was seen; applies to exactly the next argument.
    pending_inversion: bool,
    /// A `--` escape was seen; the next token is a literal value.
    literal_next: bool,
    /// Container still consuming free-looking tokens.
    multival: Option<usize>,
    /// Open control blocks. An explicit stack, so nesting is bounded by
    /// memory rather than call depth.
    bracket_stack: Vec<usize>,
    /// Deepest nesting seen.
    max_depth: usize,
}

struct Pending {
    index: usize,
    required: bool,
}

impl ArgRegistry {
    /// Parse `std::env::args()`, skipping the program name.
    pub fn parse(&mut self) -> Result<(), ParseError> {
        let argv: Vec<String> = std::env::args().skip(1).collect();
        self.parse_tokens(&argv)
    }

    /// Evaluate an explicit token stream against the registered arguments.
    ///
    /// Performs the entire tokenize-validate-assign-constrain sequence
    /// synchronously. On error, destinations already written by earlier
    /// tokens keep their values.
    pub fn parse_tokens<S: AsRef<str>>(&mut self, argv: &[S]) -> Result<(), ParseError> {
        for spec in &mut self.specs {
            spec.reset_parse_state();
        }
        self.reset_builtins();
        self.max_bracket_depth = 0;
        tracing::debug!(tokens = argv.len(), "argument evaluation started");

        let control_pair: Option<(String, String)> = self
            .control
            .as_ref()
            .map(|c| (c.open.clone(), c.close.clone()));
        let mut st = ParseState::default();

        for raw in argv {
            let token = raw.as_ref();
            tracing::trace!(%token, "next token");

            if st.literal_next {
                st.literal_next = false;
                self.route_literal(token, &mut st)?;
                continue;
            }

            let class = classify(
                token,
                self.end_values_enabled,
                control_pair.as_ref().map(|(o, c)| (o.as_str(), c.as_str())),
            );

            if let Some(pending) = st.pending.take() {
                match &class {
                    TokenClass::FreeEscape => {
                        // `-o -- -x` assigns the literal `-x` to -o.
                        st.pending = Some(pending);
                        st.literal_next = true;
                        continue;
                    }
                    c if self.class_is_recognized(c) => {
                        if pending.required {
                            return Err(ParseError::MissingValue(
                                self.specs[pending.index].display_name(),
                            ));
                        }
                        self.assign_missing(pending.index, &mut st)?;
                        // The current token is processed normally below.
                    }
                    _ => {
                        self.apply_and_finish(pending.index, token, &mut st)?;
                        continue;
                    }
                }
            }

            match class {
                TokenClass::ControlOpen => {
                    self.reject_pending_inversion(token, &st)?;
                    st.bracket_stack.push(st.bracket_stack.len() + 1);
                    let depth = st.bracket_stack.len();
                    st.max_depth = st.max_depth.max(depth);
                    if let Some(control) = &mut self.control {
                        control.handler.on_open(depth);
                    }
                }
                TokenClass::ControlClose => {
                    self.reject_pending_inversion(token, &st)?;
                    st.bracket_stack.pop();
                    let depth = st.bracket_stack.len();
                    if let Some(control) = &mut self.control {
                        control.handler.on_close(depth);
                    }
                }
                TokenClass::Inversion => {
                    if st.pending_inversion {
                        return Err(ParseError::MalformedControl("!".to_string()));
                    }
                    st.pending_inversion = true;
                }
                TokenClass::FreeEscape => {
                    self.reject_pending_inversion(token, &st)?;
                    st.literal_next = true;
                }
                TokenClass::EndValues => {
                    self.reject_pending_inversion(token, &st)?;
                    st.multival = None;
                }
                TokenClass::Short(body) => {
                    st.multival = None;
                    self.handle_short(token, body, &mut st)?;
                }
                TokenClass::Long { name, attached } => {
                    st.multival = None;
                    self.handle_long(token, name, attached, &mut st)?;
                }
                TokenClass::Plain(value) => {
                    if st.pending_inversion {
                        return Err(ParseError::MalformedControl(value.to_string()));
                    }
                    if let Some(index) = st.multival {
                        apply_value(&mut self.specs[index], value)?;
                    } else {
                        self.route_free(value, &mut st)?;
                    }
                }
            }
        }

        self.complete(st)
    }

    /// Post-stream phase: pending values, sorting, constraints, mandatory
    /// completeness.
    fn complete(&mut self, mut st: ParseState) -> Result<(), ParseError> {
        if let Some(pending) = st.pending.take() {
            if pending.required {
                return Err(ParseError::MissingValue(
                    self.specs[pending.index].display_name(),
                ));
            }
            self.assign_missing(pending.index, &mut st)?;
        }
        if st.pending_inversion {
            return Err(ParseError::MalformedControl("end of arguments".to_string()));
        }

        for spec in &mut self.specs {
            if spec.sort_data {
                spec.sink.sort();
            }
        }

        let ctx = ConstraintContext::new(&self.specs);
        for constraint in &self.constraints {
            constraint.evaluate(&ctx).map_err(ParseError::Constraint)?;
        }

        for spec in &self.specs {
            if spec.mandatory && spec.uses == 0 {
                return Err(ParseError::MissingMandatory(spec.display_name()));
            }
        }

        self.max_bracket_depth = st.max_depth;
        tracing::debug!(max_bracket_depth = st.max_depth, "argument evaluation finished");
        Ok(())
    }

    fn reject_pending_inversion(&self, token: &str, st: &ParseState) -> Result<(), ParseError> {
        if st.pending_inversion {
            Err(ParseError::MalformedControl(token.to_string()))
        } else {
            Ok(())
        }
    }

    /// Whether a classified token resolves to a registered argument or a
    /// structural marker (used for lookahead decisions on pending values).
    fn class_is_recognized(&self, class: &TokenClass<'_>) -> bool {
        match class {
            TokenClass::Short(body) => body
                .chars()
                .next()
                .map(|c| self.find_short(c).is_some())
                .unwrap_or(false),
            TokenClass::Long { name, .. } => self.find_long(name).is_some(),
            TokenClass::Plain(_) | TokenClass::FreeEscape => false,
            TokenClass::Inversion
            | TokenClass::EndValues
            | TokenClass::ControlOpen
            | TokenClass::ControlClose => true,
        }
    }

    /// Route a token forced literal by `--`: pending value first, then
    /// multi-value continuation, then the free-value slot.
    fn route_literal(&mut self, token: &str, st: &mut ParseState) -> Result<(), ParseError> {
        if let Some(pending) = st.pending.take() {
            self.apply_and_finish(pending.index, token, st)
        } else if let Some(index) = st.multival {
            apply_value(&mut self.specs[index], token)
        } else {
            self.route_free(token, st)
        }
    }

    /// Resolve a short cluster: combined switches, or a short argument
    /// with an attached or following value.
    fn handle_short(&mut self, token: &str, body: &str, st: &mut ParseState) -> Result<(), ParseError> {
        let chars: Vec<char> = body.chars().collect();
        let mut i = 0;
        let mut previous: Option<usize> = None;
        while i < chars.len() {
            match self.find_short(chars[i]) {
                None => {
                    // Not a registered flag: the remainder is an attached
                    // value for the preceding short argument.
                    let Some(prev) = previous else {
                        return Err(ParseError::UnknownArgument(token.to_string()));
                    };
                    let rest: String = chars[i..].iter().collect();
                    return Err(ParseError::UnexpectedValue {
                        name: self.specs[prev].display_name(),
                        value: rest,
                    });
                }
                Some(index) => {
                    let invert = st.pending_inversion;
                    resolve_usage(&mut self.specs[index], invert)?;
                    if self.specs[index].value_mode == ValueMode::None {
                        st.pending_inversion = false;
                        apply_implicit(&mut self.specs[index], invert)?;
                        previous = Some(index);
                        i += 1;
                    } else {
                        let rest: String = chars[i + 1..].iter().collect();
                        if rest.is_empty() {
                            st.pending = Some(Pending {
                                index,
                                required: self.specs[index].value_mode == ValueMode::Required,
                            });
                        } else {
                            self.apply_and_finish(index, &rest, st)?;
                        }
                        return Ok(());
                    }
                }
            }
        }
        Ok(())
    }

    /// Resolve a long argument, with an optional `=`-attached value.
    fn handle_long(
        &mut self,
        token: &str,
        name: &str,
        attached: Option<&str>,
        st: &mut ParseState,
    ) -> Result<(), ParseError> {
        let Some(index) = self.find_long(name) else {
            return Err(ParseError::UnknownArgument(token.to_string()));
        };
        let invert = st.pending_inversion;
        resolve_usage(&mut self.specs[index], invert)?;
        st.pending_inversion = false;
        match (self.specs[index].value_mode, attached) {
            (ValueMode::None, Some(value)) => Err(ParseError::UnexpectedValue {
                name: self.specs[index].display_name(),
                value: value.to_string(),
            }),
            (ValueMode::None, None) => apply_implicit(&mut self.specs[index], invert),
            (_, Some(value)) => self.apply_and_finish(index, value, st),
            (ValueMode::Required, None) => {
                st.pending = Some(Pending {
                    index,
                    required: true,
                });
                Ok(())
            }
            (ValueMode::Optional, None) => {
                st.pending = Some(Pending {
                    index,
                    required: false,
                });
                Ok(())
            }
        }
    }

    /// Bind a free value to the free-value descriptor, if one exists.
    fn route_free(&mut self, value: &str, st: &mut ParseState) -> Result<(), ParseError> {
        let Some(index) = self.free_index() else {
            return Err(ParseError::UnexpectedFreeValue(value.to_string()));
        };
        resolve_usage(&mut self.specs[index], false)?;
        self.apply_and_finish(index, value, st)
    }

    /// Apply a value and arm multi-value continuation if configured.
    fn apply_and_finish(&mut self, index: usize, value: &str, st: &mut ParseState) -> Result<(), ParseError> {
        apply_value(&mut self.specs[index], value)?;
        if self.specs[index].multiple_values {
            st.multival = Some(index);
        }
        Ok(())
    }

    /// An optional value never arrived: assign the configured substitute,
    /// if any.
    fn assign_missing(&mut self, index: usize, st: &mut ParseState) -> Result<(), ParseError> {
        let substitute = self.specs[index].missing_value.clone();
        if let Some(substitute) = substitute {
            self.apply_and_finish(index, &substitute, st)?;
        } else if self.specs[index].multiple_values {
            st.multival = Some(index);
        }
        Ok(())
    }
}

/// Count one usage at the moment the argument is resolved, enforcing the
/// cardinality limit and the inversion permission.
fn resolve_usage(spec: &mut ArgSpec, inversion_pending: bool) -> Result<(), ParseError> {
    if inversion_pending && (spec.value_mode != ValueMode::None || !spec.allows_inversion) {
        return Err(ParseError::InversionNotSupported(spec.display_name()));
    }
    if spec.deprecated {
        tracing::debug!(
            argument = %spec.display_name(),
            replaced_by = ?spec.replaced_by,
            "deprecated argument used"
        );
    }
    spec.uses += 1;
    if let Some(limit) = spec.cardinality {
        if spec.uses > limit {
            return Err(ParseError::Cardinality {
                name: spec.display_name(),
                limit,
            });
        }
    }
    Ok(())
}

/// Assign the implicit boolean a switch produces, honoring `unset_flag`
/// and a pending inversion.
fn apply_implicit(spec: &mut ArgSpec, invert: bool) -> Result<(), ParseError> {
    let mut value = !spec.unset_flag;
    if invert {
        value = !value;
    }
    let name = spec.display_name();
    spec.sink
        .assign(if value { "true" } else { "false" }, false)
        .map_err(|e| map_assign_err(&name, e))
}

/// Run one raw value through the full assignment pipeline: list splitting,
/// pair splitting, formatter chain, check chain, conversion, storage.
fn apply_value(spec: &mut ArgSpec, raw: &str) -> Result<(), ParseError> {
    if spec.clear_before_assign && !spec.cleared {
        spec.sink.clear();
        spec.cleared = true;
    }
    let kind = spec.sink.kind();
    let name = spec.display_name();
    let unique = spec.unique_data;

    let elements: Vec<&str> = if kind.is_container() {
        raw.split(spec.list_sep).collect()
    } else {
        vec![raw]
    };

    for (position, element) in elements.into_iter().enumerate() {
        if kind.accepts_pairs() {
            let inner = strip_brackets(spec, element).ok_or_else(|| ParseError::MalformedPair {
                name: name.clone(),
                element: element.to_string(),
                expected: pair_format_description(spec),
            })?;
            let (raw_key, raw_value) =
                inner
                    .split_once(spec.pair_sep)
                    .ok_or_else(|| ParseError::MalformedPair {
                        name: name.clone(),
                        element: element.to_string(),
                        expected: pair_format_description(spec),
                    })?;
            let key = apply_chain(&spec.formatters, raw_key, Some(FormatScope::Key), None);
            let value = apply_chain(&spec.formatters, raw_value, Some(FormatScope::Value), None);
            run_checks(&spec.checks, &name, &key)?;
            spec.sink
                .assign_pair(&key, &value, unique)
                .map_err(|e| map_assign_err(&name, e))?;
        } else {
            let staged = apply_chain(&spec.formatters, element, None, Some(position));
            run_checks(&spec.checks, &name, &staged)?;
            spec.sink
                .assign(&staged, unique)
                .map_err(|e| map_assign_err(&name, e))?;
        }
    }
    Ok(())
}

/// Remove the configured wrapping delimiters from one map element.
fn strip_brackets<'a>(spec: &ArgSpec, element: &'a str) -> Option<&'a str> {
    match spec.pair_brackets {
        None => Some(element),
        Some((open, close)) => element.strip_prefix(open)?.strip_suffix(close),
    }
}

fn pair_format_description(spec: &ArgSpec) -> String {
    let sep = spec.pair_sep;
    match spec.pair_brackets {
        Some((open, close)) => format!("{open}key{sep}value{close}"),
        None => format!("key{sep}value"),
    }
}

/// Run the check chain in registration order; the first failure aborts.
fn run_checks(checks: &[Box<dyn Check>], name: &str, staged: &str) -> Result<(), ParseError> {
    for check in checks {
        match check.run(staged) {
            Ok(()) => {}
            Err(CheckFailure::NotNumeric) => {
                return Err(ParseError::TypeMismatch {
                    name: name.to_string(),
                    value: staged.to_string(),
                    expected: "number",
                })
            }
            Err(CheckFailure::Failed { detail }) => {
                return Err(ParseError::Check(CheckViolation {
                    name: name.to_string(),
                    value: staged.to_string(),
                    category: check.category(),
                    detail,
                }))
            }
        }
    }
    Ok(())
}

fn map_assign_err(name: &str, err: AssignError) -> ParseError {
    match err {
        AssignError::Convert { value, expected } => ParseError::TypeMismatch {
            name: name.to_string(),
            value,
            expected,
        },
        AssignError::Duplicate(value) => ParseError::Duplicate {
            name: name.to_string(),
            value,
        },
        AssignError::Rejected { value, reason } => ParseError::Check(CheckViolation {
            name: name.to_string(),
            value,
            category: crate::check::CheckCategory::Custom,
            detail: reason,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{scalar, sequence, Handle};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn registry_with_flag() -> (ArgRegistry, Handle<bool>) {
        let flag: Handle<bool> = Rc::new(RefCell::new(false));
        let mut args = ArgRegistry::new();
        args.add("f,flag", scalar(flag.clone()), "a switch").unwrap();
        (args, flag)
    }

    #[test]
    fn test_switch_assignment() {
        let (mut args, flag) = registry_with_flag();
        args.parse_tokens(&["-f"]).unwrap();
        assert!(*flag.borrow());
    }

    #[test]
    fn test_long_switch() {
        let (mut args, flag) = registry_with_flag();
        args.parse_tokens(&["--flag"]).unwrap();
        assert!(*flag.borrow());
    }

    #[test]
    fn test_unknown_argument() {
        let (mut args, _) = registry_with_flag();
        let err = args.parse_tokens(&["-x"]).unwrap_err();
        assert_eq!(err, ParseError::UnknownArgument("-x".to_string()));
    }

    #[test]
    fn test_required_value_attached_and_separate() {
        let dest: Handle<i32> = Rc::new(RefCell::new(0));
        let mut args = ArgRegistry::new();
        args.add("m", scalar(dest.clone()), "a number").unwrap();

        args.parse_tokens(&["-m", "500"]).unwrap();
        assert_eq!(*dest.borrow(), 500);

        args.parse_tokens(&["-m500"]).unwrap();
        assert_eq!(*dest.borrow(), 500);
    }

    #[test]
    fn test_missing_required_value_at_end() {
        let dest: Handle<i32> = Rc::new(RefCell::new(0));
        let mut args = ArgRegistry::new();
        args.add("m", scalar(dest), "a number").unwrap();

        let err = args.parse_tokens(&["-m"]).unwrap_err();
        assert_eq!(err, ParseError::MissingValue("-m".to_string()));
    }

    #[test]
    fn test_missing_required_value_before_argument() {
        let dest: Handle<i32> = Rc::new(RefCell::new(0));
        let flag: Handle<bool> = Rc::new(RefCell::new(false));
        let mut args = ArgRegistry::new();
        args.add("m", scalar(dest), "a number").unwrap();
        args.add("f", scalar(flag), "a switch").unwrap();

        let err = args.parse_tokens(&["-m", "-f"]).unwrap_err();
        assert_eq!(err, ParseError::MissingValue("-m".to_string()));
    }

    #[test]
    fn test_option_looking_value_consumed_when_unregistered() {
        let dest: Handle<i32> = Rc::new(RefCell::new(0));
        let mut args = ArgRegistry::new();
        args.add("m", scalar(dest.clone()), "a number").unwrap();

        // "-5" is not a registered argument, so it supplies the value.
        args.parse_tokens(&["-m", "-5"]).unwrap();
        assert_eq!(*dest.borrow(), -5);
    }

    #[test]
    fn test_free_escape_forces_literal_value() {
        let dest: Handle<String> = Rc::new(RefCell::new(String::new()));
        let flag: Handle<bool> = Rc::new(RefCell::new(false));
        let mut args = ArgRegistry::new();
        args.add("o", scalar(dest.clone()), "output").unwrap();
        args.add("f", scalar(flag), "a switch").unwrap();

        args.parse_tokens(&["-o", "--", "-f"]).unwrap();
        assert_eq!(*dest.borrow(), "-f");
    }

    #[test]
    fn test_multival_continuation() {
        let dest: Handle<Vec<i32>> = Rc::new(RefCell::new(Vec::new()));
        let flag: Handle<bool> = Rc::new(RefCell::new(false));
        let mut args = ArgRegistry::new();
        args.add("i", sequence(dest.clone()), "numbers")
            .unwrap()
            .set_multiple_values()
            .unwrap();
        args.add("f", scalar(flag.clone()), "a switch").unwrap();

        args.parse_tokens(&["-i", "1", "2", "3", "-f"]).unwrap();
        assert_eq!(*dest.borrow(), vec![1, 2, 3]);
        assert!(*flag.borrow());
    }

    #[test]
    fn test_end_values_sentinel() {
        let dest: Handle<Vec<i32>> = Rc::new(RefCell::new(Vec::new()));
        let free: Handle<Vec<String>> = Rc::new(RefCell::new(Vec::new()));
        let mut args = ArgRegistry::new();
        args.enable_end_values();
        args.add("i", sequence(dest.clone()), "numbers")
            .unwrap()
            .set_multiple_values()
            .unwrap();
        args.add("-", sequence(free.clone()), "files").unwrap();

        args.parse_tokens(&["-i", "1", "2", "--endvalues", "in.txt"])
            .unwrap();
        assert_eq!(*dest.borrow(), vec![1, 2]);
        assert_eq!(*free.borrow(), vec!["in.txt"]);
    }

    #[test]
    fn test_cardinality_enforced_at_moment_of_use() {
        let dest: Handle<i32> = Rc::new(RefCell::new(0));
        let mut args = ArgRegistry::new();
        args.add("m", scalar(dest), "a number").unwrap();

        let err = args.parse_tokens(&["-m", "1", "-m", "2"]).unwrap_err();
        assert_eq!(
            err,
            ParseError::Cardinality {
                name: "-m".to_string(),
                limit: 1,
            }
        );
    }

    #[test]
    fn test_inversion_flips_switch() {
        let flag: Handle<bool> = Rc::new(RefCell::new(false));
        let mut args = ArgRegistry::new();
        args.add("f,flag", scalar(flag.clone()), "a switch")
            .unwrap()
            .allow_inversion()
            .unwrap();

        args.parse_tokens(&["!", "-f"]).unwrap();
        assert!(!*flag.borrow());
        args.parse_tokens(&["-f"]).unwrap();
        assert!(*flag.borrow());
    }

    #[test]
    fn test_inversion_on_disallowing_argument() {
        let (mut args, _) = registry_with_flag();
        let err = args.parse_tokens(&["!", "-f"]).unwrap_err();
        assert_eq!(err, ParseError::InversionNotSupported("--flag".to_string()));
    }

    #[test]
    fn test_inversion_before_value_is_malformed() {
        let free: Handle<Vec<String>> = Rc::new(RefCell::new(Vec::new()));
        let mut args = ArgRegistry::new();
        args.add("-", sequence(free), "files").unwrap();

        let err = args.parse_tokens(&["!", "in.txt"]).unwrap_err();
        assert_eq!(err, ParseError::MalformedControl("in.txt".to_string()));
    }

    #[test]
    fn test_trailing_inversion_is_malformed() {
        let (mut args, _) = registry_with_flag();
        let err = args.parse_tokens(&["!"]).unwrap_err();
        assert!(matches!(err, ParseError::MalformedControl(_)));
    }

    #[test]
    fn test_unset_flag_stores_false() {
        let flag: Handle<bool> = Rc::new(RefCell::new(true));
        let mut args = ArgRegistry::new();
        args.add("q", scalar(flag.clone()), "quiet")
            .unwrap()
            .unset_flag()
            .unwrap();

        args.parse_tokens(&["-q"]).unwrap();
        assert!(!*flag.borrow());
    }
}
