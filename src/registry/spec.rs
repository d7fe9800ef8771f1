//! Argument descriptor and fluent configuration
//!
//! An [`ArgSpec`] is created once through [`crate::registry::ArgRegistry::add`]
//! and configured through the fluent calls below before parsing begins. Its
//! identity (names, free-value slot, bound destination) is immutable after
//! creation.
//!
//! Every configuration call validates applicability against the bound
//! destination kind and fails with a [`SetupError`] at the call site, so a
//! structurally invalid declaration never reaches the parser.

use crate::check::Check;
use crate::error::SetupError;
use crate::format::{FormatScope, Formatter, ScopedFormatter};
use crate::value::{SinkKind, ValueSink};

/// Whether an argument requires, optionally accepts, or never accepts a
/// following value token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueMode {
    /// The argument is a switch; using it assigns an implicit boolean.
    None,
    /// A following token is consumed as the value only if it is not itself
    /// a registered argument token.
    Optional,
    /// The next token must supply the value.
    Required,
}

impl ValueMode {
    /// Lowercase label used in the introspection listing.
    pub fn label(self) -> &'static str {
        match self {
            ValueMode::None => "none",
            ValueMode::Optional => "optional",
            ValueMode::Required => "required",
        }
    }
}

/// One registered argument: identity, destination binding, chains, flags.
pub struct ArgSpec {
    pub(crate) short: Option<char>,
    pub(crate) long: Option<String>,
    pub(crate) free: bool,
    pub(crate) description: String,
    pub(crate) sink: Box<dyn ValueSink>,
    pub(crate) value_mode: ValueMode,
    pub(crate) checks: Vec<Box<dyn Check>>,
    pub(crate) formatters: Vec<ScopedFormatter>,
    pub(crate) mandatory: bool,
    pub(crate) hidden: bool,
    pub(crate) deprecated: bool,
    pub(crate) replaced_by: Option<String>,
    pub(crate) allows_inversion: bool,
    pub(crate) multiple_values: bool,
    pub(crate) sort_data: bool,
    pub(crate) unique_data: bool,
    pub(crate) clear_before_assign: bool,
    /// `None` means unlimited. Counted per argument usage, not per element.
    pub(crate) cardinality: Option<usize>,
    pub(crate) list_sep: char,
    pub(crate) pair_sep: char,
    pub(crate) pair_brackets: Option<(char, char)>,
    pub(crate) unset_flag: bool,
    /// Substitute assigned when an optional value is absent.
    pub(crate) missing_value: Option<String>,
    /// Registered by an enabled built-in (help); collisions report
    /// [`SetupError::ReservedName`].
    pub(crate) builtin: bool,
    /// Usage count from the most recent parse.
    pub(crate) uses: usize,
    /// Whether clear-before-assign already fired during the current parse.
    pub(crate) cleared: bool,
}

impl std::fmt::Debug for ArgSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArgSpec")
            .field("short", &self.short)
            .field("long", &self.long)
            .field("free", &self.free)
            .field("description", &self.description)
            .field("value_mode", &self.value_mode)
            .field("checks", &self.checks)
            .field("mandatory", &self.mandatory)
            .field("hidden", &self.hidden)
            .field("deprecated", &self.deprecated)
            .field("replaced_by", &self.replaced_by)
            .field("allows_inversion", &self.allows_inversion)
            .field("multiple_values", &self.multiple_values)
            .field("cardinality", &self.cardinality)
            .field("builtin", &self.builtin)
            .field("uses", &self.uses)
            .finish_non_exhaustive()
    }
}

/// Default element separator for one-token list values.
pub const DEFAULT_LIST_SEP: char = ',';
/// Default element separator for one-token map values.
pub const DEFAULT_MAP_LIST_SEP: char = ';';
/// Default key/value separator inside one map element.
pub const DEFAULT_PAIR_SEP: char = ',';

impl ArgSpec {
    pub(crate) fn new(
        short: Option<char>,
        long: Option<String>,
        free: bool,
        sink: Box<dyn ValueSink>,
        description: &str,
    ) -> Self {
        let kind = sink.kind();
        // A bool scalar defaults to a switch; everything else wants a value.
        let value_mode = if kind == SinkKind::Scalar && sink.element_type() == "bool" {
            ValueMode::None
        } else {
            ValueMode::Required
        };
        let cardinality = if kind.is_container() || kind == SinkKind::Callable {
            None
        } else {
            Some(1)
        };
        let list_sep = if kind.accepts_pairs() {
            DEFAULT_MAP_LIST_SEP
        } else {
            DEFAULT_LIST_SEP
        };
        ArgSpec {
            short,
            long,
            free,
            description: description.to_string(),
            sink,
            value_mode,
            checks: Vec::new(),
            formatters: Vec::new(),
            mandatory: false,
            hidden: false,
            deprecated: false,
            replaced_by: None,
            allows_inversion: false,
            multiple_values: false,
            sort_data: false,
            unique_data: false,
            clear_before_assign: false,
            cardinality,
            list_sep,
            pair_sep: DEFAULT_PAIR_SEP,
            pair_brackets: None,
            unset_flag: false,
            missing_value: None,
            builtin: false,
            uses: 0,
            cleared: false,
        }
    }

    // -- identity & state accessors --------------------------------------

    /// Display name used in errors and listings: the long name if present,
    /// else the short name, else the free-value label.
    pub fn display_name(&self) -> String {
        if let Some(long) = &self.long {
            format!("--{long}")
        } else if let Some(short) = self.short {
            format!("-{short}")
        } else {
            "free value".to_string()
        }
    }

    /// Short name, if any.
    pub fn short(&self) -> Option<char> {
        self.short
    }

    /// Long name, if any.
    pub fn long(&self) -> Option<&str> {
        self.long.as_deref()
    }

    /// Whether this is the free-value descriptor.
    pub fn is_free(&self) -> bool {
        self.free
    }

    /// The registered description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Current value mode.
    pub fn value_mode(&self) -> ValueMode {
        self.value_mode
    }

    /// The bound destination kind.
    pub fn kind(&self) -> SinkKind {
        self.sink.kind()
    }

    /// Number of elements the destination currently holds.
    pub fn held(&self) -> usize {
        self.sink.len()
    }

    /// How many times the argument was used in the most recent parse.
    pub fn uses(&self) -> usize {
        self.uses
    }

    /// Whether the argument is marked mandatory.
    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    /// Whether the argument is hidden from the default listing.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    fn not_applicable(&self, call: &'static str) -> SetupError {
        SetupError::NotApplicable {
            call,
            name: self.display_name(),
            kind: self.sink.kind(),
        }
    }

    // -- fluent configuration --------------------------------------------

    /// Set the value mode. `None` is only meaningful for destinations that
    /// can take an implicit boolean (bool scalars and callables); the free
    /// value slot always consumes its token as a value.
    pub fn set_value_mode(&mut self, mode: ValueMode) -> Result<&mut Self, SetupError> {
        if self.free {
            return Err(self.not_applicable("set_value_mode"));
        }
        let kind = self.sink.kind();
        if mode == ValueMode::None
            && !(kind == SinkKind::Callable || self.sink.supports_negation())
        {
            return Err(SetupError::BadValueMode {
                name: self.display_name(),
                kind,
            });
        }
        self.value_mode = mode;
        Ok(self)
    }

    /// Set the substitute assigned when an optional value is absent.
    pub fn set_missing_value(&mut self, substitute: &str) -> Result<&mut Self, SetupError> {
        if self.value_mode != ValueMode::Optional {
            return Err(self.not_applicable("set_missing_value"));
        }
        self.missing_value = Some(substitute.to_string());
        Ok(self)
    }

    /// Attach a check. Exclusive categories (bounds, enumerated values)
    /// reject a second check of the same family.
    pub fn add_check(&mut self, check: Box<dyn Check>) -> Result<&mut Self, SetupError> {
        let category = check.category();
        if category.exclusive() && self.checks.iter().any(|c| c.category() == category) {
            return Err(SetupError::ConflictingCheck {
                name: self.display_name(),
                category,
            });
        }
        self.checks.push(check);
        Ok(self)
    }

    /// Attach a formatter applied to every staged element.
    pub fn add_format(&mut self, formatter: Box<dyn Formatter>) -> Result<&mut Self, SetupError> {
        self.formatters.push(ScopedFormatter {
            scope: FormatScope::All,
            formatter,
        });
        Ok(self)
    }

    /// Attach a formatter scoped to map keys, map values, or one list
    /// position. Key/Value scoping requires a map kind; positional scoping
    /// requires a sequence.
    pub fn add_format_scoped(
        &mut self,
        scope: FormatScope,
        formatter: Box<dyn Formatter>,
    ) -> Result<&mut Self, SetupError> {
        let kind = self.sink.kind();
        let legal = match scope {
            FormatScope::All => true,
            FormatScope::Key | FormatScope::Value => kind.accepts_pairs(),
            FormatScope::Position(_) => kind == SinkKind::Sequence,
        };
        if !legal {
            return Err(self.not_applicable("add_format_scoped"));
        }
        self.formatters.push(ScopedFormatter { scope, formatter });
        Ok(self)
    }

    /// Set the separator that splits one token into list elements.
    pub fn set_list_sep(&mut self, sep: char) -> Result<&mut Self, SetupError> {
        let kind = self.sink.kind();
        if !kind.is_container() {
            return Err(self.not_applicable("set_list_sep"));
        }
        if kind.accepts_pairs() && sep == self.pair_sep {
            return Err(SetupError::SeparatorClash {
                name: self.display_name(),
                sep,
            });
        }
        self.list_sep = sep;
        Ok(self)
    }

    /// Configure how one map element splits into key and value, and
    /// optionally a wrapping delimiter pair such as `"{}"`.
    pub fn set_pair_format(
        &mut self,
        sep: char,
        brackets: Option<&str>,
    ) -> Result<&mut Self, SetupError> {
        if !self.sink.kind().accepts_pairs() {
            return Err(self.not_applicable("set_pair_format"));
        }
        if sep == self.list_sep {
            return Err(SetupError::SeparatorClash {
                name: self.display_name(),
                sep,
            });
        }
        let pair_brackets = match brackets {
            None => None,
            Some(spec) => {
                let mut chars = spec.chars();
                match (chars.next(), chars.next(), chars.next()) {
                    (Some(open), Some(close), None) => Some((open, close)),
                    _ => {
                        return Err(SetupError::BadPairBrackets {
                            name: self.display_name(),
                            brackets: spec.to_string(),
                        })
                    }
                }
            }
        };
        self.pair_sep = sep;
        self.pair_brackets = pair_brackets;
        Ok(self)
    }

    /// Limit how many times the argument may be used on one command line.
    pub fn set_cardinality(&mut self, limit: usize) -> Result<&mut Self, SetupError> {
        if limit == 0 {
            return Err(SetupError::BadCardinality {
                name: self.display_name(),
                limit,
            });
        }
        self.cardinality = Some(limit);
        Ok(self)
    }

    /// Empty the pre-existing destination contents once, on the first value
    /// assigned during a parse. Requires the optional value mode.
    pub fn set_clear_before_assign(&mut self) -> Result<&mut Self, SetupError> {
        if self.value_mode != ValueMode::Optional {
            return Err(SetupError::ClearRequiresOptional(self.display_name()));
        }
        self.clear_before_assign = true;
        Ok(self)
    }

    /// Sort the destination contents after parsing completes. Rejected for
    /// unordered container kinds.
    pub fn set_sort_data(&mut self) -> Result<&mut Self, SetupError> {
        let kind = self.sink.kind();
        if !kind.is_container() {
            return Err(self.not_applicable("set_sort_data"));
        }
        if !kind.is_sortable() {
            return Err(SetupError::SortUnsupported(self.display_name()));
        }
        self.sort_data = true;
        Ok(self)
    }

    /// Turn duplicate keys/elements into errors instead of the kind's
    /// default overwrite/accumulate behavior.
    pub fn set_unique_data(&mut self) -> Result<&mut Self, SetupError> {
        if !self.sink.kind().is_container() {
            return Err(self.not_applicable("set_unique_data"));
        }
        self.unique_data = true;
        Ok(self)
    }

    /// Make the switch store `false` when used. Boolean scalars only.
    pub fn unset_flag(&mut self) -> Result<&mut Self, SetupError> {
        if !(self.sink.kind() == SinkKind::Scalar && self.sink.supports_negation()) {
            return Err(self.not_applicable("unset_flag"));
        }
        self.unset_flag = true;
        Ok(self)
    }

    /// Allow the `!` inversion marker before this argument. Only legal for
    /// destinations whose value can be semantically negated.
    pub fn allow_inversion(&mut self) -> Result<&mut Self, SetupError> {
        if !self.sink.supports_negation() {
            return Err(SetupError::InversionUnsupported(self.display_name()));
        }
        self.allows_inversion = true;
        Ok(self)
    }

    /// Mark the argument mandatory. A pure switch (bool scalar without a
    /// value mode) cannot be mandatory.
    pub fn set_is_mandatory(&mut self) -> Result<&mut Self, SetupError> {
        if self.value_mode == ValueMode::None && self.sink.kind() == SinkKind::Scalar {
            return Err(SetupError::MandatoryFlag(self.display_name()));
        }
        self.mandatory = true;
        Ok(self)
    }

    /// Keep routing free-looking tokens to this destination after its value
    /// mode is satisfied. Containers and callables only.
    pub fn set_multiple_values(&mut self) -> Result<&mut Self, SetupError> {
        let kind = self.sink.kind();
        if !(kind.is_container() || kind == SinkKind::Callable) {
            return Err(self.not_applicable("set_multiple_values"));
        }
        self.multiple_values = true;
        Ok(self)
    }

    /// Hide the argument from the default introspection listing.
    pub fn set_hidden(&mut self) -> &mut Self {
        self.hidden = true;
        self
    }

    /// Mark the argument deprecated, optionally naming its replacement.
    pub fn set_deprecated(&mut self, replaced_by: Option<&str>) -> &mut Self {
        self.deprecated = true;
        self.replaced_by = replaced_by.map(str::to_string);
        self
    }

    // -- parse-time support ----------------------------------------------

    /// Reset per-parse state (usage counter, clear marker).
    pub(crate) fn reset_parse_state(&mut self) {
        self.uses = 0;
        self.cleared = false;
    }

    /// Descriptions of the attached checks, in registration order.
    pub fn check_descriptions(&self) -> Vec<String> {
        self.checks.iter().map(|c| c.describe()).collect()
    }

    /// Descriptions of the attached formatters, in registration order.
    pub fn format_descriptions(&self) -> Vec<String> {
        self.formatters.iter().map(|f| f.describe()).collect()
    }

    /// Whether either name matches `name` (without dashes).
    pub(crate) fn matches_name(&self, name: &str) -> bool {
        let mut chars = name.chars();
        let single = match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        };
        if let Some(c) = single {
            if self.short == Some(c) {
                return true;
            }
        }
        self.long.as_deref() == Some(name) || (self.free && name == "-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{lower, range, values};
    use crate::format::{lowercase, uppercase};
    use crate::value::{map, scalar, sequence, Handle};
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    fn int_scalar() -> ArgSpec {
        let dest: Handle<i32> = Rc::new(RefCell::new(0));
        ArgSpec::new(Some('i'), Some("int".to_string()), false, scalar(dest), "an int")
    }

    fn int_sequence() -> ArgSpec {
        let dest: Handle<Vec<i32>> = Rc::new(RefCell::new(Vec::new()));
        ArgSpec::new(Some('s'), None, false, sequence(dest), "ints")
    }

    fn string_map() -> ArgSpec {
        let dest: Handle<BTreeMap<i32, String>> = Rc::new(RefCell::new(BTreeMap::new()));
        ArgSpec::new(Some('m'), None, false, map(dest), "a map")
    }

    fn bool_flag() -> ArgSpec {
        let dest: Handle<bool> = Rc::new(RefCell::new(false));
        ArgSpec::new(Some('f'), Some("flag".to_string()), false, scalar(dest), "a flag")
    }

    #[test]
    fn test_default_value_modes() {
        assert_eq!(bool_flag().value_mode(), ValueMode::None);
        assert_eq!(int_scalar().value_mode(), ValueMode::Required);
        assert_eq!(int_sequence().value_mode(), ValueMode::Required);
    }

    #[test]
    fn test_default_cardinality() {
        assert_eq!(int_scalar().cardinality, Some(1));
        assert_eq!(int_sequence().cardinality, None);
    }

    #[test]
    fn test_default_separators() {
        assert_eq!(int_sequence().list_sep, ',');
        let map_spec = string_map();
        assert_eq!(map_spec.list_sep, ';');
        assert_eq!(map_spec.pair_sep, ',');
    }

    #[test]
    fn test_display_name_prefers_long() {
        assert_eq!(int_scalar().display_name(), "--int");
        assert_eq!(int_sequence().display_name(), "-s");
    }

    #[test]
    fn test_conflicting_bound_checks_rejected() {
        let mut spec = int_scalar();
        spec.add_check(range(10.0, 100.0)).unwrap();
        let err = spec.add_check(range(10.0, 100.0)).unwrap_err();
        assert!(matches!(err, SetupError::ConflictingCheck { .. }));

        let mut spec = int_scalar();
        spec.add_check(lower(1.0)).unwrap();
        let err = spec.add_check(lower(2.0)).unwrap_err();
        assert!(matches!(err, SetupError::ConflictingCheck { .. }));
    }

    #[test]
    fn test_lower_and_range_share_category() {
        let mut spec = int_scalar();
        spec.add_check(lower(1.0)).unwrap();
        assert!(spec.add_check(range(0.0, 9.0)).is_err());
    }

    #[test]
    fn test_enumerated_values_exclusive() {
        let mut spec = int_scalar();
        spec.add_check(values(["1", "2"])).unwrap();
        assert!(spec.add_check(values(["3"])).is_err());
        // Bounds and values can coexist.
        assert!(spec.add_check(range(0.0, 9.0)).is_ok());
    }

    #[test]
    fn test_list_sep_requires_container() {
        let mut spec = int_scalar();
        assert!(matches!(
            spec.set_list_sep(':').unwrap_err(),
            SetupError::NotApplicable { .. }
        ));
        assert!(int_sequence().set_list_sep(':').is_ok());
    }

    #[test]
    fn test_pair_format_requires_map() {
        let mut spec = int_sequence();
        assert!(spec.set_pair_format(':', None).is_err());

        let mut spec = string_map();
        spec.set_pair_format(':', Some("{}")).unwrap();
        assert_eq!(spec.pair_sep, ':');
        assert_eq!(spec.pair_brackets, Some(('{', '}')));
    }

    #[test]
    fn test_separator_clash_rejected() {
        let mut spec = string_map();
        // Map list separator defaults to ';'.
        assert!(matches!(
            spec.set_pair_format(';', None).unwrap_err(),
            SetupError::SeparatorClash { .. }
        ));
        assert!(matches!(
            spec.set_list_sep(',').unwrap_err(),
            SetupError::SeparatorClash { .. }
        ));
    }

    #[test]
    fn test_bad_pair_brackets() {
        let mut spec = string_map();
        assert!(matches!(
            spec.set_pair_format(':', Some("{")).unwrap_err(),
            SetupError::BadPairBrackets { .. }
        ));
    }

    #[test]
    fn test_clear_before_assign_requires_optional() {
        let mut spec = int_sequence();
        assert!(matches!(
            spec.set_clear_before_assign().unwrap_err(),
            SetupError::ClearRequiresOptional(_)
        ));
        spec.set_value_mode(ValueMode::Optional).unwrap();
        assert!(spec.set_clear_before_assign().is_ok());
    }

    #[test]
    fn test_sort_and_unique_require_container() {
        let mut spec = int_scalar();
        assert!(spec.set_sort_data().is_err());
        assert!(spec.set_unique_data().is_err());
        assert!(int_sequence().set_sort_data().is_ok());
        assert!(int_sequence().set_unique_data().is_ok());
    }

    #[test]
    fn test_unset_flag_only_for_bool_scalar() {
        assert!(bool_flag().unset_flag().is_ok());
        assert!(int_scalar().unset_flag().is_err());
    }

    #[test]
    fn test_inversion_requires_negatable_destination() {
        assert!(bool_flag().allow_inversion().is_ok());
        assert!(matches!(
            int_scalar().allow_inversion().unwrap_err(),
            SetupError::InversionUnsupported(_)
        ));
    }

    #[test]
    fn test_mandatory_flag_contradiction() {
        assert!(matches!(
            bool_flag().set_is_mandatory().unwrap_err(),
            SetupError::MandatoryFlag(_)
        ));
        assert!(int_scalar().set_is_mandatory().is_ok());
    }

    #[test]
    fn test_value_mode_none_needs_negatable_destination() {
        let mut spec = int_scalar();
        assert!(matches!(
            spec.set_value_mode(ValueMode::None).unwrap_err(),
            SetupError::BadValueMode { .. }
        ));
    }

    #[test]
    fn test_scoped_format_applicability() {
        let mut spec = string_map();
        assert!(spec
            .add_format_scoped(FormatScope::Key, uppercase())
            .is_ok());

        let mut spec = int_sequence();
        assert!(spec
            .add_format_scoped(FormatScope::Key, uppercase())
            .is_err());
        assert!(spec
            .add_format_scoped(FormatScope::Position(0), lowercase())
            .is_ok());

        let mut spec = string_map();
        assert!(spec
            .add_format_scoped(FormatScope::Position(0), lowercase())
            .is_err());
    }

    #[test]
    fn test_zero_cardinality_rejected() {
        let mut spec = int_sequence();
        assert!(matches!(
            spec.set_cardinality(0).unwrap_err(),
            SetupError::BadCardinality { .. }
        ));
        assert!(spec.set_cardinality(3).is_ok());
    }

    #[test]
    fn test_multiple_values_requires_container() {
        assert!(int_scalar().set_multiple_values().is_err());
        assert!(int_sequence().set_multiple_values().is_ok());
    }

    #[test]
    fn test_matches_name() {
        let spec = int_scalar();
        assert!(spec.matches_name("i"));
        assert!(spec.matches_name("int"));
        assert!(!spec.matches_name("x"));
    }
}
