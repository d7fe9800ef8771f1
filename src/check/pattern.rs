//! Regular-expression pattern check
//!
//! The expression is compiled when the check is constructed, so a bad
//! pattern fails at setup time rather than on the first parsed token.

use crate::check::{Check, CheckCategory, CheckFailure};
use crate::error::SetupError;
use regex::Regex;

/// Regex match over a staged value.
pub struct PatternCheck {
    expression: String,
    regex: Regex,
}

impl Check for PatternCheck {
    fn category(&self) -> CheckCategory {
        CheckCategory::Pattern
    }

    fn describe(&self) -> String {
        format!("matches /{}/", self.expression)
    }

    fn run(&self, staged: &str) -> Result<(), CheckFailure> {
        if self.regex.is_match(staged) {
            Ok(())
        } else {
            Err(CheckFailure::Failed {
                detail: format!("'{staged}' does not match /{}/", self.expression),
            })
        }
    }
}

/// Require the value to match `expression`. Compilation failures surface
/// as a setup error at the call site.
pub fn pattern(expression: &str) -> Result<Box<dyn Check>, SetupError> {
    let regex = Regex::new(expression).map_err(|e| SetupError::BadPattern {
        pattern: expression.to_string(),
        detail: e.to_string(),
    })?;
    Ok(Box::new(PatternCheck {
        expression: expression.to_string(),
        regex,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_match() {
        let check = pattern("^[a-z]+$").unwrap();
        assert!(check.run("hello").is_ok());
        assert!(check.run("Hello").is_err());
        assert!(check.run("").is_err());
    }

    #[test]
    fn test_bad_pattern_is_setup_error() {
        let err = pattern("[unclosed").unwrap_err();
        assert!(matches!(err, SetupError::BadPattern { .. }));
    }

    #[test]
    fn test_describe() {
        let check = pattern("^x").unwrap();
        assert_eq!(check.describe(), "matches /^x/");
    }
}
