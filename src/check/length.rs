//! String length checks
//!
//! Bounds over the character count of a staged value. Length checks are
//! stackable, so a minimum and a maximum can be attached separately.

use crate::check::{Check, CheckCategory, CheckFailure};

/// Character-count bounds over a staged value.
pub struct LengthCheck {
    min: Option<usize>,
    max: Option<usize>,
}

impl Check for LengthCheck {
    fn category(&self) -> CheckCategory {
        CheckCategory::Length
    }

    fn describe(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("length {min}..={max}"),
            (Some(min), None) => format!("length at least {min}"),
            (None, Some(max)) => format!("length at most {max}"),
            (None, None) => "length unbounded".to_string(),
        }
    }

    fn run(&self, staged: &str) -> Result<(), CheckFailure> {
        let count = staged.chars().count();
        let ok = self.min.map_or(true, |min| count >= min)
            && self.max.map_or(true, |max| count <= max);
        if ok {
            Ok(())
        } else {
            Err(CheckFailure::Failed {
                detail: format!("'{staged}' has {count} character(s), expected {}", self.describe()),
            })
        }
    }
}

/// Require `min <= chars <= max`.
pub fn length(min: usize, max: usize) -> Box<dyn Check> {
    Box::new(LengthCheck {
        min: Some(min),
        max: Some(max),
    })
}

/// Require at least `min` characters.
pub fn min_length(min: usize) -> Box<dyn Check> {
    Box::new(LengthCheck {
        min: Some(min),
        max: None,
    })
}

/// Require at most `max` characters.
pub fn max_length(max: usize) -> Box<dyn Check> {
    Box::new(LengthCheck {
        min: None,
        max: Some(max),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_range_inclusive() {
        let check = length(2, 4);
        assert!(check.run("ab").is_ok());
        assert!(check.run("abcd").is_ok());
        assert!(check.run("a").is_err());
        assert!(check.run("abcde").is_err());
    }

    #[test]
    fn test_min_and_max_alone() {
        assert!(min_length(3).run("abc").is_ok());
        assert!(min_length(3).run("ab").is_err());
        assert!(max_length(2).run("ab").is_ok());
        assert!(max_length(2).run("abc").is_err());
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let check = max_length(2);
        assert!(check.run("äö").is_ok());
    }

    #[test]
    fn test_describe() {
        assert_eq!(length(1, 8).describe(), "length 1..=8");
        assert_eq!(min_length(2).describe(), "length at least 2");
        assert_eq!(max_length(9).describe(), "length at most 9");
    }
}
