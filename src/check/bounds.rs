//! Numeric bound checks
//!
//! Lower, upper, and range bounds over the staged value parsed as a number.
//! The lower bound is inclusive and the upper bound exclusive, so
//! `range(10, 100)` accepts 10 and 99 but rejects 100.

use crate::check::{Check, CheckCategory, CheckFailure};

enum Bound {
    Lower(f64),
    Upper(f64),
    Range(f64, f64),
}

/// Numeric bound over a staged value. All three variants share the bounds
/// category, so at most one of lower/upper/range may be attached.
pub struct BoundsCheck {
    bound: Bound,
}

impl Check for BoundsCheck {
    fn category(&self) -> CheckCategory {
        CheckCategory::Bounds
    }

    fn describe(&self) -> String {
        match self.bound {
            Bound::Lower(min) => format!("at least {min}"),
            Bound::Upper(max) => format!("below {max}"),
            Bound::Range(min, max) => format!("in [{min}, {max})"),
        }
    }

    fn run(&self, staged: &str) -> Result<(), CheckFailure> {
        let value: f64 = staged.trim().parse().map_err(|_| CheckFailure::NotNumeric)?;
        let ok = match self.bound {
            Bound::Lower(min) => value >= min,
            Bound::Upper(max) => value < max,
            Bound::Range(min, max) => value >= min && value < max,
        };
        if ok {
            Ok(())
        } else {
            Err(CheckFailure::Failed {
                detail: format!("{staged} is not {}", self.describe()),
            })
        }
    }
}

/// Require the value to be at least `min` (inclusive).
pub fn lower(min: f64) -> Box<dyn Check> {
    Box::new(BoundsCheck {
        bound: Bound::Lower(min),
    })
}

/// Require the value to be below `max` (exclusive).
pub fn upper(max: f64) -> Box<dyn Check> {
    Box::new(BoundsCheck {
        bound: Bound::Upper(max),
    })
}

/// Require `min <= value < max`.
pub fn range(min: f64, max: f64) -> Box<dyn Check> {
    Box::new(BoundsCheck {
        bound: Bound::Range(min, max),
    })
}
