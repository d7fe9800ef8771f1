//! Enumerated-values check
//!
//! Restricts a staged value to a fixed set of allowed spellings. The
//! comparison runs after the formatter chain, so a case-folding formatter
//! can normalize input before the membership test.

use crate::check::{Check, CheckCategory, CheckFailure};

/// Membership test against a fixed list of allowed values.
pub struct ValuesCheck {
    allowed: Vec<String>,
}

impl Check for ValuesCheck {
    fn category(&self) -> CheckCategory {
        CheckCategory::EnumeratedValues
    }

    fn describe(&self) -> String {
        format!("one of [{}]", self.allowed.join(", "))
    }

    fn run(&self, staged: &str) -> Result<(), CheckFailure> {
        if self.allowed.iter().any(|a| a == staged) {
            Ok(())
        } else {
            Err(CheckFailure::Failed {
                detail: format!("'{staged}' is not {}", self.describe()),
            })
        }
    }
}

/// Restrict the value to the given spellings.
pub fn values<I, S>(allowed: I) -> Box<dyn Check>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Box::new(ValuesCheck {
        allowed: allowed.into_iter().map(Into::into).collect(),
    })
}
