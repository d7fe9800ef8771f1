//! User-supplied predicate check
//!
//! The escape hatch for project-specific validation. Stackable; conflicts
//! never arise from this family.

use crate::check::{Check, CheckCategory, CheckFailure};

/// Wraps a user closure as a check.
pub struct CustomCheck {
    label: String,
    f: Box<dyn Fn(&str) -> Result<(), String>>,
}

impl Check for CustomCheck {
    fn category(&self) -> CheckCategory {
        CheckCategory::Custom
    }

    fn describe(&self) -> String {
        self.label.clone()
    }

    fn run(&self, staged: &str) -> Result<(), CheckFailure> {
        (self.f)(staged).map_err(|detail| CheckFailure::Failed { detail })
    }
}

/// Attach a user predicate. `label` appears in the introspection listing.
pub fn predicate<F>(label: &str, f: F) -> Box<dyn Check>
where
    F: Fn(&str) -> Result<(), String> + 'static,
{
    Box::new(CustomCheck {
        label: label.to_string(),
        f: Box::new(f),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicate_outcomes() {
        let check = predicate("even number", |s| {
            let n: i64 = s.parse().map_err(|_| "not a number".to_string())?;
            if n % 2 == 0 {
                Ok(())
            } else {
                Err(format!("{n} is odd"))
            }
        });

        assert!(check.run("4").is_ok());
        assert_eq!(
            check.run("5"),
            Err(CheckFailure::Failed {
                detail: "5 is odd".to_string()
            })
        );
        assert_eq!(check.describe(), "even number");
    }
}
