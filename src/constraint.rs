//! Cross-argument constraints
//!
//! Constraints are relations over two or more registered arguments,
//! evaluated exactly once per parse: after the token stream is exhausted
//! and before mandatory completeness is checked. A violated constraint
//! aborts the parse with a [`ConstraintViolation`] identifying the
//! offending arguments.
//!
//! Constraint specification strings name arguments separated by `;`
//! (short or long form, no dashes), e.g. `disjoint("l;r")`.

use crate::error::ConstraintViolation;
use crate::registry::spec::ArgSpec;

/// Read-only view over the parsed argument state handed to constraints.
pub struct ConstraintContext<'a> {
    specs: &'a [ArgSpec],
}

impl<'a> ConstraintContext<'a> {
    pub(crate) fn new(specs: &'a [ArgSpec]) -> Self {
        ConstraintContext { specs }
    }

    fn lookup(&self, name: &str) -> Option<&ArgSpec> {
        self.specs.iter().find(|s| s.matches_name(name))
    }

    /// Display name of the referenced argument.
    pub fn display(&self, name: &str) -> String {
        self.lookup(name)
            .map(|s| s.display_name())
            .unwrap_or_else(|| name.to_string())
    }

    /// Whether the argument was used at least once in this parse.
    pub fn used(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|s| s.uses() > 0)
    }

    /// String forms of the elements the argument's destination holds
    /// (keys for map kinds).
    pub fn elements(&self, name: &str) -> Vec<String> {
        self.lookup(name)
            .map(|s| s.sink.string_elements())
            .unwrap_or_default()
    }
}

/// A relation over two or more arguments, evaluated after parsing.
pub trait Constraint {
    /// Human-readable rule description, e.g. `disjoint(l; r)`.
    fn describe(&self) -> String;

    /// The referenced argument names (no dashes). Validated at
    /// registration time.
    fn names(&self) -> Vec<String>;

    /// Evaluate the relation over the final parse state.
    fn evaluate(&self, ctx: &ConstraintContext<'_>) -> Result<(), ConstraintViolation>;
}

fn parse_names(spec: &str) -> Vec<String> {
    spec.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Disjoint
// ---------------------------------------------------------------------------

/// Container contents of the referenced arguments must not intersect.
pub struct Disjoint {
    names: Vec<String>,
}

impl Constraint for Disjoint {
    fn describe(&self) -> String {
        format!("disjoint({})", self.names.join("; "))
    }

    fn names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn evaluate(&self, ctx: &ConstraintContext<'_>) -> Result<(), ConstraintViolation> {
        for (i, left) in self.names.iter().enumerate() {
            let left_elements = ctx.elements(left);
            for right in &self.names[i + 1..] {
                let right_elements = ctx.elements(right);
                if let Some(common) = left_elements
                    .iter()
                    .find(|e| right_elements.contains(e))
                {
                    return Err(ConstraintViolation {
                        rule: self.describe(),
                        names: vec![ctx.display(left), ctx.display(right)],
                        detail: format!("both contain '{common}'"),
                    });
                }
            }
        }
        Ok(())
    }
}

/// The destinations named in `spec` (`;`-separated) must stay disjoint.
pub fn disjoint(spec: &str) -> Box<dyn Constraint> {
    Box::new(Disjoint {
        names: parse_names(spec),
    })
}

// ---------------------------------------------------------------------------
// Mutual exclusion
// ---------------------------------------------------------------------------

/// At most one of the referenced arguments may be used.
pub struct MutuallyExclusive {
    names: Vec<String>,
}

impl Constraint for MutuallyExclusive {
    fn describe(&self) -> String {
        format!("mutually-exclusive({})", self.names.join("; "))
    }

    fn names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn evaluate(&self, ctx: &ConstraintContext<'_>) -> Result<(), ConstraintViolation> {
        let used: Vec<&String> = self.names.iter().filter(|n| ctx.used(n)).collect();
        if used.len() > 1 {
            return Err(ConstraintViolation {
                rule: self.describe(),
                names: used.iter().map(|n| ctx.display(n)).collect(),
                detail: "more than one of the arguments was used".to_string(),
            });
        }
        Ok(())
    }
}

/// At most one of the arguments named in `spec` (`;`-separated) may appear.
pub fn mutually_exclusive(spec: &str) -> Box<dyn Constraint> {
    Box::new(MutuallyExclusive {
        names: parse_names(spec),
    })
}

// ---------------------------------------------------------------------------
// Requires
// ---------------------------------------------------------------------------

/// Using the first argument requires the second to be used as well.
pub struct Requires {
    name: String,
    required: String,
}

impl Constraint for Requires {
    fn describe(&self) -> String {
        format!("requires({}; {})", self.name, self.required)
    }

    fn names(&self) -> Vec<String> {
        vec![self.name.clone(), self.required.clone()]
    }

    fn evaluate(&self, ctx: &ConstraintContext<'_>) -> Result<(), ConstraintViolation> {
        if ctx.used(&self.name) && !ctx.used(&self.required) {
            return Err(ConstraintViolation {
                rule: self.describe(),
                names: vec![ctx.display(&self.name), ctx.display(&self.required)],
                detail: format!(
                    "{} was used without {}",
                    ctx.display(&self.name),
                    ctx.display(&self.required)
                ),
            });
        }
        Ok(())
    }
}

/// Using `name` requires `required` to appear as well.
pub fn requires(name: &str, required: &str) -> Box<dyn Constraint> {
    Box::new(Requires {
        name: name.trim().to_string(),
        required: required.trim().to_string(),
    })
}
