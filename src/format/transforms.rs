//! Built-in string transforms
//!
//! Case folding plus an escape hatch for user closures. Constructors return
//! boxed trait objects ready for `add_format`.

use crate::format::Formatter;

/// Uppercase case folding.
pub struct Uppercase;

impl Formatter for Uppercase {
    fn apply(&self, input: &str) -> String {
        input.to_uppercase()
    }

    fn describe(&self) -> String {
        "uppercase".to_string()
    }
}

/// Lowercase case folding.
pub struct Lowercase;

impl Formatter for Lowercase {
    fn apply(&self, input: &str) -> String {
        input.to_lowercase()
    }

    fn describe(&self) -> String {
        "lowercase".to_string()
    }
}

/// User-supplied transform with a label for the introspection listing.
pub struct CustomFormat {
    label: String,
    f: Box<dyn Fn(&str) -> String>,
}

impl Formatter for CustomFormat {
    fn apply(&self, input: &str) -> String {
        (self.f)(input)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

/// Fold the staged value to uppercase.
pub fn uppercase() -> Box<dyn Formatter> {
    Box::new(Uppercase)
}

/// Fold the staged value to lowercase.
pub fn lowercase() -> Box<dyn Formatter> {
    Box::new(Lowercase)
}

/// Apply a user transform. `label` appears in the introspection listing.
pub fn custom<F>(label: &str, f: F) -> Box<dyn Formatter>
where
    F: Fn(&str) -> String + 'static,
{
    Box::new(CustomFormat {
        label: label.to_string(),
        f: Box::new(f),
    })
}
