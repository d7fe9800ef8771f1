//! Post-parse introspection
//!
//! A listing of the destination state per registered argument: names, value
//! mode, cardinality, currently-held value count, attached check and
//! formatter descriptions, and the mandatory/hidden/deprecated flags.
//!
//! The line-based listing is a stable string contract consumed by external
//! renderers and diagnostics; the [`ArgReport`] structure carries the same
//! data for serialization.

use crate::registry::ArgRegistry;
use serde::Serialize;

/// Snapshot of one registered argument after (or before) a parse.
#[derive(Debug, Clone, Serialize)]
pub struct ArgReport {
    /// Display name (long form preferred).
    pub name: String,
    pub short: Option<char>,
    pub long: Option<String>,
    pub free: bool,
    pub description: String,
    pub value_mode: String,
    /// `None` means unlimited.
    pub cardinality: Option<usize>,
    /// Elements the destination currently holds.
    pub held: usize,
    /// Usages counted in the most recent parse.
    pub uses: usize,
    pub mandatory: bool,
    pub hidden: bool,
    pub deprecated: bool,
    pub replaced_by: Option<String>,
    pub checks: Vec<String>,
    pub formats: Vec<String>,
}

impl ArgRegistry {
    /// Snapshots of all registered arguments, in registration order.
    pub fn report(&self) -> Vec<ArgReport> {
        self.specs
            .iter()
            .map(|spec| ArgReport {
                name: spec.display_name(),
                short: spec.short(),
                long: spec.long().map(str::to_string),
                free: spec.is_free(),
                description: spec.description().to_string(),
                value_mode: spec.value_mode().label().to_string(),
                cardinality: spec.cardinality,
                held: spec.held(),
                uses: spec.uses(),
                mandatory: spec.is_mandatory(),
                hidden: spec.is_hidden(),
                deprecated: spec.deprecated,
                replaced_by: spec.replaced_by.clone(),
                checks: spec.check_descriptions(),
                formats: spec.format_descriptions(),
            })
            .collect()
    }

    /// The report as pretty-printed JSON.
    pub fn report_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.report())
    }

    /// One line per argument in registration order. Hidden arguments are
    /// omitted unless `verbose` is set.
    ///
    /// Line shape:
    ///
    /// ```text
    /// --int (-i): an int [mode=required, max=1, held=0] checks: in [10, 100)
    /// ```
    pub fn list_arguments(&self, verbose: bool) -> String {
        let mut lines = Vec::new();
        for report in self.report() {
            if report.hidden && !verbose {
                continue;
            }
            lines.push(render_line(&report));
        }
        lines.join("\n")
    }
}

fn render_line(report: &ArgReport) -> String {
    let mut line = String::new();

    // Names.
    if report.free {
        line.push_str("free value");
    } else {
        line.push_str(&report.name);
        if report.long.is_some() {
            if let Some(short) = report.short {
                line.push_str(&format!(" (-{short})"));
            }
        }
    }
    line.push_str(": ");
    line.push_str(&report.description);

    // Attributes.
    line.push_str(&format!(" [mode={}, max=", report.value_mode));
    match report.cardinality {
        Some(limit) => line.push_str(&limit.to_string()),
        None => line.push_str("unlimited"),
    }
    line.push_str(&format!(", held={}", report.held));
    if report.mandatory {
        line.push_str(", mandatory");
    }
    if report.hidden {
        line.push_str(", hidden");
    }
    if report.deprecated {
        match &report.replaced_by {
            Some(replacement) => line.push_str(&format!(", deprecated (use {replacement})")),
            None => line.push_str(", deprecated"),
        }
    }
    line.push(']');

    // Chains.
    if !report.checks.is_empty() {
        line.push_str(" checks: ");
        line.push_str(&report.checks.join("; "));
    }
    if !report.formats.is_empty() {
        line.push_str(" formats: ");
        line.push_str(&report.formats.join("; "));
    }

    line
}
