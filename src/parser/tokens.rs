//! Token classification
//!
//! One command-line word maps to exactly one [`TokenClass`]. Classification
//! is purely lexical; resolving names against the registry happens in the
//! engine. A lone `-` is a plain value by convention (stdin marker), and
//! everything that matches no other rule is a plain value too.

/// Lexical class of one command-line token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenClass<'a> {
    /// `-abc`: the characters after the dash, to be resolved as combined
    /// short flags or a short argument with an attached value.
    Short(&'a str),
    /// `--name` or `--name=value`.
    Long {
        name: &'a str,
        attached: Option<&'a str>,
    },
    /// Bare `--`: the next token is a literal value.
    FreeEscape,
    /// `!`: the next argument is inverted.
    Inversion,
    /// `--endvalues`: terminates multi-value continuation (only produced
    /// when the sentinel is enabled).
    EndValues,
    /// The registered control-open token.
    ControlOpen,
    /// The registered control-close token.
    ControlClose,
    /// A free value or an argument value.
    Plain(&'a str),
}

/// Sentinel recognized when end-values behavior is enabled.
pub const END_VALUES: &str = "--endvalues";

/// Classify one token.
///
/// `control` carries the registered bracket token pair, if any; those
/// tokens are matched verbatim before any dash rules apply.
pub fn classify<'a>(
    token: &'a str,
    end_values_enabled: bool,
    control: Option<(&str, &str)>,
) -> TokenClass<'a> {
    if let Some((open, close)) = control {
        if token == open {
            return TokenClass::ControlOpen;
        }
        if token == close {
            return TokenClass::ControlClose;
        }
    }
    if token == "!" {
        return TokenClass::Inversion;
    }
    if token == "--" {
        return TokenClass::FreeEscape;
    }
    if end_values_enabled && token == END_VALUES {
        return TokenClass::EndValues;
    }
    if let Some(body) = token.strip_prefix("--") {
        return match body.split_once('=') {
            Some((name, value)) => TokenClass::Long {
                name,
                attached: Some(value),
            },
            None => TokenClass::Long {
                name: body,
                attached: None,
            },
        };
    }
    if token.len() > 1 {
        if let Some(body) = token.strip_prefix('-') {
            return TokenClass::Short(body);
        }
    }
    TokenClass::Plain(token)
}
