//! Tokenizer and parsing state machine
//!
//! The parser consumes the command-line token stream one word at a time.
//! Each token is classified ([`tokens::classify`]) and drives the state
//! machine in [`engine`]: short clusters resolve to one or more descriptors,
//! long tokens split on `=`, a bare `--` escapes the next token into a
//! literal value, `!` marks the next argument for inversion, and registered
//! bracket tokens feed the control-handler stack.
//!
//! The whole evaluation is synchronous: one `parse_tokens` call performs
//! tokenize, validate, assign, and constrain with no suspension points, and
//! the exclusive borrow it takes is the guard against a second in-flight
//! parse.

pub mod engine;
pub mod tokens;

pub use tokens::TokenClass;

/// Callbacks invoked when the registered bracket tokens appear.
///
/// The parser maintains the open/close stack; the handler only observes
/// transitions. `depth` is the nesting depth after an open and before a
/// close, so an unmatched close reports depth 0 and the handler decides
/// what to do about it.
pub trait ControlHandler {
    fn on_open(&mut self, depth: usize);
    fn on_close(&mut self, depth: usize);
}

/// A registered bracket token pair and its handler.
pub struct ControlBlock {
    pub open: String,
    pub close: String,
    pub handler: Box<dyn ControlHandler>,
}

impl ControlBlock {
    /// Register `open`/`close` tokens (e.g. `"["` and `"]"`) with their
    /// handler.
    pub fn new(open: &str, close: &str, handler: Box<dyn ControlHandler>) -> Self {
        ControlBlock {
            open: open.to_string(),
            close: close.to_string(),
            handler,
        }
    }
}
