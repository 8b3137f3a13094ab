//! Error types for description parsing, palette parsing and event dispatch
//!
//! Three families mirror the phases of a UI's life:
//! - [`SyntaxError`]: the description text is malformed (parse time)
//! - [`StyleError`]: the palette text is malformed (parse time)
//! - [`RuntimeError`]: registry, binding or dispatch violations
//!
//! [`UiError`] is the umbrella returned by the public API. Parse-time errors abort
//! construction of the whole UI; dispatch-time errors propagate out of the loop
//! iteration that raised them.

use thiserror::Error;

/// Errors raised while parsing a UI description
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// The first three characters of a line are not a known opcode
    #[error("Unrecognized widget '{opcode}' at line {line}")]
    UnrecognizedWidget { opcode: String, line: usize },

    /// A marker was started but is not well formed (`&press` without `=`, empty id, ...)
    #[error("Malformed attribute '{text}' at line {line}")]
    MalformedAttribute { text: String, line: usize },

    /// `&name=...` where `name` is not one of press, edit, focus, key
    #[error("Unknown event '{event}' at line {line}")]
    UnknownEvent { event: String, line: usize },

    /// The literal-argument remainder could not be parsed
    #[error("Malformed arguments {text:?} at line {line}: {reason}")]
    MalformedArguments {
        text: String,
        reason: String,
        line: usize,
    },

    /// A keyword argument the widget kind does not accept
    #[error("Unsupported argument '{name}' for {widget} at line {line}")]
    UnsupportedArgument {
        name: String,
        widget: &'static str,
        line: usize,
    },

    /// A keyword argument with a value of the wrong type
    #[error("Argument '{name}' for {widget} expects {expected} at line {line}")]
    InvalidArgument {
        name: String,
        widget: &'static str,
        expected: &'static str,
        line: usize,
    },

    /// `Btn`, `Chc` or `Rdo` without a `[label]`
    #[error("Malformed button {text:?} at line {line}")]
    MalformedButton { text: String, line: usize },

    /// `Edt` without a `[text]`
    #[error("Malformed edit {text:?} at line {line}")]
    MalformedEdit { text: String, line: usize },

    /// `End` with no open container
    #[error("End called without container widget at line {line}")]
    UnbalancedEnd { line: usize },

    /// `End` followed by data
    #[error("End takes no argument, got {text:?} at line {line}")]
    EndWithArguments { text: String, line: usize },

    /// The description ended with containers still open
    #[error("{depth} container(s) left open at end of description")]
    UnclosedContainer { depth: usize },

    /// A second `Hdr` line
    #[error("Header can occur only once (line {line})")]
    DuplicateHeader { line: usize },

    /// A second `Ftr` line
    #[error("Footer can occur only once (line {line})")]
    DuplicateFooter { line: usize },
}

/// Errors raised while parsing palette text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    /// A code that is not in the mnemonic table
    #[error("Unsupported color '{code}' at palette line {line}")]
    UnknownCode { code: String, line: usize },

    /// A rule without exactly three codes
    #[error("Expected NAME: FOREGROUND, BACKGROUND, FONT at palette line {line}, found {found} code(s)")]
    FieldCount { found: usize, line: usize },

    /// A rule without a `name :` prefix
    #[error("Malformed style rule {text:?} at palette line {line}")]
    MalformedRule { text: String, line: usize },
}

/// Errors raised by registries and by event dispatch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Two widgets registered under the same id
    #[error("Duplicate widget id '{id}'")]
    DuplicateId { id: String },

    /// Two strings registered under the same key
    #[error("Duplicate string '{key}'")]
    DuplicateString { key: String },

    /// Lookup of an id no widget was registered under
    #[error("Undefined widget id '{id}'")]
    UndefinedId { id: String },

    /// Lookup of a string key that was never defined
    #[error("Undefined string '{key}'")]
    UndefinedString { key: String },

    /// An event bound to a widget kind that cannot produce it
    #[error("Cannot bind '{event}' event to {widget} at line {line}")]
    BindingMismatch {
        event: &'static str,
        widget: &'static str,
        line: usize,
    },

    /// A bound responder the active handler does not implement
    #[error("Handler does not implement '{event}' responder '{responder}'")]
    MissingResponder {
        event: &'static str,
        responder: String,
    },

    /// An event bound to a responder while no handler is installed
    #[error("No handler installed to receive '{event}' responder '{responder}'")]
    NoHandler {
        event: &'static str,
        responder: String,
    },

    /// A dialog operation while no dialog is displayed
    #[error("No dialog is displayed")]
    NoActiveDialog,

    /// Opening a dialog while another one is displayed
    #[error("A dialog is already displayed")]
    DialogAlreadyActive,

    /// An edit-text operation on a widget that is not an edit field
    #[error("Widget '{id}' is not editable")]
    NotEditable { id: String },

    /// A text operation on a widget without text
    #[error("Widget '{id}' has no text")]
    NotText { id: String },
}

/// Umbrella error for the public API
#[derive(Debug, Error)]
pub enum UiError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Style(#[from] StyleError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type UiResult<T> = Result<T, UiError>;

impl SyntaxError {
    /// Line of the description the error points at, when known
    pub fn line(&self) -> Option<usize> {
        match self {
            SyntaxError::UnrecognizedWidget { line, .. }
            | SyntaxError::MalformedAttribute { line, .. }
            | SyntaxError::UnknownEvent { line, .. }
            | SyntaxError::MalformedArguments { line, .. }
            | SyntaxError::UnsupportedArgument { line, .. }
            | SyntaxError::InvalidArgument { line, .. }
            | SyntaxError::MalformedButton { line, .. }
            | SyntaxError::MalformedEdit { line, .. }
            | SyntaxError::UnbalancedEnd { line }
            | SyntaxError::EndWithArguments { line, .. }
            | SyntaxError::DuplicateHeader { line }
            | SyntaxError::DuplicateFooter { line } => Some(*line),
            SyntaxError::UnclosedContainer { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_mentions_line_and_text() {
        let err = SyntaxError::MalformedArguments {
            text: "x=(1".to_string(),
            reason: "unterminated".to_string(),
            line: 7,
        };
        let message = err.to_string();
        assert!(message.contains("line 7"));
        assert!(message.contains("x=(1"));
        assert_eq!(err.line(), Some(7));
    }

    #[test]
    fn test_umbrella_wraps_each_family() {
        let err: UiError = StyleError::UnknownCode {
            code: "ZZ".to_string(),
            line: 2,
        }
        .into();
        assert!(matches!(err, UiError::Style(_)));
        assert_eq!(err.to_string(), "Unsupported color 'ZZ' at palette line 2");

        let err: UiError = RuntimeError::DuplicateId { id: "ok".into() }.into();
        assert!(matches!(err, UiError::Runtime(RuntimeError::DuplicateId { .. })));
    }
}
