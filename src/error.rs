//! Unified error hierarchy for the scanner, parser, path engine and decode bridge.

use std::fmt;

use crate::token::Position;

/// A message anchored at a specific point in the source.
///
/// Every user-visible error that originates from a specific input location
/// implements this shape: a message plus the offending [`Position`].
#[derive(Clone, Debug, PartialEq)]
pub struct TokenScopedError {
    pub message: String,
    pub position: Position,
}

impl TokenScopedError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }

    /// Render a three-line excerpt of `source` with a caret under the column.
    pub fn annotate(&self, source: &str) -> String {
        crate::path::ops::annotate_source(source, self.position, false)
    }
}

impl fmt::Display for TokenScopedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {} col {}",
            self.message, self.position.line, self.position.column
        )
    }
}

impl std::error::Error for TokenScopedError {}

/// Scanner-level failures (§4.1.5).
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct ScanError(pub TokenScopedError);

impl ScanError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self(TokenScopedError::new(message, position))
    }

    pub fn position(&self) -> Position {
        self.0.position
    }
}

/// Parser-level failures (§4.2.2, §7 "Structural").
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct SyntaxError(pub TokenScopedError);

impl SyntaxError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self(TokenScopedError::new(message, position))
    }

    pub fn position(&self) -> Position {
        self.0.position
    }
}

/// Path-engine failures (§4.4.3).
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("invalid path syntax: {0}")]
    InvalidPath(String),
    #[error("no node matched the path")]
    NotFound,
    #[error("path matched a node of the wrong kind for this operation: {0}")]
    InvalidQuery(String),
    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Serde decode-bridge failures (§10.1).
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("integer overflow decoding into target type")]
    Overflow,
    #[error("unknown field `{0}` (strict mode)")]
    UnknownField(String),
    #[error("missing field `{0}`")]
    MissingField(String),
    #[error("unresolved alias `{0}`")]
    UnresolvedAlias(String),
    #[error("duplicate mapping key `{0}`")]
    DuplicateKey(String),
    #[error("{0}")]
    Custom(String),
}

impl serde::de::Error for DecodeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        DecodeError::Custom(msg.to_string())
    }
}

/// Top-level error unifying every failure mode this crate can produce (§10.2).
#[derive(Clone, Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Downcast helper mirroring the reference `AsTokenScopedError` (§7).
pub fn as_token_scoped_error(err: &Error) -> Option<&TokenScopedError> {
    match err {
        Error::Scan(e) => Some(&e.0),
        Error::Syntax(e) => Some(&e.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position() {
        let pos = Position {
            line: 3,
            column: 5,
            offset: 10,
            indent_num: 0,
            indent_level: 0,
        };
        let e = ScanError::new("tab where indentation expected", pos);
        assert_eq!(
            e.to_string(),
            "tab where indentation expected at line 3 col 5"
        );
    }

    #[test]
    fn as_token_scoped_error_unwraps_scan_and_syntax_only() {
        let pos = Position::start();
        let scan: Error = ScanError::new("x", pos).into();
        assert!(as_token_scoped_error(&scan).is_some());

        let query: Error = QueryError::NotFound.into();
        assert!(as_token_scoped_error(&query).is_none());
    }
}
