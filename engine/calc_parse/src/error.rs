//! Parse errors.
//!
//! These never escape `compile()` - a failed parse triggers the
//! literal-fallback policy - but they carry enough detail for tests,
//! logging, and any future diagnostics surface.

use calc_ir::{Span, TokenKind};
use calc_lexer::LexError;
use std::fmt;

/// Parse error with a human-readable message and source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Human-readable message.
    pub message: String,
    /// Location of the error in the raw text.
    pub span: Span,
}

impl ParseError {
    /// Create a new parse error.
    #[cold]
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        ParseError {
            message: message.into(),
            span,
        }
    }

    /// Expected one kind of token, found another.
    #[cold]
    pub fn expected_token(expected: &str, found: &TokenKind, span: Span) -> Self {
        ParseError::new(
            format!("expected `{expected}`, found `{}`", found.display_name()),
            span,
        )
    }

    /// Expression ended but input continued.
    #[cold]
    pub fn trailing_input(found: &TokenKind, span: Span) -> Self {
        ParseError::new(
            format!("unexpected `{}` after expression", found.display_name()),
            span,
        )
    }

    /// A token that cannot start an expression.
    #[cold]
    pub fn expected_expression(found: &TokenKind, span: Span) -> Self {
        ParseError::new(
            format!("expected expression, found `{}`", found.display_name()),
            span,
        )
    }

    /// `datasources` was not followed by a statically-known name.
    ///
    /// Dependency extraction is an exact AST walk, which requires every
    /// datasource name to be a dot-identifier or string literal.
    #[cold]
    pub fn expected_datasource_name(found: &TokenKind, span: Span) -> Self {
        ParseError::new(
            format!(
                "expected a datasource name (`.name` or `[\"name\"]`), found `{}`",
                found.display_name()
            ),
            span,
        )
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::new("unrecognized character", err.span)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}..{}",
            self.message, self.span.start, self.span.end
        )
    }
}

impl std::error::Error for ParseError {}
