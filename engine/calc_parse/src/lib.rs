//! Recursive descent parser and compiler for setting expressions.
//!
//! The public surface is two operations:
//! - [`parse_expression`]: the fallible inner parse, producing a
//!   [`ParsedExpr`] (flat arena + root handle) or a [`ParseError`].
//! - [`compile`]: the infallible outer operation used by the engine. Any
//!   parse failure falls back to a unit that returns the raw text verbatim
//!   (the literal-fallback policy), so malformed input never surfaces as
//!   an error to the user.
//!
//! Dependency extraction is an exact structural walk over the parsed tree;
//! see [`CompiledUnit::dependencies`].

mod cursor;
mod error;
mod grammar;
mod unit;

pub use cursor::Cursor;
pub use error::ParseError;
pub use unit::{compile, extract_dependencies, parse_expression, CompiledUnit, ParsedExpr};

use calc_ir::{ExprArena, ExprId, Span, Token, TokenKind};

/// Parser state.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    arena: ExprArena,
}

impl<'a> Parser<'a> {
    /// Create a new parser over a token stream.
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            arena: ExprArena::new(),
        }
    }

    // Cursor delegation methods.

    #[inline]
    fn current_kind(&self) -> &TokenKind {
        self.cursor.current_kind()
    }

    #[inline]
    fn current_span(&self) -> Span {
        self.cursor.current_span()
    }

    #[inline]
    fn previous_span(&self) -> Span {
        self.cursor.previous_span()
    }

    #[inline]
    fn is_at_end(&self) -> bool {
        self.cursor.is_at_end()
    }

    #[inline]
    fn check(&self, kind: &TokenKind) -> bool {
        self.cursor.check(kind)
    }

    #[inline]
    fn advance(&mut self) -> &Token {
        self.cursor.advance()
    }

    #[inline]
    fn expect(&mut self, kind: &TokenKind) -> Result<&Token, ParseError> {
        self.cursor.expect(kind)
    }

    #[inline]
    fn expect_ident(&mut self) -> Result<String, ParseError> {
        self.cursor.expect_ident()
    }

    /// Parse a whole unit: optional `return`, one expression, optional `;`,
    /// then end of input.
    ///
    /// The whole text is the result expression; users write either
    /// `datasources["a"]` or `return datasources["a"];` and both mean the
    /// same thing.
    pub fn parse_unit(mut self) -> Result<ParsedExpr, ParseError> {
        if self.check(&TokenKind::Return) {
            self.advance();
        }

        let root = self.parse_expr()?;

        if self.check(&TokenKind::Semi) {
            self.advance();
        }
        if !self.is_at_end() {
            return Err(ParseError::trailing_input(
                self.current_kind(),
                self.current_span(),
            ));
        }

        Ok(ParsedExpr::new(self.arena, root))
    }

    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
        self.parse_ternary()
    }

    // Arena access for the grammar module.

    #[inline]
    fn arena_mut(&mut self) -> &mut ExprArena {
        &mut self.arena
    }

    #[inline]
    fn arena_get_span(&self, id: ExprId) -> Span {
        self.arena.get_expr(id).span
    }
}
