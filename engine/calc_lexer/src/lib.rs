//! Lexer for the expression grammar, built on logos.
//!
//! Produces a `Vec<Token>` terminated by `TokenKind::Eof`. Literal payloads
//! (numbers, strings with escapes) are decoded here so the parser only ever
//! sees finished values.

use calc_ir::{Span, Token, TokenKind};
use logos::Logos;

/// Raw token from logos (before literal decoding).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n]+")] // Skip whitespace
#[logos(skip r"//[^\n]*")] // Skip line comments
#[logos(skip r"/\*([^*]|\*[^/])*\*/")] // Skip block comments
enum RawToken {
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("return")]
    Return,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?|[0-9]+[eE][+-]?[0-9]+")]
    Float,
    #[regex(r"[0-9]+")]
    Int,

    #[regex(r#""([^"\\]|\\.)*""#)]
    DoubleQuoteStr,
    #[regex(r"'([^'\\]|\\.)*'")]
    SingleQuoteStr,

    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
}

/// Character the lexer could not start a token at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub span: Span,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unrecognized character at byte {}", self.span.start)
    }
}

impl std::error::Error for LexError {}

/// Lex expression source into spanned tokens.
///
/// The returned stream always ends with an `Eof` token covering the end of
/// the input, so the parser's cursor never runs off the end.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(raw) = lexer.next() {
        let span = Span::from_range(lexer.span());
        let raw = raw.map_err(|()| LexError { span })?;
        let kind = decode(raw, lexer.slice());
        tokens.push(Token::new(kind, span));
    }

    let end = Span::from_range(source.len()..source.len());
    tokens.push(Token::new(TokenKind::Eof, end));
    Ok(tokens)
}

/// Decode a raw token into its final `TokenKind`.
fn decode(raw: RawToken, slice: &str) -> TokenKind {
    match raw {
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::Null => TokenKind::Null,
        RawToken::Return => TokenKind::Return,
        RawToken::Ident => TokenKind::Ident(slice.to_string()),
        // Integers too large for i64 degrade to floats, as they would in
        // a double-only number model.
        RawToken::Int => slice
            .parse::<i64>()
            .map(TokenKind::Int)
            .unwrap_or_else(|_| TokenKind::Float(slice.parse::<f64>().unwrap_or(f64::NAN))),
        RawToken::Float => TokenKind::Float(slice.parse::<f64>().unwrap_or(f64::NAN)),
        RawToken::DoubleQuoteStr | RawToken::SingleQuoteStr => {
            TokenKind::Str(unescape(&slice[1..slice.len() - 1]))
        }
        RawToken::Dot => TokenKind::Dot,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Semi => TokenKind::Semi,
        RawToken::Question => TokenKind::Question,
        RawToken::Colon => TokenKind::Colon,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Bang => TokenKind::Bang,
        RawToken::Lt => TokenKind::Lt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Gt => TokenKind::Gt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::AndAnd => TokenKind::AndAnd,
        RawToken::OrOr => TokenKind::OrOr,
    }
}

/// Resolve backslash escapes in a string literal body.
///
/// Unknown escapes keep the escaped character verbatim; setting text is
/// user-typed and leniency beats a hard error here.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
