//! Shared IR types for the calculated-value engine.
//!
//! This crate holds everything the pipeline crates agree on:
//! - `Span`: compact byte-offset source locations
//! - `Token`/`TokenKind`: lexer output
//! - `Expr`/`ExprKind`/`ExprArena`: the flat expression AST
//! - `Value`: JSON-like runtime values (datasource payloads and results)
//! - `ExpectedType`: the type filter attached to a setting

mod ast;
mod expected_type;
mod span;
mod token;
mod value;

pub use ast::{BinaryOp, Expr, ExprArena, ExprId, ExprKind, UnaryOp};
pub use expected_type::ExpectedType;
pub use span::Span;
pub use token::{Token, TokenKind};
pub use value::{Object, Value};
