//! Compiled units and dependency extraction.

use crate::{ParseError, Parser};
use calc_ir::{ExprArena, ExprId, ExprKind};
use std::collections::BTreeSet;
use tracing::debug;

/// A successfully parsed expression: flat arena plus root handle.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExpr {
    arena: ExprArena,
    root: ExprId,
}

impl ParsedExpr {
    pub(crate) fn new(arena: ExprArena, root: ExprId) -> Self {
        ParsedExpr { arena, root }
    }

    pub fn arena(&self) -> &ExprArena {
        &self.arena
    }

    pub fn root(&self) -> ExprId {
        self.root
    }

    /// Collect every datasource name the expression references.
    ///
    /// Every arena node was allocated while parsing this unit, so a linear
    /// scan visits exactly the expression's nodes - no recursion needed,
    /// and the walk is structural, not textual: a name inside a string
    /// literal or comment is never counted.
    pub fn dependencies(&self) -> BTreeSet<String> {
        self.arena
            .iter()
            .filter_map(|expr| match &expr.kind {
                ExprKind::DatasourceRef { name } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}

/// The executable form of a setting's raw text.
///
/// Exactly one unit exists per setting at a time; recompiling replaces it
/// wholesale. Compilation is all-or-nothing: there is no partially-built
/// unit.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledUnit {
    /// A parsed expression, evaluated against the datasource snapshot.
    Expr(ParsedExpr),
    /// Raw text that did not parse, carried as a constant. Evaluation
    /// returns it verbatim.
    Literal(String),
}

impl CompiledUnit {
    /// The set of datasource names this unit depends on.
    ///
    /// Literal units depend on nothing.
    pub fn dependencies(&self) -> BTreeSet<String> {
        match self {
            CompiledUnit::Expr(parsed) => parsed.dependencies(),
            CompiledUnit::Literal(_) => BTreeSet::new(),
        }
    }

    /// True if this unit fell back to literal text.
    pub fn is_literal(&self) -> bool {
        matches!(self, CompiledUnit::Literal(_))
    }
}

/// Parse raw text into an expression, or fail.
///
/// This is the fallible inner operation; engine code goes through
/// [`compile`] instead, which applies the literal-fallback policy.
pub fn parse_expression(raw_text: &str) -> Result<ParsedExpr, ParseError> {
    let tokens = calc_lexer::lex(raw_text)?;
    Parser::new(&tokens).parse_unit()
}

/// Compile raw setting text into a unit.
///
/// Never fails and never executes user code: text that does not parse as
/// an expression becomes a constant returning the text itself, so a plain
/// string typed into a setting field just works.
pub fn compile(raw_text: &str) -> CompiledUnit {
    match parse_expression(raw_text) {
        Ok(parsed) => CompiledUnit::Expr(parsed),
        Err(err) => {
            debug!(%err, raw_text, "expression did not parse; falling back to literal text");
            CompiledUnit::Literal(raw_text.to_string())
        }
    }
}

/// Extract the dependency set of raw setting text.
pub fn extract_dependencies(raw_text: &str) -> BTreeSet<String> {
    compile(raw_text).dependencies()
}
