//! Flat expression AST.
//!
//! Expressions live in an `ExprArena` and refer to each other through
//! `ExprId` handles, so a compiled unit is a single contiguous allocation
//! that can be dropped (and replaced) wholesale.

use crate::Span;

/// Handle into an `ExprArena`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(u32);

impl ExprId {
    /// Raw index, for debugging output.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Binary operators of the expression grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Expression node kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    Str(String),
    /// Boolean literal.
    Bool(bool),
    /// Null literal.
    Null,
    /// Array literal.
    Array(Vec<ExprId>),
    /// Reference to a named datasource's latest payload.
    ///
    /// Both `datasources.name` and `datasources["name"]` fold into this node
    /// at parse time; the name is always statically known, which is what
    /// makes dependency extraction exact.
    DatasourceRef { name: String },
    /// A bare identifier. There are no user bindings, so this is always
    /// unbound at evaluation time; it exists to drive the bare-word
    /// literal recovery.
    Ident(String),
    /// Member access: `receiver.field`.
    Field { receiver: ExprId, field: String },
    /// Index access: `receiver[index]`.
    Index { receiver: ExprId, index: ExprId },
    /// Unary operation.
    Unary { op: UnaryOp, operand: ExprId },
    /// Binary operation.
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    /// Ternary conditional: `cond ? then : otherwise`.
    Conditional {
        cond: ExprId,
        then: ExprId,
        otherwise: ExprId,
    },
}

/// An expression node with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub const fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

/// Arena of expression nodes for one compiled unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExprArena {
    exprs: Vec<Expr>,
}

impl ExprArena {
    pub fn new() -> Self {
        ExprArena { exprs: Vec::new() }
    }

    /// Allocate an expression, returning its handle.
    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(u32::try_from(self.exprs.len()).unwrap_or(u32::MAX));
        self.exprs.push(expr);
        id
    }

    /// Look up an expression by handle.
    ///
    /// # Panics
    /// Panics if the handle comes from a different arena and is out of
    /// bounds. Handles are never exposed across units.
    #[inline]
    pub fn get_expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    /// Iterate over all nodes in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = &Expr> {
        self.exprs.iter()
    }
}
