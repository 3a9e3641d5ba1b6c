//! Evaluation errors.
//!
//! `EvalErrorKind` provides typed error categories; `#[cold]` factory
//! functions (e.g. `undefined_variable()`) are the public construction
//! API and populate both `kind` and `message`.

use calc_ir::Span;
use std::fmt;

/// Result of evaluation.
pub type EvalResult = Result<calc_ir::Value, EvalError>;

/// Typed error category for evaluation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// A bare identifier with no binding. Drives the bare-word literal
    /// recovery in `evaluate_setting`.
    UndefinedVariable { name: String },
    /// Member access on a value with no members (including an absent
    /// datasource reference).
    CannotAccessField { field: String, type_name: String },
    /// Index access on an unindexable value.
    CannotIndex { receiver: String, index: String },
    /// Unary operator applied to the wrong type.
    InvalidUnaryOp { op: String, type_name: String },
    /// Binary operator applied to operands of incompatible types.
    BinaryTypeMismatch { left: String, right: String },
    /// Binary operator unsupported for a type.
    InvalidBinaryOp { op: String, type_name: String },
    /// `&&`, `||`, `!`, or a ternary condition saw a non-boolean.
    ConditionNotBoolean { got: String },
    /// Integer division by zero.
    DivisionByZero,
    /// Integer modulo by zero.
    ModuloByZero,
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalErrorKind::UndefinedVariable { name } => {
                write!(f, "undefined variable `{name}`")
            }
            EvalErrorKind::CannotAccessField { field, type_name } => {
                write!(f, "cannot access field `{field}` of {type_name}")
            }
            EvalErrorKind::CannotIndex { receiver, index } => {
                write!(f, "cannot index {receiver} with {index}")
            }
            EvalErrorKind::InvalidUnaryOp { op, type_name } => {
                write!(f, "unary `{op}` is not defined for {type_name}")
            }
            EvalErrorKind::BinaryTypeMismatch { left, right } => {
                write!(f, "operands have mismatched types: {left} and {right}")
            }
            EvalErrorKind::InvalidBinaryOp { op, type_name } => {
                write!(f, "`{op}` is not defined for {type_name}")
            }
            EvalErrorKind::ConditionNotBoolean { got } => {
                write!(f, "condition must be a boolean, got {got}")
            }
            EvalErrorKind::DivisionByZero => f.write_str("division by zero"),
            EvalErrorKind::ModuloByZero => f.write_str("modulo by zero"),
        }
    }
}

/// Runtime evaluation failure.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalError {
    /// Typed category.
    pub kind: EvalErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Location in the raw text, when known.
    pub span: Option<Span>,
}

impl EvalError {
    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError {
            kind,
            message,
            span: None,
        }
    }

    /// Attach a source span to this error.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// True if this failure is a reference to an unbound name - the only
    /// failure the bare-word literal recovery applies to.
    #[inline]
    pub fn is_unbound_reference(&self) -> bool {
        matches!(self.kind, EvalErrorKind::UndefinedVariable { .. })
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {}

// Factory constructors.

/// Undefined variable.
#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

/// Cannot access a field of a non-object value.
#[cold]
pub fn cannot_access_field(field: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::CannotAccessField {
        field: field.to_string(),
        type_name: type_name.to_string(),
    })
}

/// Cannot index a value of one type with another.
#[cold]
pub fn cannot_index(receiver: &str, index: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::CannotIndex {
        receiver: receiver.to_string(),
        index: index.to_string(),
    })
}

/// Unary operator applied to the wrong type.
#[cold]
pub fn invalid_unary_op(op: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidUnaryOp {
        op: op.to_string(),
        type_name: type_name.to_string(),
    })
}

/// Type mismatch in a binary operation.
#[cold]
pub fn binary_type_mismatch(left: &str, right: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::BinaryTypeMismatch {
        left: left.to_string(),
        right: right.to_string(),
    })
}

/// Invalid operator for a specific type.
#[cold]
pub fn invalid_binary_op_for(op: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidBinaryOp {
        op: op.to_string(),
        type_name: type_name.to_string(),
    })
}

/// Non-boolean in a boolean position.
#[cold]
pub fn condition_not_boolean(got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ConditionNotBoolean {
        got: got.to_string(),
    })
}

/// Division by zero error.
#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

/// Modulo by zero error.
#[cold]
pub fn modulo_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ModuloByZero)
}
