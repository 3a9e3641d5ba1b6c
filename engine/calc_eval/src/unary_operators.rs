//! Unary operator dispatch.

use crate::errors::{condition_not_boolean, invalid_unary_op};
use crate::EvalResult;
use calc_ir::{UnaryOp, Value};

/// Evaluate a unary operation on a value.
pub fn evaluate_unary(operand: Value, op: UnaryOp) -> EvalResult {
    match op {
        UnaryOp::Neg => match operand {
            Value::Int(n) => Ok(match n.checked_neg() {
                Some(negated) => Value::Int(negated),
                // i64::MIN has no integer negation; degrade to float
                #[allow(clippy::cast_precision_loss)]
                None => Value::Float(-(n as f64)),
            }),
            Value::Float(n) => Ok(Value::Float(-n)),
            other => Err(invalid_unary_op("-", other.type_name())),
        },
        UnaryOp::Not => match operand {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            other => Err(condition_not_boolean(other.type_name())),
        },
    }
}
