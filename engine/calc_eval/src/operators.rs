//! Binary operator dispatch.

use crate::errors::{
    binary_type_mismatch, condition_not_boolean, division_by_zero, invalid_binary_op_for,
    modulo_by_zero,
};
use crate::EvalResult;
use calc_ir::{BinaryOp, Value};

/// Evaluate a binary operation on two values.
///
/// `&&` and `||` are short-circuited by the evaluator before both operands
/// exist; this function still implements them for direct callers.
pub fn evaluate_binary(lhs: Value, rhs: Value, op: BinaryOp) -> EvalResult {
    match op {
        BinaryOp::Add => evaluate_add(lhs, rhs),
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            evaluate_arithmetic(lhs, rhs, op)
        }
        BinaryOp::Eq => Ok(Value::Bool(values_equal(&lhs, &rhs))),
        BinaryOp::NotEq => Ok(Value::Bool(!values_equal(&lhs, &rhs))),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            evaluate_comparison(lhs, rhs, op)
        }
        BinaryOp::And | BinaryOp::Or => match (lhs, rhs) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(if op == BinaryOp::And {
                a && b
            } else {
                a || b
            })),
            (Value::Bool(_), other) | (other, _) => {
                Err(condition_not_boolean(other.type_name()))
            }
        },
    }
}

/// Structural equality with numeric cross-type comparison:
/// `Int(2) == Float(2.0)` holds, as it would under a double-only number
/// model.
#[allow(clippy::float_cmp)]
pub(crate) fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
            int_to_f64(*a) == *b
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).is_some_and(|w| values_equal(v, w)))
        }
        _ => lhs == rhs,
    }
}

/// `+`: numeric addition, string concatenation (with stringification of
/// the non-string side), array concatenation.
fn evaluate_add(lhs: Value, rhs: Value) -> EvalResult {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Ok(a
            .checked_add(b)
            .map(Value::Int)
            .unwrap_or_else(|| float_binop(int_to_f64(a), int_to_f64(b), BinaryOp::Add))),
        (a, b) if is_number(&a) && is_number(&b) => {
            Ok(float_binop(as_f64(&a), as_f64(&b), BinaryOp::Add))
        }
        (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
        // String + scalar stringifies the scalar, JS-style
        (Value::Str(a), b) if !b.is_composite() && !b.is_undefined() => {
            Ok(Value::Str(format!("{a}{b}")))
        }
        (a, Value::Str(b)) if !a.is_composite() && !a.is_undefined() => {
            Ok(Value::Str(format!("{a}{b}")))
        }
        (Value::Array(mut a), Value::Array(b)) => {
            a.extend(b);
            Ok(Value::Array(a))
        }
        (a, b) => Err(binary_type_mismatch(a.type_name(), b.type_name())),
    }
}

fn evaluate_arithmetic(lhs: Value, rhs: Value, op: BinaryOp) -> EvalResult {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => int_arithmetic(a, b, op),
        (a, b) if is_number(&a) && is_number(&b) => {
            let (x, y) = (as_f64(&a), as_f64(&b));
            Ok(float_binop(x, y, op))
        }
        (a, b) if is_number(&a) => Err(invalid_binary_op_for(op.symbol(), b.type_name())),
        (a, _) => Err(invalid_binary_op_for(op.symbol(), a.type_name())),
    }
}

fn int_arithmetic(a: i64, b: i64, op: BinaryOp) -> EvalResult {
    match op {
        BinaryOp::Sub => Ok(a
            .checked_sub(b)
            .map(Value::Int)
            .unwrap_or_else(|| float_binop(int_to_f64(a), int_to_f64(b), op))),
        BinaryOp::Mul => Ok(a
            .checked_mul(b)
            .map(Value::Int)
            .unwrap_or_else(|| float_binop(int_to_f64(a), int_to_f64(b), op))),
        BinaryOp::Div => {
            if b == 0 {
                return Err(division_by_zero());
            }
            // Exact quotients stay integers; everything else degrades to
            // a float, keeping `7 / 2 == 3.5`. `checked_*` also covers
            // the `i64::MIN / -1` overflow.
            match a.checked_rem(b) {
                Some(0) => Ok(a
                    .checked_div(b)
                    .map(Value::Int)
                    .unwrap_or_else(|| float_binop(int_to_f64(a), int_to_f64(b), op))),
                _ => Ok(float_binop(int_to_f64(a), int_to_f64(b), op)),
            }
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(modulo_by_zero());
            }
            // `i64::MIN % -1` overflows; its remainder is 0
            Ok(a.checked_rem(b).map(Value::Int).unwrap_or(Value::Int(0)))
        }
        _ => Err(invalid_binary_op_for(op.symbol(), "number")),
    }
}

fn evaluate_comparison(lhs: Value, rhs: Value, op: BinaryOp) -> EvalResult {
    let ordering = match (&lhs, &rhs) {
        (a, b) if is_number(a) && is_number(b) => as_f64(a).partial_cmp(&as_f64(b)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (a, b) => return Err(binary_type_mismatch(a.type_name(), b.type_name())),
    };
    // NaN comparisons are false across the board
    let Some(ordering) = ordering else {
        return Ok(Value::Bool(false));
    };
    let result = match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::LtEq => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::GtEq => ordering.is_ge(),
        _ => false,
    };
    Ok(Value::Bool(result))
}

#[inline]
fn is_number(value: &Value) -> bool {
    matches!(value, Value::Int(_) | Value::Float(_))
}

#[inline]
fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Int(n) => int_to_f64(*n),
        Value::Float(n) => *n,
        _ => f64::NAN,
    }
}

#[inline]
#[allow(clippy::cast_precision_loss)]
fn int_to_f64(n: i64) -> f64 {
    n as f64
}

fn float_binop(a: f64, b: f64, op: BinaryOp) -> Value {
    Value::Float(match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Mod => a % b,
        _ => f64::NAN,
    })
}
