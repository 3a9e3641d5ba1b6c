//! Unit evaluation against a datasource snapshot.

use crate::errors::{cannot_access_field, cannot_index, condition_not_boolean, undefined_variable};
use crate::operators::evaluate_binary;
use crate::unary_operators::evaluate_unary;
use crate::EvalResult;
use calc_ir::{BinaryOp, ExprArena, ExprId, ExprKind, Value};
use calc_parse::CompiledUnit;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::hash::BuildHasher;

/// Read-only view of the datasource snapshot.
///
/// The evaluator sees the full current snapshot, not just the unit's
/// dependency subset - extraction over-approximates nothing here, but the
/// contract stays the same either way.
pub trait DatasourceView {
    /// The latest payload for a datasource, if one exists.
    fn payload(&self, name: &str) -> Option<&Value>;
}

impl DatasourceView for IndexMap<String, Value> {
    fn payload(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl<S: BuildHasher> DatasourceView for HashMap<String, Value, S> {
    fn payload(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

/// Evaluate a compiled unit against the current snapshot.
///
/// Literal-fallback units return their text verbatim. A reference to an
/// absent datasource yields `Undefined` rather than failing; only
/// dereferencing a member of an absent value is an error.
pub fn evaluate(unit: &CompiledUnit, datasources: &dyn DatasourceView) -> EvalResult {
    match unit {
        CompiledUnit::Literal(text) => Ok(Value::string(text.clone())),
        CompiledUnit::Expr(parsed) => eval_expr(parsed.arena(), parsed.root(), datasources),
    }
}

/// Evaluate a setting's unit with the bare-word recovery rule applied.
///
/// If evaluation fails specifically with an unbound-name error and the raw
/// text is a single bare word, the user almost certainly meant a plain
/// string that happens to collide with the expression grammar - return the
/// text itself. Any other failure propagates.
pub fn evaluate_setting(
    unit: &CompiledUnit,
    raw_text: &str,
    datasources: &dyn DatasourceView,
) -> EvalResult {
    match evaluate(unit, datasources) {
        Err(err) if err.is_unbound_reference() && is_bare_word(raw_text) => {
            Ok(Value::string(raw_text))
        }
        other => other,
    }
}

/// The recovery rule applies only to a single `\w+` word. Kept narrow on
/// purpose: letters, digits, and underscore only.
pub fn is_bare_word(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn eval_expr(arena: &ExprArena, id: ExprId, datasources: &dyn DatasourceView) -> EvalResult {
    let expr = arena.get_expr(id);
    match &expr.kind {
        ExprKind::Int(n) => Ok(Value::Int(*n)),
        ExprKind::Float(n) => Ok(Value::Float(*n)),
        ExprKind::Str(s) => Ok(Value::string(s.clone())),
        ExprKind::Bool(b) => Ok(Value::Bool(*b)),
        ExprKind::Null => Ok(Value::Null),
        ExprKind::Array(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(eval_expr(arena, *item, datasources)?);
            }
            Ok(Value::Array(values))
        }
        ExprKind::DatasourceRef { name } => Ok(datasources
            .payload(name)
            .cloned()
            .unwrap_or(Value::Undefined)),
        ExprKind::Ident(name) => Err(undefined_variable(name).with_span(expr.span)),
        ExprKind::Field { receiver, field } => {
            let value = eval_expr(arena, *receiver, datasources)?;
            access_field(&value, field).map_err(|e| e.with_span(expr.span))
        }
        ExprKind::Index { receiver, index } => {
            let value = eval_expr(arena, *receiver, datasources)?;
            let key = eval_expr(arena, *index, datasources)?;
            access_index(&value, &key).map_err(|e| e.with_span(expr.span))
        }
        ExprKind::Unary { op, operand } => {
            let value = eval_expr(arena, *operand, datasources)?;
            evaluate_unary(value, *op).map_err(|e| e.with_span(expr.span))
        }
        ExprKind::Binary { op, lhs, rhs } => {
            let left = eval_expr(arena, *lhs, datasources)?;
            // Short-circuit the boolean connectives
            match op {
                BinaryOp::And | BinaryOp::Or => {
                    let Value::Bool(a) = left else {
                        return Err(
                            condition_not_boolean(left.type_name()).with_span(expr.span)
                        );
                    };
                    if (*op == BinaryOp::And && !a) || (*op == BinaryOp::Or && a) {
                        return Ok(Value::Bool(a));
                    }
                    let right = eval_expr(arena, *rhs, datasources)?;
                    let Value::Bool(b) = right else {
                        return Err(
                            condition_not_boolean(right.type_name()).with_span(expr.span)
                        );
                    };
                    Ok(Value::Bool(b))
                }
                _ => {
                    let right = eval_expr(arena, *rhs, datasources)?;
                    evaluate_binary(left, right, *op).map_err(|e| e.with_span(expr.span))
                }
            }
        }
        ExprKind::Conditional {
            cond,
            then,
            otherwise,
        } => match eval_expr(arena, *cond, datasources)? {
            Value::Bool(true) => eval_expr(arena, *then, datasources),
            Value::Bool(false) => eval_expr(arena, *otherwise, datasources),
            other => Err(condition_not_boolean(other.type_name()).with_span(expr.span)),
        },
    }
}

/// `receiver.field` semantics.
///
/// Missing keys yield `Undefined` (real data may simply not have arrived
/// yet); dereferencing a member of `Undefined` or `Null` is a real
/// runtime error.
fn access_field(receiver: &Value, field: &str) -> EvalResult {
    match receiver {
        Value::Object(entries) => Ok(entries.get(field).cloned().unwrap_or(Value::Undefined)),
        // `.length` convenience on arrays and strings
        Value::Array(items) if field == "length" => {
            Ok(Value::Int(i64::try_from(items.len()).unwrap_or(i64::MAX)))
        }
        Value::Str(s) if field == "length" => {
            Ok(Value::Int(i64::try_from(s.chars().count()).unwrap_or(i64::MAX)))
        }
        other => Err(cannot_access_field(field, other.type_name())),
    }
}

/// `receiver[index]` semantics.
fn access_index(receiver: &Value, index: &Value) -> EvalResult {
    match receiver {
        Value::Array(items) => Ok(array_index(index)
            .and_then(|i| items.get(i))
            .cloned()
            .unwrap_or(Value::Undefined)),
        Value::Object(entries) => {
            // Non-string keys stringify, as JS object indexing would
            let looked_up = match index {
                Value::Str(key) => entries.get(key.as_str()),
                other if !other.is_composite() && !other.is_undefined() => {
                    entries.get(other.to_string().as_str())
                }
                _ => None,
            };
            Ok(looked_up.cloned().unwrap_or(Value::Undefined))
        }
        Value::Str(s) => Ok(array_index(index)
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::Str(c.to_string()))
            .unwrap_or(Value::Undefined)),
        other => Err(cannot_index(other.type_name(), index.type_name())),
    }
}

/// Interpret a value as a non-negative array index.
fn array_index(index: &Value) -> Option<usize> {
    match index {
        Value::Int(n) => usize::try_from(*n).ok(),
        #[allow(clippy::float_cmp, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Value::Float(f) if f.fract() == 0.0 && *f >= 0.0 && *f <= 9_007_199_254_740_992.0 => {
            Some(*f as usize)
        }
        _ => None,
    }
}
