//! Expected-type filter for settings.

use crate::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The value type a setting's expression is expected to produce.
///
/// Supplied by the settings UI and used two ways: completion candidates
/// are filtered by it, and a mismatching resolved value surfaces as a
/// validation hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedType {
    #[default]
    Any,
    Array,
    Object,
    String,
    Number,
    Boolean,
}

impl ExpectedType {
    /// Exact runtime-type check. `Number` accepts both int and float.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            ExpectedType::Any => true,
            ExpectedType::Array => matches!(value, Value::Array(_)),
            ExpectedType::Object => matches!(value, Value::Object(_)),
            ExpectedType::String => matches!(value, Value::Str(_)),
            ExpectedType::Number => matches!(value, Value::Int(_) | Value::Float(_)),
            ExpectedType::Boolean => matches!(value, Value::Bool(_)),
        }
    }

    /// Completion filter: composites always pass, because navigating
    /// deeper may still reach a type-matching leaf.
    pub fn could_match(self, value: &Value) -> bool {
        value.is_composite() || self.matches(value)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExpectedType::Any => "any",
            ExpectedType::Array => "array",
            ExpectedType::Object => "object",
            ExpectedType::String => "string",
            ExpectedType::Number => "number",
            ExpectedType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
