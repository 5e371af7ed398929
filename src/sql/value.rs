//! Scalar values and the literal-escaping seam.

use serde::{Deserialize, Serialize};

/// A scalar carried by filters, join conditions and relation metadata.
///
/// Deserializes from any JSON/TOML scalar; `null` becomes [`Value::Null`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

/// Turns a scalar into a SQL literal that is safe to splice into a statement.
///
/// The compiler never passes [`Value::Null`] where a comparison is being
/// built (`IS NULL` is emitted instead), but implementations must still
/// return something sensible for it.
pub trait ValueEscaper: Send + Sync {
    fn quote(&self, value: &Value) -> String;
}
