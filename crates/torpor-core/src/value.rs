use crate::{Error, Result};

/// A single column value.
///
/// Values hash and order by content so they can serve as identity-map and
/// table keys.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    /// The `null` value.
    #[default]
    Null,
    /// A boolean value.
    Bool(bool),
    /// A signed 64-bit integer.
    I64(i64),
    /// A string value.
    String(String),
}

impl Value {
    /// Returns the `null` value.
    pub const fn null() -> Value {
        Value::Null
    }

    /// Returns `true` if the value is `null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Variant name, used in conversion errors.
    pub(crate) fn ty_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::I64(_) => "I64",
            Value::String(_) => "String",
        }
    }

    /// Converts the value to a `bool`, failing on any other variant.
    pub fn to_bool(self) -> Result<bool> {
        match self {
            Value::Bool(v) => Ok(v),
            _ => Err(Error::type_conversion(self, "bool")),
        }
    }

    /// Converts the value to an `i64`, failing on any other variant.
    pub fn to_i64(self) -> Result<i64> {
        match self {
            Value::I64(v) => Ok(v),
            _ => Err(Error::type_conversion(self, "i64")),
        }
    }

    /// Converts the value to a `String`, failing on any other variant.
    pub fn to_string(self) -> Result<String> {
        match self {
            Value::String(v) => Ok(v),
            _ => Err(Error::type_conversion(self, "String")),
        }
    }

    /// Converts the value to an `Option<i64>`, mapping `null` to `None`.
    pub fn to_option_i64(self) -> Result<Option<i64>> {
        match self {
            Value::Null => Ok(None),
            Value::I64(v) => Ok(Some(v)),
            _ => Err(Error::type_conversion(self, "Option<i64>")),
        }
    }

    /// Converts the value to an `Option<String>`, mapping `null` to `None`.
    pub fn to_option_string(self) -> Result<Option<String>> {
        match self {
            Value::Null => Ok(None),
            Value::String(v) => Ok(Some(v)),
            _ => Err(Error::type_conversion(self, "Option<String>")),
        }
    }

    /// Borrows the value as a `&str` if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// Reads the value as an `i64` if it is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Value {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Value {
        Value::I64(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Value {
        Value::I64(value.into())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Value {
        Value::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Value {
        Value::String(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Value {
        match value {
            Some(value) => value.into(),
            None => Value::Null,
        }
    }
}
