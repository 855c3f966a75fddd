//! The coerced value held by an attribute.

use crate::{coerce, date};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// A value produced by attribute coercion.
///
/// `Number` may hold NaN and `InvalidDate` marks date text that failed to
/// parse. Both are stored values, not errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AttrValue {
    #[default]
    Null,
    Number(f64),
    String(String),
    Boolean(bool),
    Date(DateTime<Utc>),
    InvalidDate,
    Json(Value),
}

impl AttrValue {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::Date(d) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Converts to plain JSON, formatting dates with `date_format`.
    #[must_use]
    pub fn to_json_with(&self, date_format: &str) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Number(n) => coerce::number_to_json(*n),
            Self::String(s) => Value::String(s.clone()),
            Self::Boolean(b) => Value::Bool(*b),
            Self::Date(d) => Value::String(date::format(d, date_format)),
            Self::InvalidDate => Value::String(date::INVALID_DATE.to_string()),
            Self::Json(v) => v.clone(),
        }
    }

    /// Converts to plain JSON using the canonical date format.
    #[must_use]
    pub fn to_json(&self) -> Value {
        self.to_json_with(date::CANONICAL_FORMAT)
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<DateTime<Utc>> for AttrValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}
