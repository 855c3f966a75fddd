//! Typed attribute container.

use chrono::{DateTime, Utc};
use modelkit_types::{AttrType, AttrValue, coerce, date};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Construction options for an attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttrParams {
    /// Applied at construction and whenever the attribute is set to null.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl AttrParams {
    /// Params with a default value.
    pub fn with_default(value: impl Into<Value>) -> Self {
        Self {
            default_value: Some(value.into()),
        }
    }
}

/// Holds one coerced value of a fixed [`AttrType`].
#[derive(Debug, Clone, PartialEq)]
pub struct Attr {
    attr_type: AttrType,
    value: AttrValue,
    params: AttrParams,
}

impl Attr {
    /// Creates an attribute, applying the default value if one is configured.
    pub fn new(attr_type: AttrType, params: AttrParams) -> Self {
        let mut attr = Self {
            attr_type,
            value: AttrValue::Null,
            params,
        };
        attr.value = attr.default_or_null();
        attr
    }

    pub fn attr_type(&self) -> AttrType {
        self.attr_type
    }

    pub fn params(&self) -> &AttrParams {
        &self.params
    }

    /// Returns the current value.
    pub fn value(&self) -> &AttrValue {
        &self.value
    }

    /// Assigns a payload value, coercing it to the attribute's type.
    ///
    /// Null resets to the default value, or to null when there is none.
    /// Unreadable input is stored as a sentinel (NaN, `InvalidDate`).
    pub fn set_value(&mut self, input: impl Into<Value>) {
        let input = input.into();
        self.value = if input.is_null() {
            self.default_or_null()
        } else {
            coerce_value(self.attr_type, input)
        };
    }

    /// Assigns a native date.
    ///
    /// Number attributes store epoch milliseconds, string attributes the
    /// canonical text, boolean attributes `true`. Date and JSON attributes
    /// keep the date itself.
    pub fn set_date(&mut self, value: DateTime<Utc>) {
        self.value = match self.attr_type {
            AttrType::Date | AttrType::Json => AttrValue::Date(value),
            AttrType::Number => AttrValue::Number(value.timestamp_millis() as f64),
            AttrType::String => AttrValue::String(date::format_canonical(&value)),
            AttrType::Boolean => AttrValue::Boolean(true),
        };
    }

    fn default_or_null(&self) -> AttrValue {
        match &self.params.default_value {
            Some(default) if !default.is_null() => coerce_value(self.attr_type, default.clone()),
            _ => AttrValue::Null,
        }
    }
}

fn coerce_value(attr_type: AttrType, input: Value) -> AttrValue {
    match attr_type {
        AttrType::Number => AttrValue::Number(coerce::to_number(&input)),
        AttrType::String => AttrValue::String(match input {
            Value::String(s) => s,
            other => coerce::to_text(&other),
        }),
        AttrType::Boolean => AttrValue::Boolean(coerce::to_bool(&input)),
        AttrType::Date => coerce_date(&input),
        AttrType::Json => AttrValue::Json(input),
    }
}

fn coerce_date(input: &Value) -> AttrValue {
    let parsed = match input {
        Value::String(s) => date::parse(s),
        Value::Number(n) => date::from_millis(n.as_f64().unwrap_or(f64::NAN)),
        _ => return AttrValue::InvalidDate,
    };
    parsed.map_or(AttrValue::InvalidDate, AttrValue::Date)
}
