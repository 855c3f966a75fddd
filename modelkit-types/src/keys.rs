//! Field name to payload key translation.

use serde::{Deserialize, Serialize};

/// How an entity's field names map to the keys of its external payload.
///
/// Fields are declared in camelCase and payloads use snake_case unless a
/// schema opts into [`KeyStyle::Verbatim`] or supplies its own mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStyle {
    /// `customArray` ↔ `custom_array`.
    #[default]
    SnakeCase,
    /// Keys are the field names unchanged.
    Verbatim,
    /// Keys come from a caller-supplied function. Not representable in
    /// config files.
    #[serde(skip)]
    Custom(fn(&str) -> String),
}

impl KeyStyle {
    /// Returns the payload key for a declared field name.
    #[must_use]
    pub fn to_key(&self, field_name: &str) -> String {
        match self {
            Self::SnakeCase => split_before_uppercase(field_name).join("_").to_lowercase(),
            Self::Verbatim => field_name.to_string(),
            Self::Custom(map) => map(field_name),
        }
    }

    /// Returns the field name a payload key most likely came from.
    ///
    /// This is the inverse of [`to_key`](Self::to_key) for names made of
    /// lowercase words. Names with consecutive capitals (`ID` → `i_d`) do
    /// not survive the round trip, so callers resolving keys should confirm
    /// the candidate with `to_key`. A [`Custom`](Self::Custom) mapping has
    /// no inverse, so the key itself is returned.
    #[must_use]
    pub fn to_field_name(&self, key: &str) -> String {
        match self {
            Self::SnakeCase => {
                let mut parts = key.split('_');
                let mut name = parts.next().unwrap_or_default().to_string();
                for part in parts {
                    let mut chars = part.chars();
                    if let Some(first) = chars.next() {
                        name.extend(first.to_uppercase());
                        name.push_str(chars.as_str());
                    }
                }
                name
            }
            Self::Verbatim | Self::Custom(_) => key.to_string(),
        }
    }
}

/// Splits a name before each ASCII uppercase letter.
///
/// A `.` directly before the uppercase letter is consumed by the split. A
/// name starting with an uppercase letter yields no empty leading segment.
fn split_before_uppercase(name: &str) -> Vec<&str> {
    let bytes = name.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] == b'.' && bytes.get(pos + 1).is_some_and(u8::is_ascii_uppercase) {
            segments.push(&name[start..pos]);
            start = pos + 1;
            pos = start + 1;
            continue;
        }
        if bytes[pos].is_ascii_uppercase() && pos != start {
            segments.push(&name[start..pos]);
            start = pos;
        }
        pos += 1;
    }

    segments.push(&name[start..]);
    segments
}
