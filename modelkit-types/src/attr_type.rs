//! The declared type of an attribute.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Determines which coercion rule an attribute applies on assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrType {
    Number,
    String,
    Boolean,
    Date,
    /// Structured passthrough, stored without coercion.
    Json,
}

impl AttrType {
    /// Returns the lowercase name used in payloads and configuration.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttrType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "number" => Ok(Self::Number),
            "string" => Ok(Self::String),
            "boolean" => Ok(Self::Boolean),
            "date" => Ok(Self::Date),
            "json" => Ok(Self::Json),
            other => Err(crate::Error::UnknownAttrType(other.to_string())),
        }
    }
}
