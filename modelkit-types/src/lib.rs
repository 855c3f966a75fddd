//! Core type definitions for modelkit.
//!
//! This crate defines the scalar layer that entity models are built on:
//! - [`AttrType`] and [`AttrValue`], the declared type of an attribute and
//!   the coerced value it holds
//! - Coercion rules that turn loosely-typed payload values into typed ones
//! - Timezone-safe date parsing and canonical date formatting
//! - [`KeyStyle`], the field name to payload key translation
//!
//! Nothing here knows about entities or relations; those live in
//! `modelkit-model`.

mod attr_type;
pub mod coerce;
pub mod date;
mod keys;
mod value;

pub use attr_type::AttrType;
pub use keys::KeyStyle;
pub use value::AttrValue;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("unknown attribute type: {0}")]
    UnknownAttrType(String),
}
