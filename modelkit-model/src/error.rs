//! Error types for entity models.

use thiserror::Error;

/// Model-level errors.
///
/// Malformed payload data is never an error: coercion degrades to sentinel
/// values and missing keys are skipped. These variants cover misuse of the
/// typed API, cyclic graphs and configuration loading.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A non-JSON input was assigned to a name the schema does not declare.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// The input kind does not fit the field kind.
    #[error("cannot assign {input} to {kind} field `{field}`")]
    TypeMismatch {
        field: String,
        kind: &'static str,
        input: &'static str,
    },

    /// A related entity was mutably borrowed while being read.
    #[error("related entity is already mutably borrowed")]
    EntityBorrowed,

    /// Serialization went deeper than the configured limit.
    #[error("serialization exceeded maximum depth of {0}")]
    DepthExceeded(usize),

    /// Configuration file is not valid TOML for [`crate::ModelConfig`].
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
