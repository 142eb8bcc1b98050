use cql_core::ValueError;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("config error: {0}")]
    Config(String),

    #[error("value error: {0}")]
    Value(#[from] ValueError),

    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("Unable to get column field \"{0}\"")]
    MissingField(String),
}

impl SchemaError {
    /// Add context to the error.
    ///
    /// For `Value`, context goes into the inner `ValueError`. `MissingField`
    /// is returned unchanged.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            SchemaError::Value(e) => SchemaError::Value(e.with_context(ctx)),
            SchemaError::Config(msg) => SchemaError::Config(format!("{ctx}: {msg}")),
            SchemaError::UnknownType(msg) => SchemaError::UnknownType(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, SchemaError>;
