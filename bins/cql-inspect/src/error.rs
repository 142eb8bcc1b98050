use cql_core::ValueError;
use cql_schema::SchemaError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Schema(#[from] SchemaError),

    #[error("{0}")]
    Value(#[from] ValueError),

    #[error("keyspace '{0}' not found")]
    KeyspaceNotFound(String),

    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("operator '{0}' needs a right operand")]
    MissingOperand(String),

    #[error("operator '{0}' takes a single operand")]
    UnexpectedOperand(String),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}
