//! Application-level errors

use thiserror::Error;

/// Failures at the application boundary, with the context needed to report them.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("config error: {message}")]
    Config { message: String },

    #[error("script line {line}: {message}")]
    Script { line: usize, message: String },

    #[error("invalid tree json: {context}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
