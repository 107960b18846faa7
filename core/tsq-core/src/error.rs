//! Error types for the TSQ push-down optimizer.
//!
//! All public APIs return `TsqResult<T>` — no panics in library code.

use thiserror::Error;

/// Unified error type for all TSQ operations.
#[derive(Debug, Error)]
pub enum TsqError {
    /// Structural request the storage layer deliberately refuses to serve
    #[error("unimplemented: {0}")]
    Unimplemented(String),

    /// A node spec does not have the type its rule pattern guarantees
    #[error("malformed plan: {message}\nContext: {context}")]
    MalformedPlan { message: String, context: String },

    /// A pushable expression could not be turned into a storage predicate
    #[error("predicate translation failed: {0}")]
    PredicateTranslation(String),

    /// Node id is unknown or was removed from the graph
    #[error("plan node {0} not found")]
    NodeNotFound(usize),

    /// Graph operation whose preconditions do not hold
    #[error("invalid operation: {message}\nContext: {context}")]
    InvalidOperation { message: String, context: String },

    /// The rule set kept rewriting past the configured iteration cap
    #[error("optimizer did not reach a fixed point after {iterations} iterations")]
    NoFixedPoint { iterations: usize },

    /// Standard I/O error
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl TsqError {
    pub(crate) fn malformed(message: impl Into<String>, context: impl Into<String>) -> Self {
        TsqError::MalformedPlan {
            message: message.into(),
            context: context.into(),
        }
    }

    pub(crate) fn invalid(message: impl Into<String>, context: impl Into<String>) -> Self {
        TsqError::InvalidOperation {
            message: message.into(),
            context: context.into(),
        }
    }
}

/// Result type alias for all TSQ operations.
pub type TsqResult<T> = Result<T, TsqError>;

impl From<serde_json::Error> for TsqError {
    fn from(err: serde_json::Error) -> Self {
        TsqError::Serialization(err.to_string())
    }
}
