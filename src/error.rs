//! Error types for condition compilation, metadata lookups and the CRUD facade.
//!
//! Every variant except [`QueryError::Persistence`] describes a caller bug
//! (malformed conditions, wrong entity type, incomplete metadata). They are
//! raised synchronously and abort the current call without partial results.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Malformed condition specification, extras or ordering
    #[error("Specification error: {0}")]
    Specification(String),

    /// An entity of an unexpected type was handed to a typed facade
    #[error("Type mismatch: expected entities of type \"{expected}\" (type \"{found}\" found)")]
    TypeMismatch { expected: String, found: String },

    /// The entity type's metadata cannot satisfy the request
    #[error("Metadata error: {0}")]
    Metadata(String),

    /// Invalid configuration values
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Failure reported by the persistence engine
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl QueryError {
    pub fn specification<S: Into<String>>(message: S) -> Self {
        Self::Specification(message.into())
    }

    pub fn type_mismatch<E: Into<String>, F: Into<String>>(expected: E, found: F) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn metadata<S: Into<String>>(message: S) -> Self {
        Self::Metadata(message.into())
    }

    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration(message.into())
    }

    pub fn persistence<S: Into<String>>(message: S) -> Self {
        Self::Persistence(message.into())
    }

    /// Whether the error was caused by the caller rather than the engine
    pub fn is_usage_error(&self) -> bool {
        !matches!(self, Self::Persistence(_))
    }
}

impl From<config::ConfigError> for QueryError {
    fn from(error: config::ConfigError) -> Self {
        Self::Configuration(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
