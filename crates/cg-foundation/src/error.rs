//! Error handling shared across the call graph engine.

use thiserror::Error;

/// Top-level error type for the engine. Component crates define their own
/// narrower error enums and convert into this one at crate boundaries.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CgError {
    #[error("manifest error: {message}")]
    Manifest { message: String },

    #[error("parse error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("network error: {message}")]
    Network { message: String },

    #[error("invalid data: {message}")]
    InvalidData { message: String },

    #[error("not found: {resource}")]
    NotFound { resource: String },

    #[error("timeout during: {operation}")]
    Timeout { operation: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl CgError {
    pub fn manifest(message: impl Into<String>) -> Self {
        Self::Manifest {
            message: message.into(),
        }
    }

    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Result type alias for convenience.
pub type CgResult<T> = Result<T, CgError>;

/// Standardized error codes for tool-call responses (see `cg-server`).
pub mod error_codes {
    pub const E1000_INTERNAL: &str = "E1000";
    pub const E1001_INVALID_REQUEST: &str = "E1001";
    pub const E1002_NOT_FOUND: &str = "E1002";
    pub const E1003_AMBIGUOUS: &str = "E1003";
    pub const E1004_TIMEOUT: &str = "E1004";
}
