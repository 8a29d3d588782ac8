//! Unified error types for Warden.
//!
//! This module provides a flat error type that wraps the structured engine
//! errors and presents a consistent interface to callers.

use thiserror::Error;
use warden_core::WardenError;

/// Message shown outward for every "you may not see this" outcome.
pub const PUBLIC_NOT_FOUND: &str = "not found";

/// All Warden errors.
///
/// `Display` keeps every kind distinct for logs. Use
/// [`Error::public_message`] for text that leaves the process.
#[derive(Debug, Error)]
pub enum Error {
    /// Entity not found (user, run, file, grant, ...)
    #[error("not found: {0}")]
    NotFound(String),

    /// Uniqueness violation (duplicate id, credential, membership, grant)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Malformed input (grant row naming both or neither principal, missing policy)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Status change not allowed by the run state machine
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// The acting user may not perform the action
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The principal holds no sufficient access
    #[error("access denied: {0}")]
    Denied(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Storage error
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type for Warden operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if this is a conflict error.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }

    /// Check if this is a `Forbidden` or `Denied` error.
    pub fn is_authorization(&self) -> bool {
        matches!(self, Error::Forbidden(_) | Error::Denied(_))
    }

    /// Check if this is an invalid status transition.
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Error::InvalidTransition(_))
    }

    /// Check if this is an invalid-argument error.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }

    /// Message safe to return to an untrusted caller.
    ///
    /// Not-found, forbidden and denied collapse into one message so that a
    /// caller cannot discover the existence of runs, files or grants.
    pub fn public_message(&self) -> String {
        match self {
            Error::NotFound(_) | Error::Forbidden(_) | Error::Denied(_) => {
                PUBLIC_NOT_FOUND.to_string()
            }
            Error::Io(_) | Error::Storage(_) | Error::Serialization(_) => {
                "internal error".to_string()
            }
            other => other.to_string(),
        }
    }
}

// Convert from the structured engine error
impl From<WardenError> for Error {
    fn from(e: WardenError) -> Self {
        match e {
            WardenError::NotFound { entity } => Error::NotFound(entity.to_string()),
            WardenError::Conflict { entity, reason } => {
                Error::Conflict(format!("{}: {}", entity, reason))
            }
            WardenError::InvalidArgument { message } => Error::InvalidArgument(message),
            WardenError::InvalidTransition { run_id, from, to } => {
                Error::InvalidTransition(format!("run {}: {} -> {}", run_id, from, to))
            }
            WardenError::Forbidden {
                actor,
                action,
                entity,
            } => Error::Forbidden(format!("user {} may not {} {}", actor, action, entity)),
            WardenError::Denied { principal, run_id } => {
                Error::Denied(format!("user {} on run {}", principal, run_id))
            }
            WardenError::Config { message } => Error::Config(message),
            WardenError::Serialization { message } => Error::Serialization(message),
            WardenError::Io(io_err) => Error::Io(io_err),
            WardenError::Storage { message } => Error::Storage(message),
        }
    }
}

// Convert from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
