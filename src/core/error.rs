//! Error type system for the Student Portal client
//!
//! This module provides:
//! - A single error enum covering local, transport and backend failures
//! - Classification into the four failure kinds the screens react to
//! - Extraction of a human-readable message with a fallback

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Main error type for the Student Portal client
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    // Local errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Token storage error: {0}")]
    StorageError(String),

    // Backend answered with a non-success status
    #[error("Request rejected with status {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    // Transport errors
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

/// The failure kinds a screen distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Invalid credentials or an unusable token
    Authentication,
    /// Missing or malformed input, caught locally or reported by the backend
    Validation,
    /// The caller's role does not allow the action
    Authorization,
    /// Connection, server or decoding failure
    Transport,
}

impl PortalError {
    /// Build a rejection from an HTTP status and an optional body message
    pub fn rejected(status: StatusCode, message: Option<String>) -> Self {
        PortalError::Rejected {
            status: status.as_u16(),
            message: message.filter(|m| !m.trim().is_empty()),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PortalError::AuthenticationError(_) => ErrorKind::Authentication,
            PortalError::ValidationError(_) => ErrorKind::Validation,
            PortalError::Rejected { status, .. } => match *status {
                401 => ErrorKind::Authentication,
                403 => ErrorKind::Authorization,
                400 | 409 | 422 => ErrorKind::Validation,
                _ => ErrorKind::Transport,
            },
            PortalError::ConfigError(_)
            | PortalError::StorageError(_)
            | PortalError::NetworkError(_)
            | PortalError::Timeout(_)
            | PortalError::IoError(_)
            | PortalError::SerializationError(_)
            | PortalError::DeserializationError(_) => ErrorKind::Transport,
        }
    }

    /// Get the error type name for log fields
    pub fn error_type(&self) -> &'static str {
        match self {
            PortalError::ConfigError(_) => "ConfigError",
            PortalError::ValidationError(_) => "ValidationError",
            PortalError::AuthenticationError(_) => "AuthenticationError",
            PortalError::StorageError(_) => "StorageError",
            PortalError::Rejected { .. } => "Rejected",
            PortalError::NetworkError(_) => "NetworkError",
            PortalError::Timeout(_) => "Timeout",
            PortalError::IoError(_) => "IoError",
            PortalError::SerializationError(_) => "SerializationError",
            PortalError::DeserializationError(_) => "DeserializationError",
        }
    }

    /// Message the backend supplied with a rejection, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            PortalError::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Message to show the user: the backend's message, a local validation
    /// message, or the given fallback
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            PortalError::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            PortalError::ValidationError(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Check if retrying the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            PortalError::NetworkError(_) | PortalError::Timeout(_) => true,
            PortalError::Rejected { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for PortalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PortalError::Timeout(err.to_string())
        } else if err.is_decode() {
            PortalError::DeserializationError(err.to_string())
        } else if let Some(status) = err.status() {
            PortalError::rejected(status, None)
        } else {
            PortalError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::DeserializationError(err.to_string())
    }
}

/// Result type alias for operations that can fail with PortalError
pub type Result<T> = std::result::Result<T, PortalError>;

/// Context extension trait for turning foreign errors into storage errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context to an error using a closure
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PortalError::StorageError(format!("{}: {}", context.into(), e)))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| PortalError::StorageError(format!("{}: {}", f(), e)))
    }
}
