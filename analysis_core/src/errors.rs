//! # Error Types
//!
//! Structured error types for analysis_core. Every failure in the
//! request/response chain ends up as one of these, and its `Display` text is
//! what the user sees in place of tab content.
//!
//! ## Example
//!
//! ```rust
//! use analysis_core::errors::{AssistError, AssistResult};
//!
//! fn require_code(code: &str) -> AssistResult<()> {
//!     if code.trim().is_empty() {
//!         return Err(AssistError::invalid_config("code", "Nothing to analyze"));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for analysis_core operations
pub type AssistResult<T> = Result<T, AssistError>;

/// Structured error type for client operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum AssistError {
    /// The request never produced a response (DNS, connect, timeout, TLS...)
    #[error("Network error: {reason}")]
    Network { reason: String },

    /// A response arrived but its body could not be used
    #[error("Invalid response: {reason}")]
    InvalidResponse { reason: String },

    /// Diagram definition could not be parsed or laid out
    #[error("Diagram error at line {line}: {reason}")]
    Diagram { line: usize, reason: String },

    /// A configuration value is unusable
    #[error("Invalid config for '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AssistError {
    /// Create a Network error
    pub fn network(reason: impl Into<String>) -> Self {
        AssistError::Network {
            reason: reason.into(),
        }
    }

    /// Create an InvalidResponse error
    pub fn invalid_response(reason: impl Into<String>) -> Self {
        AssistError::InvalidResponse {
            reason: reason.into(),
        }
    }

    /// Create a Diagram error
    pub fn diagram(line: usize, reason: impl Into<String>) -> Self {
        AssistError::Diagram {
            line,
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AssistError::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            AssistError::Network { .. } => "NETWORK",
            AssistError::InvalidResponse { .. } => "INVALID_RESPONSE",
            AssistError::Diagram { .. } => "DIAGRAM",
            AssistError::InvalidConfig { .. } => "INVALID_CONFIG",
            AssistError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for AssistError {
    fn from(err: serde_json::Error) -> Self {
        AssistError::invalid_response(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = AssistError::diagram(3, "Unknown edge connector '~>'");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"Diagram\""));
        let roundtrip: AssistError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AssistError::network("refused").error_code(), "NETWORK");
        assert_eq!(AssistError::invalid_response("eof").error_code(), "INVALID_RESPONSE");
        assert_eq!(AssistError::invalid_config("endpoint", "empty").error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_display_is_user_facing() {
        let error = AssistError::network("connection refused");
        assert_eq!(error.to_string(), "Network error: connection refused");
    }

    #[test]
    fn test_json_error_maps_to_invalid_response() {
        let err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let mapped: AssistError = err.into();
        assert_eq!(mapped.error_code(), "INVALID_RESPONSE");
    }
}
