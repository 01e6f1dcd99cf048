//! Custom Error Types for PromptLab
//!
//! Provides structured error handling with user-friendly messages.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for PromptLab operations
#[derive(Error, Debug)]
pub enum PromptLabError {
    #[error("Store operation failed: {operation} - {details}")]
    Store { operation: String, details: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },

    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("AI provider not configured. Please set your API key first.")]
    AiNotConfigured,

    #[error("AI request failed: {message}")]
    AiRequest { message: String },

    #[error("File operation failed: {path} - {reason}")]
    FileOperation { path: String, reason: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl PromptLabError {
    /// Get error code for frontend
    pub fn code(&self) -> &'static str {
        match self {
            PromptLabError::Store { .. } => "STORE_ERROR",
            PromptLabError::NotFound { .. } => "NOT_FOUND",
            PromptLabError::InvalidInput { .. } => "INVALID_INPUT",
            PromptLabError::AiNotConfigured => "AI_NOT_CONFIGURED",
            PromptLabError::AiRequest { .. } => "AI_REQUEST",
            PromptLabError::FileOperation { .. } => "FILE_OPERATION",
            PromptLabError::Config { .. } => "CONFIG_ERROR",
        }
    }

    /// Get user-friendly suggestion for recovery
    pub fn suggestion(&self) -> &'static str {
        match self {
            PromptLabError::Store { .. } => "Try again in a moment. The data store may be busy.",
            PromptLabError::NotFound { .. } => "The item may have been deleted. Refresh the view.",
            PromptLabError::InvalidInput { .. } => "Check the value you entered and try again.",
            PromptLabError::AiNotConfigured => {
                "Set OPENAI_API_KEY or add openai_api_key to the PromptLab config file."
            }
            PromptLabError::AiRequest { .. } => {
                "Check your internet connection and API key validity."
            }
            PromptLabError::FileOperation { .. } => "Check file permissions and path validity.",
            PromptLabError::Config { .. } => "Check your configuration settings.",
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PromptLabError::AiRequest { .. } | PromptLabError::Store { .. }
        )
    }

    pub fn not_found(entity: &str, id: &str) -> Self {
        PromptLabError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

/// Serializable error response for frontend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub suggestion: String,
    pub recoverable: bool,
}

impl From<PromptLabError> for ErrorResponse {
    fn from(err: PromptLabError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            suggestion: err.suggestion().to_string(),
            recoverable: err.is_recoverable(),
        }
    }
}

/// Result type alias for PromptLab operations
pub type PromptLabResult<T> = Result<T, PromptLabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = PromptLabError::not_found("Organization", "org-1");
        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(err.to_string(), "Organization org-1 not found");
    }

    #[test]
    fn test_error_response_serialization() {
        let err = PromptLabError::AiNotConfigured;
        let response: ErrorResponse = err.into();
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("AI_NOT_CONFIGURED"));
        assert!(!response.recoverable);
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(PromptLabError::Store {
            operation: "update_organization".to_string(),
            details: "busy".to_string()
        }
        .is_recoverable());
        assert!(!PromptLabError::not_found("Organization", "org-1").is_recoverable());
        assert!(!PromptLabError::InvalidInput {
            field: "name".to_string(),
            reason: "empty".to_string()
        }
        .is_recoverable());
    }
}
