/// Domain-specific error types for issuescope
///
/// Carries enough context (field names, missing resources) for MCP clients
/// to correct a bad tool call without reading server logs.

#[derive(Debug, thiserror::Error)]
pub enum IssueScopeError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>
    },

    #[error("Not found: {resource}")]
    NotFound {
        resource: String
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::embedding::EmbeddingError> for IssueScopeError {
    fn from(e: crate::embedding::EmbeddingError) -> Self {
        IssueScopeError::Internal(e.to_string())
    }
}

impl IssueScopeError {
    /// Helper to create validation errors with field names
    ///
    /// Example:
    /// ```
    /// use issuescope::errors::IssueScopeError;
    /// let err = IssueScopeError::validation("repo", "Repository is required");
    /// ```
    pub fn validation(field: &str, message: &str) -> Self {
        IssueScopeError::Validation {
            message: message.to_string(),
            field: Some(field.to_string()),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        IssueScopeError::NotFound {
            resource: resource.into(),
        }
    }
}
