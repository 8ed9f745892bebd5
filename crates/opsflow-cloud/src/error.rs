//! Cloud resource error types

use thiserror::Error;

/// Errors raised while managing a cloud resource
///
/// Upstream failures are split into [`CloudError::Transient`] and
/// [`CloudError::Fatal`] so the retry loop can decide whether to keep going.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Invalid configuration: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Transient upstream error [{code}]: {message}")]
    Transient { code: String, message: String },

    #[error("Upstream error [{code}]: {message}")]
    Fatal { code: String, message: String },

    /// The resource was created upstream as `id` but could not be read back
    #[error("Created {id} but could not read it back: {source}")]
    Unconfirmed {
        id: String,
        #[source]
        source: Box<CloudError>,
    },

    #[error("State file error: {0}")]
    State(String),

    #[error("Lock acquisition failed: {0}")]
    Lock(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn transient(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transient {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn fatal(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fatal {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn unconfirmed(id: impl Into<String>, source: CloudError) -> Self {
        Self::Unconfirmed {
            id: id.into(),
            source: Box::new(source),
        }
    }

    /// Identifier of a resource that exists upstream despite this error
    pub fn created_id(&self) -> Option<&str> {
        match self {
            Self::Unconfirmed { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Whether the retry loop may attempt the call again
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Upstream error code, if this error came from the upstream service
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Transient { code, .. } | Self::Fatal { code, .. } => Some(code),
            Self::Unconfirmed { source, .. } => source.code(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
