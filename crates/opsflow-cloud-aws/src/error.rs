//! AWS provider error types

use opsflow_cloud::CloudError;
use thiserror::Error;

/// Error code OpsWorks returns for unknown app ids
pub const NOT_FOUND_CODE: &str = "ResourceNotFoundException";

/// Error codes worth retrying until the deadline
pub const TRANSIENT_CODES: &[&str] = &[
    "ThrottlingException",
    "Throttling",
    "RequestLimitExceeded",
    "ServiceUnavailable",
    "InternalFailure",
    "InternalServerError",
];

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("Configuration error: {0}")]
    Config(#[from] opsflow_config::ConfigError),

    #[error("Cloud error: {0}")]
    Cloud(#[from] CloudError),
}

pub type Result<T> = std::result::Result<T, AwsError>;

/// Map an upstream error code onto the cloud error taxonomy
///
/// Unknown or missing codes are fatal.
pub fn classify_code(code: Option<&str>, message: impl Into<String>) -> CloudError {
    let message = message.into();
    match code {
        Some(NOT_FOUND_CODE) => CloudError::NotFound(message),
        Some(code) if TRANSIENT_CODES.contains(&code) => CloudError::transient(code, message),
        Some(code) => CloudError::fatal(code, message),
        None => CloudError::fatal("Unknown", message),
    }
}
