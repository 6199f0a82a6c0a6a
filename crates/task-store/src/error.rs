//! Error types for remote calls and client-side checks.

use thiserror::Error;

/// Result type for calls across the remote-service boundary
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Failure of a call into the backend-as-a-service platform
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Request never produced a response (offline, CORS, DNS)
    #[error("Network error: {0}")]
    Network(String),

    /// No session, expired token, or bad credentials
    #[error("Unauthorized: {0}")]
    Auth(String),

    /// The service answered with an error payload
    #[error("{0}")]
    Remote(String),

    /// The response did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Input rejected before any call was made
    #[error("Invalid input: {0}")]
    Invalid(String),
}

impl From<serde_json::Error> for BackendError {
    fn from(e: serde_json::Error) -> Self {
        BackendError::Decode(e.to_string())
    }
}

/// Profile picture rejected before upload
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadError {
    #[error("Please select an image file")]
    NotAnImage,

    #[error("File size must be less than 5MB")]
    TooLarge,
}

/// A string that names no variant of a closed set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self { kind, value: value.to_string() }
    }
}
