//! Errors reported by the native access SDK.
//!
//! These arrive through delegate callbacks rather than return values. Their
//! `Display` output is the SDK's localized description and is forwarded to
//! callers unchanged.

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, SdkError>;

/// Errors that the SDK reports through its callbacks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SdkError {
    /// Credential registration failed (network, invitation expired, ...).
    #[error("{message}")]
    Registration { message: String },

    /// Connecting to a reader failed during an access attempt.
    #[error("{message}")]
    ReaderConnection { message: String },

    /// Deleting a credential failed.
    #[error("{message}")]
    CredentialDelete { message: String },
}

impl SdkError {
    /// Create a new registration error.
    pub fn registration(message: impl Into<String>) -> Self {
        Self::Registration {
            message: message.into(),
        }
    }

    /// Create a new reader connection error.
    pub fn reader_connection(message: impl Into<String>) -> Self {
        Self::ReaderConnection {
            message: message.into(),
        }
    }

    /// Create a new credential delete error.
    pub fn credential_delete(message: impl Into<String>) -> Self {
        Self::CredentialDelete {
            message: message.into(),
        }
    }

    /// The SDK's localized description.
    pub fn message(&self) -> &str {
        match self {
            Self::Registration { message }
            | Self::ReaderConnection { message }
            | Self::CredentialDelete { message } => message,
        }
    }
}
