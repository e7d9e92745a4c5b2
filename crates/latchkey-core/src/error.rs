use std::fmt;

use thiserror::Error;

/// Caller-facing errors.
///
/// Every variant maps to a stable [`ErrorKind`] whose [`code`](ErrorKind::code)
/// is the string a platform boundary hands to the caller alongside the
/// human-readable `Display` message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Setup errors
    #[error("configure has not been called yet")]
    NotConfigured,

    // Validation errors
    #[error("{message}")]
    InvalidArgument { message: String },

    #[error("continuationPoint was not valid")]
    InvalidContinuationPoint { token: String },

    // Internal invariant breach, never surfaced to a caller
    #[error("Continuation token already registered: {token}")]
    DuplicateToken { token: String },

    // SDK-reported failures
    #[error("{message}")]
    RegistrationFailed { message: String },

    #[error("{message}")]
    DeleteFailed { message: String },

    // Abandoned registrations
    #[error("Registration timed out awaiting a second-factor decision")]
    RegistrationTimedOut,

    #[error("Registration was cancelled before completion")]
    RegistrationCancelled,
}

impl Error {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an invalid continuation point error for `token`.
    pub fn invalid_continuation_point(token: impl Into<String>) -> Self {
        Self::InvalidContinuationPoint {
            token: token.into(),
        }
    }

    /// Create a registration failure carrying the SDK's message.
    pub fn registration_failed(message: impl Into<String>) -> Self {
        Self::RegistrationFailed {
            message: message.into(),
        }
    }

    /// Create a credential deletion failure carrying the SDK's message.
    pub fn delete_failed(message: impl Into<String>) -> Self {
        Self::DeleteFailed {
            message: message.into(),
        }
    }

    /// The stable kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConfigured => ErrorKind::NotConfigured,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::InvalidContinuationPoint { .. } => ErrorKind::InvalidContinuationPoint,
            Self::DuplicateToken { .. } => ErrorKind::DuplicateToken,
            Self::RegistrationFailed { .. } => ErrorKind::RegistrationFailed,
            Self::DeleteFailed { .. } => ErrorKind::DeleteFailed,
            Self::RegistrationTimedOut => ErrorKind::RegistrationTimedOut,
            Self::RegistrationCancelled => ErrorKind::RegistrationCancelled,
        }
    }

    /// Shorthand for `self.kind().code()`.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }
}

/// Stable error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotConfigured,
    InvalidArgument,
    InvalidContinuationPoint,
    DuplicateToken,
    RegistrationFailed,
    DeleteFailed,
    RegistrationTimedOut,
    RegistrationCancelled,
}

impl ErrorKind {
    /// Wire code for this kind.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::InvalidArgument => "invalid_arg",
            Self::InvalidContinuationPoint => "invalid_continuation_point",
            Self::DuplicateToken => "duplicate_token",
            Self::RegistrationFailed => "registration_failed",
            Self::DeleteFailed => "delete_mobile_credential_failed",
            Self::RegistrationTimedOut => "registration_timed_out",
            Self::RegistrationCancelled => "registration_cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
