//! Typed errors raised by backend implementations
//!
//! Backends report failures as [`AuthError`] or [`StoreError`]. Neither type
//! crosses the accessor boundary: [`OperationResult::capture`] flattens them
//! into a message string, which is all a caller ever sees.
//!
//! [`ConfigError`] covers configuration loading and is returned directly.
//!
//! [`OperationResult::capture`]: crate::core::result::OperationResult::capture

use std::fmt;
use thiserror::Error;

// =============================================================================
// Auth Errors
// =============================================================================

/// Machine-readable auth failure codes, in the backend's `auth/*` namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorCode {
    InvalidEmail,
    WeakPassword,
    EmailAlreadyInUse,
    InvalidCredential,
    PopupClosedByUser,
    NetworkRequestFailed,
    InternalError,
}

impl AuthErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthErrorCode::InvalidEmail => "auth/invalid-email",
            AuthErrorCode::WeakPassword => "auth/weak-password",
            AuthErrorCode::EmailAlreadyInUse => "auth/email-already-in-use",
            AuthErrorCode::InvalidCredential => "auth/invalid-credential",
            AuthErrorCode::PopupClosedByUser => "auth/popup-closed-by-user",
            AuthErrorCode::NetworkRequestFailed => "auth/network-request-failed",
            AuthErrorCode::InternalError => "auth/internal-error",
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by an [`AuthBackend`](crate::core::backend::AuthBackend)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({code})")]
pub struct AuthError {
    pub code: AuthErrorCode,
    pub message: String,
}

impl AuthError {
    pub fn new(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_email() -> Self {
        Self::new(AuthErrorCode::InvalidEmail, "The email address is badly formatted")
    }

    pub fn weak_password() -> Self {
        Self::new(
            AuthErrorCode::WeakPassword,
            "Password should be at least 6 characters",
        )
    }

    pub fn email_already_in_use() -> Self {
        Self::new(
            AuthErrorCode::EmailAlreadyInUse,
            "The email address is already in use by another account",
        )
    }

    pub fn invalid_credential() -> Self {
        Self::new(AuthErrorCode::InvalidCredential, "Invalid email or password")
    }

    pub fn popup_closed_by_user() -> Self {
        Self::new(
            AuthErrorCode::PopupClosedByUser,
            "The popup has been closed by the user before finalizing the operation",
        )
    }

    pub fn network_request_failed() -> Self {
        Self::new(
            AuthErrorCode::NetworkRequestFailed,
            "A network error has occurred",
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::InternalError, message)
    }
}

// =============================================================================
// Store Errors
// =============================================================================

/// Machine-readable document store failure codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorCode {
    NotFound,
    InvalidArgument,
    PermissionDenied,
    Unavailable,
    Internal,
}

impl StoreErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreErrorCode::NotFound => "not-found",
            StoreErrorCode::InvalidArgument => "invalid-argument",
            StoreErrorCode::PermissionDenied => "permission-denied",
            StoreErrorCode::Unavailable => "unavailable",
            StoreErrorCode::Internal => "internal",
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a [`DocumentStore`](crate::core::backend::DocumentStore)
///
/// Displays as the bare message, the code is kept for backends and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StoreError {
    pub code: StoreErrorCode,
    pub message: String,
}

impl StoreError {
    pub fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::NotFound, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::InvalidArgument, message)
    }

    pub fn permission_denied() -> Self {
        Self::new(
            StoreErrorCode::PermissionDenied,
            "Missing or insufficient permissions.",
        )
    }

    pub fn unavailable() -> Self {
        Self::new(
            StoreErrorCode::Unavailable,
            "Failed to get document because the client is offline.",
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::Internal, message)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required key is absent or empty
    #[error("Missing required configuration key: {key}")]
    MissingKey { key: String },

    /// The configuration document could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}
