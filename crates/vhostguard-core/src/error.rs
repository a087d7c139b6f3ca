//! Shared error type across vhostguard crates.

use thiserror::Error;

/// Stable rejection codes surfaced to callers and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectCode {
    /// Security enabled but no rule set configured.
    DefaultDeny,
    /// An applicable deny rule matched.
    DenyMatched,
    /// Whitelist mode and no allow rule matched.
    NotAllowed,
    /// Invalid configuration or directive.
    BadRequest,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal error.
    Internal,
}

impl RejectCode {
    /// String representation used in logs and metrics labels.
    pub fn as_str(self) -> &'static str {
        match self {
            RejectCode::DefaultDeny => "DEFAULT_DENY",
            RejectCode::DenyMatched => "DENY_MATCHED",
            RejectCode::NotAllowed => "NOT_ALLOWED",
            RejectCode::BadRequest => "BAD_REQUEST",
            RejectCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            RejectCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, VhostGuardError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum VhostGuardError {
    #[error("security: {0}")]
    DefaultDeny(String),
    #[error("security deny: {0}")]
    DenyMatched(String),
    #[error("security allow: {0}")]
    NotAllowed(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl VhostGuardError {
    /// Map an error to its stable code.
    pub fn code(&self) -> RejectCode {
        match self {
            VhostGuardError::DefaultDeny(_) => RejectCode::DefaultDeny,
            VhostGuardError::DenyMatched(_) => RejectCode::DenyMatched,
            VhostGuardError::NotAllowed(_) => RejectCode::NotAllowed,
            VhostGuardError::BadRequest(_) => RejectCode::BadRequest,
            VhostGuardError::UnsupportedVersion => RejectCode::UnsupportedVersion,
            VhostGuardError::Internal(_) => RejectCode::Internal,
        }
    }

    /// True for the admission rejections (as opposed to config/internal errors).
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            VhostGuardError::DefaultDeny(_)
                | VhostGuardError::DenyMatched(_)
                | VhostGuardError::NotAllowed(_)
        )
    }
}
