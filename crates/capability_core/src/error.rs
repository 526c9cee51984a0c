//! Typed failure taxonomy shared by every capability adapter.

/// Typed error describing why a capability operation failed.
///
/// Every adapter operation resolves to one of these kinds: the capability is
/// absent from the environment, a permission or precondition blocked the
/// call, the native operation itself rejected, or the caller aborted the
/// attempt. Aborts are a distinguishable outcome rather than a user-facing
/// failure and are never recorded in a snapshot's `last_error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// The capability probe found the capability absent; never retried.
    Unsupported {
        /// Stable capability identifier used in diagnostics.
        capability: &'static str,
    },
    /// The platform or user denied permission for the operation.
    PermissionDenied {
        /// Stable capability identifier used in diagnostics.
        capability: &'static str,
    },
    /// A required precondition did not hold (resource not open, bad argument).
    Precondition {
        /// Stable capability identifier used in diagnostics.
        capability: &'static str,
        /// Human-readable description of the violated precondition.
        reason: String,
    },
    /// The underlying platform operation rejected.
    Native {
        /// Stable capability identifier used in diagnostics.
        capability: &'static str,
        /// Message carried by the native rejection.
        message: String,
    },
    /// The caller cancelled the operation before it completed.
    Aborted {
        /// Stable capability identifier used in diagnostics.
        capability: &'static str,
    },
}

impl CapabilityError {
    /// Builds an [`CapabilityError::Unsupported`] error for `capability`.
    pub const fn unsupported(capability: &'static str) -> Self {
        Self::Unsupported { capability }
    }

    /// Builds a [`CapabilityError::PermissionDenied`] error for `capability`.
    pub const fn permission_denied(capability: &'static str) -> Self {
        Self::PermissionDenied { capability }
    }

    /// Builds a [`CapabilityError::Precondition`] error with a reason.
    pub fn precondition(capability: &'static str, reason: impl Into<String>) -> Self {
        Self::Precondition {
            capability,
            reason: reason.into(),
        }
    }

    /// Builds a [`CapabilityError::Native`] error wrapping a platform message.
    pub fn native(capability: &'static str, message: impl Into<String>) -> Self {
        Self::Native {
            capability,
            message: message.into(),
        }
    }

    /// Builds an [`CapabilityError::Aborted`] outcome for `capability`.
    pub const fn aborted(capability: &'static str) -> Self {
        Self::Aborted { capability }
    }

    /// Returns the stable capability label for diagnostics.
    pub const fn capability(&self) -> &'static str {
        match self {
            Self::Unsupported { capability }
            | Self::PermissionDenied { capability }
            | Self::Precondition { capability, .. }
            | Self::Native { capability, .. }
            | Self::Aborted { capability } => capability,
        }
    }

    /// Returns whether this outcome is a caller-requested abort.
    pub const fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}

impl std::fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsupported { capability } => {
                write!(f, "capability unsupported: {capability}")
            }
            Self::PermissionDenied { capability } => {
                write!(f, "capability permission denied: {capability}")
            }
            Self::Precondition { capability, reason } => {
                write!(f, "capability precondition failed: {capability}: {reason}")
            }
            Self::Native { capability, message } => {
                write!(f, "capability operation failed: {capability}: {message}")
            }
            Self::Aborted { capability } => {
                write!(f, "capability operation aborted: {capability}")
            }
        }
    }
}

impl std::error::Error for CapabilityError {}
