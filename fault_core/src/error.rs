//! Error taxonomy for fault_core operations
//!
//! Every fallible operation in the crate reports one of five kinds. Callers
//! that only care about the category can match on [`FaultError::kind`].

/// Result type for fault_core operations
pub type FaultResult<T> = Result<T, FaultError>;

/// Category of a [`FaultError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    InvalidArgument,
    NotFound,
    AlreadyRegistered,
    InvalidState,
    ResourceExhausted,
}

impl FaultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::AlreadyRegistered => "already_registered",
            Self::InvalidState => "invalid_state",
            Self::ResourceExhausted => "resource_exhausted",
        }
    }
}

impl std::fmt::Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures raised while building records, registering capabilities or
/// resolving catalog codes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FaultError {
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("{what} '{key}' not found")]
    NotFound { what: String, key: String },

    #[error("'{name}' is already registered on {owner}")]
    AlreadyRegistered { owner: String, name: String },

    #[error("Invalid state: {reason}")]
    InvalidState { reason: String },

    #[error("Resource exhausted: {reason} (limit {limit})")]
    ResourceExhausted { reason: String, limit: usize },
}

impl FaultError {
    /// Create an invalid argument error
    pub fn invalid_argument(reason: &str) -> Self {
        Self::InvalidArgument {
            reason: reason.to_string(),
        }
    }

    /// Create a not found error for the named kind of thing
    pub fn not_found(what: &str, key: &str) -> Self {
        Self::NotFound {
            what: what.to_string(),
            key: key.to_string(),
        }
    }

    /// Create an already registered error
    pub fn already_registered(owner: &str, name: &str) -> Self {
        Self::AlreadyRegistered {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(reason: &str) -> Self {
        Self::InvalidState {
            reason: reason.to_string(),
        }
    }

    /// Create a resource exhausted error
    pub fn resource_exhausted(reason: &str, limit: usize) -> Self {
        Self::ResourceExhausted {
            reason: reason.to_string(),
            limit,
        }
    }

    /// Poisoned registry lock
    pub(crate) fn poisoned(registry: &str) -> Self {
        Self::invalid_state(&format!("{} lock poisoned", registry))
    }

    pub fn kind(&self) -> FaultKind {
        match self {
            Self::InvalidArgument { .. } => FaultKind::InvalidArgument,
            Self::NotFound { .. } => FaultKind::NotFound,
            Self::AlreadyRegistered { .. } => FaultKind::AlreadyRegistered,
            Self::InvalidState { .. } => FaultKind::InvalidState,
            Self::ResourceExhausted { .. } => FaultKind::ResourceExhausted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            FaultError::invalid_argument("x").kind(),
            FaultKind::InvalidArgument
        );
        assert_eq!(FaultError::not_found("code", "A1").kind(), FaultKind::NotFound);
        assert_eq!(
            FaultError::resource_exhausted("too many", 100).kind(),
            FaultKind::ResourceExhausted
        );
        assert_matches!(
            FaultError::poisoned("dictionary registry"),
            FaultError::InvalidState { .. }
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            FaultError::not_found("Error code", "VAL001").to_string(),
            "Error code 'VAL001' not found"
        );
        assert_eq!(
            FaultError::already_registered("AppError", "formatters").to_string(),
            "'formatters' is already registered on AppError"
        );
        assert_eq!(FaultKind::InvalidState.to_string(), "invalid_state");
    }
}
