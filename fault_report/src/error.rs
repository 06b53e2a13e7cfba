//! Error types for reporting configuration and output

use fault_core::FaultError;

/// Result type for fault_report operations
pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Invalid reporting configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Reporting preferences already initialized")]
    AlreadyInitialized,

    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Fault(#[from] FaultError),
}

impl ReportError {
    /// Create an invalid configuration error
    pub fn invalid_config(reason: &str) -> Self {
        Self::InvalidConfig {
            reason: reason.to_string(),
        }
    }
}
