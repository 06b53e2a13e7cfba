// RUNTIME PREFERENCES (User Experience)

use super::constants::compile_time::formatting::DEFAULT_JSON_INDENT;
use fault_core::Severity;
use serde::{Deserialize, Serialize};
use std::env;

/// Environment variables read by [`ReportPreferences::default`]
pub mod env_vars {
    pub const MIN_SEVERITY: &str = "FAULT_MIN_SEVERITY";
    pub const STRUCTURED_LOGGING: &str = "FAULT_STRUCTURED_LOGGING";
    pub const COLORS: &str = "FAULT_COLORS";
    pub const SHOW_METADATA: &str = "FAULT_SHOW_METADATA";
    pub const SHOW_TIMESTAMP: &str = "FAULT_SHOW_TIMESTAMP";
    pub const JSON_INDENT: &str = "FAULT_JSON_INDENT";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportPreferences {
    /// Records below this severity are not logged
    pub min_severity: Severity,

    /// Whether configured loggers emit JSON lines
    pub use_structured_logging: bool,

    /// Whether the ANSI formatter emits escape codes
    pub enable_colors: bool,

    /// Whether formatters include metadata
    pub show_metadata: bool,

    /// Whether formatters include timestamps
    pub show_timestamp: bool,

    /// Indent width for the JSON formatter; 0 renders a single line
    pub json_indent: usize,
}

impl Default for ReportPreferences {
    fn default() -> Self {
        Self {
            min_severity: env::var(env_vars::MIN_SEVERITY)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(Severity::Info),
            use_structured_logging: env::var(env_vars::STRUCTURED_LOGGING)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_colors: env::var(env_vars::COLORS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            show_metadata: env::var(env_vars::SHOW_METADATA)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            show_timestamp: env::var(env_vars::SHOW_TIMESTAMP)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            json_indent: env::var(env_vars::JSON_INDENT)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_JSON_INDENT),
        }
    }
}

impl ReportPreferences {
    /// Verbose, colored output for local work
    pub fn development() -> Self {
        Self {
            min_severity: Severity::Debug,
            use_structured_logging: false,
            enable_colors: true,
            show_metadata: true,
            show_timestamp: true,
            json_indent: DEFAULT_JSON_INDENT,
        }
    }

    /// Compact JSON lines for log shippers
    pub fn production() -> Self {
        Self {
            min_severity: Severity::Warning,
            use_structured_logging: true,
            enable_colors: false,
            show_metadata: true,
            show_timestamp: true,
            json_indent: 0,
        }
    }
}
