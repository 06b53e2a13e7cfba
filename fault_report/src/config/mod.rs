//! Reporting configuration
//!
//! Compile-time limits live in [`constants`]; user preferences in
//! [`runtime::ReportPreferences`] come from `FAULT_*` environment variables,
//! a TOML document, or an explicit value installed once per process.

pub mod constants;
pub mod runtime;

pub use constants::compile_time;
pub use runtime::{env_vars, ReportPreferences};

use crate::error::{ReportError, ReportResult};
use compile_time::formatting::MAX_JSON_INDENT;
use std::path::Path;
use std::sync::OnceLock;

// ============================================================================
// RUNTIME PREFERENCES STORAGE
// ============================================================================

static RUNTIME_PREFERENCES: OnceLock<ReportPreferences> = OnceLock::new();

/// Install process-wide preferences; only the first call succeeds
pub fn init_preferences(preferences: ReportPreferences) -> ReportResult<()> {
    validate_preferences(&preferences)?;

    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| ReportError::AlreadyInitialized)
}

/// Installed preferences, or environment defaults when none were installed
pub fn preferences() -> ReportPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

/// Check preferences against compile-time limits
pub fn validate_preferences(preferences: &ReportPreferences) -> ReportResult<()> {
    if preferences.json_indent > MAX_JSON_INDENT {
        return Err(ReportError::invalid_config(&format!(
            "json_indent {} exceeds maximum {}",
            preferences.json_indent, MAX_JSON_INDENT
        )));
    }
    Ok(())
}

// ============================================================================
// LOADING
// ============================================================================

/// Parse preferences from TOML; missing keys fall back to defaults
pub fn from_toml_str(text: &str) -> ReportResult<ReportPreferences> {
    let preferences: ReportPreferences = toml::from_str(text)?;
    validate_preferences(&preferences)?;
    Ok(preferences)
}

/// Read and parse a TOML preferences file
pub fn load_preferences<P: AsRef<Path>>(path: P) -> ReportResult<ReportPreferences> {
    let text = std::fs::read_to_string(path)?;
    from_toml_str(&text)
}

/// Human-readable dump for diagnostics
pub fn get_config_summary(preferences: &ReportPreferences) -> String {
    format!(
        "Reporting Configuration:\n\
         - Min severity: {}\n\
         - Structured logging: {}\n\
         - Colors: {}\n\
         - Show metadata: {}\n\
         - Show timestamp: {}\n\
         - JSON indent: {}",
        preferences.min_severity,
        preferences.use_structured_logging,
        preferences.enable_colors,
        preferences.show_metadata,
        preferences.show_timestamp,
        preferences.json_indent,
    )
}
