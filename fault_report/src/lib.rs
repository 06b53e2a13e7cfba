//! # fault_report
//!
//! Rendering and logging for [`fault_core`] records: text, ANSI, HTML and
//! JSON formatters, severity-gated loggers, reporting preferences, and
//! helpers that expose both as record capabilities.

pub mod config;
pub mod error;
pub mod formatters;
pub mod install;
pub mod logging;

// Convenience re-exports
pub use config::ReportPreferences;
pub use error::{ReportError, ReportResult};
pub use formatters::{AnsiFormatter, Formatter, HtmlFormatter, JsonFormatter, TextFormatter};
pub use install::{register_defaults, FormatterFeature, LoggerFeature, FORMATTERS, LOGGERS};
pub use logging::{
    ConsoleLogger, ErrorLogger, LogFacadeLogger, LoggingService, MemoryLogger, MultiLogger,
    StructuredLogger,
};
