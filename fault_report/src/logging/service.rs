//! Logging service and loggers for error records

use crate::config::{self, ReportPreferences};
use crate::config::compile_time::logging::FACADE_TARGET;
use crate::formatters::{Formatter, JsonFormatter, TextFormatter};
use fault_core::chain::{chain_to_string, most_severe};
use fault_core::{ErrorRecord, Severity};
use std::sync::Arc;

/// Sink for error records, gated by a minimum severity
pub trait ErrorLogger: Send + Sync {
    /// Records below this severity produce no output
    fn min_severity(&self) -> Severity;

    /// Write an already rendered record or chain
    fn emit(&self, error: &ErrorRecord, rendered: &str);

    /// Formatter used for rendering; `Display` when absent
    fn formatter(&self) -> Option<&dyn Formatter> {
        None
    }

    fn should_log(&self, error: &ErrorRecord) -> bool {
        error.severity().at_least(self.min_severity())
    }

    fn log(&self, error: &ErrorRecord) {
        if self.should_log(error) {
            let rendered = match self.formatter() {
                Some(formatter) => formatter.format(error),
                None => error.to_string(),
            };
            self.emit(error, &rendered);
        }
    }

    /// Log the whole chain as one entry, gated on the head's severity
    fn log_chain(&self, error: &ErrorRecord) {
        if self.should_log(error) {
            let rendered = match self.formatter() {
                Some(formatter) => formatter.format_chain(error),
                None => chain_to_string(error),
            };
            self.emit(error, &rendered);
        }
    }
}

/// Main logging service with configuration awareness
pub struct LoggingService {
    logger: Arc<dyn ErrorLogger>,
    min_severity: Severity,
}

impl LoggingService {
    /// Create new logging service with specified logger and minimum severity
    pub fn new(logger: Arc<dyn ErrorLogger>, min_severity: Severity) -> Self {
        Self {
            logger,
            min_severity,
        }
    }

    /// Create service from the process-wide preferences
    pub fn with_config() -> Self {
        Self::from_preferences(&config::preferences())
    }

    pub fn from_preferences(preferences: &ReportPreferences) -> Self {
        let min_severity = preferences.min_severity;
        let logger: Arc<dyn ErrorLogger> = if preferences.use_structured_logging {
            Arc::new(StructuredLogger::new(min_severity))
        } else {
            Arc::new(ConsoleLogger::with_formatter(
                min_severity,
                Arc::new(TextFormatter::from_preferences(preferences)),
            ))
        };

        Self::new(logger, min_severity)
    }

    pub fn set_min_severity(&mut self, severity: Severity) {
        self.min_severity = severity;
    }

    pub fn min_severity(&self) -> Severity {
        self.min_severity
    }

    pub fn should_log(&self, severity: Severity) -> bool {
        severity.at_least(self.min_severity)
    }

    pub fn log(&self, error: &ErrorRecord) {
        if self.should_log(error.severity()) {
            self.logger.log(error);
        }
    }

    pub fn log_chain(&self, error: &ErrorRecord) {
        if self.should_log(error.severity()) {
            self.logger.log_chain(error);
        }
    }

    /// Log only the most severe record of the chain
    pub fn log_most_severe(&self, error: &ErrorRecord) {
        self.log(&most_severe(error));
    }
}

// ============================================================================
// LOGGERS
// ============================================================================

/// Critical and error records to stderr, the rest to stdout
pub struct ConsoleLogger {
    min_severity: Severity,
    formatter: Option<Arc<dyn Formatter>>,
}

impl ConsoleLogger {
    pub fn new(min_severity: Severity) -> Self {
        Self {
            min_severity,
            formatter: None,
        }
    }

    pub fn with_formatter(min_severity: Severity, formatter: Arc<dyn Formatter>) -> Self {
        Self {
            min_severity,
            formatter: Some(formatter),
        }
    }
}

impl ErrorLogger for ConsoleLogger {
    fn min_severity(&self) -> Severity {
        self.min_severity
    }

    fn formatter(&self) -> Option<&dyn Formatter> {
        self.formatter.as_deref()
    }

    fn emit(&self, error: &ErrorRecord, rendered: &str) {
        match error.severity() {
            Severity::Critical | Severity::Error => eprintln!("{}", rendered),
            _ => println!("{}", rendered),
        }
    }
}

/// Structured logger for JSON output and better tooling integration
pub struct StructuredLogger {
    min_severity: Severity,
    formatter: JsonFormatter,
}

impl StructuredLogger {
    pub fn new(min_severity: Severity) -> Self {
        Self {
            min_severity,
            formatter: JsonFormatter::compact(),
        }
    }
}

impl ErrorLogger for StructuredLogger {
    fn min_severity(&self) -> Severity {
        self.min_severity
    }

    fn formatter(&self) -> Option<&dyn Formatter> {
        Some(&self.formatter)
    }

    fn emit(&self, error: &ErrorRecord, rendered: &str) {
        match error.severity() {
            Severity::Critical | Severity::Error => eprintln!("{}", rendered),
            _ => println!("{}", rendered),
        }
    }
}

/// Forwards records to the `log` crate
pub struct LogFacadeLogger {
    min_severity: Severity,
    formatter: Option<Arc<dyn Formatter>>,
    target: String,
}

impl LogFacadeLogger {
    pub fn new(min_severity: Severity) -> Self {
        Self {
            min_severity,
            formatter: None,
            target: FACADE_TARGET.to_string(),
        }
    }

    pub fn with_target(mut self, target: &str) -> Self {
        self.target = target.to_string();
        self
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

/// `log` level for a severity; critical has no own level
pub fn log_level(severity: Severity) -> log::Level {
    match severity {
        Severity::Critical | Severity::Error => log::Level::Error,
        Severity::Warning => log::Level::Warn,
        Severity::Info => log::Level::Info,
        Severity::Debug => log::Level::Debug,
    }
}

impl ErrorLogger for LogFacadeLogger {
    fn min_severity(&self) -> Severity {
        self.min_severity
    }

    fn formatter(&self) -> Option<&dyn Formatter> {
        self.formatter.as_deref()
    }

    fn emit(&self, error: &ErrorRecord, rendered: &str) {
        log::log!(target: self.target.as_str(), log_level(error.severity()), "{}", rendered);
    }
}

/// Fans every record out to several loggers, each applying its own gate
pub struct MultiLogger {
    loggers: Vec<Arc<dyn ErrorLogger>>,
}

impl MultiLogger {
    pub fn new() -> Self {
        Self {
            loggers: Vec::new(),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.loggers.push(logger);
        self
    }

    pub fn with_console(self, min_severity: Severity) -> Self {
        self.with_logger(Arc::new(ConsoleLogger::new(min_severity)))
    }

    pub fn with_structured(self, min_severity: Severity) -> Self {
        self.with_logger(Arc::new(StructuredLogger::new(min_severity)))
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

impl Default for MultiLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorLogger for MultiLogger {
    /// Most permissive threshold among the children
    fn min_severity(&self) -> Severity {
        self.loggers
            .iter()
            .map(|logger| logger.min_severity())
            .min()
            .unwrap_or(Severity::Critical)
    }

    fn emit(&self, error: &ErrorRecord, rendered: &str) {
        for logger in self.loggers.iter().filter(|logger| logger.should_log(error)) {
            logger.emit(error, rendered);
        }
    }

    fn log(&self, error: &ErrorRecord) {
        for logger in &self.loggers {
            logger.log(error);
        }
    }

    fn log_chain(&self, error: &ErrorRecord) {
        for logger in &self.loggers {
            logger.log_chain(error);
        }
    }
}

// ============================================================================
// FACTORIES
// ============================================================================

/// Service built from the process-wide preferences
pub fn create_configured_service() -> LoggingService {
    LoggingService::with_config()
}

/// Console logger showing everything
pub fn create_dev_logger() -> LoggingService {
    LoggingService::from_preferences(&ReportPreferences::development())
}

/// JSON lines from warning up
pub fn create_prod_logger() -> LoggingService {
    LoggingService::from_preferences(&ReportPreferences::production())
}

/// Memory logger capturing everything, returned alongside its service
pub fn create_test_logger() -> (LoggingService, Arc<super::MemoryLogger>) {
    let memory = Arc::new(super::MemoryLogger::new(Severity::Debug));
    let service = LoggingService::new(memory.clone(), Severity::Debug);
    (service, memory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemoryLogger;

    fn record(message: &str, severity: Severity) -> ErrorRecord {
        ErrorRecord::builder(message).severity(severity).build().unwrap()
    }

    #[test]
    fn test_threshold_gates_output() {
        let memory = MemoryLogger::new(Severity::Warning);
        memory.log(&record("debug", Severity::Debug));
        memory.log(&record("info", Severity::Info));
        memory.log(&record("warning", Severity::Warning));
        memory.log(&record("critical", Severity::Critical));
        assert_eq!(memory.count(), 2);
        assert_eq!(memory.get_entries()[0].rendered, "[WARNING] HandlerError: warning");
    }

    #[test]
    fn test_service_threshold_applies_before_logger() {
        let memory = Arc::new(MemoryLogger::new(Severity::Debug));
        let mut service = LoggingService::new(memory.clone(), Severity::Error);
        service.log(&record("warning", Severity::Warning));
        assert_eq!(memory.count(), 0);

        service.set_min_severity(Severity::Warning);
        service.log(&record("warning", Severity::Warning));
        assert_eq!(memory.count(), 1);
        assert!(service.should_log(Severity::Critical));
    }

    #[test]
    fn test_log_chain_is_one_entry() {
        let (service, memory) = create_test_logger();
        let root = record("root", Severity::Error);
        let top = ErrorRecord::builder("top")
            .severity(Severity::Info)
            .cause(root)
            .build()
            .unwrap();
        service.log_chain(&top);
        let entries = memory.get_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].rendered,
            "[INFO] HandlerError: top\n[ERROR] HandlerError: root"
        );
    }

    #[test]
    fn test_log_most_severe() {
        let (service, memory) = create_test_logger();
        let critical = record("db down", Severity::Critical);
        let top = ErrorRecord::builder("request failed")
            .severity(Severity::Warning)
            .cause(critical.clone())
            .build()
            .unwrap();
        service.log_most_severe(&top);
        assert_eq!(memory.get_entries()[0].id, critical.id());
    }

    #[test]
    fn test_formatter_is_used() {
        let memory = MemoryLogger::new(Severity::Debug)
            .with_formatter(Arc::new(JsonFormatter::compact()));
        memory.log(&record("json please", Severity::Info));
        let rendered = &memory.get_entries()[0].rendered;
        assert!(rendered.starts_with('{'));
        assert!(rendered.contains("\"message\":\"json please\""));
    }

    #[test]
    fn test_multi_logger_fans_out() {
        let strict = Arc::new(MemoryLogger::new(Severity::Error));
        let lenient = Arc::new(MemoryLogger::new(Severity::Debug));
        let multi = MultiLogger::new()
            .with_logger(strict.clone())
            .with_logger(lenient.clone());
        assert_eq!(multi.min_severity(), Severity::Debug);

        multi.log(&record("info", Severity::Info));
        multi.log(&record("error", Severity::Error));
        assert_eq!(strict.count(), 1);
        assert_eq!(lenient.count(), 2);
        assert_eq!(MultiLogger::default().min_severity(), Severity::Critical);
    }

    #[test]
    fn test_multi_logger_emit_respects_child_thresholds() {
        let strict = Arc::new(MemoryLogger::new(Severity::Error));
        let lenient = Arc::new(MemoryLogger::new(Severity::Debug));
        let multi = MultiLogger::new()
            .with_logger(strict.clone())
            .with_logger(lenient.clone());

        let warning = record("pre-rendered", Severity::Warning);
        multi.emit(&warning, "rendered elsewhere");
        assert_eq!(strict.count(), 0);
        assert_eq!(lenient.count(), 1);
        assert_eq!(lenient.get_entries()[0].rendered, "rendered elsewhere");

        multi.emit(&record("bad", Severity::Critical), "critical line");
        assert_eq!(strict.count(), 1);
        assert_eq!(lenient.count(), 2);
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(log_level(Severity::Critical), log::Level::Error);
        assert_eq!(log_level(Severity::Warning), log::Level::Warn);
        assert_eq!(log_level(Severity::Debug), log::Level::Debug);
        let facade = LogFacadeLogger::new(Severity::Info).with_target("app::errors");
        assert_eq!(facade.target(), "app::errors");
        facade.log(&record("forwarded", Severity::Error));
    }

    #[test]
    fn test_service_from_preferences() {
        let service = LoggingService::from_preferences(&ReportPreferences::production());
        assert_eq!(service.min_severity(), Severity::Warning);
        assert!(!service.should_log(Severity::Info));
    }
}
