//! Formatters and loggers as record capabilities
//!
//! [`register_defaults`] attaches a `"formatters"` group (text, ansi, html,
//! json) and a `"loggers"` group (console, structured, facade) to a class.
//! Every record of that class, or of a class deriving from it, can then
//! render or log itself:
//!
//! ```rust
//! use fault_core::class::{ErrorClass, BASE};
//! use fault_core::ErrorRecord;
//! use fault_report::install::{register_defaults, FormatterFeature, FORMATTERS};
//! use fault_report::ReportPreferences;
//!
//! static API: ErrorClass = ErrorClass::derive("ApiError", &BASE);
//! register_defaults(&API, &ReportPreferences::production()).unwrap();
//!
//! let error = ErrorRecord::builder("rate limited").class(&API).build().unwrap();
//! let json = error.feature::<FormatterFeature>(FORMATTERS, "json").unwrap();
//! assert!(json.format().unwrap().contains("\"name\":\"ApiError\""));
//! ```

use crate::config::ReportPreferences;
use crate::formatters::{AnsiFormatter, Formatter, HtmlFormatter, JsonFormatter, TextFormatter};
use crate::logging::{ConsoleLogger, ErrorLogger, LogFacadeLogger, StructuredLogger};
use fault_core::capability::FeatureGroup;
use fault_core::class::ErrorClass;
use fault_core::{ErrorRecord, FaultError, FaultResult, WeakErrorRecord};
use std::sync::Arc;

/// Capability group holding the formatters
pub const FORMATTERS: &str = "formatters";

/// Capability group holding the loggers
pub const LOGGERS: &str = "loggers";

/// A formatter bound to one record
pub struct FormatterFeature {
    error: WeakErrorRecord,
    formatter: Arc<dyn Formatter>,
}

impl FormatterFeature {
    pub fn new(error: &ErrorRecord, formatter: Arc<dyn Formatter>) -> Self {
        Self {
            error: error.downgrade(),
            formatter,
        }
    }

    pub fn format(&self) -> FaultResult<String> {
        Ok(self.formatter.format(&self.record()?))
    }

    pub fn format_chain(&self) -> FaultResult<String> {
        Ok(self.formatter.format_chain(&self.record()?))
    }

    fn record(&self) -> FaultResult<ErrorRecord> {
        self.error
            .upgrade()
            .ok_or_else(|| FaultError::invalid_state("error record was dropped"))
    }
}

/// A logger bound to one record
pub struct LoggerFeature {
    error: WeakErrorRecord,
    logger: Arc<dyn ErrorLogger>,
}

impl LoggerFeature {
    pub fn new(error: &ErrorRecord, logger: Arc<dyn ErrorLogger>) -> Self {
        Self {
            error: error.downgrade(),
            logger,
        }
    }

    pub fn log(&self) -> FaultResult<()> {
        self.logger.log(&self.record()?);
        Ok(())
    }

    pub fn log_chain(&self) -> FaultResult<()> {
        self.logger.log_chain(&self.record()?);
        Ok(())
    }

    fn record(&self) -> FaultResult<ErrorRecord> {
        self.error
            .upgrade()
            .ok_or_else(|| FaultError::invalid_state("error record was dropped"))
    }
}

fn formatter_entry(group: FeatureGroup, key: &str, formatter: Arc<dyn Formatter>) -> FeatureGroup {
    group.with(key, move |error: &ErrorRecord| {
        FormatterFeature::new(error, Arc::clone(&formatter))
    })
}

fn logger_entry(group: FeatureGroup, key: &str, logger: Arc<dyn ErrorLogger>) -> FeatureGroup {
    group.with(key, move |error: &ErrorRecord| {
        LoggerFeature::new(error, Arc::clone(&logger))
    })
}

/// Formatters configured from `preferences`
pub fn formatter_group(preferences: &ReportPreferences) -> FeatureGroup {
    let group = FeatureGroup::new();
    let group = formatter_entry(
        group,
        "text",
        Arc::new(TextFormatter::from_preferences(preferences)),
    );
    let group = formatter_entry(
        group,
        "ansi",
        Arc::new(AnsiFormatter::from_preferences(preferences)),
    );
    let group = formatter_entry(
        group,
        "html",
        Arc::new(HtmlFormatter::from_preferences(preferences)),
    );
    formatter_entry(
        group,
        "json",
        Arc::new(JsonFormatter::from_preferences(preferences)),
    )
}

/// Loggers gated at the preferred minimum severity
pub fn logger_group(preferences: &ReportPreferences) -> FeatureGroup {
    let min_severity = preferences.min_severity;
    let text: Arc<dyn Formatter> = Arc::new(TextFormatter::from_preferences(preferences));

    let group = FeatureGroup::new();
    let group = logger_entry(
        group,
        "console",
        Arc::new(ConsoleLogger::with_formatter(min_severity, Arc::clone(&text))),
    );
    let group = logger_entry(
        group,
        "structured",
        Arc::new(StructuredLogger::new(min_severity)),
    );
    logger_entry(
        group,
        "facade",
        Arc::new(LogFacadeLogger::new(min_severity).with_formatter(text)),
    )
}

pub fn register_formatters(
    class: &'static ErrorClass,
    preferences: &ReportPreferences,
) -> FaultResult<&'static ErrorClass> {
    class.register_group(FORMATTERS, formatter_group(preferences))
}

pub fn register_loggers(
    class: &'static ErrorClass,
    preferences: &ReportPreferences,
) -> FaultResult<&'static ErrorClass> {
    class.register_group(LOGGERS, logger_group(preferences))
}

/// Both groups at once
pub fn register_defaults(
    class: &'static ErrorClass,
    preferences: &ReportPreferences,
) -> FaultResult<&'static ErrorClass> {
    register_formatters(class, preferences)?;
    register_loggers(class, preferences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemoryLogger;
    use assert_matches::assert_matches;
    use fault_core::class::BASE;
    use fault_core::Severity;

    static INSTALLED: ErrorClass = ErrorClass::derive("InstallTestError", &BASE);
    static INSTALLED_CHILD: ErrorClass = ErrorClass::derive("InstallTestChildError", &INSTALLED);
    static TWICE: ErrorClass = ErrorClass::derive("InstallTestTwiceError", &BASE);
    static CUSTOM: ErrorClass = ErrorClass::derive("InstallTestCustomError", &BASE);

    fn quiet() -> ReportPreferences {
        ReportPreferences {
            min_severity: Severity::Critical,
            use_structured_logging: false,
            enable_colors: false,
            show_metadata: false,
            show_timestamp: false,
            json_indent: 0,
        }
    }

    #[test]
    fn test_formatters_are_inherited_and_memoized() {
        register_defaults(&INSTALLED, &quiet()).unwrap();

        let error = ErrorRecord::builder("boom")
            .class(&INSTALLED_CHILD)
            .build()
            .unwrap();
        let names = error.capability_names();
        assert_eq!(names, vec![FORMATTERS, LOGGERS]);

        let text = error.feature::<FormatterFeature>(FORMATTERS, "text").unwrap();
        assert_eq!(text.format().unwrap(), "InstallTestChildError: boom");
        let again = error.feature::<FormatterFeature>(FORMATTERS, "text").unwrap();
        assert!(Arc::ptr_eq(&text, &again));

        let json = error.feature::<FormatterFeature>(FORMATTERS, "json").unwrap();
        assert_eq!(
            json.format().unwrap(),
            r#"{"message":"boom","name":"InstallTestChildError","severity":"error"}"#
        );

        let keys: Vec<&str> = error.capability(FORMATTERS).unwrap().keys().collect();
        assert_eq!(keys, vec!["ansi", "html", "json", "text"]);
    }

    #[test]
    fn test_feature_outliving_record() {
        register_formatters(&TWICE, &quiet()).unwrap();
        assert_matches!(
            register_formatters(&TWICE, &quiet()),
            Err(FaultError::AlreadyRegistered { .. })
        );

        let error = ErrorRecord::builder("gone").class(&TWICE).build().unwrap();
        let feature = error.feature::<FormatterFeature>(FORMATTERS, "html").unwrap();
        drop(error);
        assert_matches!(feature.format(), Err(FaultError::InvalidState { .. }));
    }

    #[test]
    fn test_custom_logger_group() {
        let memory = Arc::new(MemoryLogger::new(Severity::Debug));
        let group = logger_entry(FeatureGroup::new(), "memory", memory.clone());
        CUSTOM.register_group(LOGGERS, group).unwrap();

        let root = ErrorRecord::builder("root").build().unwrap();
        let error = ErrorRecord::builder("top")
            .class(&CUSTOM)
            .cause(root)
            .build()
            .unwrap();
        let logger = error.feature::<LoggerFeature>(LOGGERS, "memory").unwrap();
        logger.log().unwrap();
        logger.log_chain().unwrap();

        let entries = memory.get_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].rendered, "[ERROR] InstallTestCustomError: top");
        assert!(entries[1].rendered.ends_with("\n[ERROR] HandlerError: root"));
    }
}
