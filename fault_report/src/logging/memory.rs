//! In-memory logger for tests and diagnostics

use super::service::ErrorLogger;
use crate::config::compile_time::logging::MEMORY_LOG_CAPACITY;
use crate::formatters::Formatter;
use chrono::{DateTime, Utc};
use fault_core::{ErrorRecord, Severity};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// One captured log entry
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedEntry {
    pub id: Uuid,
    pub name: String,
    pub severity: Severity,
    pub code: Option<String>,
    pub rendered: String,
    pub logged_at: DateTime<Utc>,
}

/// Keeps the most recent entries, dropping the oldest beyond its capacity
pub struct MemoryLogger {
    min_severity: Severity,
    capacity: usize,
    formatter: Option<Arc<dyn Formatter>>,
    entries: Mutex<Vec<LoggedEntry>>,
}

impl MemoryLogger {
    pub fn new(min_severity: Severity) -> Self {
        Self {
            min_severity,
            capacity: MEMORY_LOG_CAPACITY,
            formatter: None,
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LoggedEntry>> {
        // A panic while holding the lock leaves the vector intact
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get_entries(&self) -> Vec<LoggedEntry> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }

    pub fn get_entries_with_code(&self, code: &str) -> Vec<LoggedEntry> {
        self.lock()
            .iter()
            .filter(|e| e.code.as_deref() == Some(code))
            .cloned()
            .collect()
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.lock().iter().any(|e| e.code.as_deref() == Some(code))
    }

    pub fn get_entries_at_least(&self, severity: Severity) -> Vec<LoggedEntry> {
        self.lock()
            .iter()
            .filter(|e| e.severity.at_least(severity))
            .cloned()
            .collect()
    }

    pub fn get_summary(&self) -> LogSummary {
        let entries = self.lock();
        let count = |severity: Severity| entries.iter().filter(|e| e.severity == severity).count();

        LogSummary {
            total_count: entries.len(),
            critical_count: count(Severity::Critical),
            error_count: count(Severity::Error),
            warning_count: count(Severity::Warning),
            info_count: count(Severity::Info),
            debug_count: count(Severity::Debug),
        }
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new(Severity::Debug)
    }
}

impl ErrorLogger for MemoryLogger {
    fn min_severity(&self) -> Severity {
        self.min_severity
    }

    fn formatter(&self) -> Option<&dyn Formatter> {
        self.formatter.as_deref()
    }

    fn emit(&self, error: &ErrorRecord, rendered: &str) {
        let mut entries = self.lock();

        if entries.len() >= self.capacity {
            let remove_count = entries.len() - self.capacity + 1;
            entries.drain(0..remove_count);
        }

        entries.push(LoggedEntry {
            id: error.id(),
            name: error.name().to_string(),
            severity: error.severity(),
            code: error.code().map(str::to_string),
            rendered: rendered.to_string(),
            logged_at: Utc::now(),
        });
    }
}

/// Counts of captured entries by severity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSummary {
    pub total_count: usize,
    pub critical_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub debug_count: usize,
}

impl LogSummary {
    pub fn has_errors(&self) -> bool {
        self.error_count > 0 || self.critical_count > 0
    }

    pub fn has_critical_errors(&self) -> bool {
        self.critical_count > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warning_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coded(message: &str, code: &str, severity: Severity) -> ErrorRecord {
        ErrorRecord::builder(message)
            .code(code)
            .severity(severity)
            .build()
            .unwrap()
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let memory = MemoryLogger::default().with_capacity(2);
        for i in 0..3 {
            memory.log(&coded(&format!("m{}", i), &format!("C{}", i), Severity::Error));
        }
        let codes: Vec<Option<String>> = memory.get_entries().into_iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![Some("C1".to_string()), Some("C2".to_string())]);
    }

    #[test]
    fn test_queries_and_summary() {
        let memory = MemoryLogger::default();
        memory.log(&coded("a", "DB1", Severity::Critical));
        memory.log(&coded("b", "DB1", Severity::Warning));
        memory.log(&coded("c", "NET", Severity::Info));

        assert!(memory.has_code("NET"));
        assert!(!memory.has_code("NOPE"));
        assert_eq!(memory.get_entries_with_code("DB1").len(), 2);
        assert_eq!(memory.get_entries_at_least(Severity::Warning).len(), 2);

        let summary = memory.get_summary();
        assert_eq!(summary.total_count, 3);
        assert!(summary.has_critical_errors());
        assert!(summary.has_errors());
        assert!(summary.has_warnings());
        assert_eq!(summary.debug_count, 0);

        memory.clear();
        assert_eq!(memory.count(), 0);
        assert!(!memory.get_summary().has_errors());
    }
}
