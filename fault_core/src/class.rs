//! Error classes
//!
//! An [`ErrorClass`] is a static descriptor standing in for an error
//! subtype. Classes form a single-parent hierarchy rooted at [`BASE`];
//! capability groups and catalog dictionaries attached to a class are
//! inherited by every class deriving from it.
//!
//! ```rust
//! use fault_core::class::{ErrorClass, BASE};
//!
//! static VALIDATION: ErrorClass = ErrorClass::derive("ValidationError", &BASE);
//!
//! let names: Vec<&str> = VALIDATION.lineage().map(|c| c.name()).collect();
//! assert_eq!(names, vec!["ValidationError", "HandlerError"]);
//! ```
//!
//! Registries identify a class by the address of its static, so two
//! classes sharing a name stay independent. The name is only for display.

use crate::severity::Severity;

/// Static descriptor of an error subtype
#[derive(Debug)]
pub struct ErrorClass {
    name: &'static str,
    parent: Option<&'static ErrorClass>,
    severity: Option<Severity>,
}

/// Root of every class hierarchy
pub static BASE: ErrorClass = ErrorClass::root("HandlerError");

pub static CRITICAL: ErrorClass =
    ErrorClass::with_severity("CriticalHandlerError", &BASE, Severity::Critical);
pub static ERROR: ErrorClass =
    ErrorClass::with_severity("ErrorHandlerError", &BASE, Severity::Error);
pub static WARNING: ErrorClass =
    ErrorClass::with_severity("WarningHandlerError", &BASE, Severity::Warning);
pub static INFO: ErrorClass = ErrorClass::with_severity("InfoHandlerError", &BASE, Severity::Info);
pub static DEBUG: ErrorClass =
    ErrorClass::with_severity("DebugHandlerError", &BASE, Severity::Debug);

impl ErrorClass {
    /// A class with no parent
    pub const fn root(name: &'static str) -> Self {
        Self {
            name,
            parent: None,
            severity: None,
        }
    }

    /// A subclass inheriting everything from `parent`
    pub const fn derive(name: &'static str, parent: &'static ErrorClass) -> Self {
        Self {
            name,
            parent: Some(parent),
            severity: None,
        }
    }

    /// A subclass with its own default severity
    pub const fn with_severity(
        name: &'static str,
        parent: &'static ErrorClass,
        severity: Severity,
    ) -> Self {
        Self {
            name,
            parent: Some(parent),
            severity: Some(severity),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parent(&self) -> Option<&'static ErrorClass> {
        self.parent
    }

    /// Nearest default severity along the lineage
    pub fn default_severity(&'static self) -> Option<Severity> {
        self.lineage().find_map(|class| class.severity)
    }

    /// This class followed by each ancestor up to the root
    pub fn lineage(&'static self) -> Lineage {
        Lineage { next: Some(self) }
    }

    /// True when `ancestor` appears in this class's lineage
    pub fn is_a(&'static self, ancestor: &ErrorClass) -> bool {
        self.lineage().any(|class| std::ptr::eq(class, ancestor))
    }

    /// Identity of this class in the registries
    pub(crate) fn key(&'static self) -> ClassKey {
        ClassKey(self as *const ErrorClass as usize)
    }
}

/// Address of a static [`ErrorClass`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ClassKey(usize);

impl PartialEq for ErrorClass {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for ErrorClass {}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Iterator over a class and its ancestors
#[derive(Debug, Clone)]
pub struct Lineage {
    next: Option<&'static ErrorClass>,
}

impl Iterator for Lineage {
    type Item = &'static ErrorClass;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent;
        Some(current)
    }
}
