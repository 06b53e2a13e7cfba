//! Construction macros

// ============================================================================
// RECORD CONSTRUCTION
// ============================================================================

/// Build an `ErrorRecord` from a message and up to three positional arguments
///
/// Each argument goes through `ErrorArg::from`, so text, JSON values,
/// metadata maps and records can be mixed freely. Native errors must be
/// wrapped with `ErrorArg::error`.
///
/// ```rust
/// use fault_core::{record, ErrorArg};
/// use serde_json::json;
///
/// let cause = std::io::Error::new(std::io::ErrorKind::Other, "broken pipe");
/// let error = record!("upload failed", "UP01", json!({"bytes": 512}), ErrorArg::error(cause)).unwrap();
/// assert_eq!(error.code(), Some("UP01"));
/// assert_eq!(error.cause().unwrap().message(), "broken pipe");
/// ```
#[macro_export]
macro_rules! record {
    (class = $class:expr, $message:expr) => {
        $crate::ErrorRecord::construct($class, $message, ::std::vec::Vec::new())
    };

    (class = $class:expr, $message:expr, $($arg:expr),+ $(,)?) => {
        $crate::ErrorRecord::construct(
            $class,
            $message,
            ::std::vec![$($crate::ErrorArg::from($arg)),+],
        )
    };

    ($message:expr) => {
        $crate::ErrorRecord::construct(&$crate::class::BASE, $message, ::std::vec::Vec::new())
    };

    ($message:expr, $($arg:expr),+ $(,)?) => {
        $crate::ErrorRecord::construct(
            &$crate::class::BASE,
            $message,
            ::std::vec![$($crate::ErrorArg::from($arg)),+],
        )
    };
}

/// Build a catalog-driven `ErrorRecord` for a class and code
#[macro_export]
macro_rules! coded {
    ($class:expr, $code:expr) => {
        $crate::ErrorRecord::from_code($class, $code, ::std::vec::Vec::new())
    };

    ($class:expr, $code:expr, $($arg:expr),+ $(,)?) => {
        $crate::ErrorRecord::from_code(
            $class,
            $code,
            ::std::vec![$($crate::ErrorArg::from($arg)),+],
        )
    };
}

#[cfg(test)]
mod tests {
    use crate::catalog::{CatalogEntry, Dictionary};
    use crate::class::{ErrorClass, BASE, WARNING};
    use crate::{ErrorArg, FaultError, Severity};
    use assert_matches::assert_matches;
    use serde_json::json;

    static MACRO_CODES: ErrorClass = ErrorClass::derive("MacroTestCodedError", &BASE);

    #[test]
    fn test_record_macro_forms() {
        let bare = record!("plain").unwrap();
        assert_eq!(bare.message(), "plain");

        let classed = record!(class = &WARNING, "slow", "W1").unwrap();
        assert_eq!(classed.severity(), Severity::Warning);
        assert_eq!(classed.code(), Some("W1"));

        let io = std::io::Error::new(std::io::ErrorKind::Other, "eof");
        let full = record!("read", json!({"offset": 9}), ErrorArg::error(io)).unwrap();
        assert_eq!(full.metadata().unwrap()["offset"], json!(9));
        assert_eq!(full.cause().unwrap().message(), "eof");

        assert_matches!(record!(""), Err(FaultError::InvalidArgument { .. }));
    }

    #[test]
    fn test_coded_macro() {
        let mut dictionary = Dictionary::new();
        dictionary.insert(
            "Q1".to_string(),
            CatalogEntry::new("Queue {{ queue }} is full").with_severity(Severity::Warning),
        );
        MACRO_CODES.register_dictionary(dictionary).unwrap();

        let error = coded!(&MACRO_CODES, "Q1", json!({"queue": "jobs"})).unwrap();
        assert_eq!(error.message(), "Queue jobs is full");
        assert_eq!(error.severity(), Severity::Warning);
    }
}
