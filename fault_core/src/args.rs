//! Positional argument resolution
//!
//! Callers migrating from untyped error constructors pass up to three
//! arguments after the message, each of which may be a code, a metadata
//! object or a cause. [`resolve_arguments`] decides which is which from the
//! shape of each argument; every constructor in the crate goes through it.

use crate::record::{ErrorRecord, Metadata};
use serde_json::Value;
use std::error::Error;

/// One loosely typed constructor argument
#[derive(Debug)]
pub enum ErrorArg {
    Text(String),
    Value(Value),
    Error(Box<dyn Error + Send + Sync + 'static>),
}

impl ErrorArg {
    /// Wrap any error as a cause candidate
    pub fn error<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::Error(Box::new(error))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    fn into_text(self) -> Result<String, Self> {
        match self {
            Self::Text(text) | Self::Value(Value::String(text)) => Ok(text),
            other => Err(other),
        }
    }

    fn into_metadata(self) -> Option<Metadata> {
        match self {
            Self::Value(Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    fn into_cause(self) -> Option<ErrorRecord> {
        match self {
            Self::Error(error) => to_record(error.as_ref()),
            _ => None,
        }
    }
}

impl From<&str> for ErrorArg {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ErrorArg {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for ErrorArg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Metadata> for ErrorArg {
    fn from(metadata: Metadata) -> Self {
        Self::Value(Value::Object(metadata))
    }
}

impl From<ErrorRecord> for ErrorArg {
    fn from(record: ErrorRecord) -> Self {
        Self::Error(Box::new(record))
    }
}

impl From<Box<dyn Error + Send + Sync + 'static>> for ErrorArg {
    fn from(error: Box<dyn Error + Send + Sync + 'static>) -> Self {
        Self::Error(error)
    }
}

/// Fields recovered from positional arguments
#[derive(Debug, Default)]
pub struct ResolvedArguments {
    pub code: Option<String>,
    pub metadata: Option<Metadata>,
    pub cause: Option<ErrorRecord>,
}

/// Classify the arguments following the message
///
/// 1. Text in the first slot is the code. The second slot is then the cause
///    if it is an error, otherwise metadata (when it is an object) with the
///    third slot as a possible cause.
/// 2. An error in the first slot is the cause; later slots are ignored.
/// 3. Anything else in the first slot is metadata (when it is an object) and
///    the second slot is a possible cause.
///
/// Arguments that do not fit their slot are dropped rather than rejected.
pub fn resolve_arguments(
    first: Option<ErrorArg>,
    second: Option<ErrorArg>,
    third: Option<ErrorArg>,
) -> ResolvedArguments {
    let mut resolved = ResolvedArguments::default();
    let Some(first) = first else {
        return resolved;
    };

    match first.into_text() {
        Ok(code) => {
            resolved.code = Some(code).filter(|code| !code.trim().is_empty());
            match second {
                Some(cause @ ErrorArg::Error(_)) => resolved.cause = cause.into_cause(),
                Some(other) => {
                    resolved.metadata = other.into_metadata();
                    resolved.cause = third.and_then(ErrorArg::into_cause);
                }
                None => {}
            }
        }
        Err(cause @ ErrorArg::Error(_)) => resolved.cause = cause.into_cause(),
        Err(other) => {
            resolved.metadata = other.into_metadata();
            resolved.cause = second.and_then(ErrorArg::into_cause);
        }
    }
    resolved
}

/// Whether `error` is an [`ErrorRecord`]
pub fn is_record(error: &(dyn Error + 'static)) -> bool {
    error.downcast_ref::<ErrorRecord>().is_some()
}

/// Normalize any error into a record
///
/// Records pass through unchanged. Other errors are wrapped in a new base
/// record carrying only their message; `None` when that message is empty.
pub fn to_record(error: &(dyn Error + 'static)) -> Option<ErrorRecord> {
    if let Some(record) = error.downcast_ref::<ErrorRecord>() {
        return Some(record.clone());
    }
    ErrorRecord::builder(error.to_string()).build().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{ErrorClass, BASE};
    use crate::Severity;
    use serde_json::json;
    use std::io;

    static PARSE: ErrorClass = ErrorClass::derive("ArgsTestParseError", &BASE);

    fn io_error(message: &str) -> ErrorArg {
        ErrorArg::error(io::Error::new(io::ErrorKind::Other, message.to_string()))
    }

    #[test]
    fn test_code_only() {
        let error = ErrorRecord::construct(&BASE, "msg", vec!["CODE1".into()]).unwrap();
        assert_eq!(error.code(), Some("CODE1"));
        assert!(error.cause().is_none());
        assert!(error.metadata().is_none());
    }

    #[test]
    fn test_metadata_only() {
        let error = ErrorRecord::construct(&BASE, "msg", vec![json!({"a": 1}).into()]).unwrap();
        assert_eq!(error.metadata().unwrap()["a"], json!(1));
        assert!(error.code().is_none());
    }

    #[test]
    fn test_native_cause_is_wrapped() {
        let error = ErrorRecord::construct(&PARSE, "msg", vec![io_error("socket closed")]).unwrap();
        let cause = error.cause().unwrap();
        assert_eq!(cause.message(), "socket closed");
        assert_eq!(cause.name(), "HandlerError");
        assert_eq!(cause.severity(), Severity::Error);
        assert_eq!(error.name(), "ArgsTestParseError");
    }

    #[test]
    fn test_code_metadata_and_cause() {
        let error = ErrorRecord::construct(
            &BASE,
            "msg",
            vec!["CODE1".into(), json!({"a": 1}).into(), io_error("root")],
        )
        .unwrap();
        assert_eq!(error.code(), Some("CODE1"));
        assert_eq!(error.metadata().unwrap()["a"], json!(1));
        assert_eq!(error.cause().unwrap().message(), "root");
    }

    #[test]
    fn test_code_then_cause() {
        let resolved = resolve_arguments(Some("C".into()), Some(io_error("x")), None);
        assert_eq!(resolved.code.as_deref(), Some("C"));
        assert!(resolved.metadata.is_none());
        assert_eq!(resolved.cause.unwrap().message(), "x");
    }

    #[test]
    fn test_cause_first_ignores_rest() {
        let resolved = resolve_arguments(
            Some(io_error("first")),
            Some("IGNORED".into()),
            Some(json!({"a": 1}).into()),
        );
        assert!(resolved.code.is_none());
        assert!(resolved.metadata.is_none());
        assert_eq!(resolved.cause.unwrap().message(), "first");
    }

    #[test]
    fn test_metadata_then_cause() {
        let resolved = resolve_arguments(Some(json!({"k": "v"}).into()), Some(io_error("c")), None);
        assert_eq!(resolved.metadata.unwrap()["k"], json!("v"));
        assert_eq!(resolved.cause.unwrap().message(), "c");
    }

    #[test]
    fn test_non_object_values_are_not_metadata() {
        let resolved = resolve_arguments(Some(json!(42).into()), None, None);
        assert!(resolved.metadata.is_none());
        let resolved = resolve_arguments(Some(json!("TEXT").into()), Some(json!([1]).into()), None);
        assert_eq!(resolved.code.as_deref(), Some("TEXT"));
        assert!(resolved.metadata.is_none());
    }

    #[test]
    fn test_blank_code_is_dropped() {
        let resolved = resolve_arguments(Some("   ".into()), Some(json!({"a": 1}).into()), None);
        assert!(resolved.code.is_none());
        assert_eq!(resolved.metadata.unwrap()["a"], json!(1));

        let error = ErrorRecord::construct(&BASE, "msg", vec!["\t ".into()]).unwrap();
        assert!(error.code().is_none());
        assert_eq!(error.to_string(), "[ERROR] HandlerError: msg");
    }

    #[test]
    fn test_record_cause_passes_through() {
        let root = ErrorRecord::builder("root").code("R").build().unwrap();
        let error = ErrorRecord::construct(&BASE, "top", vec![root.clone().into()]).unwrap();
        assert!(ErrorRecord::same(error.cause().unwrap(), &root));
    }

    #[test]
    fn test_to_record() {
        let record = ErrorRecord::builder("mine").build().unwrap();
        assert!(is_record(&record));
        assert!(ErrorRecord::same(&to_record(&record).unwrap(), &record));

        let foreign = io::Error::new(io::ErrorKind::NotFound, "missing file");
        assert!(!is_record(&foreign));
        assert_eq!(to_record(&foreign).unwrap().message(), "missing file");

        let silent = io::Error::new(io::ErrorKind::Other, "");
        assert!(to_record(&silent).is_none());
    }
}
