//! # Error Records
//!
//! [`ErrorRecord`] is an immutable, cheaply cloneable handle to one error:
//! identifier, timestamp, severity, message, optional code and metadata,
//! and an optional cause forming a chain back to the original failure.
//!
//! Records are built through [`ErrorBuilder`], or through
//! [`ErrorRecord::construct`] for callers passing loosely typed positional
//! arguments.
//!
//! ```rust
//! use fault_core::{ErrorRecord, Severity};
//!
//! let io = ErrorRecord::builder("connection reset").build().unwrap();
//! let error = ErrorRecord::builder("sync failed")
//!     .code("SYNC01")
//!     .meta("attempt", 3)
//!     .severity(Severity::Warning)
//!     .cause(io)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(error.to_string(), "[WARNING SYNC01] HandlerError: sync failed");
//! assert_eq!(error.chain().len(), 2);
//! ```

use crate::args::{resolve_arguments, ErrorArg, ResolvedArguments};
use crate::capability::{CapabilityRegistry, CapabilityTable};
use crate::chain::{self, ChainView};
use crate::class::{ErrorClass, BASE};
use crate::config::compile_time::record::MAX_POSITIONAL_ARGUMENTS;
use crate::error::{FaultError, FaultResult};
use crate::severity::Severity;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::{Arc, OnceLock, Weak};
use uuid::Uuid;

/// Open key/value context attached to a record
pub type Metadata = Map<String, Value>;

struct RecordInner {
    id: Uuid,
    timestamp: DateTime<Utc>,
    class: &'static ErrorClass,
    severity: Severity,
    message: String,
    code: Option<String>,
    metadata: Option<Metadata>,
    cause: OnceLock<ErrorRecord>,
    capabilities: CapabilityTable,
}

/// Shared handle to an immutable error
#[derive(Clone)]
pub struct ErrorRecord {
    inner: Arc<RecordInner>,
}

/// Non-owning handle to an [`ErrorRecord`]
#[derive(Clone, Debug)]
pub struct WeakErrorRecord {
    inner: Weak<RecordInner>,
}

impl WeakErrorRecord {
    /// The record, if it is still alive
    pub fn upgrade(&self) -> Option<ErrorRecord> {
        self.inner.upgrade().map(|inner| ErrorRecord { inner })
    }
}

impl ErrorRecord {
    /// Start building a record of the base class
    pub fn builder(message: impl Into<String>) -> ErrorBuilder {
        ErrorBuilder::new(message)
    }

    pub fn critical(message: impl Into<String>) -> ErrorBuilder {
        ErrorBuilder::new(message).severity(Severity::Critical)
    }

    pub fn error(message: impl Into<String>) -> ErrorBuilder {
        ErrorBuilder::new(message).severity(Severity::Error)
    }

    pub fn warning(message: impl Into<String>) -> ErrorBuilder {
        ErrorBuilder::new(message).severity(Severity::Warning)
    }

    pub fn info(message: impl Into<String>) -> ErrorBuilder {
        ErrorBuilder::new(message).severity(Severity::Info)
    }

    pub fn debug(message: impl Into<String>) -> ErrorBuilder {
        ErrorBuilder::new(message).severity(Severity::Debug)
    }

    /// Build a record from up to three loosely typed positional arguments
    ///
    /// The arguments are classified by shape: text is a code, an object is
    /// metadata and an error is the cause. See
    /// [`resolve_arguments`](crate::args::resolve_arguments) for the exact
    /// precedence.
    pub fn construct(
        class: &'static ErrorClass,
        message: impl Into<String>,
        args: Vec<ErrorArg>,
    ) -> FaultResult<ErrorRecord> {
        if args.len() > MAX_POSITIONAL_ARGUMENTS {
            return Err(FaultError::invalid_argument(&format!(
                "at most {} arguments may follow the message, got {}",
                MAX_POSITIONAL_ARGUMENTS,
                args.len()
            )));
        }

        let mut args = args.into_iter();
        let resolved = resolve_arguments(args.next(), args.next(), args.next());
        ErrorBuilder::new(message)
            .class(class)
            .arguments(resolved)
            .build()
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.inner.timestamp
    }

    /// ISO-8601 timestamp with millisecond precision, e.g. `2024-05-01T10:00:00.123Z`
    pub fn timestamp_iso(&self) -> String {
        self.inner
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn severity(&self) -> Severity {
        self.inner.severity
    }

    pub fn message(&self) -> &str {
        &self.inner.message
    }

    pub fn code(&self) -> Option<&str> {
        self.inner.code.as_deref()
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.inner.metadata.as_ref()
    }

    pub fn cause(&self) -> Option<&ErrorRecord> {
        self.inner.cause.get()
    }

    pub fn class(&self) -> &'static ErrorClass {
        self.inner.class
    }

    /// Name of the class the record was constructed as
    pub fn name(&self) -> &'static str {
        self.inner.class.name()
    }

    /// Whether both handles point at the same record
    pub fn same(a: &ErrorRecord, b: &ErrorRecord) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    pub fn downgrade(&self) -> WeakErrorRecord {
        WeakErrorRecord {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Attach a cause to a record built without one
    ///
    /// The cause can be set once. Linking a record into its own chain forms
    /// a cycle: traversal stays finite, but the records are never freed.
    pub fn link_cause(&self, cause: ErrorRecord) -> FaultResult<()> {
        self.inner.cause.set(cause).map_err(|_| {
            FaultError::invalid_state(&format!("cause of error {} is already set", self.id()))
        })
    }

    /// Causal chain starting at this record
    pub fn chain(&self) -> ChainView<'_> {
        ChainView::new(self)
    }

    /// Nested serialized form including every cause
    ///
    /// When the chain loops back on itself the repeated link is left out.
    pub fn serialize(&self) -> SerializedErrorRecord {
        let mut nested: Option<SerializedErrorRecord> = None;
        for node in chain::get_chain(self).iter().rev() {
            let mut serialized = SerializedErrorRecord::from_node(node);
            serialized.cause = nested.take().map(Box::new);
            nested = Some(serialized);
        }
        nested.unwrap_or_else(|| SerializedErrorRecord::from_node(self))
    }

    pub(crate) fn address(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    pub(crate) fn capabilities(&self) -> &CapabilityTable {
        &self.inner.capabilities
    }
}

impl std::fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}", self.severity().label())?;
        if let Some(code) = self.code() {
            write!(f, " {}", code)?;
        }
        write!(f, "] {}: {}", self.name(), self.message())
    }
}

impl std::fmt::Debug for ErrorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorRecord")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("severity", &self.severity())
            .field("message", &self.message())
            .field("code", &self.code())
            .field("metadata", &self.metadata())
            .field("cause", &self.cause().map(ErrorRecord::id))
            .finish()
    }
}

impl std::error::Error for ErrorRecord {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Named-field construction of an [`ErrorRecord`]
#[derive(Debug)]
pub struct ErrorBuilder {
    class: &'static ErrorClass,
    message: String,
    severity: Option<Severity>,
    code: Option<String>,
    metadata: Option<Metadata>,
    cause: Option<ErrorRecord>,
    registry: Option<&'static CapabilityRegistry>,
}

impl ErrorBuilder {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            class: &BASE,
            message: message.into(),
            severity: None,
            code: None,
            metadata: None,
            cause: None,
            registry: None,
        }
    }

    pub fn class(mut self, class: &'static ErrorClass) -> Self {
        self.class = class;
        self
    }

    /// Explicit severity; otherwise the class default, then `error`
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Add a single metadata entry
    pub fn meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata
            .get_or_insert_with(Metadata::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn cause(mut self, cause: ErrorRecord) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Resolve capabilities from `registry` instead of the global one
    pub fn registry(mut self, registry: &'static CapabilityRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Apply the outcome of positional argument resolution
    pub fn arguments(mut self, resolved: ResolvedArguments) -> Self {
        if let Some(code) = resolved.code {
            self.code = Some(code);
        }
        if let Some(metadata) = resolved.metadata {
            self.metadata = Some(metadata);
        }
        if let Some(cause) = resolved.cause {
            self.cause = Some(cause);
        }
        self
    }

    pub fn build(self) -> FaultResult<ErrorRecord> {
        if self.message.is_empty() {
            return Err(FaultError::invalid_argument(
                "error message must be a non-empty string",
            ));
        }

        let severity = self
            .severity
            .or_else(|| self.class.default_severity())
            .unwrap_or_default();
        let registry = self.registry.unwrap_or_else(CapabilityRegistry::global);
        let capabilities = CapabilityTable::for_class(registry, self.class)?;
        let cause = match self.cause {
            Some(cause) => OnceLock::from(cause),
            None => OnceLock::new(),
        };

        Ok(ErrorRecord {
            inner: Arc::new(RecordInner {
                id: Uuid::new_v4(),
                timestamp: Utc::now(),
                class: self.class,
                severity,
                message: self.message,
                code: self.code.filter(|code| !code.trim().is_empty()),
                metadata: self.metadata,
                cause,
                capabilities,
            }),
        })
    }
}

// ============================================================================
// SERIALIZED FORMS
// ============================================================================

/// Wire form of a record with its causes nested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedErrorRecord {
    pub id: String,
    pub message: String,
    pub name: String,
    pub severity: Severity,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<SerializedErrorRecord>>,
}

impl SerializedErrorRecord {
    fn from_node(node: &ErrorRecord) -> Self {
        Self {
            id: node.id().to_string(),
            message: node.message().to_string(),
            name: node.name().to_string(),
            severity: node.severity(),
            timestamp: node.timestamp_iso(),
            metadata: node.metadata().cloned(),
            code: node.code().map(str::to_string),
            cause: None,
        }
    }

    /// Number of records in this nested form
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut current = self;
        while let Some(cause) = current.cause.as_deref() {
            depth += 1;
            current = cause;
        }
        depth
    }
}

/// Wire form of one chain element, without its cause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedChainEntry {
    pub id: String,
    pub message: String,
    pub name: String,
    pub severity: Severity,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl From<&ErrorRecord> for SerializedChainEntry {
    fn from(node: &ErrorRecord) -> Self {
        Self {
            id: node.id().to_string(),
            message: node.message().to_string(),
            name: node.name().to_string(),
            severity: node.severity(),
            timestamp: node.timestamp_iso(),
            metadata: node.metadata().cloned(),
            code: node.code().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{ErrorClass, CRITICAL, INFO};
    use assert_matches::assert_matches;
    use serde_json::json;
    use std::collections::HashSet;
    use std::error::Error;

    static FOO: ErrorClass = ErrorClass::derive("FooError", &BASE);
    static AUDIT: ErrorClass = ErrorClass::derive("RecordTestAuditError", &INFO);

    #[test]
    fn test_builder_defaults() {
        let error = ErrorRecord::builder("boom").build().unwrap();
        assert_eq!(error.message(), "boom");
        assert_eq!(error.severity(), Severity::Error);
        assert_eq!(error.name(), "HandlerError");
        assert!(error.code().is_none());
        assert!(error.metadata().is_none());
        assert!(error.cause().is_none());
    }

    #[test]
    fn test_empty_message_rejected() {
        assert_matches!(
            ErrorRecord::builder("").build(),
            Err(FaultError::InvalidArgument { .. })
        );
    }

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<Uuid> = (0..1000)
            .map(|i| ErrorRecord::builder(format!("e{}", i)).build().unwrap().id())
            .collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_severity_precedence() {
        let from_class = ErrorRecord::builder("a").class(&AUDIT).build().unwrap();
        assert_eq!(from_class.severity(), Severity::Info);

        let explicit = ErrorRecord::builder("b")
            .class(&AUDIT)
            .severity(Severity::Critical)
            .build()
            .unwrap();
        assert_eq!(explicit.severity(), Severity::Critical);

        assert_eq!(
            ErrorRecord::debug("c").build().unwrap().severity(),
            Severity::Debug
        );
    }

    #[test]
    fn test_display_contract() {
        let error = ErrorRecord::builder("boom")
            .class(&FOO)
            .severity(Severity::Critical)
            .code("X1")
            .build()
            .unwrap();
        assert_eq!(error.to_string(), "[CRITICAL X1] FooError: boom");

        let uncoded = ErrorRecord::builder("boom")
            .class(&CRITICAL)
            .code("")
            .build()
            .unwrap();
        assert_eq!(uncoded.to_string(), "[CRITICAL] CriticalHandlerError: boom");

        let blank = ErrorRecord::builder("boom").code("  ").build().unwrap();
        assert!(blank.code().is_none());
        assert_eq!(blank.to_string(), "[ERROR] HandlerError: boom");
    }

    #[test]
    fn test_source_follows_cause() {
        let root = ErrorRecord::builder("root").build().unwrap();
        let top = ErrorRecord::builder("top")
            .cause(root.clone())
            .build()
            .unwrap();
        let source = top.source().unwrap();
        assert_eq!(source.to_string(), root.to_string());
        assert!(root.source().is_none());
    }

    #[test]
    fn test_link_cause_is_write_once() {
        let a = ErrorRecord::builder("a").build().unwrap();
        let b = ErrorRecord::builder("b").build().unwrap();
        let c = ErrorRecord::builder("c").build().unwrap();
        a.link_cause(b.clone()).unwrap();
        assert!(ErrorRecord::same(a.cause().unwrap(), &b));
        assert_matches!(a.link_cause(c), Err(FaultError::InvalidState { .. }));
    }

    #[test]
    fn test_weak_handle() {
        let error = ErrorRecord::builder("short lived").build().unwrap();
        let weak = error.downgrade();
        assert!(ErrorRecord::same(&weak.upgrade().unwrap(), &error));
        drop(error);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_serialize_nests_causes() {
        let root = ErrorRecord::builder("disk")
            .meta("path", "/var")
            .build()
            .unwrap();
        let middle = ErrorRecord::builder("write").cause(root).build().unwrap();
        let top = ErrorRecord::builder("save")
            .code("SAVE")
            .cause(middle)
            .build()
            .unwrap();

        let serialized = top.serialize();
        assert_eq!(serialized.message, "save");
        assert_eq!(serialized.code.as_deref(), Some("SAVE"));
        assert_eq!(serialized.depth(), 3);
        let root_form = serialized.cause.as_ref().unwrap().cause.as_ref().unwrap();
        assert_eq!(root_form.message, "disk");
        assert!(root_form.cause.is_none());
        assert_eq!(root_form.metadata.as_ref().unwrap()["path"], json!("/var"));
    }

    #[test]
    fn test_serialized_json_shape() {
        let error = ErrorRecord::warning("slow").build().unwrap();
        let value = serde_json::to_value(error.serialize()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object["severity"], json!("warning"));
        assert_eq!(object["name"], json!("HandlerError"));
        assert!(!object.contains_key("cause"));
        assert!(!object.contains_key("code"));
        assert!(!object.contains_key("metadata"));

        let timestamp = object["timestamp"].as_str().unwrap();
        assert!(timestamp.ends_with('Z'));
        assert_eq!(timestamp.len(), "2024-05-01T10:00:00.123Z".len());
        assert_eq!(timestamp, error.timestamp_iso());
    }

    #[test]
    fn test_serialize_cycle_is_finite() {
        let a = ErrorRecord::builder("a").build().unwrap();
        let b = ErrorRecord::builder("b").cause(a.clone()).build().unwrap();
        a.link_cause(b.clone()).unwrap();
        assert_eq!(a.serialize().depth(), 2);
        assert_eq!(b.serialize().depth(), 2);
    }

    #[test]
    fn test_construct_rejects_extra_arguments() {
        let args = vec![
            ErrorArg::from("A"),
            ErrorArg::from(json!({})),
            ErrorArg::from("B"),
            ErrorArg::from("C"),
        ];
        assert_matches!(
            ErrorRecord::construct(&BASE, "msg", args),
            Err(FaultError::InvalidArgument { .. })
        );
    }
}
