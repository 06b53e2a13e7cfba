//! # fault_core
//!
//! Structured error records for applications that want more than a string:
//! every [`ErrorRecord`] carries an id, timestamp, severity, optional code
//! and metadata, and an optional cause linking it to the failure behind it.
//!
//! - [`record`] builds records and their serialized forms
//! - [`args`] resolves loosely typed positional constructor arguments
//! - [`chain`] walks cause chains, cycle-safe
//! - [`capability`] attaches lazily built features (formatters, loggers) per class
//! - [`catalog`] maps stable codes to message templates and severities
//!
//! The crate performs no I/O beyond explicit dictionary loading and never
//! logs on its own behalf.

pub mod args;
pub mod capability;
pub mod catalog;
pub mod chain;
pub mod class;
pub mod config;
pub mod error;
pub mod macros;
pub mod record;
pub mod severity;

// Convenience re-exports
pub use args::{is_record, to_record, ErrorArg, ResolvedArguments};
pub use capability::{CapabilityRegistry, CapabilityView, FeatureGroup, FeatureInstance};
pub use catalog::{CatalogEntry, Dictionary, DictionaryRegistry, CODE_ERROR};
pub use chain::ChainView;
pub use class::{ErrorClass, BASE};
pub use error::{FaultError, FaultKind, FaultResult};
pub use record::{
    ErrorBuilder, ErrorRecord, Metadata, SerializedChainEntry, SerializedErrorRecord,
    WeakErrorRecord,
};
pub use severity::Severity;

pub mod prelude {
    pub use crate::args::{is_record, to_record, ErrorArg};
    pub use crate::capability::{FeatureGroup, FeatureInstance};
    pub use crate::catalog::{CatalogEntry, Dictionary, CODE_ERROR};
    pub use crate::chain::{chain_to_string, get_chain, most_severe, root, serialize_chain};
    pub use crate::class::{ErrorClass, BASE, CRITICAL, DEBUG, ERROR, INFO, WARNING};
    pub use crate::error::{FaultError, FaultResult};
    pub use crate::record::{ErrorRecord, Metadata, WeakErrorRecord};
    pub use crate::severity::Severity;
    pub use crate::{coded, record};
}
