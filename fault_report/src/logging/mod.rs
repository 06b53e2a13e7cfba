//! Loggers for error records
//!
//! Every logger implements [`ErrorLogger`]: records below its minimum
//! severity are dropped, the rest are rendered through the logger's
//! formatter (or `Display`) and emitted. [`LoggingService`] adds a second
//! gate in front of any logger.

pub mod memory;
pub mod service;

pub use memory::{LogSummary, LoggedEntry, MemoryLogger};
pub use service::{
    create_configured_service, create_dev_logger, create_prod_logger, create_test_logger,
    log_level, ConsoleLogger, ErrorLogger, LogFacadeLogger, LoggingService, MultiLogger,
    StructuredLogger,
};
