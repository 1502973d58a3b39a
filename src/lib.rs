//! Cmdlog Library
//!
//! Progress reporting for command-line tasks: timestamped, memory-annotated
//! console messages with `{name}` templates, fixed or randomized sleeps, and
//! error/exception forwarding to an injected sink.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;

pub use domain::error::{CmdlogError, CmdlogResult};
pub use domain::config::{CmdlogConfig, ReporterConfig};
pub use crate::core::{
    ErrorSink, Exception, MemorySink, MemorySnapshot, MessageReporter, Params, SinkRecord,
    TracingSink,
};
