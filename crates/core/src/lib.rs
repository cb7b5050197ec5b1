//! mpi-runner - Build and run orchestration for dslc and MPI programs
//!
//! This crate provides:
//! - A catalog of build and run methods, each a positional command template
//! - Parameter resolution from the active file, with process-count clamping
//! - Command building that fills templates according to each method's shape
//! - Dispatch through a monitored, diagnostic-navigable log or by hand-off
//! - Compile-and-run orchestration of a build and a run method
pub mod catalog;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod log;
pub mod orchestrator;
pub mod params;

// Re-export commonly used types
pub use catalog::{MethodCatalog, MethodEntry, MethodRole, ProcessKind, TemplateShape};
pub use command::{CommandBuilder, ResolvedCommand};
pub use config::Config;
pub use dispatch::{
    DispatchMode, Dispatcher, Environment, ExecutionOutcome, HandoffSink, HandoffTarget,
    MemorySink,
};
pub use error::{Error, Result};
pub use log::{Diagnostic, LogView};
pub use orchestrator::{Orchestrator, join_commands};
pub use params::{BuildParameters, ProcessCount};
