//! Execution strategies: monitored runs and hand-off

mod dispatcher;
mod environment;
mod handoff;
mod outcome;

pub use dispatcher::{Dispatcher, classify_exit};
pub use environment::{EnvMode, Environment, shell_quote};
pub use handoff::{ClipboardSink, HandoffSink, HandoffTarget, MemorySink, StdoutSink, open_sink};
pub use outcome::{DispatchMode, ExecutionOutcome, TOOL_NOT_FOUND_EXIT_CODE};
