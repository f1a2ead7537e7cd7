//! # Logging for build-exec
//!
//! Every command run by `build-exec` reports what it is doing through a [`LogSink`]. The sink
//! is handed to the runner when it is constructed, so hosts decide where lines end up and tests
//! can swap in a [`CapturingSink`].
//!
//! [`LoggingOpts`](opts::LoggingOpts) configures the process wide `log` backend and owns the
//! [`ConsoleMode`](opts::ConsoleMode) that decides whether standard output is treated as an
//! interactive terminal.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod opts;
mod sink;

pub use opts::{ConsoleMode, LogLevel, LoggingOpts};
pub use sink::{CapturingSink, LogFacadeSink, LogSink};

/// The log target used for lines emitted by executed commands
pub const EXEC_TARGET: &str = "build_exec";
