//! # build-exec
//!
//! Runs external commands on behalf of build steps. Each command is logged before it starts, its
//! output is either buffered (interactive terminals, so colors survive) or streamed line by line
//! (CI logs), and a non-zero exit code becomes an [`ExecutionFailure`].
//!
//! ```no_run
//! use build_exec::{CommandRunner, ExecOptions};
//!
//! let runner = CommandRunner::default();
//! let version = runner.execute(["git", "rev-parse", "HEAD"], ExecOptions::default())?;
//! println!("building {version}");
//! # Ok::<(), build_exec::ExecError>(())
//! ```
//!
//! Top level build steps that have no way to recover use
//! [`run_or_exit`](CommandRunner::run_or_exit), which ends the current process with the child's
//! exit code instead of returning the failure.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

#[macro_use]
extern crate log;

pub mod error;
pub mod invocation;
pub mod options;
pub mod process;
pub mod runner;
pub mod strategy;

pub use build_exec_logging::{
    CapturingSink, ConsoleMode, LogFacadeSink, LogLevel, LogSink, LoggingOpts,
};
pub use error::{ExecError, ExecResult, ExecutionFailure};
pub use invocation::Invocation;
pub use options::{ExecOptions, Input, Redirect};
pub use runner::CommandRunner;
pub use strategy::OutputStrategy;
