//! Errors produced while executing commands

use std::io;

/// A command ran to completion but exited with a non-zero code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("command exited with code {code}")]
pub struct ExecutionFailure {
    code: i32,
    output: String,
}

impl ExecutionFailure {
    /// Create a new failure
    pub fn new(code: i32, output: impl Into<String>) -> Self {
        Self {
            code,
            output: output.into(),
        }
    }

    /// The exit code reported for the child process.
    ///
    /// On unix, a child killed by a signal reports the negated signal number.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Whatever output was captured before the child exited. Empty if output was not captured.
    pub fn output(&self) -> &str {
        &self.output
    }
}

/// An error that occurred while executing a command
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The command exited with a non-zero code
    #[error(transparent)]
    Failed(#[from] ExecutionFailure),
    /// The child process couldn't be started at all
    #[error("couldn't start {program:?}: {source}")]
    Spawn {
        /// The program that was being started
        program: String,
        /// Why the start failed
        #[source]
        source: io::Error,
    },
    /// The invocation had no program
    #[error("no command was given to execute")]
    EmptyInvocation,
    /// Reading output, waiting on the child or opening a redirect failed
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ExecError {
    /// Gets the execution failure, if the command ran and exited unsuccessfully
    pub fn failure(&self) -> Option<&ExecutionFailure> {
        match self {
            ExecError::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// The exit code of the child, if it ran
    pub fn exit_code(&self) -> Option<i32> {
        self.failure().map(ExecutionFailure::code)
    }
}

/// Result type for command execution
pub type ExecResult<T = String> = Result<T, ExecError>;
