//! What gets executed: either an argument list or a shell command line

use crate::error::{ExecError, ExecResult};
use std::ffi::{OsStr, OsString};
use std::fmt::{Display, Formatter};
use std::process::Command;

#[cfg(unix)]
const HOST_SHELL: (&str, &str) = ("/bin/sh", "-c");
#[cfg(windows)]
const HOST_SHELL: (&str, &str) = ("cmd", "/C");

/// A command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// The program followed by its arguments, spawned directly
    Args(Vec<OsString>),
    /// A command line interpreted by the host shell
    Shell(String),
}

impl Invocation {
    /// Create an argument list invocation
    pub fn args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Self::Args(
            args.into_iter()
                .map(|s| s.as_ref().to_os_string())
                .collect(),
        )
    }

    /// Create a shell invocation
    pub fn shell(command_line: impl Into<String>) -> Self {
        Self::Shell(command_line.into())
    }

    /// Whether this invocation is a shell command line
    pub fn is_shell(&self) -> bool {
        matches!(self, Invocation::Shell(_))
    }

    /// The invocation as one space-joined line
    pub fn command_line(&self) -> String {
        match self {
            Invocation::Args(args) => args
                .iter()
                .map(|arg| arg.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" "),
            Invocation::Shell(line) => line.clone(),
        }
    }

    /// The program the host will actually start
    pub fn program(&self, shell: bool) -> String {
        match self {
            _ if shell => HOST_SHELL.0.to_string(),
            Invocation::Args(args) => args
                .first()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_default(),
            Invocation::Shell(line) => line.clone(),
        }
    }

    /// Creates the command for this invocation.
    ///
    /// Nothing goes through the host shell unless `shell` is set. Then an
    /// [`Args`](Invocation::Args) invocation is joined into one command line. Without it, a
    /// [`Shell`](Invocation::Shell) command line is started as a program of that exact name, so
    /// `"echo $FOO"` is never expanded.
    pub fn to_command(&self, shell: bool) -> ExecResult<Command> {
        match self {
            Invocation::Args(args) if args.is_empty() => Err(ExecError::EmptyInvocation),
            Invocation::Shell(line) if line.trim().is_empty() => Err(ExecError::EmptyInvocation),
            _ if shell => {
                let (program, flag) = HOST_SHELL;
                let mut command = Command::new(program);
                command.arg(flag).arg(self.command_line());
                Ok(command)
            }
            Invocation::Args(args) => {
                let mut command = Command::new(&args[0]);
                command.args(&args[1..]);
                Ok(command)
            }
            Invocation::Shell(line) => Ok(Command::new(line)),
        }
    }
}

impl Display for Invocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.command_line())
    }
}

impl From<&str> for Invocation {
    fn from(line: &str) -> Self {
        Self::shell(line)
    }
}

impl From<String> for Invocation {
    fn from(line: String) -> Self {
        Self::Shell(line)
    }
}

impl<S: AsRef<OsStr>, const N: usize> From<[S; N]> for Invocation {
    fn from(args: [S; N]) -> Self {
        Self::args(args)
    }
}

impl<S: AsRef<OsStr>> From<Vec<S>> for Invocation {
    fn from(args: Vec<S>) -> Self {
        Self::args(args)
    }
}

impl<S: AsRef<OsStr>> From<&[S]> for Invocation {
    fn from(args: &[S]) -> Self {
        Self::args(args)
    }
}
