//! The process layer: spawning children and waiting on them.
//!
//! [`Spawner`] and [`Process`] are the seams between the output strategies and the operating
//! system, so strategies can be driven by scripted processes in tests.

use crate::error::{ExecError, ExecResult};
use crate::invocation::Invocation;
use crate::options::{ExecOptions, Redirect};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::io;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};

/// How the standard output of a child is wired up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StdoutPlan {
    /// Capture stdout through a pipe, leaving stderr alone
    Capture,
    /// Capture stdout and stderr through one shared pipe
    Merged,
    /// Send stdout somewhere else, nothing is captured
    Redirect(Redirect),
}

/// A running child process
pub trait Process {
    /// Takes the readable end of the captured output. Returns `None` if output isn't captured or
    /// was already taken.
    fn take_output(&mut self) -> Option<Box<dyn Read + Send>>;

    /// Waits for the child to exit and returns its exit code. Calling this again returns the same
    /// code.
    fn wait(&mut self) -> io::Result<i32>;
}

/// Starts child processes
pub trait Spawner: Send + Sync {
    /// Start the invocation with the given options, wiring stdout according to the plan.
    fn spawn(
        &self,
        invocation: &Invocation,
        options: &ExecOptions,
        stdout: StdoutPlan,
    ) -> ExecResult<Box<dyn Process>>;
}

/// Spawns real processes using [`std::process::Command`]
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSpawner;

impl Spawner for OsSpawner {
    fn spawn(
        &self,
        invocation: &Invocation,
        options: &ExecOptions,
        stdout: StdoutPlan,
    ) -> ExecResult<Box<dyn Process>> {
        let mut command = invocation.to_command(options.shell)?;
        if let Some(dir) = &options.working_dir {
            command.current_dir(dir);
        }
        if let Some(env) = &options.env {
            command.env_clear().envs(env);
        }
        command.stdin(options.stdin.to_stdio()?);

        let stderr = || -> io::Result<Stdio> {
            match &options.stderr {
                Some(redirect) => redirect.to_stdio(),
                None => Ok(Stdio::inherit()),
            }
        };
        let merged = match stdout {
            StdoutPlan::Capture => {
                command.stdout(Stdio::piped()).stderr(stderr()?);
                None
            }
            StdoutPlan::Merged => {
                let (reader, writer) = io::pipe()?;
                command.stdout(writer.try_clone()?).stderr(writer);
                Some(reader)
            }
            StdoutPlan::Redirect(redirect) => {
                command.stdout(redirect.to_stdio()?).stderr(stderr()?);
                None
            }
        };

        trace!("attempting to execute command: {:?}", command);
        trace!("working_dir: {:?}", command.get_current_dir());
        trace!("env: {:#?}", collect_envs(&command));

        let mut child = command.spawn().map_err(|source| ExecError::Spawn {
            program: invocation.program(options.shell),
            source,
        })?;
        // the command still holds write ends of the merged pipe, which would keep it open forever
        drop(command);

        let output: Option<Box<dyn Read + Send>> = match merged {
            Some(reader) => Some(Box::new(reader)),
            None => child
                .stdout
                .take()
                .map(|stdout| Box::new(stdout) as Box<dyn Read + Send>),
        };
        Ok(Box::new(OsProcess {
            child,
            output,
            code: None,
        }))
    }
}

fn collect_envs(command: &Command) -> HashMap<String, String> {
    command
        .get_envs()
        .map(|(key, val): (&OsStr, Option<&OsStr>)| {
            (
                key.to_string_lossy().to_string(),
                val.map(|v| v.to_string_lossy().to_string())
                    .unwrap_or_default(),
            )
        })
        .collect()
}

/// A child started by [`OsSpawner`].
///
/// If dropped before it was waited on, the child is killed and reaped.
pub struct OsProcess {
    child: Child,
    output: Option<Box<dyn Read + Send>>,
    code: Option<i32>,
}

impl Process for OsProcess {
    fn take_output(&mut self) -> Option<Box<dyn Read + Send>> {
        self.output.take()
    }

    fn wait(&mut self) -> io::Result<i32> {
        if let Some(code) = self.code {
            return Ok(code);
        }
        let code = exit_code(self.child.wait()?);
        self.code = Some(code);
        Ok(code)
    }
}

impl Drop for OsProcess {
    fn drop(&mut self) {
        self.output.take();
        if self.code.is_none() {
            debug!("killing unfinished child {}", self.child.id());
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// The exit code of a finished child.
///
/// Children terminated by a signal report the negated signal number on unix, and `-1` anywhere
/// else a code isn't available.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}
