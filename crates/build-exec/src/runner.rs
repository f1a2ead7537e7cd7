//! The command runner

use crate::error::{ExecError, ExecResult, ExecutionFailure};
use crate::invocation::Invocation;
use crate::options::{ExecOptions, Redirect};
use crate::process::{OsSpawner, Spawner};
use crate::strategy::{Completion, OutputStrategy};
use build_exec_logging::{ConsoleMode, LogFacadeSink, LogSink, LoggingOpts};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Runs commands one at a time, logging what they do.
///
/// The runner itself holds no per-call state. The sink and spawner are shared, so clones are cheap
/// and can be handed to other threads.
#[derive(Clone)]
pub struct CommandRunner {
    sink: Arc<dyn LogSink>,
    console: ConsoleMode,
    spawner: Arc<dyn Spawner>,
}

impl Debug for CommandRunner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRunner")
            .field("console", &self.console)
            .finish_non_exhaustive()
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new(LogFacadeSink::default(), ConsoleMode::Auto)
    }
}

impl CommandRunner {
    /// Create a runner that logs into `sink`.
    ///
    /// The console mode is resolved on every call, so [`ConsoleMode::Auto`] follows whatever
    /// stdout is attached to at the time.
    pub fn new<S: LogSink + 'static>(sink: S, console: ConsoleMode) -> Self {
        Self {
            sink: Arc::new(sink),
            console,
            spawner: Arc::new(OsSpawner),
        }
    }

    /// Create a runner logging into the `log` facade at the exec level and with the console mode
    /// of the logging options
    pub fn from_opts(opts: &LoggingOpts) -> Self {
        Self::new(LogFacadeSink::new(opts.exec_level()), opts.console)
    }

    /// Replace how child processes are started
    pub fn with_spawner<P: Spawner + 'static>(mut self, spawner: P) -> Self {
        self.spawner = Arc::new(spawner);
        self
    }

    /// The console mode of this runner
    pub fn console_mode(&self) -> ConsoleMode {
        self.console
    }

    /// Executes a command, returning its trimmed output.
    ///
    /// # Error
    /// Returns [`ExecError::Failed`] if the command exits with a non-zero code. The failure carries
    /// whatever output was captured.
    pub fn execute<I: Into<Invocation>>(
        &self,
        invocation: I,
        options: ExecOptions,
    ) -> ExecResult<String> {
        let invocation = invocation.into();
        self.sink.log(&format!("[exec] {}", invocation));

        let strategy = OutputStrategy::for_console(self.console);
        debug!("executing {:?} with {:?} output", invocation, strategy);
        let plan = strategy.stdout_plan(&options);
        let mut process = self.spawner.spawn(&invocation, &options, plan)?;
        let Completion { code, output } = strategy.drive(process.as_mut(), &*self.sink)?;

        if code != 0 {
            return Err(ExecutionFailure::new(code, output.unwrap_or_default()).into());
        }
        Ok(output
            .map(|output| output.trim().to_string())
            .unwrap_or_default())
    }

    /// Executes a command, exiting this process with the command's exit code if it fails.
    ///
    /// # Error
    /// Only errors that prevented the command from running at all are returned.
    pub fn run_or_exit<I: Into<Invocation>>(
        &self,
        invocation: I,
        options: ExecOptions,
    ) -> ExecResult<String> {
        match self.execute(invocation, options) {
            Err(ExecError::Failed(failure)) => {
                error!("command failed with exit code {}", failure.code());
                std::process::exit(failure.code())
            }
            other => other,
        }
    }

    /// Executes a command through the host shell, exiting this process if it fails.
    pub fn run_shell_or_exit<I: Into<Invocation>>(&self, invocation: I) -> ExecResult<String> {
        self.run_or_exit(invocation, ExecOptions::shell())
    }

    /// Executes a command directly with exactly the given environment.
    ///
    /// Stdout is inherited rather than captured, so when the console is interactive the
    /// output goes straight to the terminal and an empty string is returned.
    pub fn run_with_env<I: Into<Invocation>>(
        &self,
        env: HashMap<String, String>,
        invocation: I,
        options: ExecOptions,
    ) -> ExecResult<String> {
        self.execute(invocation, with_env(env, options, false))
    }

    /// Like [`run_with_env`](Self::run_with_env), but through the host shell
    pub fn run_shell_with_env<I: Into<Invocation>>(
        &self,
        env: HashMap<String, String>,
        invocation: I,
        options: ExecOptions,
    ) -> ExecResult<String> {
        self.execute(invocation, with_env(env, options, true))
    }
}

fn with_env(env: HashMap<String, String>, mut options: ExecOptions, shell: bool) -> ExecOptions {
    options.shell = shell;
    options.stdout = Some(Redirect::Inherit);
    options.env = Some(env);
    options
}
