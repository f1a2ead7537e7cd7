//! The two ways command output is handled.
//!
//! On an interactive terminal output is [buffered](OutputStrategy::Buffered): it is read in one
//! go once the command finishes, which keeps any color codes intact, and only logged if the
//! command fails. Everywhere else output is [streamed](OutputStrategy::Streaming): stderr is merged
//! into stdout and every line is logged the moment it arrives, so long running commands keep
//! producing log output.

use crate::options::ExecOptions;
use crate::process::{Process, StdoutPlan};
use build_exec_logging::{ConsoleMode, LogSink};
use std::io;
use std::io::{BufRead, BufReader, Read};

/// How the output of a command is collected and logged
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OutputStrategy {
    /// Read all output at the end, logging it only on failure
    Buffered,
    /// Merge stderr into stdout and log each line as it is produced
    Streaming,
}

/// What a strategy observed once the child finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The exit code of the child
    pub code: i32,
    /// The collected output, `None` if output went elsewhere
    pub output: Option<String>,
}

impl OutputStrategy {
    /// Picks the strategy for the given console mode
    pub fn for_console(mode: ConsoleMode) -> Self {
        if mode.is_interactive() {
            OutputStrategy::Buffered
        } else {
            OutputStrategy::Streaming
        }
    }

    /// How stdout must be wired for this strategy. Streaming ignores any stdout redirect.
    pub fn stdout_plan(self, options: &ExecOptions) -> StdoutPlan {
        match self {
            OutputStrategy::Buffered => options
                .stdout
                .clone()
                .map(StdoutPlan::Redirect)
                .unwrap_or(StdoutPlan::Capture),
            OutputStrategy::Streaming => StdoutPlan::Merged,
        }
    }

    /// Collects the output of the process and waits for it to exit
    pub fn drive(self, process: &mut dyn Process, sink: &dyn LogSink) -> io::Result<Completion> {
        match self {
            OutputStrategy::Buffered => buffered(process, sink),
            OutputStrategy::Streaming => streaming(process, sink),
        }
    }
}

fn buffered(process: &mut dyn Process, sink: &dyn LogSink) -> io::Result<Completion> {
    let output = match process.take_output() {
        Some(mut reader) => {
            let mut bytes = vec![];
            reader.read_to_end(&mut bytes)?;
            Some(String::from_utf8_lossy(&bytes).into_owned())
        }
        None => None,
    };
    let code = process.wait()?;
    if code != 0 {
        if let Some(output) = &output {
            sink.log(output);
        }
    }
    Ok(Completion { code, output })
}

fn streaming(process: &mut dyn Process, sink: &dyn LogSink) -> io::Result<Completion> {
    let mut output = String::new();
    if let Some(reader) = process.take_output() {
        let mut reader = BufReader::new(reader);
        let mut line = vec![];
        while reader.read_until(b'\n', &mut line)? != 0 {
            let text = String::from_utf8_lossy(&line);
            sink.log(text.trim_end());
            output.push_str(&text);
            line.clear();
        }
    }
    let code = process.wait()?;
    Ok(Completion {
        code,
        output: Some(output),
    })
}
