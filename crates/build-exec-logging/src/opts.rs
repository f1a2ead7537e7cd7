//! Command line configuration of the root logger and the console

use atty::Stream;
use colored::Colorize;
use fern::{Dispatch, FormatCallback, Output};
use log::{Level, LevelFilter, Record, SetLoggerError};
use merge::Merge;
use serde::Serialize;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

/// Logging options for tools that run commands.
///
/// Meant to be flattened into the host's clap parser.
#[derive(Debug, Default, clap::Args, Clone, merge::Merge)]
#[command(next_help_heading = "Logging")]
pub struct LoggingOpts {
    /// The most verbose level of messages to display [default: info]
    #[arg(long = "log-level", value_enum, global = true)]
    pub level: Option<LogLevel>,

    /// The level that executed commands and their output are logged at [default: info]
    #[arg(long, value_enum, global = true)]
    pub exec_level: Option<LogLevel>,

    /// Show the source of a logging statement
    #[arg(long, global = true)]
    #[merge(strategy = merge::bool::overwrite_false)]
    pub show_source: bool,

    /// Outputs everything as json
    #[arg(long, global = true)]
    #[merge(strategy = merge::bool::overwrite_false)]
    pub json: bool,

    /// The console output mode.
    ///
    /// In rich mode command output is buffered so colors survive, in plain mode it is
    /// streamed line by line.
    #[arg(long, value_enum, default_value_t = ConsoleMode::Auto, global = true)]
    pub console: ConsoleMode,
}

/// A log level selectable from the command line
#[derive(Debug, Copy, Clone, clap::ValueEnum, Eq, PartialEq)]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debugging messages
    Debug,
    /// Everything
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::Error,
            LogLevel::Warn => Level::Warn,
            LogLevel::Info => Level::Info,
            LogLevel::Debug => Level::Debug,
            LogLevel::Trace => Level::Trace,
        }
    }
}

/// How standard output should be treated.
#[derive(Debug, Copy, Clone, clap::ValueEnum, Eq, PartialEq, Default)]
#[repr(u8)]
pub enum ConsoleMode {
    /// Decide based on whether stdout is attached to a terminal
    #[default]
    Auto,
    /// Stdout is an interactive terminal
    Rich,
    /// Stdout is a pipe, file or CI log
    Plain,
}

impl Merge for ConsoleMode {
    fn merge(&mut self, other: Self) {
        if self == &Self::Auto {
            *self = other;
        }
    }
}

impl ConsoleMode {
    /// Resolves [`Auto`](ConsoleMode::Auto) into either [`Rich`](ConsoleMode::Rich) or
    /// [`Plain`](ConsoleMode::Plain). Never returns `Auto`.
    pub fn resolve(self) -> Self {
        match self {
            ConsoleMode::Auto => {
                if atty::is(Stream::Stdout) {
                    ConsoleMode::Rich
                } else {
                    ConsoleMode::Plain
                }
            }
            ConsoleMode::Rich | ConsoleMode::Plain => self,
        }
    }

    /// Whether this mode resolves to an interactive terminal
    pub fn is_interactive(self) -> bool {
        self.resolve() == ConsoleMode::Rich
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum OutputType {
    Basic,
    TimeOnly,
    Complicated,
}

#[derive(Debug, Serialize)]
struct JsonMessageInfo<'a> {
    level: Level,
    target: &'a str,
    message: String,
}

static DATE_TIME_FORMAT: &[FormatItem] = format_description!(
    "[year]/[month]/[day] [hour]:[minute]:[second].[subsecond digits:4]"
);

impl LoggingOpts {
    /// Create logging options that show everything at or above the given level
    pub fn with_level(level: LogLevel) -> Self {
        Self {
            level: Some(level),
            ..Self::default()
        }
    }

    /// Gets the log level filter of the root logger
    pub fn log_level_filter(&self) -> LevelFilter {
        self.level
            .map(|level| Level::from(level).to_level_filter())
            .unwrap_or(LevelFilter::Info)
    }

    /// The level executed commands are logged at
    pub fn exec_level(&self) -> Level {
        self.exec_level.map(Level::from).unwrap_or(Level::Info)
    }

    fn output_type(&self) -> OutputType {
        match self.level {
            Some(LogLevel::Debug | LogLevel::Trace) => OutputType::Complicated,
            Some(LogLevel::Info) => OutputType::TimeOnly,
            _ => OutputType::Basic,
        }
    }

    /// Installs the logger described by these options as the global logger
    pub fn init_root_logger(&self) -> Result<(), SetLoggerError> {
        self.create_logger().apply()
    }

    /// Creates the dispatch without installing it.
    ///
    /// Plain consoles get colors turned off entirely.
    pub fn create_logger(&self) -> Dispatch {
        if self.console.resolve() == ConsoleMode::Plain {
            colored::control::set_override(false);
        }
        self.create_logger_with(Output::stdout("\n"))
    }

    /// Creates the dispatch, chaining into the given output
    pub fn create_logger_with(&self, output: impl Into<Output>) -> Dispatch {
        let dispatch = Dispatch::new()
            .level(self.log_level_filter())
            .chain(output.into());
        if self.json {
            dispatch.format(Self::json_message_format)
        } else {
            dispatch.format(Self::message_format(self.output_type(), self.show_source))
        }
    }

    fn message_format(
        output_type: OutputType,
        show_source: bool,
    ) -> impl Fn(FormatCallback, &fmt::Arguments, &Record) + Sync + Send + 'static {
        move |out, message, record| {
            out.finish(format_args!(
                "{} {}",
                Self::format_prefix(output_type, show_source, record),
                match record.level() {
                    Level::Error => message.to_string().red().to_string(),
                    Level::Warn => message.to_string().yellow().to_string(),
                    Level::Info | Level::Debug => message.to_string(),
                    Level::Trace => message.to_string().bright_blue().to_string(),
                }
            ))
        }
    }

    fn json_message_format(out: FormatCallback, args: &fmt::Arguments, record: &Record) {
        let info = JsonMessageInfo {
            level: record.level(),
            target: record.target(),
            message: args.to_string(),
        };
        match serde_json::to_string(&info) {
            Ok(json) => out.finish(format_args!("{}", json)),
            Err(_) => out.finish(format_args!("{}", info.message)),
        }
    }

    fn format_prefix(output_type: OutputType, show_source: bool, record: &Record) -> String {
        let level_string = record.level().to_string().to_lowercase();
        let level_string = match record.level() {
            Level::Error => level_string.red(),
            Level::Warn => level_string.yellow(),
            Level::Info => level_string.green(),
            Level::Debug => level_string.blue(),
            Level::Trace => level_string.bright_black(),
        };

        let prefix = match output_type {
            OutputType::Basic => format!("{}:", level_string),
            OutputType::TimeOnly => {
                let time = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
                format!("[{}] {}:", format_time(time), level_string)
            }
            OutputType::Complicated => {
                let time = OffsetDateTime::now_utc();
                let file = Path::new(record.file().unwrap_or("unknown"))
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or("unknown");
                let line = record.line().map(|l| format!(":{l}")).unwrap_or_default();
                format!("[{} {file}{line} {}]", format_time(time), level_string)
            }
        };

        if show_source {
            format!("{} {}", source_of(record), prefix)
        } else {
            prefix
        }
    }
}

fn format_time(time: OffsetDateTime) -> String {
    time.format(DATE_TIME_FORMAT).unwrap_or_default()
}

fn source_of(record: &Record) -> String {
    match record.module_path().zip(record.file()) {
        Some((module, file)) => {
            let line = record.line().map(|i| format!(":{}", i)).unwrap_or_default();
            let crate_name = module.split("::").next().unwrap_or(module);
            let source: PathBuf = Path::new(file)
                .iter()
                .skip_while(|&p| p != OsStr::new("src"))
                .skip(1)
                .collect();
            format!(
                "({crate_name} :: {source}{line})",
                source = source.to_string_lossy()
            )
            .italic()
            .to_string()
        }
        None => "(<unknown source>)".to_string(),
    }
}
