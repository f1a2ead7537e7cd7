//! Sinks that receive the text emitted while running commands

use crate::EXEC_TARGET;
use log::Level;
use parking_lot::Mutex;
use std::sync::Arc;

/// Something that accepts lines of text.
///
/// Sinks are responsible for their own formatting and destination.
pub trait LogSink: Send + Sync {
    /// Log a single line of text
    fn log(&self, text: &str);
}

impl<S: LogSink + ?Sized> LogSink for &S {
    fn log(&self, text: &str) {
        (**self).log(text)
    }
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn log(&self, text: &str) {
        (**self).log(text)
    }
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn log(&self, text: &str) {
        (**self).log(text)
    }
}

/// Forwards every line into the `log` facade, under the [`EXEC_TARGET`] target.
#[derive(Debug, Clone)]
pub struct LogFacadeSink {
    level: Level,
}

impl LogFacadeSink {
    /// Create a sink that emits at the given level
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// The level lines are emitted at
    pub fn level(&self) -> Level {
        self.level
    }
}

impl Default for LogFacadeSink {
    fn default() -> Self {
        Self::new(Level::Info)
    }
}

impl LogSink for LogFacadeSink {
    fn log(&self, text: &str) {
        log::log!(target: EXEC_TARGET, self.level, "{}", text);
    }
}

/// Keeps every logged line in memory.
///
/// Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct CapturingSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CapturingSink {
    /// Create an empty capturing sink
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of every line logged so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Every line logged so far, joined with newlines
    pub fn contents(&self) -> String {
        self.lines.lock().join("\n")
    }

    /// Forget all captured lines
    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl LogSink for CapturingSink {
    fn log(&self, text: &str) {
        self.lines.lock().push(text.to_string());
    }
}
