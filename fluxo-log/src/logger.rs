//! Logger implementation
//!
//! No global logger: every component that wants to log holds an
//! `Arc<Logger>` passed in at construction time. `Logger::noop()` gives a
//! logger with no sinks for tests and default configurations.

use crate::record::{Level, Record};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

/// Log output target trait
pub trait LogSink: Send + Sync {
    /// Write one log record
    fn write(&self, record: &Record);
}

/// Logger configuration and state
pub struct Logger {
    /// Current level, atomically swappable at runtime
    level: AtomicU8,
    /// Output targets
    sinks: Mutex<Vec<Box<dyn LogSink>>>,
}

impl Logger {
    /// Create a new logger with the given level and no sinks
    pub fn new(level: Level) -> Arc<Self> {
        Arc::new(Logger {
            level: AtomicU8::new(level as u8),
            sinks: Mutex::new(Vec::new()),
        })
    }

    /// Add an output target, chainable
    pub fn with_sink<S: LogSink + 'static>(self: Arc<Self>, sink: S) -> Arc<Self> {
        self.add_sink(sink);
        self
    }

    /// Add an output target
    pub fn add_sink<S: LogSink + 'static>(&self, sink: S) {
        let mut sinks = self.sinks.lock().expect("logger sink lock");
        sinks.push(Box::new(sink));
    }

    /// Change the level at runtime
    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    /// Current level
    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed)).unwrap_or(Level::Info)
    }

    /// Whether the given level would be written
    pub fn is_enabled(&self, level: Level) -> bool {
        level >= self.level()
    }

    /// Record a log message (use the level macros instead of calling this
    /// directly)
    #[inline(never)]
    pub fn log(&self, level: Level, target: &'static str, message: impl Into<String>) {
        if !self.is_enabled(level) {
            return;
        }
        let record = Record::new(level, target, message);
        let sinks = self.sinks.lock().expect("logger sink lock");
        for sink in sinks.iter() {
            sink.write(&record);
        }
    }

    /// A logger that drops everything (Error level, no sinks)
    pub fn noop() -> Arc<Self> {
        Self::new(Level::Error)
    }
}

/// Sink writing human-readable lines to stdout
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write(&self, record: &Record) {
        println!("{}", record);
    }
}

/// Sink writing human-readable lines to stderr
pub struct StderrSink;

impl LogSink for StderrSink {
    fn write(&self, record: &Record) {
        eprintln!("{}", record);
    }
}
