//! Progress logging for loads.
//!
//! Log entries go to stderr so that stdout stays free for machine-readable
//! output (`moviedb load --json`). `Detail` entries are only printed in
//! verbose mode.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Detail,
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Optional indentation level (for nested logs)
    pub indent: u8,
}

impl LogEntry {
    pub fn detail(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Detail, message: message.into(), indent: 0 }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Render the entry as a single line, without trailing newline.
    pub fn render(&self) -> String {
        let prefix = match self.level {
            LogLevel::Detail => "   ·",
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        };
        let indent = "   ".repeat(self.indent as usize);
        format!("{}{} {}", indent, prefix, self.message)
    }
}

/// Global logger
pub static LOGGER: Lazy<Logger> = Lazy::new(Logger::new);

/// Writes log entries to stderr
pub struct Logger {
    verbose: AtomicBool,
}

impl Logger {
    pub fn new() -> Self {
        Self { verbose: AtomicBool::new(false) }
    }

    pub fn set_verbose(&self, verbose: bool) {
        self.verbose.store(verbose, Ordering::Relaxed);
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose.load(Ordering::Relaxed)
    }

    /// Print an entry, unless it is a detail entry and verbose mode is off
    pub fn log(&self, entry: LogEntry) {
        if entry.level == LogLevel::Detail && !self.is_verbose() {
            return;
        }
        eprintln!("{}", entry.render());
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn per-batch detail logging on or off
pub fn set_verbose(verbose: bool) {
    LOGGER.set_verbose(verbose);
}

/// Convenient logging functions
pub fn log_detail(msg: impl Into<String>) {
    LOGGER.log(LogEntry::detail(msg).with_indent(1));
}

pub fn log_info(msg: impl Into<String>) {
    LOGGER.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOGGER.log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOGGER.log(LogEntry::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOGGER.log(LogEntry::error(msg));
}

pub fn log_warning_indent(msg: impl Into<String>, indent: u8) {
    LOGGER.log(LogEntry::warning(msg).with_indent(indent));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_prefix_and_indent() {
        assert_eq!(LogEntry::success("done").render(), "   ✓ done");
        assert_eq!(LogEntry::info("x").with_indent(1).render(), "      x");
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let json = serde_json::to_value(LogEntry::warning("skip").with_indent(2)).unwrap();
        assert_eq!(json["level"], "warning");
        assert_eq!(json["indent"], 2);
    }

    #[test]
    fn test_verbose_toggle() {
        let logger = Logger::new();
        assert!(!logger.is_verbose());
        logger.set_verbose(true);
        assert!(logger.is_verbose());
    }
}
