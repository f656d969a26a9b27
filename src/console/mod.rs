//! The logging channel seen by snippets as `console`
//!
//! A [`Console`] has two slots:
//! - the **log** slot, used by `console.log`, which a runner can swap out for
//!   the duration of one execution with [`Console::intercept_log`]
//! - the **host** slot, used by `console.info/warn/error/debug`, which always
//!   points at the host's real console
//!
//! Interception is scoped by the returned [`LogGuard`]: dropping it puts the
//! previous sink back, whether the run succeeded, failed or unwound.
//!
//! # Sinks
//!
//! - [`StreamSink`]: writes lines to any `io::Write` (stdout/stderr in batch mode)
//! - [`TracingSink`]: forwards lines as `tracing` events (TUI mode)
//! - [`CaptureBuffer`]: shared in-memory line buffer used for capture

pub mod format;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::io::Write;
use std::rc::Rc;

/// Which console method produced a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Log,
    Info,
    Warn,
    Error,
    Debug,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Log => "log",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Debug => "debug",
        }
    }
}

/// Destination for formatted console lines
pub trait ConsoleSink {
    fn write_line(&self, level: LogLevel, line: &str);
}

/// Sink writing one line per call to an `io::Write`
pub struct StreamSink<W: Write> {
    writer: RefCell<W>,
}

impl<W: Write> StreamSink<W> {
    pub fn new(writer: W) -> Self {
        StreamSink {
            writer: RefCell::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write> ConsoleSink for StreamSink<W> {
    fn write_line(&self, level: LogLevel, line: &str) {
        let mut writer = self.writer.borrow_mut();
        if let Err(err) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            tracing::warn!(level = level.as_str(), error = %err, "console write failed");
        }
    }
}

/// Sink forwarding lines to `tracing`, for hosts without a usable stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ConsoleSink for TracingSink {
    fn write_line(&self, level: LogLevel, line: &str) {
        match level {
            LogLevel::Error => tracing::error!(target: "jsplay::console", "{}", line),
            LogLevel::Warn => tracing::warn!(target: "jsplay::console", "{}", line),
            LogLevel::Debug => tracing::debug!(target: "jsplay::console", "{}", line),
            LogLevel::Log | LogLevel::Info => {
                tracing::info!(target: "jsplay::console", level = level.as_str(), "{}", line)
            }
        }
    }
}

/// Shared, ordered in-memory line buffer
#[derive(Debug, Default, Clone)]
pub struct CaptureBuffer {
    lines: Rc<RefCell<Vec<String>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        CaptureBuffer::default()
    }

    /// Copy of the captured lines
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Move the captured lines out, leaving the buffer empty
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.lines.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.borrow().is_empty()
    }
}

impl ConsoleSink for CaptureBuffer {
    fn write_line(&self, _level: LogLevel, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }
}

struct ConsoleSlots {
    log: RefCell<Rc<dyn ConsoleSink>>,
    host: Rc<dyn ConsoleSink>,
    intercept_depth: Cell<usize>,
}

/// Cloneable handle to the logging channel
#[derive(Clone)]
pub struct Console {
    slots: Rc<ConsoleSlots>,
}

impl Console {
    /// Console whose log and host slots both point at `host`
    pub fn new(host: impl ConsoleSink + 'static) -> Self {
        Self::from_shared(Rc::new(host))
    }

    pub fn from_shared(host: Rc<dyn ConsoleSink>) -> Self {
        Console {
            slots: Rc::new(ConsoleSlots {
                log: RefCell::new(Rc::clone(&host)),
                host,
                intercept_depth: Cell::new(0),
            }),
        }
    }

    /// Route a line: `log` goes through the swappable slot, every other level
    /// goes to the host
    pub fn write(&self, level: LogLevel, line: &str) {
        let sink = match level {
            LogLevel::Log => Rc::clone(&self.slots.log.borrow()),
            _ => Rc::clone(&self.slots.host),
        };
        sink.write_line(level, line);
    }

    pub fn log(&self, line: &str) {
        self.write(LogLevel::Log, line);
    }

    /// Swap the log slot for `sink` until the guard is dropped
    pub fn intercept_log(&self, sink: Rc<dyn ConsoleSink>) -> LogGuard {
        let previous = self.slots.log.replace(sink);
        self.slots
            .intercept_depth
            .set(self.slots.intercept_depth.get() + 1);
        LogGuard {
            console: self.clone(),
            previous: Some(previous),
        }
    }

    /// Whether `console.log` currently goes somewhere other than the host
    pub fn is_intercepted(&self) -> bool {
        self.slots.intercept_depth.get() > 0
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("intercepted", &self.is_intercepted())
            .finish()
    }
}

/// Restores the previous log sink when dropped
#[must_use = "the log sink is restored as soon as the guard is dropped"]
pub struct LogGuard {
    console: Console,
    previous: Option<Rc<dyn ConsoleSink>>,
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            *self.console.slots.log.borrow_mut() = previous;
            let depth = self.console.slots.intercept_depth.get();
            self.console.slots.intercept_depth.set(depth.saturating_sub(1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intercept_and_restore() {
        let host = CaptureBuffer::new();
        let console = Console::new(host.clone());
        let capture = CaptureBuffer::new();

        {
            let _guard = console.intercept_log(Rc::new(capture.clone()));
            assert!(console.is_intercepted());
            console.log("captured");
            console.write(LogLevel::Warn, "to host");
        }

        console.log("after");
        assert!(!console.is_intercepted());
        assert_eq!(capture.lines(), vec!["captured"]);
        assert_eq!(host.lines(), vec!["to host", "after"]);
    }

    #[test]
    fn test_nested_guards_restore_in_order() {
        let host = CaptureBuffer::new();
        let console = Console::new(host.clone());
        let outer = CaptureBuffer::new();
        let inner = CaptureBuffer::new();

        let outer_guard = console.intercept_log(Rc::new(outer.clone()));
        {
            let _inner_guard = console.intercept_log(Rc::new(inner.clone()));
            console.log("inner");
        }
        console.log("outer");
        drop(outer_guard);
        console.log("host");

        assert_eq!(inner.lines(), vec!["inner"]);
        assert_eq!(outer.lines(), vec!["outer"]);
        assert_eq!(host.lines(), vec!["host"]);
    }

    #[test]
    fn test_guard_restores_during_unwinding() {
        let host = CaptureBuffer::new();
        let console = Console::new(host.clone());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = console.intercept_log(Rc::new(CaptureBuffer::new()));
            panic!("snippet blew up");
        }));

        assert!(result.is_err());
        console.log("restored");
        assert_eq!(host.lines(), vec!["restored"]);
    }

    #[test]
    fn test_stream_sink_writes_lines() {
        let sink = StreamSink::new(Vec::new());
        sink.write_line(LogLevel::Log, "a");
        sink.write_line(LogLevel::Error, "b");
        assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_capture_take_empties_buffer() {
        let buffer = CaptureBuffer::new();
        buffer.write_line(LogLevel::Log, "x");
        assert_eq!(buffer.take(), vec!["x"]);
        assert!(buffer.is_empty());
    }
}
