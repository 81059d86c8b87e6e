//! Output sink port.
//!
//! A sink is the thing that actually renders a payload, typically a console
//! stream. Emitters never inspect payloads; they only decide *when* a sink
//! is invoked.

use std::fmt;
use std::io::{self, Write};

/// Port for writing a payload to its final destination.
///
/// Implementations are invoked while the emitter holds its internal lock,
/// so they must not call back into the emitter that owns them.
///
/// Any `Fn(T) + Send + Sync` closure is a sink:
///
/// ```
/// use pacelog_core::Sink;
///
/// let sink = |line: String| println!("{line}");
/// sink.write("ready".to_string());
/// ```
pub trait Sink<T>: Send + Sync {
    /// Write one payload.
    fn write(&self, payload: T);
}

impl<T, F> Sink<T> for F
where
    F: Fn(T) + Send + Sync,
{
    fn write(&self, payload: T) {
        self(payload);
    }
}

/// Console stream selector for [`ConsoleSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleStream {
    #[default]
    Stdout,
    Stderr,
}

/// Sink that prints `Display` payloads to the console, one line each.
///
/// Write failures (closed pipe, full disk behind a redirect) are reported
/// through `tracing` and otherwise ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink {
    stream: ConsoleStream,
}

impl ConsoleSink {
    /// Print to standard output.
    pub const fn stdout() -> Self {
        Self {
            stream: ConsoleStream::Stdout,
        }
    }

    /// Print to standard error.
    pub const fn stderr() -> Self {
        Self {
            stream: ConsoleStream::Stderr,
        }
    }

    /// The stream this sink writes to.
    pub const fn stream(&self) -> ConsoleStream {
        self.stream
    }

    fn write_line(&self, payload: &dyn fmt::Display) -> io::Result<()> {
        match self.stream {
            ConsoleStream::Stdout => writeln!(io::stdout().lock(), "{payload}"),
            ConsoleStream::Stderr => writeln!(io::stderr().lock(), "{payload}"),
        }
    }
}

impl<T: fmt::Display> Sink<T> for ConsoleSink {
    fn write(&self, payload: T) {
        if let Err(e) = self.write_line(&payload) {
            tracing::warn!(stream = ?self.stream, error = %e, "Console write failed");
        }
    }
}

/// A sink that discards every payload.
///
/// Useful for silencing an emitter without changing its call sites.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl NoopSink {
    /// Create a new no-op sink.
    pub const fn new() -> Self {
        Self
    }
}

impl<T> Sink<T> for NoopSink {
    fn write(&self, _payload: T) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_closure_is_a_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&seen);
        let sink = move |n: u32| captured.lock().unwrap().push(n);

        sink.write(1);
        sink.write(2);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_boxed_trait_object() {
        let sink: Box<dyn Sink<&str>> = Box::new(NoopSink::new());
        sink.write("dropped");
    }

    #[test]
    fn test_console_sink_streams() {
        assert_eq!(ConsoleSink::default().stream(), ConsoleStream::Stdout);
        assert_eq!(ConsoleSink::stdout().stream(), ConsoleStream::Stdout);
        assert_eq!(ConsoleSink::stderr().stream(), ConsoleStream::Stderr);
    }

    #[test]
    fn test_console_sink_writes_display_payloads() {
        // Should not panic
        ConsoleSink::stderr().write("progress: 42%");
        ConsoleSink::stderr().write(42_u64);
    }
}
