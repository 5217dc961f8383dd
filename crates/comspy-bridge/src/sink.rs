use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDateTime;
use tracing::debug;

/// Timestamp layout of every log line: `MM-DD-YYYY HH:MM:SS.mmm`.
pub const TIMESTAMP_FORMAT: &str = "%m-%d-%Y %H:%M:%S%.3f";

/// Destination for bridge events.
pub trait LogSink {
    /// Append one event. `message` is appended after `": "` when present and
    /// non-empty.
    fn record(&mut self, event: &str, message: Option<&str>) -> io::Result<()>;

    /// Push buffered lines to the underlying resource.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Render one newline-terminated log line.
pub fn format_line(timestamp: NaiveDateTime, event: &str, message: Option<&str>) -> String {
    let mut line = format!("{} - {}", timestamp.format(TIMESTAMP_FORMAT), event);
    if let Some(message) = message.filter(|m| !m.is_empty()) {
        line.push_str(": ");
        line.push_str(message);
    }
    line.push('\n');
    line
}

/// Line-oriented event log stamped with local wall-clock time.
///
/// Each line goes out in a single write followed by a flush.
pub struct EventLog<W: Write> {
    inner: W,
    echo: bool,
}

impl EventLog<File> {
    /// Create (or truncate) the log file at `path`.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        debug!(path = %path.display(), "opened event log");
        Ok(Self::new(file))
    }
}

impl<W: Write> EventLog<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, echo: false }
    }

    /// Also print every line to stdout.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn echo(&self) -> bool {
        self.echo
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> LogSink for EventLog<W> {
    fn record(&mut self, event: &str, message: Option<&str>) -> io::Result<()> {
        let line = format_line(chrono::Local::now().naive_local(), event, message);
        self.inner.write_all(line.as_bytes())?;
        self.inner.flush()?;
        if self.echo {
            print!("{line}");
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// A sink shared between threads. Each record holds the lock for the whole
/// line, so concurrent writers never interleave within a line.
pub struct SharedSink<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> SharedSink<S> {
    pub fn new(sink: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sink)),
        }
    }

    /// Run `f` with exclusive access to the wrapped sink.
    pub fn with<T>(&self, f: impl FnOnce(&mut S) -> T) -> T {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl<S> Clone for SharedSink<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: LogSink> LogSink for SharedSink<S> {
    fn record(&mut self, event: &str, message: Option<&str>) -> io::Result<()> {
        self.with(|sink| sink.record(event, message))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with(|sink| sink.flush())
    }
}
