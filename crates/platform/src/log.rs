//! Injected diagnostics sink
//!
//! The driver core never writes to a global logger. It owns a [`Logger`]
//! wrapping some [`LogSink`] and a minimum [`Level`]; lines below that level
//! are dropped before any formatting happens.
//!
//! | Sink            | Feature   | Target                 |
//! |-----------------|-----------|------------------------|
//! | [`NullSink`]    | —         | discards everything    |
//! | `DefmtSink`     | `defmt`   | RTT via defmt          |
//! | `TracingSink`   | `tracing` | host subscriber        |
//! | `MemorySink`    | `std`     | in-memory, for tests   |

use core::fmt;

#[cfg(any(test, feature = "std", feature = "defmt", feature = "tracing"))]
use crate::config::{DRIVER_NAME, PREFIX_SEPARATOR};

/// Log severity, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Protocol-level tracing (register values, solver steps)
    Debug,
    /// Lifecycle events (reset, mode changes)
    Info,
    /// Recoverable problems (self-test mismatches, guard violations)
    #[default]
    Warning,
    /// Operations that could not be carried out
    Error,
}

impl Level {
    /// Human-readable label used in the line prefix.
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "Debug",
            Level::Info => "Info",
            Level::Warning => "Warning",
            Level::Error => "Error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination for diagnostic lines.
pub trait LogSink {
    /// Emit one already-filtered line.
    fn log(&mut self, level: Level, args: fmt::Arguments<'_>);
}

impl<S: LogSink + ?Sized> LogSink for &mut S {
    fn log(&mut self, level: Level, args: fmt::Arguments<'_>) {
        (**self).log(level, args);
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&mut self, _level: Level, _args: fmt::Arguments<'_>) {}
}

/// Sink forwarding to defmt.
#[cfg(feature = "defmt")]
#[derive(Debug, Clone, Copy, Default)]
pub struct DefmtSink;

#[cfg(feature = "defmt")]
impl LogSink for DefmtSink {
    fn log(&mut self, level: Level, args: fmt::Arguments<'_>) {
        let line = defmt::Display2Format(&args);
        match level {
            Level::Debug => defmt::debug!("{=str}{=str}{}", DRIVER_NAME, PREFIX_SEPARATOR, line),
            Level::Info => defmt::info!("{=str}{=str}{}", DRIVER_NAME, PREFIX_SEPARATOR, line),
            Level::Warning => defmt::warn!("{=str}{=str}{}", DRIVER_NAME, PREFIX_SEPARATOR, line),
            Level::Error => defmt::error!("{=str}{=str}{}", DRIVER_NAME, PREFIX_SEPARATOR, line),
        }
    }
}

/// Sink forwarding to tracing.
#[cfg(feature = "tracing")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[cfg(feature = "tracing")]
impl LogSink for TracingSink {
    fn log(&mut self, level: Level, args: fmt::Arguments<'_>) {
        match level {
            Level::Debug => tracing::debug!("{}{}{}", DRIVER_NAME, PREFIX_SEPARATOR, args),
            Level::Info => tracing::info!("{}{}{}", DRIVER_NAME, PREFIX_SEPARATOR, args),
            Level::Warning => tracing::warn!("{}{}{}", DRIVER_NAME, PREFIX_SEPARATOR, args),
            Level::Error => tracing::error!("{}{}{}", DRIVER_NAME, PREFIX_SEPARATOR, args),
        }
    }
}

/// Sink recording every line in memory.
///
/// Lines are stored as `"VS1053 - <Level>: <message>"`.
#[cfg(any(test, feature = "std"))]
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: std::vec::Vec<(Level, std::string::String)>,
}

#[cfg(any(test, feature = "std"))]
impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded lines, oldest first.
    pub fn lines(&self) -> &[(Level, std::string::String)] {
        &self.lines
    }

    /// Number of recorded lines at exactly `level`.
    pub fn count(&self, level: Level) -> usize {
        self.lines.iter().filter(|(l, _)| *l == level).count()
    }

    /// Whether any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|(_, line)| line.contains(needle))
    }

    /// Forget all recorded lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(any(test, feature = "std"))]
impl LogSink for MemorySink {
    fn log(&mut self, level: Level, args: fmt::Arguments<'_>) {
        self.lines
            .push((level, std::format!("{DRIVER_NAME}{PREFIX_SEPARATOR}{level}: {args}")));
    }
}

/// A sink plus a minimum severity.
#[derive(Debug, Clone, Default)]
pub struct Logger<S> {
    sink: S,
    min_level: Level,
}

impl<S: LogSink> Logger<S> {
    /// Wrap `sink`, dropping lines below `min_level`.
    pub fn new(sink: S, min_level: Level) -> Self {
        Self { sink, min_level }
    }

    /// Current minimum severity.
    pub fn min_level(&self) -> Level {
        self.min_level
    }

    /// Change the minimum severity.
    pub fn set_min_level(&mut self, level: Level) {
        self.min_level = level;
    }

    /// Whether a line at `level` would be emitted.
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }

    /// Emit a line if `level` passes the filter.
    pub fn log(&mut self, level: Level, args: fmt::Arguments<'_>) {
        if self.enabled(level) {
            self.sink.log(level, args);
        }
    }

    /// Emit at [`Level::Debug`].
    pub fn debug(&mut self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    /// Emit at [`Level::Info`].
    pub fn info(&mut self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    /// Emit at [`Level::Warning`].
    pub fn warn(&mut self, args: fmt::Arguments<'_>) {
        self.log(Level::Warning, args);
    }

    /// Emit at [`Level::Error`].
    pub fn error(&mut self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    /// Borrow the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutably borrow the sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Give the sink back.
    pub fn into_sink(self) -> S {
        self.sink
    }
}
