//! Session stopwatch for babylog.
//!
//! A monotonic elapsed-time tracker with start/pause/reset/resume semantics.
//! The authoritative elapsed value is always derived from wall-clock
//! timestamps; any display refresh cadence is a rendering concern that never
//! affects the value. The wall clock sits behind the [`Clock`] trait so the
//! arithmetic stays testable without a scheduler.

use chrono::Utc;

/// Source of wall-clock milliseconds.
pub trait Clock: Send + Sync {
    /// Current wall-clock time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// An elapsed-time stopwatch.
///
/// Invariant: the accumulated base only advances on pause; reset zeroes both
/// the base and the start reference.
pub struct Stopwatch {
    clock: Box<dyn Clock>,
    running: bool,
    base_ms: i64,
    started_at_ms: i64,
}

impl std::fmt::Debug for Stopwatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stopwatch")
            .field("running", &self.running)
            .field("base_ms", &self.base_ms)
            .field("started_at_ms", &self.started_at_ms)
            .finish_non_exhaustive()
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a stopwatch driven by the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    /// Create a stopwatch driven by a custom clock.
    #[must_use]
    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            running: false,
            base_ms: 0,
            started_at_ms: 0,
        }
    }

    /// Whether the stopwatch is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start (or resume) the stopwatch. No-op while already running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.started_at_ms = self.clock.now_ms();
        self.running = true;
    }

    /// Pause the stopwatch, freezing the elapsed value into the accumulated
    /// base. No-op unless running.
    pub fn pause(&mut self) {
        if !self.running {
            return;
        }
        self.base_ms += self.clock.now_ms() - self.started_at_ms;
        self.running = false;
    }

    /// Reset to idle from any state.
    pub fn reset(&mut self) {
        self.base_ms = 0;
        self.started_at_ms = 0;
        self.running = false;
    }

    /// Current elapsed milliseconds, wall-clock derived.
    #[must_use]
    pub fn elapsed_ms(&self) -> i64 {
        if self.running {
            self.base_ms + (self.clock.now_ms() - self.started_at_ms)
        } else {
            self.base_ms
        }
    }

    /// Merge the current elapsed value into a note, see [`append_duration`].
    #[must_use]
    pub fn merge_into_note(&self, text: &str) -> String {
        append_duration(text, self.elapsed_ms())
    }
}

/// Format elapsed milliseconds as zero-padded `HH:MM:SS`, truncating the
/// sub-second remainder.
#[must_use]
pub fn format_elapsed(total_ms: i64) -> String {
    let total_seconds = total_ms.max(0) / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Append `"Session duration HH:MM:SS"` to a note, separated by `". "`.
///
/// Returns the input unchanged when the elapsed value is zero or the exact
/// phrase is already present, so repeated clicks never duplicate it.
#[must_use]
pub fn append_duration(text: &str, elapsed_ms: i64) -> String {
    if elapsed_ms <= 0 {
        return text.to_string();
    }
    let phrase = format!("Session duration {}", format_elapsed(elapsed_ms));
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return phrase;
    }
    if trimmed.contains(&phrase) {
        return text.to_string();
    }
    format!("{trimmed}. {phrase}")
}
