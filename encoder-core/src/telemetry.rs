//! Throttled text telemetry.
//!
//! Capture events can fire far faster than a serial console drains. Reports
//! are therefore paced by a separate fixed-frequency period-match event: each
//! firing bumps [`ReportThrottle`]'s counter, and at most one line is written
//! per firing, always describing the latest sample.

use core::fmt::Write;

use heapless::String;

/// Maximum length of a single telemetry line (including `\r\n`).
pub const MAX_LINE_LENGTH: usize = 64;

/// A formatted telemetry line.
pub type Line = String<MAX_LINE_LENGTH>;

/// Banner rule written around the startup title.
pub const BANNER_RULE: &str = "======================== \r\n";

/// Startup title.
pub const BANNER_TITLE: &str = "XMC POSIF QD example \r\n";

/// Written instead of the banner in debug report mode.
pub const DEBUG_INIT_DONE: &str = "Initialization done\r\n";

/// Written once, after the first indicator update, in debug report mode.
pub const DEBUG_LED_ON: &str = "Direction LED Turned on\r\n";

/// Written once, on the first throttled report, in debug report mode.
pub const DEBUG_RESULTS: &str = "Results printed\r\n";

/// Error type for telemetry operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryError {
    /// Write to the text channel failed.
    Io,
    /// Line did not fit into the format buffer.
    Overflow,
}

/// Fire-and-forget text channel (typically a debug UART).
pub trait TelemetrySink {
    /// Write `text` verbatim. May block until the channel accepts it.
    fn write_str(&mut self, text: &str) -> Result<(), TelemetryError>;
}

/// Counts report-timer firings and gates report emission.
///
/// `pulse_counter` starts at 0 and `previous` at -1. A report is due when a
/// firing moves the counter away from the snapshot taken at the end of the
/// previous iteration; the snapshot is resynced every iteration, report or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReportThrottle {
    pulse_counter: i32,
    previous: i32,
}

impl Default for ReportThrottle {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportThrottle {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pulse_counter: 0,
            previous: -1,
        }
    }

    /// Record one report-timer firing. Returns whether a report is due.
    #[must_use]
    pub fn on_period_match(&mut self) -> bool {
        self.pulse_counter = self.pulse_counter.wrapping_add(1);
        self.previous != self.pulse_counter
    }

    /// End-of-iteration resync of the snapshot.
    #[inline]
    pub fn resync(&mut self) {
        self.previous = self.pulse_counter;
    }

    /// One full iteration: optional firing, then resync.
    ///
    /// Returns whether a report is due in this iteration.
    #[must_use]
    pub fn step(&mut self, period_match: bool) -> bool {
        let due = period_match && self.on_period_match();
        self.resync();
        due
    }

    /// Number of report-timer firings seen so far.
    #[inline]
    #[must_use]
    pub const fn pulse_counter(&self) -> i32 {
        self.pulse_counter
    }

    /// Counter value recorded at the end of the last iteration.
    #[inline]
    #[must_use]
    pub const fn previous(&self) -> i32 {
        self.previous
    }
}

/// `"POSITION: %5d INTERVAL: %lu\r\n"`
pub fn format_position_line(position_ticks: u16, interval_ns: u32) -> Result<Line, TelemetryError> {
    let mut line = Line::new();
    write!(line, "POSITION: {position_ticks:5} INTERVAL: {interval_ns}\r\n")
        .map_err(|_| TelemetryError::Overflow)?;
    Ok(line)
}

/// `" Index signal time period: %luus\r\n"`
pub fn format_index_line(period_us: u32) -> Result<Line, TelemetryError> {
    let mut line = Line::new();
    write!(line, " Index signal time period: {period_us}us\r\n")
        .map_err(|_| TelemetryError::Overflow)?;
    Ok(line)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::vec::Vec;

    #[test]
    fn test_throttle_counter_sequence() {
        // Firings on iterations 3 and 5 give the counter sequence [0, 0, 1, 1, 2]
        let mut throttle = ReportThrottle::new();
        let firings = [false, false, true, false, true];

        let mut counters = Vec::new();
        let mut reports = Vec::new();
        for (i, fired) in firings.into_iter().enumerate() {
            if throttle.step(fired) {
                reports.push(i + 1);
            }
            counters.push(throttle.pulse_counter());
        }

        assert_eq!(counters, [0, 0, 1, 1, 2]);
        assert_eq!(reports, [3, 5]);
    }

    #[test]
    fn test_throttle_unchanged_counter_never_reports() {
        let mut throttle = ReportThrottle::new();
        assert!(throttle.step(true));
        for _ in 0..10 {
            assert!(!throttle.step(false));
        }
        assert_eq!(throttle.previous(), throttle.pulse_counter());
    }

    #[test]
    fn test_throttle_initial_state() {
        let throttle = ReportThrottle::default();
        assert_eq!(throttle.pulse_counter(), 0);
        assert_eq!(throttle.previous(), -1);
    }

    #[test]
    fn test_throttle_resyncs_every_iteration() {
        let mut throttle = ReportThrottle::new();
        throttle.resync();
        assert_eq!(throttle.previous(), 0);
        assert!(throttle.on_period_match());
        throttle.resync();
        assert_eq!(throttle.previous(), 1);
    }

    #[test]
    fn test_throttle_counter_wraps() {
        let mut throttle = ReportThrottle {
            pulse_counter: i32::MAX,
            previous: i32::MAX,
        };
        assert!(throttle.step(true));
        assert_eq!(throttle.pulse_counter(), i32::MIN);
    }

    #[test]
    fn test_position_line_format() {
        assert_eq!(
            format_position_line(42, 10_000).unwrap().as_str(),
            "POSITION:    42 INTERVAL: 10000\r\n"
        );
        assert_eq!(
            format_position_line(0, 0).unwrap().as_str(),
            "POSITION:     0 INTERVAL: 0\r\n"
        );
        assert_eq!(
            format_position_line(u16::MAX, u32::MAX).unwrap().as_str(),
            "POSITION: 65535 INTERVAL: 4294967295\r\n"
        );
    }

    #[test]
    fn test_index_line_format() {
        assert_eq!(
            format_index_line(20).unwrap().as_str(),
            " Index signal time period: 20us\r\n"
        );
        assert_eq!(
            format_index_line(u32::MAX).unwrap().as_str(),
            " Index signal time period: 4294967295us\r\n"
        );
    }
}
