//! DecodeLoop: polls capture events, drives indicators, throttles telemetry.

use embedded_hal::digital::OutputPin;

use crate::capture::{Channel, CaptureSource, QuadratureDecoder, CAPTURE_REGISTER};
use crate::config::{BoardConfig, ReportMode, Variant};
use crate::indicator::{IndicatorDriver, IndicatorError};
use crate::telemetry::{
    format_index_line, format_position_line, ReportThrottle, TelemetryError, TelemetrySink,
    BANNER_RULE, BANNER_TITLE, DEBUG_INIT_DONE, DEBUG_LED_ON, DEBUG_RESULTS,
};
use crate::types::{Direction, IndexPeriod, PositionSample};

/// Outcome of a single loop iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Iteration {
    /// Direction classified in this iteration, if a capture event fired.
    pub direction: Option<Direction>,
    /// Whether a report was written to the telemetry sink.
    pub reported: bool,
}

/// Error type for decode loop iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopError {
    /// Error from the indicator outputs.
    Indicator(IndicatorError),
    /// Error from the telemetry sink.
    Telemetry(TelemetryError),
}

impl From<IndicatorError> for LoopError {
    fn from(err: IndicatorError) -> Self {
        LoopError::Indicator(err)
    }
}

impl From<TelemetryError> for LoopError {
    fn from(err: TelemetryError) -> Self {
        LoopError::Telemetry(err)
    }
}

/// The event-driven decode-and-report loop.
///
/// Each iteration tests the capture event of the configured [`Variant`] first,
/// then the report-timer event. Either, both or neither may fire. The loop
/// busy-polls and never suspends.
///
/// # Error Handling
///
/// A failing branch does not abort the iteration: both branches still run and
/// the throttle is still resynced. The first error is returned for testing;
/// [`DecodeLoop::run`] drops it.
pub struct DecodeLoop<P, A, B, S> {
    peripherals: P,
    indicators: IndicatorDriver<A, B>,
    sink: S,
    config: BoardConfig,
    throttle: ReportThrottle,
    sample: PositionSample,
    index_period: IndexPeriod,
    led_marker_written: bool,
    results_marker_written: bool,
}

impl<P, A, B, S> DecodeLoop<P, A, B, S>
where
    P: CaptureSource + QuadratureDecoder,
    A: OutputPin,
    B: OutputPin,
    S: TelemetrySink,
{
    /// Create a loop over already started peripherals.
    pub fn new(
        peripherals: P,
        indicators: IndicatorDriver<A, B>,
        sink: S,
        config: BoardConfig,
    ) -> Self {
        Self {
            peripherals,
            indicators,
            sink,
            config,
            throttle: ReportThrottle::new(),
            sample: PositionSample::default(),
            index_period: IndexPeriod::default(),
            led_marker_written: false,
            results_marker_written: false,
        }
    }

    /// Write the startup banner.
    pub fn start(&mut self) -> Result<(), TelemetryError> {
        match self.config.report_mode {
            ReportMode::Telemetry => {
                self.sink.write_str(BANNER_RULE)?;
                self.sink.write_str(BANNER_TITLE)?;
                self.sink.write_str(BANNER_RULE)
            }
            ReportMode::Debug => self.sink.write_str(DEBUG_INIT_DONE),
        }
    }

    /// Run the loop forever.
    pub fn run(&mut self) -> ! {
        loop {
            if let Err(_e) = self.poll_once() {
                #[cfg(feature = "defmt")]
                defmt::warn!("decode loop: {:?}", _e);
            }
        }
    }

    /// Run a single iteration.
    pub fn poll_once(&mut self) -> Result<Iteration, LoopError> {
        let mut iteration = Iteration::default();

        let channel = self.config.variant.capture_channel();
        let capture = if self.peripherals.poll_event(channel) {
            self.peripherals.clear_event(channel);
            let direction = self.capture();
            iteration.direction = Some(direction);
            self.show(direction)
        } else {
            Ok(())
        };

        let period_match = self.peripherals.poll_event(Channel::ReportTimer);
        let report = if self.throttle.step(period_match) {
            iteration.reported = true;
            self.report()
        } else {
            Ok(())
        };
        if period_match {
            self.peripherals.clear_event(Channel::ReportTimer);
        }

        capture?;
        report?;
        Ok(iteration)
    }

    /// Latch the capture registers and classify direction.
    fn capture(&mut self) -> Direction {
        match self.config.variant {
            Variant::Continuous => {
                self.sample = PositionSample::new(
                    self.peripherals
                        .read_capture(Channel::PositionCounter, CAPTURE_REGISTER),
                    self.peripherals
                        .read_capture(Channel::TickInterval, CAPTURE_REGISTER),
                );
            }
            Variant::IndexPeriod => {
                let raw = self
                    .peripherals
                    .read_capture(Channel::IndexTimer, CAPTURE_REGISTER);
                self.index_period = self.config.timing.index_period(raw);
            }
        }

        // Decoder is read after the event so the flag is not stale
        let state = self.peripherals.read_state();
        self.config.classifier.classify(&state)
    }

    fn show(&mut self, direction: Direction) -> Result<(), LoopError> {
        let previous = self.indicators.state();
        let shown = self.indicators.set_indicators(direction);
        if let Ok(state) = shown {
            if state != previous {
                #[cfg(feature = "defmt")]
                defmt::debug!("direction: {:?}", direction);
            }
        }

        // Marker follows the classified direction, not the pin writes
        let marker = if self.config.report_mode == ReportMode::Debug && !self.led_marker_written {
            self.led_marker_written = true;
            self.sink.write_str(DEBUG_LED_ON)
        } else {
            Ok(())
        };

        shown?;
        marker?;
        Ok(())
    }

    fn report(&mut self) -> Result<(), LoopError> {
        match self.config.report_mode {
            ReportMode::Telemetry => {
                let line = match self.config.variant {
                    Variant::Continuous => format_position_line(
                        self.sample.position_ticks,
                        self.config.timing.interval_ns(self.sample.interval_ticks),
                    )?,
                    Variant::IndexPeriod => format_index_line(self.index_period.microseconds)?,
                };
                #[cfg(feature = "defmt")]
                defmt::trace!("report: {=str}", line.as_str());
                self.sink.write_str(&line)?;
            }
            ReportMode::Debug => {
                if !self.results_marker_written {
                    self.results_marker_written = true;
                    self.sink.write_str(DEBUG_RESULTS)?;
                }
            }
        }
        Ok(())
    }

    /// Last captured position sample.
    #[inline]
    #[must_use]
    pub fn sample(&self) -> PositionSample {
        self.sample
    }

    /// Last measured index period.
    #[inline]
    #[must_use]
    pub fn index_period(&self) -> IndexPeriod {
        self.index_period
    }

    /// Report throttle state.
    #[inline]
    #[must_use]
    pub fn throttle(&self) -> &ReportThrottle {
        &self.throttle
    }

    /// Get a reference to the indicator driver.
    pub fn indicators(&self) -> &IndicatorDriver<A, B> {
        &self.indicators
    }

    /// Get a reference to the capture peripherals.
    pub fn peripherals(&self) -> &P {
        &self.peripherals
    }

    /// Get a mutable reference to the capture peripherals.
    pub fn peripherals_mut(&mut self) -> &mut P {
        &mut self.peripherals
    }

    /// Get a reference to the telemetry sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Decompose the loop into its peripherals, indicators and sink.
    pub fn into_parts(self) -> (P, IndicatorDriver<A, B>, S) {
        (self.peripherals, self.indicators, self.sink)
    }
}
