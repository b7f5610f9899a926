//! Polled software capture unit.
//!
//! Implements [`CaptureSource`] and [`QuadratureDecoder`] on top of plain
//! digital inputs and a monotonic tick counter, for boards without a hardware
//! position interface. Every `poll_event` samples the pins and advances the
//! emulated timers, so the decode loop's busy polling is also what drives the
//! decoder.
//!
//! Channels behave like latched hardware events: one pending event per
//! channel, no queuing, and a newer match overwrites the latched registers.

use embedded_hal::digital::InputPin;

use crate::capture::{Channel, CaptureSource, QuadratureDecoder, CAPTURE_REGISTER};
use crate::types::{CaptureEdge, CaptureEvent, DecoderState, RawDirection};

/// Monotonic tick counter.
pub trait TickSource {
    /// Ticks since an arbitrary epoch. Must never go backwards.
    fn now_ticks(&self) -> u64;
}

/// Result of comparing two consecutive phase samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// No phase changed.
    Hold,
    /// One quarter step clockwise.
    Forward,
    /// One quarter step counter-clockwise.
    Backward,
    /// Both phases changed at once; a step was missed.
    Illegal,
}

/// Pack phase levels into a 2-bit Gray-code state (`A` is the high bit).
#[inline]
#[must_use]
pub const fn phase_state(a: bool, b: bool) -> u8 {
    ((a as u8) << 1) | b as u8
}

/// Classify the transition between two 2-bit phase states.
///
/// Clockwise order is `00 -> 10 -> 11 -> 01 -> 00` (A leads B).
#[must_use]
pub const fn step(prev: u8, curr: u8) -> Step {
    match ((prev & 0b11) << 2) | (curr & 0b11) {
        0b0000 | 0b0101 | 0b1010 | 0b1111 => Step::Hold,
        0b0010 | 0b1011 | 0b1101 | 0b0100 => Step::Forward,
        0b0001 | 0b0111 | 0b1110 | 0b1000 => Step::Backward,
        _ => Step::Illegal,
    }
}

/// Emulated period-match timer with a single latched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeriodMatch {
    period: u64,
    deadline: u64,
    pending: bool,
}

impl PeriodMatch {
    /// Start a timer that first matches `period` ticks after `now`.
    ///
    /// A zero period is treated as one tick.
    #[must_use]
    pub const fn new(period: u64, now: u64) -> Self {
        let period = if period == 0 { 1 } else { period };
        Self {
            period,
            deadline: now + period,
            pending: false,
        }
    }

    /// Advance to `now`. Returns whether at least one match occurred.
    ///
    /// Matches missed while the event was still pending collapse into it.
    pub fn poll(&mut self, now: u64) -> bool {
        if now < self.deadline {
            return false;
        }
        let missed = (now - self.deadline) / self.period;
        self.deadline += (missed + 1) * self.period;
        self.pending = true;
        true
    }

    #[inline]
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    #[inline]
    pub fn clear(&mut self) {
        self.pending = false;
    }
}

/// Timing parameters for [`SoftCapture`], all in [`TickSource`] ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SoftCaptureConfig {
    /// Period of the position sampling trigger.
    pub sample_period: u64,
    /// Period of the report-throttle timer.
    pub report_period: u64,
    /// Divider applied to inter-tick intervals before truncation to 16 bits.
    pub interval_prescaler: u32,
    /// Divider applied to index periods before truncation to 16 bits.
    pub index_prescaler: u32,
}

/// Software quadrature decoder and capture timers.
pub struct SoftCapture<PA, PB, PI, K> {
    phase_a: PA,
    phase_b: PB,
    index: Option<PI>,
    clock: K,
    config: SoftCaptureConfig,

    phase: u8,
    position: u16,
    direction: RawDirection,
    legal: bool,
    pulsing: bool,
    last_edge: Option<u64>,
    interval: u16,

    sample_timer: PeriodMatch,
    report_timer: PeriodMatch,
    position_latch: CaptureEvent,
    interval_latch: CaptureEvent,

    index_level: bool,
    last_index: Option<u64>,
    index_latch: CaptureEvent,
    index_pending: bool,
}

impl<PA, PB, PI, K> SoftCapture<PA, PB, PI, K>
where
    PA: InputPin,
    PB: InputPin,
    PI: InputPin,
    K: TickSource,
{
    /// Create a capture unit and start its timers.
    ///
    /// `index` is only needed for index period measurement.
    pub fn new(
        mut phase_a: PA,
        mut phase_b: PB,
        mut index: Option<PI>,
        clock: K,
        config: SoftCaptureConfig,
    ) -> Self {
        let now = clock.now_ticks();
        let a = phase_a.is_high().unwrap_or(false);
        let b = phase_b.is_high().unwrap_or(false);
        let index_level = index
            .as_mut()
            .and_then(|pin| pin.is_high().ok())
            .unwrap_or(false);
        let empty = |edge| CaptureEvent {
            raw_count: 0,
            captured_at_edge: edge,
        };

        Self {
            phase_a,
            phase_b,
            index,
            clock,
            config,
            phase: phase_state(a, b),
            position: 0,
            direction: RawDirection::CounterClockwise,
            legal: false,
            pulsing: false,
            last_edge: None,
            interval: 0,
            sample_timer: PeriodMatch::new(config.sample_period, now),
            report_timer: PeriodMatch::new(config.report_period, now),
            position_latch: empty(CaptureEdge::Falling),
            interval_latch: empty(CaptureEdge::Rising),
            index_level,
            last_index: None,
            index_latch: empty(CaptureEdge::Rising),
            index_pending: false,
        }
    }

    /// Sample inputs and advance timers.
    pub fn sample(&mut self) {
        let now = self.clock.now_ticks();
        self.sample_phases(now);
        self.sample_index(now);

        if self.sample_timer.poll(now) {
            self.position_latch.raw_count = self.position;
            self.interval_latch.raw_count = self.interval;
        }
        self.report_timer.poll(now);
    }

    fn sample_phases(&mut self, now: u64) {
        let (Ok(a), Ok(b)) = (self.phase_a.is_high(), self.phase_b.is_high()) else {
            return;
        };
        let curr = phase_state(a, b);

        let direction = match step(self.phase, curr) {
            Step::Hold => return,
            Step::Illegal => {
                #[cfg(feature = "defmt")]
                defmt::trace!("quadrature: illegal transition {=u8} -> {=u8}", self.phase, curr);
                self.phase = curr;
                self.legal = false;
                self.pulsing = true;
                return;
            }
            Step::Forward => {
                self.position = self.position.wrapping_add(1);
                RawDirection::Clockwise
            }
            Step::Backward => {
                self.position = self.position.wrapping_sub(1);
                RawDirection::CounterClockwise
            }
        };

        self.phase = curr;
        self.direction = direction;
        self.legal = true;
        self.pulsing = true;
        if let Some(last) = self.last_edge {
            self.interval = scale(now - last, self.config.interval_prescaler);
        }
        self.last_edge = Some(now);
    }

    fn sample_index(&mut self, now: u64) {
        let Some(pin) = self.index.as_mut() else {
            return;
        };
        let Ok(level) = pin.is_high() else {
            return;
        };

        let rising = level && !self.index_level;
        self.index_level = level;
        if !rising {
            return;
        }

        // First edge only arms the period measurement
        if let Some(last) = self.last_index {
            self.index_latch.raw_count = scale(now - last, self.config.index_prescaler);
            self.index_pending = true;
        }
        self.last_index = Some(now);
    }

    /// Current (unlatched) position counter.
    #[inline]
    #[must_use]
    pub fn position(&self) -> u16 {
        self.position
    }

    /// Latched capture for a register channel, if it has one.
    #[must_use]
    pub fn latched(&self, channel: Channel) -> Option<CaptureEvent> {
        match channel {
            Channel::PositionCounter => Some(self.position_latch),
            Channel::TickInterval => Some(self.interval_latch),
            Channel::IndexTimer => Some(self.index_latch),
            Channel::PositionTrigger | Channel::ReportTimer => None,
        }
    }

    /// Release the pins and clock.
    pub fn free(self) -> (PA, PB, Option<PI>, K) {
        (self.phase_a, self.phase_b, self.index, self.clock)
    }
}

/// Divide and truncate to the 16-bit capture register width.
#[inline]
fn scale(ticks: u64, prescaler: u32) -> u16 {
    (ticks / u64::from(prescaler.max(1))) as u16
}

impl<PA, PB, PI, K> CaptureSource for SoftCapture<PA, PB, PI, K>
where
    PA: InputPin,
    PB: InputPin,
    PI: InputPin,
    K: TickSource,
{
    fn poll_event(&mut self, channel: Channel) -> bool {
        self.sample();
        match channel {
            Channel::PositionTrigger => self.sample_timer.is_pending(),
            Channel::ReportTimer => self.report_timer.is_pending(),
            Channel::IndexTimer => self.index_pending,
            Channel::PositionCounter | Channel::TickInterval => false,
        }
    }

    fn clear_event(&mut self, channel: Channel) {
        match channel {
            Channel::PositionTrigger => self.sample_timer.clear(),
            Channel::ReportTimer => self.report_timer.clear(),
            Channel::IndexTimer => self.index_pending = false,
            Channel::PositionCounter | Channel::TickInterval => {}
        }
    }

    /// Only [`CAPTURE_REGISTER`] latches values; other registers read zero.
    fn read_capture(&self, channel: Channel, register: u8) -> u16 {
        if register != CAPTURE_REGISTER {
            return 0;
        }
        self.latched(channel).map_or(0, |event| event.raw_count)
    }
}

impl<PA, PB, PI, K> QuadratureDecoder for SoftCapture<PA, PB, PI, K>
where
    PA: InputPin,
    PB: InputPin,
    PI: InputPin,
    K: TickSource,
{
    fn read_state(&mut self) -> DecoderState {
        let state = DecoderState::new(self.direction, self.legal && self.pulsing, self.pulsing);
        self.pulsing = false;
        state
    }
}
