//! Capture source and decoder traits.

use crate::types::DecoderState;

/// Capture register index the decode loop reads latched values from.
pub const CAPTURE_REGISTER: u8 = 1;

/// Logical timer/capture channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Periodic sampling trigger; its event latches position and interval.
    PositionTrigger,
    /// Position counter capture register.
    PositionCounter,
    /// Time between position ticks capture register.
    TickInterval,
    /// Index pulse period capture; event and register.
    IndexTimer,
    /// Fixed-frequency period-match timer used to throttle telemetry.
    ReportTimer,
}

/// Timer/capture peripheral as seen by the decode loop.
///
/// Each channel latches at most one pending event. A new event cannot be
/// observed until the pending one is cleared, and nothing is queued.
pub trait CaptureSource {
    /// Whether an event is pending on `channel`.
    fn poll_event(&mut self, channel: Channel) -> bool;

    /// Acknowledge the pending event on `channel`.
    ///
    /// Must be called exactly once per observed event.
    fn clear_event(&mut self, channel: Channel);

    /// Read a latched 16-bit capture register.
    ///
    /// Only meaningful after the channel's event was observed; the value stays
    /// stable until the next capture.
    fn read_capture(&self, channel: Channel, register: u8) -> u16;
}

/// Quadrature decoder peripheral.
pub trait QuadratureDecoder {
    /// Snapshot the current direction flag and validity.
    ///
    /// Called after a capture event fires, never before, so the flag is not stale.
    fn read_state(&mut self) -> DecoderState;
}
