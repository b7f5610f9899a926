//! Core encoder types: Direction, DecoderState, PositionSample, IndexPeriod.

/// Rotation direction as classified from a decoder snapshot.
///
/// `Stationary` is only ever produced by the validated classification rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Clockwise,
    CounterClockwise,
    Stationary,
}

/// Raw direction flag reported by the decoder peripheral.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RawDirection {
    /// Flag value 1.
    Clockwise,
    /// Flag value 0.
    CounterClockwise,
}

impl RawDirection {
    /// Interpret a raw decoder flag: `1` is clockwise, anything else counter-clockwise.
    #[inline]
    #[must_use]
    pub const fn from_flag(flag: u8) -> Self {
        if flag == 1 {
            Self::Clockwise
        } else {
            Self::CounterClockwise
        }
    }

    /// The raw flag value (`1` or `0`).
    #[inline]
    #[must_use]
    pub const fn flag(self) -> u8 {
        match self {
            Self::Clockwise => 1,
            Self::CounterClockwise => 0,
        }
    }
}

/// Which edge of the trigger signal latched a capture register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureEdge {
    Rising,
    Falling,
}

/// A single latched capture value.
///
/// Not buffered: a newer hardware event overwrites an unread one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureEvent {
    pub raw_count: u16,
    pub captured_at_edge: CaptureEdge,
}

/// Snapshot of the decoder peripheral, taken right after a capture event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecoderState {
    pub direction: RawDirection,
    /// A confirmed phase transition backs the direction flag.
    pub validity: bool,
    /// Phase edges were seen since the previous snapshot.
    pub is_pulsing: bool,
}

impl DecoderState {
    #[must_use]
    pub const fn new(direction: RawDirection, validity: bool, is_pulsing: bool) -> Self {
        Self {
            direction,
            validity,
            is_pulsing,
        }
    }
}

/// Position counter and inter-tick interval, both in raw timer units.
///
/// Only meaningful in the iteration that captured them; afterwards they are
/// kept purely as last-known display data.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PositionSample {
    pub position_ticks: u16,
    pub interval_ticks: u16,
}

impl PositionSample {
    #[must_use]
    pub const fn new(position_ticks: u16, interval_ticks: u16) -> Self {
        Self {
            position_ticks,
            interval_ticks,
        }
    }
}

/// Time between two index pulses (one revolution).
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IndexPeriod {
    pub microseconds: u32,
}

/// Logical state of the two direction indicators.
///
/// At most one of the two is on.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IndicatorState {
    pub led_a: bool,
    pub led_b: bool,
}

impl IndicatorState {
    /// Both indicators off.
    pub const OFF: Self = Self {
        led_a: false,
        led_b: false,
    };

    /// Map a classified direction to indicator state.
    #[must_use]
    pub const fn for_direction(direction: Direction) -> Self {
        match direction {
            Direction::Clockwise => Self {
                led_a: true,
                led_b: false,
            },
            Direction::CounterClockwise => Self {
                led_a: false,
                led_b: true,
            },
            Direction::Stationary => Self::OFF,
        }
    }
}
