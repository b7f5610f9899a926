//! Direction classification from decoder snapshots.
//!
//! Two rules are supported:
//!
//! - **Simple**: the raw flag alone decides; never reports [`Direction::Stationary`].
//! - **Validated**: a direction is only reported when the decoder confirms a
//!   phase transition, otherwise [`Direction::Stationary`].
//!
//! The simple rule has lower latency but can misreport direction from a
//! residual single-edge reading when the shaft is at rest.

use crate::types::{DecoderState, Direction, RawDirection};

/// Classification rule selected by the board variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClassifierMode {
    Simple,
    Validated,
}

impl ClassifierMode {
    /// Classify a decoder snapshot using this rule.
    #[inline]
    #[must_use]
    pub fn classify(self, state: &DecoderState) -> Direction {
        match self {
            ClassifierMode::Simple => classify_simple(state.direction),
            ClassifierMode::Validated => classify_validated(state.direction, state.validity),
        }
    }
}

/// Simple rule: flag 1 is clockwise, anything else counter-clockwise.
#[inline]
#[must_use]
pub const fn classify_simple(direction: RawDirection) -> Direction {
    match direction {
        RawDirection::Clockwise => Direction::Clockwise,
        RawDirection::CounterClockwise => Direction::CounterClockwise,
    }
}

/// Validated rule: direction only when `valid`, otherwise stationary.
#[inline]
#[must_use]
pub const fn classify_validated(direction: RawDirection, valid: bool) -> Direction {
    if !valid {
        return Direction::Stationary;
    }
    classify_simple(direction)
}
