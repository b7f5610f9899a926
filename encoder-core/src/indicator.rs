//! Direction indicator outputs.

use embedded_hal::digital::OutputPin;

use crate::types::{Direction, IndicatorState};

/// Whether an indicator is lit by driving its pin high or low.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveLevel {
    High,
    Low,
}

impl ActiveLevel {
    /// Pin level (`true` = high) that represents the logical state `on`.
    #[inline]
    #[must_use]
    pub const fn level_for(self, on: bool) -> bool {
        match self {
            ActiveLevel::High => on,
            ActiveLevel::Low => !on,
        }
    }
}

/// Error type for indicator operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IndicatorError {
    /// Driving indicator A failed.
    PinA,
    /// Driving indicator B failed.
    PinB,
}

/// Drives the two direction indicators.
///
/// Indicator A marks clockwise rotation, indicator B counter-clockwise.
/// Both pins are rewritten on every call, so a missed update never leaves
/// stale state behind.
pub struct IndicatorDriver<A, B> {
    led_a: A,
    led_b: B,
    active: ActiveLevel,
    state: IndicatorState,
}

impl<A: OutputPin, B: OutputPin> IndicatorDriver<A, B> {
    /// Wrap two output pins, switching both indicators off.
    pub fn new(led_a: A, led_b: B, active: ActiveLevel) -> Self {
        let mut driver = Self {
            led_a,
            led_b,
            active,
            state: IndicatorState::OFF,
        };
        // Power-on level is board dependent; a failure here resurfaces on the first update.
        let _ = driver.apply(IndicatorState::OFF);
        driver
    }

    /// Show `direction` on the indicators.
    pub fn set_indicators(&mut self, direction: Direction) -> Result<IndicatorState, IndicatorError> {
        let state = IndicatorState::for_direction(direction);
        self.apply(state)?;
        Ok(state)
    }

    /// Last state written to the pins.
    #[inline]
    #[must_use]
    pub fn state(&self) -> IndicatorState {
        self.state
    }

    /// Configured polarity.
    #[inline]
    #[must_use]
    pub fn active_level(&self) -> ActiveLevel {
        self.active
    }

    /// Release the pins.
    pub fn free(self) -> (A, B) {
        (self.led_a, self.led_b)
    }

    fn apply(&mut self, state: IndicatorState) -> Result<(), IndicatorError> {
        let a = drive(&mut self.led_a, self.active.level_for(state.led_a));
        let b = drive(&mut self.led_b, self.active.level_for(state.led_b));
        a.map_err(|()| IndicatorError::PinA)?;
        b.map_err(|()| IndicatorError::PinB)?;
        self.state = state;
        Ok(())
    }
}

fn drive<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), ()> {
    let result = if high { pin.set_high() } else { pin.set_low() };
    result.map_err(|_| ())
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorKind, ErrorType};
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone)]
    struct MockPin {
        high: Rc<Cell<bool>>,
        writes: Rc<Cell<usize>>,
    }

    impl MockPin {
        fn new(high: bool) -> Self {
            Self {
                high: Rc::new(Cell::new(high)),
                writes: Rc::new(Cell::new(0)),
            }
        }
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high.set(false);
            self.writes.set(self.writes.get() + 1);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high.set(true);
            self.writes.set(self.writes.get() + 1);
            Ok(())
        }
    }

    struct BrokenPin;

    impl ErrorType for BrokenPin {
        type Error = ErrorKind;
    }

    impl OutputPin for BrokenPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Err(ErrorKind::Other)
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Err(ErrorKind::Other)
        }
    }

    #[test]
    fn test_new_switches_indicators_off() {
        let (a, b) = (MockPin::new(true), MockPin::new(true));
        let driver = IndicatorDriver::new(a.clone(), b.clone(), ActiveLevel::High);
        assert!(!a.high.get());
        assert!(!b.high.get());
        assert_eq!(driver.state(), IndicatorState::OFF);

        let (a, b) = (MockPin::new(false), MockPin::new(false));
        let _driver = IndicatorDriver::new(a.clone(), b.clone(), ActiveLevel::Low);
        assert!(a.high.get());
        assert!(b.high.get());
    }

    #[test]
    fn test_active_high_mapping() {
        let (a, b) = (MockPin::new(false), MockPin::new(false));
        let mut driver = IndicatorDriver::new(a.clone(), b.clone(), ActiveLevel::High);

        driver.set_indicators(Direction::Clockwise).unwrap();
        assert_eq!((a.high.get(), b.high.get()), (true, false));

        driver.set_indicators(Direction::CounterClockwise).unwrap();
        assert_eq!((a.high.get(), b.high.get()), (false, true));

        driver.set_indicators(Direction::Stationary).unwrap();
        assert_eq!((a.high.get(), b.high.get()), (false, false));
    }

    #[test]
    fn test_active_low_inverts_levels() {
        let (a, b) = (MockPin::new(false), MockPin::new(false));
        let mut driver = IndicatorDriver::new(a.clone(), b.clone(), ActiveLevel::Low);

        let state = driver.set_indicators(Direction::Clockwise).unwrap();
        assert!(state.led_a && !state.led_b);
        assert_eq!((a.high.get(), b.high.get()), (false, true));

        driver.set_indicators(Direction::Stationary).unwrap();
        assert_eq!((a.high.get(), b.high.get()), (true, true));
    }

    #[test]
    fn test_rewrites_pins_even_without_change() {
        let (a, b) = (MockPin::new(false), MockPin::new(false));
        let mut driver = IndicatorDriver::new(a.clone(), b.clone(), ActiveLevel::High);
        let before = (a.writes.get(), b.writes.get());

        driver.set_indicators(Direction::Clockwise).unwrap();
        driver.set_indicators(Direction::Clockwise).unwrap();

        assert_eq!(a.writes.get(), before.0 + 2);
        assert_eq!(b.writes.get(), before.1 + 2);
    }

    #[test]
    fn test_pin_failure_is_reported() {
        let b = MockPin::new(false);
        let mut driver = IndicatorDriver::new(BrokenPin, b.clone(), ActiveLevel::High);

        let result = driver.set_indicators(Direction::CounterClockwise);
        assert_eq!(result, Err(IndicatorError::PinA));
        // The healthy pin is still driven
        assert!(b.high.get());
        // Failed writes leave the last confirmed state
        assert_eq!(driver.state(), IndicatorState::OFF);
    }
}
