//! Conversion of raw timer counts into physical time.

use core::num::NonZeroU32;

use crate::types::IndexPeriod;

/// Error type for board configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Index timer prescaler was zero.
    ZeroPrescaler,
    /// Timer clock frequency was zero.
    ZeroClock,
}

/// Timer scale factors for one board.
///
/// The divisors are non-zero by construction, so [`TimingConfig::index_period`]
/// is always defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingConfig {
    /// Duration of one interval-timer tick in nanoseconds.
    pub tick_period_ns: u32,
    /// Index timer prescaler.
    pub prescaler: NonZeroU32,
    /// Index timer input clock in MHz.
    pub clock_mhz: NonZeroU32,
}

impl TimingConfig {
    #[must_use]
    pub const fn new(tick_period_ns: u32, prescaler: NonZeroU32, clock_mhz: NonZeroU32) -> Self {
        Self {
            tick_period_ns,
            prescaler,
            clock_mhz,
        }
    }

    /// Build from plain integers, rejecting zero divisors.
    pub const fn try_new(
        tick_period_ns: u32,
        prescaler: u32,
        clock_mhz: u32,
    ) -> Result<Self, ConfigError> {
        let Some(prescaler) = NonZeroU32::new(prescaler) else {
            return Err(ConfigError::ZeroPrescaler);
        };
        let Some(clock_mhz) = NonZeroU32::new(clock_mhz) else {
            return Err(ConfigError::ZeroClock);
        };
        Ok(Self::new(tick_period_ns, prescaler, clock_mhz))
    }

    /// Interval ticks to nanoseconds.
    #[inline]
    #[must_use]
    pub const fn interval_ns(&self, interval_ticks: u16) -> u32 {
        interval_ns(interval_ticks, self.tick_period_ns)
    }

    /// Raw index capture to a revolution period.
    #[inline]
    #[must_use]
    pub const fn index_period(&self, raw_count: u16) -> IndexPeriod {
        IndexPeriod {
            microseconds: index_period_us(raw_count, self.prescaler, self.clock_mhz),
        }
    }
}

/// `interval_ticks * tick_period_ns`, wrapping on 32-bit overflow.
#[inline]
#[must_use]
pub const fn interval_ns(interval_ticks: u16, tick_period_ns: u32) -> u32 {
    (interval_ticks as u32).wrapping_mul(tick_period_ns)
}

/// `raw_count * prescaler / clock_mhz`, truncating.
///
/// The product wraps silently on overflow; counter wraparound is not detected.
#[inline]
#[must_use]
pub const fn index_period_us(raw_count: u16, prescaler: NonZeroU32, clock_mhz: NonZeroU32) -> u32 {
    (raw_count as u32).wrapping_mul(prescaler.get()) / clock_mhz.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(v: u32) -> NonZeroU32 {
        NonZeroU32::new(v).unwrap()
    }

    #[test]
    fn test_index_period_scenario() {
        // 1000 counts at 48 MHz, no prescaling
        assert_eq!(index_period_us(1000, nz(1), nz(48)), 20);

        let config = TimingConfig::new(20, nz(1), nz(48));
        assert_eq!(config.index_period(1000).microseconds, 20);
    }

    #[test]
    fn test_index_period_truncates() {
        for raw in [0u16, 1, 47, 48, 49, 95, 96, 1000, 12_345, u16::MAX] {
            for (prescaler, clock) in [(1u32, 48u32), (64, 48), (3, 7), (1024, 120)] {
                let expected = (u64::from(raw) * u64::from(prescaler) / u64::from(clock)) as u32;
                assert_eq!(
                    index_period_us(raw, nz(prescaler), nz(clock)),
                    expected,
                    "raw={raw} prescaler={prescaler} clock={clock}"
                );
            }
        }
    }

    #[test]
    fn test_index_period_wraps_on_overflow() {
        let raw = u16::MAX;
        let prescaler = 1 << 20;
        let wrapped = u32::from(raw).wrapping_mul(prescaler);
        assert_eq!(index_period_us(raw, nz(prescaler), nz(1)), wrapped);
    }

    #[test]
    fn test_interval_scenario() {
        assert_eq!(interval_ns(500, 20), 10_000);

        let config = TimingConfig::try_new(20, 1, 48).unwrap();
        assert_eq!(config.interval_ns(500), 10_000);
    }

    #[test]
    fn test_interval_is_linear() {
        for tick_period in [1u32, 20, 1000, 83] {
            for x in [0u16, 1, 250, 500, 16_383, 32_767] {
                assert_eq!(
                    interval_ns(2 * x, tick_period),
                    2 * interval_ns(x, tick_period)
                );
            }
        }
    }

    #[test]
    fn test_try_new_rejects_zero_divisors() {
        assert_eq!(TimingConfig::try_new(20, 0, 48), Err(ConfigError::ZeroPrescaler));
        assert_eq!(TimingConfig::try_new(20, 1, 0), Err(ConfigError::ZeroClock));
        assert!(TimingConfig::try_new(0, 1, 1).is_ok());
    }
}
