//! Board configuration: variant, classification rule, report mode and timing.

use crate::capture::Channel;
use crate::classify::ClassifierMode;
use crate::timing::TimingConfig;

/// What the board measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Variant {
    /// Periodic position and inter-tick interval sampling.
    Continuous,
    /// Revolution period from the index pulse.
    IndexPeriod,
}

impl Variant {
    /// Channel whose event drives the capture branch of the decode loop.
    #[inline]
    #[must_use]
    pub const fn capture_channel(self) -> Channel {
        match self {
            Variant::Continuous => Channel::PositionTrigger,
            Variant::IndexPeriod => Channel::IndexTimer,
        }
    }
}

/// What the throttled reporter writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportMode {
    /// Position/interval or index period lines.
    Telemetry,
    /// One-shot bring-up markers instead of data lines.
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardConfig {
    pub variant: Variant,
    pub classifier: ClassifierMode,
    pub report_mode: ReportMode,
    pub timing: TimingConfig,
}

impl BoardConfig {
    /// Continuous sampling with the simple direction rule.
    #[must_use]
    pub const fn continuous(timing: TimingConfig) -> Self {
        Self {
            variant: Variant::Continuous,
            classifier: ClassifierMode::Simple,
            report_mode: ReportMode::Telemetry,
            timing,
        }
    }

    /// Index period measurement with the validated direction rule.
    #[must_use]
    pub const fn index_period(timing: TimingConfig) -> Self {
        Self {
            variant: Variant::IndexPeriod,
            classifier: ClassifierMode::Validated,
            report_mode: ReportMode::Telemetry,
            timing,
        }
    }

    #[must_use]
    pub const fn with_report_mode(mut self, report_mode: ReportMode) -> Self {
        self.report_mode = report_mode;
        self
    }

    #[must_use]
    pub const fn with_classifier(mut self, classifier: ClassifierMode) -> Self {
        self.classifier = classifier;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_presets() {
        let timing = TimingConfig::try_new(20, 1, 48).unwrap();

        let continuous = BoardConfig::continuous(timing);
        assert_eq!(continuous.classifier, ClassifierMode::Simple);
        assert_eq!(continuous.variant.capture_channel(), Channel::PositionTrigger);

        let index = BoardConfig::index_period(timing).with_report_mode(ReportMode::Debug);
        assert_eq!(index.classifier, ClassifierMode::Validated);
        assert_eq!(index.report_mode, ReportMode::Debug);
        assert_eq!(index.variant.capture_channel(), Channel::IndexTimer);
    }

    #[test]
    fn test_classifier_override_keeps_variant() {
        let timing = TimingConfig::try_new(20, 1, 48).unwrap();
        let config = BoardConfig::continuous(timing).with_classifier(ClassifierMode::Validated);
        assert_eq!(config.variant, Variant::Continuous);
        assert_eq!(config.classifier, ClassifierMode::Validated);
        assert_eq!(config.report_mode, ReportMode::Telemetry);
    }
}
