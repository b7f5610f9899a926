//! Platform-agnostic quadrature encoder decoding, timing and telemetry.
//!
//! This crate contains the decode-and-report core of the encoder monitor
//! without any chip-specific dependencies. It runs in embedded `no_std`
//! environments and on host for testing.
//!
//! # Overview
//!
//! - [`types`]: Data model ([`Direction`], [`DecoderState`], [`PositionSample`], [`IndexPeriod`])
//! - [`capture`]: Hardware contracts ([`CaptureSource`], [`QuadratureDecoder`])
//! - [`classify`]: Direction classification ([`ClassifierMode`])
//! - [`timing`]: Tick to time conversion ([`TimingConfig`])
//! - [`indicator`]: Direction LEDs ([`IndicatorDriver`])
//! - [`telemetry`]: Report throttling and line formats ([`ReportThrottle`], [`TelemetrySink`])
//! - [`config`]: Board variants ([`BoardConfig`])
//! - [`decode_loop`]: The never-ending polling loop ([`DecodeLoop`])
//! - [`soft`]: Software capture unit over plain GPIO ([`SoftCapture`])
//!
//! # Telemetry
//!
//! Depending on the board variant, one of two lines is written per report:
//!
//! ```text
//! POSITION: %5d INTERVAL: %lu\r\n
//!  Index signal time period: %luus\r\n
//! ```
//!
//! # Example
//!
//! ```rust
//! use encoder_core::{ClassifierMode, DecoderState, Direction, RawDirection, TimingConfig};
//!
//! let timing = TimingConfig::try_new(20, 1, 48).unwrap();
//! assert_eq!(timing.index_period(1000).microseconds, 20);
//! assert_eq!(timing.interval_ns(500), 10_000);
//!
//! let idle = DecoderState::new(RawDirection::Clockwise, false, false);
//! assert_eq!(ClassifierMode::Validated.classify(&idle), Direction::Stationary);
//! assert_eq!(ClassifierMode::Simple.classify(&idle), Direction::Clockwise);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and loop logging (for embedded targets)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod capture;
pub mod classify;
pub mod config;
pub mod decode_loop;
pub mod indicator;
pub mod soft;
pub mod telemetry;
pub mod timing;
pub mod types;

// Re-export main types at crate root
pub use capture::{CaptureSource, Channel, QuadratureDecoder, CAPTURE_REGISTER};
pub use classify::{classify_simple, classify_validated, ClassifierMode};
pub use config::{BoardConfig, ReportMode, Variant};
pub use decode_loop::{DecodeLoop, Iteration, LoopError};
pub use indicator::{ActiveLevel, IndicatorDriver, IndicatorError};
pub use soft::{SoftCapture, SoftCaptureConfig, TickSource};
pub use telemetry::{
    format_index_line, format_position_line, ReportThrottle, TelemetryError, TelemetrySink,
    MAX_LINE_LENGTH,
};
pub use timing::{index_period_us, interval_ns, ConfigError, TimingConfig};
pub use types::{
    CaptureEdge, CaptureEvent, DecoderState, Direction, IndexPeriod, IndicatorState,
    PositionSample, RawDirection,
};
