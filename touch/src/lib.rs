//! Capacitive touch sensing with the pin oscillator method.
//!
//! The touch pad is part of a relaxation oscillator. A hardware counter is
//! clocked by that oscillation for a fixed gate window, and a finger on the pad
//! adds capacitance, which slows the oscillator and lowers the count. A touch is
//! declared when the count falls far enough below a slowly tracked baseline.
//!
//! Everything here is hardware independent except the `pinosc` module, which
//! is only built with a device feature enabled. The firmware supplies the gate
//! timer and the reporting channel.
#![cfg_attr(not(test), no_std)]

pub mod baseline;
pub mod counter;
pub mod decision;
pub mod periph;
pub mod rate;
pub mod report;
pub mod sensor;

#[cfg(feature = "stm32f0x1")]
pub mod pinosc;

#[cfg(test)]
mod mock;

/// Number of oscillator edges counted in one gate window. The counter is 16 bits
/// wide and wraps silently.
pub type RawCount = u16;

/// Baseline minus raw count. Positive means added capacitance.
pub type Delta = i32;

/// Inter-cycle sampling rate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleRate {
    /// A touch is active or was seen recently
    Fast,
    /// Idle
    Slow,
}

/// The interval classes the gate timer can be armed with
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gate {
    /// The measurement window during which oscillator edges are counted
    Window,
    /// The pause between two measurement cycles
    Delay(SampleRate),
}

/// Configuration for the touch decision and sampling loop
#[derive(Clone, Copy, Debug)]
pub struct TouchConfig {
    /// The drop in counts below baseline that must be exceeded to report a touch
    pub threshold: u16,
    /// Number of measurements averaged into the initial baseline
    pub calibration_samples: u16,
    /// Number of untouched cycles spent at the fast rate after the last touch
    pub fast_hold_cycles: u16,
}

impl TouchConfig {
    const fn default() -> Self {
        Self {
            threshold: 220,
            calibration_samples: 16,
            fast_hold_cycles: 20,
        }
    }
}

pub const DEFAULT_TOUCH_CONFIG: TouchConfig = TouchConfig::default();

/// Lengths of the gate timer interval classes, in microseconds
#[derive(Clone, Copy, Debug)]
pub struct GateIntervals {
    /// Measurement window. Must be short enough that the counter cannot wrap.
    pub window_us: u32,
    pub fast_delay_us: u32,
    pub slow_delay_us: u32,
}

impl GateIntervals {
    const fn default() -> Self {
        Self {
            // 1 MHz / 512
            window_us: 512,
            // 12 kHz / 512
            fast_delay_us: 42_667,
            // 12 kHz / 8 / 512
            slow_delay_us: 341_333,
        }
    }

    pub const fn micros(&self, gate: Gate) -> u32 {
        match gate {
            Gate::Window => self.window_us,
            Gate::Delay(SampleRate::Fast) => self.fast_delay_us,
            Gate::Delay(SampleRate::Slow) => self.slow_delay_us,
        }
    }
}

pub const DEFAULT_GATE_INTERVALS: GateIntervals = GateIntervals::default();

/// Worst case count accumulated in a window of `window_us` by an oscillator
/// running at `max_osc_hz`, counting both edges.
///
/// Firmware compares this against `RawCount::MAX` in a const assertion, since
/// an overflowing window is never detected at runtime.
pub const fn max_count_in_window(window_us: u32, max_osc_hz: u32) -> u64 {
    2 * (window_us as u64) * (max_osc_hz as u64) / 1_000_000
}
