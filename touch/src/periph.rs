//! Hardware capabilities the sensing loop is written against.
//!
//! The firmware implements these for its timer, counter and pad pin. Tests
//! implement them with scripted doubles.

use crate::{Gate, RawCount};

/// A periodic alarm that can wake a suspended processor.
pub trait GateTimer {
    /// Start the timer with the interval of the given class. Re-arming replaces
    /// whatever interval was running.
    fn arm(&mut self, gate: Gate);

    /// Stop the timer so it produces no further wakeups.
    fn disarm(&mut self);

    /// Sleep until the armed interval expires.
    ///
    /// This never returns if the timer is not armed.
    fn suspend(&mut self);
}

/// A free running counter clocked by the pad oscillator.
pub trait CounterPeripheral {
    /// Select the pad oscillation as the count clock, counting continuously and
    /// wrapping at `RawCount::MAX`.
    fn configure_clock_from_pin(&mut self);

    /// Reset the count to zero.
    fn clear(&mut self);

    /// Latch the running count into the capture register.
    fn toggle_capture_source(&mut self);

    /// The value latched by the last `toggle_capture_source`.
    fn read_capture(&self) -> RawCount;
}

/// The touch pad pin.
pub trait PadPin {
    /// Enable or disable the peripheral function that lets the pad oscillate
    /// into the counter. Disabled leaves the pin in a neutral state.
    fn set_alternate_function(&mut self, enabled: bool);
}
