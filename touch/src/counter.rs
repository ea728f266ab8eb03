//! Gated counting of the pad oscillator

use crate::periph::{CounterPeripheral, GateTimer, PadPin};
use crate::{Gate, RawCount};

/// A touch pad and the counter its oscillation clocks.
///
/// The count is only meaningful if the measurement window is short enough that
/// the counter cannot wrap within it. That is not checked here.
pub struct PinOscillator<P, C> {
    pad: P,
    counter: C,
}

impl<P: PadPin, C: CounterPeripheral> PinOscillator<P, C> {
    pub fn new(pad: P, counter: C) -> Self {
        Self { pad, counter }
    }

    /// Count oscillator edges over one measurement window.
    ///
    /// The steps must run in this order: configure, arm, suspend, capture,
    /// read, disarm. The pad is left with its oscillator function disabled.
    pub fn measure<G: GateTimer>(&mut self, gate: &mut G) -> RawCount {
        self.counter.configure_clock_from_pin();

        // Drop the ordinary pin function before routing the oscillator
        self.pad.set_alternate_function(false);
        self.pad.set_alternate_function(true);

        gate.arm(Gate::Window);
        self.counter.clear();
        gate.suspend();

        self.counter.toggle_capture_source();
        let count = self.counter.read_capture();

        gate.disarm();
        self.pad.set_alternate_function(false);

        count
    }

    pub fn release(self) -> (P, C) {
        (self.pad, self.counter)
    }

    #[cfg(test)]
    pub(crate) fn counter_mut(&mut self) -> &mut C {
        &mut self.counter
    }
}
