use core::fmt::Write;

use crate::{Delta, RawCount};

/// Where the status of each cycle goes.
pub trait Reporter {
    /// One status line per cycle
    fn status(&mut self, baseline: RawCount, raw: RawCount, delta: Delta);

    /// Emitted on each cycle that detects a touch
    fn presence(&mut self);
}

/// Text status lines on a `core::fmt::Write`.
///
/// Write errors are dropped. A full transmit queue loses characters rather
/// than stalling the sensing loop.
pub struct LineWriter<W> {
    out: W,
}

impl<W: Write> LineWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for LineWriter<W> {
    fn status(&mut self, baseline: RawCount, raw: RawCount, delta: Delta) {
        write!(self.out, "Baseline: {} Raw count: {} Difference: {}\r\n", baseline, raw, delta).ok();
    }

    fn presence(&mut self) {
        self.out.write_str("Presence detected\r\n").ok();
    }
}
