use crate::{Delta, RawCount};

/// The tracked count of the untouched pad.
///
/// A touch lowers the raw count, so the baseline is only ever pulled toward
/// counts above it. Readings below it, touched or not, leave it alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Baseline(RawCount);

impl Baseline {
    pub const fn new(count: RawCount) -> Self {
        Self(count)
    }

    /// Average `samples` measurements into a starting baseline
    pub fn calibrate<F>(samples: u16, mut measure: F) -> Self
    where
        F: FnMut() -> RawCount,
    {
        let samples = samples.max(1);
        let mut sum: u32 = 0;
        for _ in 0..samples {
            sum += measure() as u32;
        }
        Self((sum / samples as u32) as RawCount)
    }

    pub fn count(&self) -> RawCount {
        self.0
    }

    /// Compare a new raw count against the baseline and track drift.
    ///
    /// Returns the delta against the baseline as it was before this update.
    /// When the raw count is above the baseline, the baseline moves halfway
    /// toward it.
    pub fn update(&mut self, raw: RawCount) -> Delta {
        let delta = self.0 as Delta - raw as Delta;
        if delta < 0 {
            self.0 = ((self.0 as u32 + raw as u32) / 2) as RawCount;
        }
        delta
    }
}
