use crate::{Gate, SampleRate, TouchConfig, DEFAULT_TOUCH_CONFIG};

/// Chooses the delay between measurement cycles.
///
/// A touch switches to the fast rate and holds it for `fast_hold_cycles`
/// further untouched cycles before dropping back to the slow rate.
#[derive(Clone, Copy, Debug)]
pub struct RateController {
    rate: SampleRate,
    countdown: u16,
    hold: u16,
}

impl RateController {
    pub fn new(config: Option<&TouchConfig>) -> Self {
        let config = config.unwrap_or(&DEFAULT_TOUCH_CONFIG);
        Self {
            rate: SampleRate::Slow,
            countdown: 0,
            hold: config.fast_hold_cycles,
        }
    }

    pub fn rate(&self) -> SampleRate {
        self.rate
    }

    /// Untouched cycles left before the slow rate is selected
    pub fn countdown(&self) -> u16 {
        self.countdown
    }

    /// The gate interval to arm for the pause after this cycle
    pub fn gate(&self) -> Gate {
        Gate::Delay(self.rate)
    }

    /// Feed the decision of one cycle.
    ///
    /// Returns the new rate if it changed.
    pub fn push(&mut self, touched: bool) -> Option<SampleRate> {
        let next = if touched {
            self.countdown = self.hold;
            SampleRate::Fast
        } else {
            self.countdown = self.countdown.saturating_sub(1);
            if self.countdown == 0 {
                SampleRate::Slow
            } else {
                self.rate
            }
        };

        if next != self.rate {
            self.rate = next;
            Some(next)
        } else {
            None
        }
    }
}
