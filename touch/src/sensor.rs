//! The measurement cycle: measure, compare with the baseline, decide, pick the
//! next sampling rate, report, then sleep until the next cycle.

use crate::baseline::Baseline;
use crate::counter::PinOscillator;
use crate::decision::decide;
use crate::periph::{CounterPeripheral, GateTimer, PadPin};
use crate::rate::RateController;
use crate::report::Reporter;
use crate::{Delta, RawCount, SampleRate, TouchConfig};

/// The outcome of one measurement cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sample {
    pub raw: RawCount,
    /// The baseline `raw` was compared against, before drift tracking
    pub baseline: RawCount,
    pub delta: Delta,
    pub touched: bool,
    /// Rate selected for the pause after this cycle
    pub rate: SampleRate,
    /// Set when this cycle changed the rate
    pub rate_change: Option<SampleRate>,
}

/// A single touch pad with its gate timer and tracking state
pub struct TouchSensor<'a, P, C, G> {
    oscillator: PinOscillator<P, C>,
    gate: G,
    config: &'a TouchConfig,
    baseline: Baseline,
    rate: RateController,
}

impl<'a, P, C, G> TouchSensor<'a, P, C, G>
where
    P: PadPin,
    C: CounterPeripheral,
    G: GateTimer,
{
    /// Takes the calibration measurements before returning. The pad must not be
    /// touched meanwhile.
    pub fn new(oscillator: PinOscillator<P, C>, gate: G, config: &'a TouchConfig) -> Self {
        let mut sensor = Self {
            oscillator,
            gate,
            config,
            baseline: Baseline::new(0),
            rate: RateController::new(Some(config)),
        };
        sensor.recalibrate();
        sensor
    }

    /// Replace the baseline with a fresh average
    pub fn recalibrate(&mut self) {
        let samples = self.config.calibration_samples;
        let oscillator = &mut self.oscillator;
        let gate = &mut self.gate;
        self.baseline = Baseline::calibrate(samples, || oscillator.measure(gate));
    }

    pub fn baseline(&self) -> RawCount {
        self.baseline.count()
    }

    pub fn rate(&self) -> SampleRate {
        self.rate.rate()
    }

    pub fn config(&self) -> &TouchConfig {
        self.config
    }

    /// Measure and decide, without reporting or waiting for the next cycle
    pub fn step(&mut self) -> Sample {
        let raw = self.oscillator.measure(&mut self.gate);
        let baseline = self.baseline.count();
        let delta = self.baseline.update(raw);
        let touched = decide(delta, self.config.threshold);
        let rate_change = self.rate.push(touched);

        Sample {
            raw,
            baseline,
            delta,
            touched,
            rate: self.rate.rate(),
            rate_change,
        }
    }

    /// Run one full cycle, ending asleep for the selected inter-cycle delay
    pub fn cycle<R: Reporter>(&mut self, reporter: &mut R) -> Sample {
        let sample = self.step();

        reporter.status(sample.baseline, sample.raw, sample.delta);
        if sample.touched {
            reporter.presence();
        }

        self.gate.arm(self.rate.gate());
        self.gate.suspend();

        sample
    }

    pub fn run<R: Reporter>(&mut self, reporter: &mut R) -> ! {
        loop {
            self.cycle(reporter);
        }
    }

    pub fn release(self) -> (PinOscillator<P, C>, G) {
        (self.oscillator, self.gate)
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::mock::{self, MockGate, MockPin, Op, ScriptCounter};
    use crate::report::LineWriter;
    use crate::{Gate, DEFAULT_TOUCH_CONFIG};
    use std::string::String;

    type MockSensor<'a> = TouchSensor<'a, MockPin, ScriptCounter, MockGate>;

    fn sensor<'a>(config: &'a TouchConfig, baseline: RawCount, log: &mock::Log) -> MockSensor<'a> {
        let counts = [baseline; 16];
        let osc = PinOscillator::new(MockPin::new(log), ScriptCounter::new(log, &counts));
        let s = TouchSensor::new(osc, MockGate::new(log), config);
        log.borrow_mut().clear();
        s
    }

    fn feed(s: &mut MockSensor, raw: RawCount) {
        s.oscillator.counter_mut().push(raw);
    }

    #[test]
    fn test_calibration_on_new() {
        let log = mock::log();
        let mut counts = [0; 16];
        for i in 0..16 {
            counts[i] = 1000 + i as RawCount;
        }
        let osc = PinOscillator::new(MockPin::new(&log), ScriptCounter::new(&log, &counts));
        let s = TouchSensor::new(osc, MockGate::new(&log), &DEFAULT_TOUCH_CONFIG);

        // (16 * 1000 + 120) / 16
        assert_eq!(s.baseline(), 1007);
        assert_eq!(s.rate(), SampleRate::Slow);
        let windows = log.borrow().iter().filter(|op| **op == Op::Arm(Gate::Window)).count();
        assert_eq!(windows, 16);
    }

    #[test]
    fn test_untouched_cycle() {
        let log = mock::log();
        let mut s = sensor(&DEFAULT_TOUCH_CONFIG, 1000, &log);
        feed(&mut s, 1000);

        let mut out = LineWriter::new(String::new());
        let sample = s.cycle(&mut out);

        assert_eq!(sample.delta, 0);
        assert!(!sample.touched);
        assert_eq!(sample.rate, SampleRate::Slow);
        assert_eq!(s.baseline(), 1000);
        assert_eq!(out.get_ref(), "Baseline: 1000 Raw count: 1000 Difference: 0\r\n");
    }

    #[test]
    fn test_touched_cycle() {
        let log = mock::log();
        let mut s = sensor(&DEFAULT_TOUCH_CONFIG, 1000, &log);
        feed(&mut s, 700);

        let mut out = LineWriter::new(String::new());
        let sample = s.cycle(&mut out);

        assert_eq!(sample.delta, 300);
        assert!(sample.touched);
        assert_eq!(sample.rate, SampleRate::Fast);
        assert_eq!(sample.rate_change, Some(SampleRate::Fast));
        assert_eq!(s.baseline(), 1000);
        assert_eq!(
            out.get_ref(),
            "Baseline: 1000 Raw count: 700 Difference: 300\r\nPresence detected\r\n"
        );
    }

    #[test]
    fn test_drift_cycle() {
        let log = mock::log();
        let mut s = sensor(&DEFAULT_TOUCH_CONFIG, 1000, &log);
        feed(&mut s, 1200);

        let mut out = LineWriter::new(String::new());
        let sample = s.cycle(&mut out);

        assert_eq!(sample.delta, -200);
        assert!(!sample.touched);
        assert_eq!(sample.baseline, 1000);
        assert_eq!(s.baseline(), 1100);
        assert_eq!(out.get_ref(), "Baseline: 1000 Raw count: 1200 Difference: -200\r\n");
    }

    #[test]
    fn test_cycle_ends_asleep_on_delay_gate() {
        let log = mock::log();
        let mut s = sensor(&DEFAULT_TOUCH_CONFIG, 1000, &log);
        feed(&mut s, 700);
        feed(&mut s, 1000);

        let mut out = LineWriter::new(String::new());
        s.cycle(&mut out);
        s.cycle(&mut out);

        let ops = log.borrow();
        let arms: std::vec::Vec<Op> = ops.iter().copied().filter(|op| matches!(op, Op::Arm(_))).collect();
        assert_eq!(
            arms,
            [
                Op::Arm(Gate::Window),
                Op::Arm(Gate::Delay(SampleRate::Fast)),
                Op::Arm(Gate::Window),
                Op::Arm(Gate::Delay(SampleRate::Fast)),
            ]
        );
        assert_eq!(ops[ops.len() - 2..], [Op::Arm(Gate::Delay(SampleRate::Fast)), Op::Suspend]);
    }

    #[test]
    fn test_touch_then_release_slows_down() {
        let log = mock::log();
        let mut s = sensor(&DEFAULT_TOUCH_CONFIG, 1000, &log);
        feed(&mut s, 650);
        for _ in 0..20 {
            feed(&mut s, 1000);
        }

        let mut out = LineWriter::new(String::new());
        assert!(s.cycle(&mut out).touched);
        for i in 1..=20 {
            let sample = s.cycle(&mut out);
            assert!(!sample.touched);
            if i < 20 {
                assert_eq!(sample.rate, SampleRate::Fast);
            } else {
                assert_eq!(sample.rate_change, Some(SampleRate::Slow));
            }
        }
        assert_eq!(s.rate(), SampleRate::Slow);
        assert_eq!(out.get_ref().matches("Presence detected").count(), 1);
    }

    #[test]
    fn test_threshold_edge() {
        let log = mock::log();
        let mut s = sensor(&DEFAULT_TOUCH_CONFIG, 1000, &log);
        feed(&mut s, 780);
        feed(&mut s, 779);

        assert!(!s.step().touched);
        assert!(s.step().touched);
    }

    #[test]
    fn test_recalibrate() {
        let log = mock::log();
        let mut s = sensor(&DEFAULT_TOUCH_CONFIG, 1000, &log);
        // Sustained high noise pulls the baseline up
        for _ in 0..16 {
            feed(&mut s, 1400);
        }
        for _ in 0..16 {
            s.step();
        }
        assert!(s.baseline() > 1300);

        for _ in 0..16 {
            feed(&mut s, 1000);
        }
        s.recalibrate();
        assert_eq!(s.baseline(), 1000);
    }
}
