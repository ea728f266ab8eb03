#![no_main]
#![no_std]

use cortex_m_rt::entry;
use embedded_hal::digital::v2::OutputPin;
use panic_halt as _;

use stm32f0xx_hal as hal;

use pinosc::counter::PinOscillator;
use pinosc::pinosc::{Comp1Out, FeedbackPin, Tim1Counter};
use pinosc::report::{LineWriter, Reporter};
use pinosc::sensor::TouchSensor;
use pinosc::{Delta, GateIntervals, RawCount, TouchConfig, DEFAULT_GATE_INTERVALS};

use crate::hal::pac;
use crate::hal::pac::interrupt;
use crate::hal::prelude::*;

mod gate;
mod serial;

static TOUCH_CONFIG: TouchConfig = TouchConfig {
    threshold: 220,
    calibration_samples: 16,
    fast_hold_cycles: 20,
};

const GATE_INTERVALS: GateIntervals = DEFAULT_GATE_INTERVALS;

/// Highest pad oscillator frequency expected with the feedback resistor fitted
/// and nothing touching the pad
const MAX_OSC_FREQ: u32 = 2_000_000;

// The counter wraps silently, so the window has to be short enough up front
const _: () = assert!(
    pinosc::max_count_in_window(GATE_INTERVALS.window_us, MAX_OSC_FREQ) <= RawCount::MAX as u64
);

/// Status lines on the serial port, plus the presence LED
struct Console<L> {
    lines: LineWriter<serial::uart1::Uart1Tx>,
    led: L,
}

impl<L: OutputPin> Reporter for Console<L> {
    fn status(&mut self, baseline: RawCount, raw: RawCount, delta: Delta) {
        // Status comes first each cycle; presence turns the LED back on
        self.led.set_low().ok();
        self.lines.status(baseline, raw, delta);
    }

    fn presence(&mut self) {
        self.led.set_high().ok();
        self.lines.presence();
    }
}

#[entry]
fn main() -> ! {
    let dp = pac::Peripherals::take().unwrap();

    let mut flash = dp.FLASH;
    let mut rcc = dp.RCC.configure().sysclk(8.mhz()).freeze(&mut flash);
    let gpioa = dp.GPIOA.split(&mut rcc);
    let gpiob = dp.GPIOB.split(&mut rcc);
    let gpioc = dp.GPIOC.split(&mut rcc);

    // A library requiring a critical section to set a gpio mode register is bad and I just won't.
    let fake_cs = unsafe { cortex_m::interrupt::CriticalSection::new() };

    // Touch pad on COMP1_INP; the feedback pin is switched by the oscillator driver
    let _pad = gpioa.pa1.into_analog(&fake_cs);
    let _feedback = gpioa.pa6.into_analog(&fake_cs);

    let led = gpioc.pc9.into_push_pull_output(&fake_cs);

    let tx_pin = gpiob.pb6.into_alternate_af0(&fake_cs);
    let rx_pin = gpiob.pb7.into_alternate_af0(&fake_cs);
    let uart = hal::serial::Serial::usart1(dp.USART1, (tx_pin, rx_pin), 115200.bps(), &mut rcc);
    serial::uart1::init(uart, 4);

    let gate = gate::GateTim14::new(dp.TIM14, &mut rcc, GATE_INTERVALS);
    let oscillator = PinOscillator::new(FeedbackPin::new(Comp1Out::PA6), Tim1Counter::new());

    let mut console = Console {
        lines: LineWriter::new(serial::uart1::writer()),
        led,
    };

    // Calibrates before returning; keep hands off the pad during boot
    let mut sensor = TouchSensor::new(oscillator, gate, &TOUCH_CONFIG);
    sensor.run(&mut console)
}
