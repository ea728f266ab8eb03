use core::sync::atomic::{AtomicBool, Ordering};

use pinosc::periph::GateTimer;
use pinosc::{Gate, GateIntervals};

use crate::hal::rcc::Rcc;
use crate::interrupt;
use crate::pac;

const CR1_CEN: u32 = 1 << 0;
const CR1_URS: u32 = 1 << 2;
const DIER_UIE: u32 = 1 << 0;
const EGR_UG: u32 = 1 << 0;

/// Set by the TIM14 interrupt, consumed by `suspend`
static EXPIRED: AtomicBool = AtomicBool::new(false);

/// TIM14 as the gate timer. Its update interrupt wakes the core.
pub struct GateTim14 {
    tim: pac::TIM14,
    clk_freq: u32,
    intervals: GateIntervals,
}

impl GateTim14 {
    pub fn new(tim: pac::TIM14, rcc: &mut Rcc, intervals: GateIntervals) -> Self {
        let rccregs = unsafe { pac::Peripherals::steal().RCC };
        rccregs.apb1enr.modify(|_, w| w.tim14en().set_bit());

        // If pclk is prescaled from hclk, the frequency fed into the timers is doubled
        let clk_freq = if rcc.clocks.hclk().0 == rcc.clocks.pclk().0 {
            rcc.clocks.pclk().0
        } else {
            rcc.clocks.pclk().0 * 2
        };

        tim.cr1.write(|w| unsafe { w.bits(0) });

        unsafe {
            cortex_m::peripheral::NVIC::unmask(pac::Interrupt::TIM14);
        }

        Self {
            tim,
            clk_freq,
            intervals,
        }
    }
}

/// Prescaler and reload values for an interval of `us` microseconds. Short
/// gates count 1 MHz ticks, long ones 10 kHz ticks.
fn timing(clk_freq: u32, us: u32) -> (u32, u32) {
    let tick_hz: u32 = if us <= 0xffff { 1_000_000 } else { 10_000 };
    let psc = (clk_freq / tick_hz).max(1) - 1;
    let ticks = (us as u64 * tick_hz as u64 / 1_000_000).clamp(1, 0x1_0000);
    (psc, ticks as u32 - 1)
}

impl GateTimer for GateTim14 {
    fn arm(&mut self, gate: Gate) {
        let (psc, arr) = timing(self.clk_freq, self.intervals.micros(gate));

        self.tim.cr1.write(|w| unsafe { w.bits(CR1_URS) });
        self.tim.psc.write(|w| unsafe { w.bits(psc) });
        self.tim.arr.write(|w| unsafe { w.bits(arr) });
        // Load the prescaler now; URS keeps this from raising an update interrupt
        self.tim.egr.write(|w| unsafe { w.bits(EGR_UG) });
        self.tim.sr.write(|w| unsafe { w.bits(0) });

        EXPIRED.store(false, Ordering::Relaxed);
        self.tim.dier.write(|w| unsafe { w.bits(DIER_UIE) });
        self.tim.cr1.write(|w| unsafe { w.bits(CR1_URS | CR1_CEN) });
    }

    fn disarm(&mut self) {
        self.tim.cr1.write(|w| unsafe { w.bits(0) });
        self.tim.dier.write(|w| unsafe { w.bits(0) });
        self.tim.sr.write(|w| unsafe { w.bits(0) });
        EXPIRED.store(false, Ordering::Relaxed);
    }

    fn suspend(&mut self) {
        loop {
            // An expiry between the check and WFI still wakes the core: WFI
            // returns on a pending interrupt even while PRIMASK is set.
            cortex_m::interrupt::disable();
            let expired = EXPIRED.load(Ordering::Relaxed);
            if expired {
                EXPIRED.store(false, Ordering::Relaxed);
            } else {
                cortex_m::asm::wfi();
            }
            unsafe { cortex_m::interrupt::enable() };

            if expired {
                break;
            }
        }
    }
}

#[interrupt]
fn TIM14() {
    // Clear IRQ flags
    unsafe {
        let tim14 = pac::Peripherals::steal().TIM14;
        tim14.sr.write(|w| w.bits(0));
    }
    EXPIRED.store(true, Ordering::Relaxed);
}
