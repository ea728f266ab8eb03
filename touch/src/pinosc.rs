//! Pin oscillator for the STM32F051, built from COMP1 and TIM1.
//!
//! The F0 GPIO has no built-in oscillator mode, so the pad is made to oscillate
//! with comparator 1. The pad sits on the non-inverting input (PA1), the
//! inverting input is tied internally to half of VREFINT, and the inverted
//! comparator output is driven out on a COMP1_OUT pin that feeds back to the
//! pad through a resistor:
//!
//! ```text
//!                  R_fb (~100k)
//!  COMP1_OUT  ----/\/\/\----+---- PA1 (COMP1_INP)
//!                           |
//!                          pad
//! ```
//!
//! With high hysteresis this forms a relaxation oscillator whose frequency falls
//! as the pad capacitance rises. The comparator output is also routed inside the
//! chip to TIM1 input capture 1, and TIM1 runs in external clock mode from the
//! TI1 edge detector, so it counts both edges of the oscillation.
//!
//! Like the other register level code here, this driver accesses COMP, TIM1,
//! GPIOA and RCC directly instead of taking ownership of PAC singletons. Don't
//! touch those registers elsewhere in the application.

use stm32f0::stm32f0x1 as pac;

use crate::periph::{CounterPeripheral, PadPin};
use crate::RawCount;

// COMP_CSR, comparator 1 half
const COMP1_MASK: u32 = 0x0000_ffff;
const COMP1EN: u32 = 1 << 0;
const COMP1MODE_MEDIUM_SPEED: u32 = 0b01 << 2;
const COMP1INSEL_HALF_VREFINT: u32 = 0b001 << 4;
const COMP1OUTSEL_TIM1_IC1: u32 = 0b010 << 8;
const COMP1POL_INVERTED: u32 = 1 << 11;
const COMP1HYST_HIGH: u32 = 0b11 << 12;

// TIM1
const CR1_CEN: u32 = 1 << 0;
const SMCR_SMS_EXTERNAL_CLOCK: u32 = 0b111;
const SMCR_TS_TI1F_ED: u32 = 0b100 << 4;
const CCMR1_CC1S_TI1: u32 = 0b01;
const CCMR1_CC2S_TI2: u32 = 0b01 << 8;
const CCER_CC2E: u32 = 1 << 4;
const EGR_CC2G: u32 = 1 << 2;

const GPIO_MODE_AF: u32 = 0b10;
const GPIO_MODE_ANALOG: u32 = 0b11;
const AF_COMP1_OUT: u32 = 7;

/// Pins that can carry COMP1_OUT as alternate function 7
#[derive(Clone, Copy, Debug)]
pub enum Comp1Out {
    PA0 = 0,
    PA6 = 6,
    PA11 = 11,
}

/// The feedback pin of the pad oscillator.
///
/// The oscillator only runs while this pin is in its alternate function. In
/// analog mode the feedback loop is open and the pad is left alone.
pub struct FeedbackPin {
    gpio: &'static pac::gpioa::RegisterBlock,
    pin: u8,
}

impl FeedbackPin {
    /// GPIOA must already be clocked
    pub fn new(pin: Comp1Out) -> Self {
        let gpio = unsafe { &*pac::GPIOA::ptr() };
        let pin = pin as u8;

        let shift = (pin as u32 % 8) * 4;
        if pin < 8 {
            gpio.afrl.modify(|r, w| unsafe { w.bits(r.bits() & !(0xf << shift) | (AF_COMP1_OUT << shift)) });
        } else {
            gpio.afrh.modify(|r, w| unsafe { w.bits(r.bits() & !(0xf << shift) | (AF_COMP1_OUT << shift)) });
        }

        let mut obj = Self { gpio, pin };
        obj.set_alternate_function(false);
        obj
    }
}

impl PadPin for FeedbackPin {
    fn set_alternate_function(&mut self, enabled: bool) {
        let shift = self.pin as u32 * 2;
        let mode = if enabled { GPIO_MODE_AF } else { GPIO_MODE_ANALOG };
        self.gpio.moder.modify(|r, w| unsafe { w.bits(r.bits() & !(0b11 << shift) | (mode << shift)) });
    }
}

/// TIM1 counting COMP1 edges
pub struct Tim1Counter {
    tim: &'static pac::tim1::RegisterBlock,
}

impl Tim1Counter {
    /// Enables and resets TIM1 and starts COMP1. The pad input pin must be in
    /// analog mode.
    pub fn new() -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        // COMP is clocked together with SYSCFG
        rcc.apb2enr.modify(|_, w| w.tim1en().set_bit().syscfgen().set_bit());
        rcc.apb2rstr.modify(|_, w| w.tim1rst().set_bit());
        rcc.apb2rstr.modify(|_, w| w.tim1rst().clear_bit());

        let comp = unsafe { &*pac::COMP::ptr() };
        comp.csr.modify(|r, w| unsafe {
            w.bits(
                r.bits() & !COMP1_MASK
                    | COMP1EN
                    | COMP1MODE_MEDIUM_SPEED
                    | COMP1INSEL_HALF_VREFINT
                    | COMP1OUTSEL_TIM1_IC1
                    | COMP1POL_INVERTED
                    | COMP1HYST_HIGH,
            )
        });

        let tim = unsafe { &*pac::TIM1::ptr() };
        Self { tim }
    }
}

impl CounterPeripheral for Tim1Counter {
    fn configure_clock_from_pin(&mut self) {
        let tim = self.tim;
        tim.cr1.write(|w| unsafe { w.bits(0) });

        // CC1 feeds the edge detector, CC2 is a capture channel only ever
        // triggered from software
        tim.ccmr1_output().write(|w| unsafe { w.bits(CCMR1_CC1S_TI1 | CCMR1_CC2S_TI2) });
        tim.ccer.write(|w| unsafe { w.bits(CCER_CC2E) });
        tim.smcr.write(|w| unsafe { w.bits(SMCR_TS_TI1F_ED | SMCR_SMS_EXTERNAL_CLOCK) });

        tim.psc.write(|w| unsafe { w.bits(0) });
        tim.arr.write(|w| unsafe { w.bits(0xffff) });
        tim.cr1.write(|w| unsafe { w.bits(CR1_CEN) });
    }

    fn clear(&mut self) {
        self.tim.cnt.write(|w| unsafe { w.bits(0) });
    }

    fn toggle_capture_source(&mut self) {
        self.tim.egr.write(|w| unsafe { w.bits(EGR_CC2G) });
    }

    fn read_capture(&self) -> RawCount {
        self.tim.ccr2.read().bits() as RawCount
    }
}
