//! Scripted stand-ins for the hardware, shared by the unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use crate::periph::{CounterPeripheral, GateTimer, PadPin};
use crate::{Gate, RawCount};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Configure,
    Pin(bool),
    Arm(Gate),
    Clear,
    Suspend,
    Capture,
    Read,
    Disarm,
}

pub type Log = Rc<RefCell<Vec<Op>>>;

pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Produces one scripted count per capture. Repeats the last count once the
/// script runs out.
pub struct ScriptCounter {
    pub log: Log,
    pub script: VecDeque<RawCount>,
    last: RawCount,
    latched: RawCount,
}

impl ScriptCounter {
    pub fn new(log: &Log, counts: &[RawCount]) -> Self {
        Self {
            log: log.clone(),
            script: counts.iter().copied().collect(),
            last: 0,
            latched: 0,
        }
    }

    pub fn push(&mut self, count: RawCount) {
        self.script.push_back(count);
    }
}

impl CounterPeripheral for ScriptCounter {
    fn configure_clock_from_pin(&mut self) {
        self.log.borrow_mut().push(Op::Configure);
    }

    fn clear(&mut self) {
        self.log.borrow_mut().push(Op::Clear);
    }

    fn toggle_capture_source(&mut self) {
        self.log.borrow_mut().push(Op::Capture);
        if let Some(count) = self.script.pop_front() {
            self.last = count;
        }
        self.latched = self.last;
    }

    fn read_capture(&self) -> RawCount {
        self.log.borrow_mut().push(Op::Read);
        self.latched
    }
}

pub struct MockPin {
    pub log: Log,
    pub enabled: bool,
}

impl MockPin {
    pub fn new(log: &Log) -> Self {
        Self { log: log.clone(), enabled: false }
    }
}

impl PadPin for MockPin {
    fn set_alternate_function(&mut self, enabled: bool) {
        self.log.borrow_mut().push(Op::Pin(enabled));
        self.enabled = enabled;
    }
}

pub struct MockGate {
    pub log: Log,
    pub armed: Option<Gate>,
}

impl MockGate {
    pub fn new(log: &Log) -> Self {
        Self { log: log.clone(), armed: None }
    }
}

impl GateTimer for MockGate {
    fn arm(&mut self, gate: Gate) {
        self.log.borrow_mut().push(Op::Arm(gate));
        self.armed = Some(gate);
    }

    fn disarm(&mut self) {
        self.log.borrow_mut().push(Op::Disarm);
        self.armed = None;
    }

    fn suspend(&mut self) {
        assert!(self.armed.is_some(), "suspended with no gate armed");
        self.log.borrow_mut().push(Op::Suspend);
    }
}
