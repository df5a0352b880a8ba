// Sample-driven time keeping. Every periodic event is a counter/inc pair: each
// rendered sample adds `inc` to `counter`, and every time the counter reaches
// the reference (the sample rate in fixed point) one event fires.

use crate::CLOCK_HZ;

const FIXED_SHIFT: u32 = 4;

pub const LENGTH_HZ: u32 = 256;
pub const SWEEP_HZ: u32 = 128;
pub const ENVELOPE_HZ: u32 = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Timebase {
    reference: u32,
}

impl Timebase {
    // Lower bound keeps the reference above zero for malformed save states.
    pub const fn from_reference(reference: u32) -> Self {
        let min = 1 << FIXED_SHIFT;
        Self {
            reference: if reference < min { min } else { reference },
        }
    }

    // Increment for an event that fires once every `period_cycles` clock cycles.
    // A zero period never fires.
    pub const fn inc_for_period(period_cycles: u32) -> u32 {
        if period_cycles == 0 {
            0
        } else {
            (CLOCK_HZ << FIXED_SHIFT) / period_cycles
        }
    }

    pub const fn inc_for_rate(rate_hz: u32) -> u32 {
        rate_hz << FIXED_SHIFT
    }

    pub const fn new(sample_rate: u32) -> Self {
        Self::from_reference(sample_rate << FIXED_SHIFT)
    }

    pub const fn reference(self) -> u32 {
        self.reference
    }

    pub const fn sample_rate(self) -> u32 {
        self.reference >> FIXED_SHIFT
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PhaseCounter {
    counter: u32,
    inc: u32,
}

impl PhaseCounter {
    // Advances by one sample and returns how many events fired.
    pub const fn advance(&mut self, timebase: Timebase) -> u32 {
        let reference = timebase.reference();
        self.counter += self.inc;
        let wraps = self.counter / reference;
        self.counter -= wraps * reference;
        wraps
    }

    pub const fn clamp(&mut self, timebase: Timebase) {
        if self.counter >= timebase.reference() {
            self.counter = timebase.reference() - 1;
        }
    }

    pub const fn counter(self) -> u32 {
        self.counter
    }

    pub const fn from_raw(counter: u32, inc: u32) -> Self {
        Self { counter, inc }
    }

    pub const fn inc(self) -> u32 {
        self.inc
    }

    pub const fn new(inc: u32) -> Self {
        Self { counter: 0, inc }
    }

    pub const fn reset(&mut self) {
        self.counter = 0;
    }

    pub const fn set_inc(&mut self, inc: u32) {
        self.inc = inc;
    }
}
