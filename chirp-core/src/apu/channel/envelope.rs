use crate::apu::timing::{ENVELOPE_HZ, PhaseCounter, Timebase};

const MAX_VOLUME: u8 = 0xF;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Envelope {
    counter: u8,
    running: bool,
    step: u8, // 3 bits
    timer: PhaseCounter,
    up: bool,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            counter: 0,
            running: false,
            step: 0,
            timer: PhaseCounter::new(Timebase::inc_for_rate(ENVELOPE_HZ)),
            up: false,
        }
    }
}

impl Envelope {
    pub const fn clamp(&mut self, timebase: Timebase) {
        self.timer.clamp(timebase);
    }

    pub const fn counter(&self) -> u8 {
        self.counter
    }

    pub const fn from_raw(step: u8, up: bool, running: bool, counter: u8, timer: PhaseCounter) -> Self {
        Self {
            counter,
            running,
            step: step & 7,
            timer,
            up,
        }
    }

    pub const fn running(&self) -> bool {
        self.running
    }

    pub fn step(&mut self, timebase: Timebase, volume: &mut u8) {
        for _ in 0..self.timer.advance(timebase) {
            if !self.running || self.step == 0 {
                continue;
            }

            self.counter = self.counter.saturating_sub(1);
            if self.counter > 0 {
                continue;
            }

            self.counter = self.step;

            match (self.up, *volume) {
                (true, v) if v < MAX_VOLUME => *volume += 1,
                (false, v) if v > 0 => *volume -= 1,
                _ => self.running = false,
            }
        }
    }

    pub const fn step_period(&self) -> u8 {
        self.step
    }

    pub const fn timer(&self) -> PhaseCounter {
        self.timer
    }

    pub const fn trigger(&mut self) {
        self.counter = self.step;
        self.running = true;
        self.timer.reset();
    }

    pub const fn up(&self) -> bool {
        self.up
    }

    pub const fn write(&mut self, val: u8) {
        self.step = val & 7;
        self.up = val & 8 != 0;
    }

    // Writing NRx2 on a playing channel alters the current volume instead of
    // leaving it alone.
    pub const fn write_while_playing(&mut self, val: u8, volume: &mut u8) {
        let up = val & 8 != 0;
        let mut v = *volume;

        if self.step == 0 && self.running {
            v = v.wrapping_add(1);
        } else if !self.up {
            v = v.wrapping_add(2);
        }

        if self.up != up {
            v = 16_u8.wrapping_sub(v);
        }

        *volume = v & MAX_VOLUME;
        self.write(val);
    }
}
