use crate::apu::timing::{LENGTH_HZ, PhaseCounter, Timebase};

pub enum LengthCalculationResult {
    DisableChannel,
    None,
}

pub const SHORT_LENGTH: u16 = 64;
pub const WAVE_LENGTH: u16 = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct LengthCounter {
    counter: u16,
    enabled: bool,
    load: u8,
    max: u16, // 64, or 256 for the wave channel
    timer: PhaseCounter,
}

impl LengthCounter {
    pub const fn clamp(&mut self, timebase: Timebase) {
        self.timer.clamp(timebase);
    }

    pub const fn counter(&self) -> u16 {
        self.counter
    }

    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    pub const fn from_raw(
        max: u16,
        load: u8,
        counter: u16,
        enabled: bool,
        timer: PhaseCounter,
    ) -> Self {
        Self {
            counter: if counter > max { max } else { counter },
            enabled,
            load,
            max,
            timer,
        }
    }

    pub const fn load(&self) -> u8 {
        self.load
    }

    pub const fn max(&self) -> u16 {
        self.max
    }

    pub const fn new(max: u16) -> Self {
        Self {
            counter: 0,
            enabled: false,
            load: 0,
            max,
            timer: PhaseCounter::new(Timebase::inc_for_rate(LENGTH_HZ)),
        }
    }

    pub const fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn step(&mut self, timebase: Timebase) -> LengthCalculationResult {
        let mut result = LengthCalculationResult::None;

        for _ in 0..self.timer.advance(timebase) {
            if self.enabled && self.counter > 0 {
                self.counter -= 1;

                if self.counter == 0 {
                    result = LengthCalculationResult::DisableChannel;
                }
            }
        }

        result
    }

    pub const fn timer(&self) -> PhaseCounter {
        self.timer
    }

    pub const fn trigger(&mut self) {
        if self.counter == 0 {
            self.counter = self.reload_value();
            self.timer.reset();
        }
    }

    const fn reload_value(&self) -> u16 {
        self.max.saturating_sub(self.load as u16)
    }

    pub const fn write_load(&mut self, load: u8) {
        self.load = load;
        self.counter = self.reload_value();
    }
}
