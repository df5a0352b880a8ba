use crate::apu::timing::{PhaseCounter, SWEEP_HZ, Timebase};

const MAX_FREQ: u16 = 0x7FF;

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum SweepDirection {
    #[default]
    Up = 0,
    Down = 1,
}

impl From<u8> for SweepDirection {
    fn from(val: u8) -> Self {
        if val & 8 == 0 { Self::Up } else { Self::Down }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum SweepCalculationResult {
    DisableChannel,
    None,
    UpdateFreq { freq: u16 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Sweep {
    counter: u8, // sweep ticks until the next calculation, 0 rate counts as 8
    dir: SweepDirection,
    enabled: bool,
    rate: u8,    // 3 bits
    shadow: u16, // between 0 and 0x7FF
    shift: u8,   // 3 bits
    timer: PhaseCounter,
}

impl Default for Sweep {
    fn default() -> Self {
        Self {
            counter: 8,
            dir: SweepDirection::default(),
            enabled: false,
            rate: 0,
            shadow: 0,
            shift: 0,
            timer: PhaseCounter::new(Timebase::inc_for_rate(SWEEP_HZ)),
        }
    }
}

impl Sweep {
    const fn next_freq(&self) -> u16 {
        let delta = self.shadow >> self.shift;
        match self.dir {
            SweepDirection::Up => self.shadow + delta,
            SweepDirection::Down => self.shadow.saturating_sub(delta),
        }
    }

    const fn reload_counter(&mut self) {
        self.counter = if self.rate == 0 { 8 } else { self.rate };
    }

    fn tick(&mut self) -> SweepCalculationResult {
        self.counter = self.counter.saturating_sub(1);
        if self.counter > 0 {
            return SweepCalculationResult::None;
        }

        self.reload_counter();

        if self.rate == 0 {
            return SweepCalculationResult::None;
        }

        let freq = self.next_freq();
        if freq > MAX_FREQ {
            return SweepCalculationResult::DisableChannel;
        }

        if self.shift == 0 {
            return SweepCalculationResult::None;
        }

        self.shadow = freq;

        // the hardware checks the following step right away
        if self.next_freq() > MAX_FREQ {
            SweepCalculationResult::DisableChannel
        } else {
            SweepCalculationResult::UpdateFreq { freq }
        }
    }

    pub const fn clamp(&mut self, timebase: Timebase) {
        self.timer.clamp(timebase);
    }

    pub const fn counter(&self) -> u8 {
        self.counter
    }

    pub const fn dir(&self) -> SweepDirection {
        self.dir
    }

    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    pub const fn from_raw(
        rate: u8,
        dir: SweepDirection,
        shift: u8,
        enabled: bool,
        shadow: u16,
        counter: u8,
        timer: PhaseCounter,
    ) -> Self {
        Self {
            counter,
            dir,
            enabled,
            rate: rate & 7,
            shadow: shadow & MAX_FREQ,
            shift: shift & 7,
            timer,
        }
    }

    pub const fn rate(&self) -> u8 {
        self.rate
    }

    pub const fn shadow(&self) -> u16 {
        self.shadow
    }

    pub const fn shift(&self) -> u8 {
        self.shift
    }

    // Advances the 128 Hz timer by one sample. The channel only applies the
    // result while it is enabled.
    pub fn step(&mut self, timebase: Timebase) -> SweepCalculationResult {
        let mut result = SweepCalculationResult::None;

        for _ in 0..self.timer.advance(timebase) {
            if !self.enabled {
                continue;
            }

            match self.tick() {
                SweepCalculationResult::DisableChannel => {
                    return SweepCalculationResult::DisableChannel;
                }
                SweepCalculationResult::None => (),
                update @ SweepCalculationResult::UpdateFreq { .. } => result = update,
            }
        }

        result
    }

    pub const fn timer(&self) -> PhaseCounter {
        self.timer
    }

    pub fn trigger(&mut self, freq: u16) -> SweepCalculationResult {
        self.shadow = freq & MAX_FREQ;
        self.reload_counter();
        self.timer.reset();
        self.enabled = self.rate != 0 || self.shift != 0;

        if self.shift != 0 && self.next_freq() > MAX_FREQ {
            SweepCalculationResult::DisableChannel
        } else {
            SweepCalculationResult::None
        }
    }

    pub fn write(&mut self, val: u8) {
        self.rate = (val >> 4) & 7;
        self.dir = SweepDirection::from(val);
        self.shift = val & 7;
    }
}
