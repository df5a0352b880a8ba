mod envelope;
mod length;
mod noise;
mod square;
mod sweep;
mod wave;

pub use {
    envelope::Envelope,
    length::{LengthCalculationResult, LengthCounter, SHORT_LENGTH, WAVE_LENGTH},
    noise::Noise,
    square::{Duty, Square},
    sweep::{Sweep, SweepCalculationResult, SweepDirection},
    wave::{WAVE_RAM_SIZE, Wave},
};

use crate::apu::{
    state::{Reader, Writer},
    timing::{PhaseCounter, Timebase},
};

pub const CHANNEL_COUNT: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisableReason {
    Dac,
    LengthExpired,
    SweepOverflow,
}

impl DisableReason {
    #[must_use]
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dac => "dac off",
            Self::LengthExpired => "length expired",
            Self::SweepOverflow => "sweep overflow",
        }
    }
}

// Generator state, picked by channel index: 0 and 1 square, 2 wave, 3 noise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Kind {
    Square(Square),
    Wave(Wave),
    Noise(Noise),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Channel {
    dac_cut: bool, // DAC went off since the last trigger
    enabled: bool,
    envelope: Envelope, // unused by the wave channel
    freq: u16,          // 11 bits, or the clock shift for noise
    kind: Kind,
    length: LengthCounter,
    muted: bool,
    on_left: bool,
    on_right: bool,
    phase: PhaseCounter,
    powered: bool,
    val: i16,
    volume: u8, // output level code for wave
    volume_init: u8,
}

impl Channel {
    // Bytes reserved for the kind payload so every channel serializes to the
    // same size.
    const KIND_STATE_SIZE: usize = 16;
    pub const STATE_SIZE: usize = 15 + 12 + 10 + Self::KIND_STATE_SIZE;

    fn advance_phase(&mut self, timebase: Timebase, wave_ram: &[u8; WAVE_RAM_SIZE]) {
        let steps = self.phase.advance(timebase);

        match &mut self.kind {
            Kind::Square(square) => (0..steps).for_each(|_| square.advance()),
            Kind::Wave(wave) => (0..steps).for_each(|_| wave.advance(wave_ram)),
            Kind::Noise(noise) => (0..steps).for_each(|_| noise.advance()),
        }
    }

    fn amplitude(&self) -> i16 {
        if !self.active() {
            return 0;
        }

        let volume = i16::from(self.volume);
        match &self.kind {
            Kind::Square(square) => {
                if square.high() {
                    volume
                } else {
                    -volume
                }
            }
            Kind::Wave(wave) => wave.amplitude(self.volume),
            Kind::Noise(noise) => {
                if noise.high() {
                    volume
                } else {
                    -volume
                }
            }
        }
    }

    /// Playing and audible: enabled, DAC on, and retriggered since the DAC
    /// was last switched off. This is the NR52 status bit.
    #[must_use]
    #[inline]
    pub const fn active(&self) -> bool {
        self.enabled && self.powered && !self.dac_cut
    }

    #[must_use]
    #[inline]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    #[inline]
    pub const fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    #[must_use]
    #[inline]
    pub const fn freq(&self) -> u16 {
        self.freq
    }

    #[must_use]
    #[inline]
    pub const fn kind(&self) -> &Kind {
        &self.kind
    }

    #[must_use]
    #[inline]
    pub const fn length(&self) -> &LengthCounter {
        &self.length
    }

    #[must_use]
    #[inline]
    pub const fn muted(&self) -> bool {
        self.muted
    }

    #[must_use]
    pub fn new(index: usize) -> Self {
        let (kind, max) = match index {
            0 => (Kind::Square(Square::new(true)), SHORT_LENGTH),
            1 => (Kind::Square(Square::new(false)), SHORT_LENGTH),
            2 => (Kind::Wave(Wave::default()), WAVE_LENGTH),
            _ => (Kind::Noise(Noise::default()), SHORT_LENGTH),
        };

        Self {
            dac_cut: false,
            enabled: false,
            envelope: Envelope::default(),
            freq: 0,
            kind,
            length: LengthCounter::new(max),
            muted: false,
            on_left: false,
            on_right: false,
            phase: PhaseCounter::default(),
            powered: false,
            val: 0,
            volume: 0,
            volume_init: 0,
        }
    }

    #[must_use]
    #[inline]
    pub const fn on_left(&self) -> bool {
        self.on_left
    }

    #[must_use]
    #[inline]
    pub const fn on_right(&self) -> bool {
        self.on_right
    }

    #[must_use]
    #[inline]
    pub const fn phase(&self) -> PhaseCounter {
        self.phase
    }

    #[must_use]
    #[inline]
    pub const fn powered(&self) -> bool {
        self.powered
    }

    // Recomputes the phase increment from the current frequency.
    pub fn reload_inc(&mut self) {
        let period = match &self.kind {
            Kind::Square(_) => Square::period_cycles(self.freq),
            Kind::Wave(_) => Wave::period_cycles(self.freq),
            Kind::Noise(noise) => noise.period_cycles(self.freq),
        };

        self.phase.set_inc(Timebase::inc_for_period(period));
    }

    // Hardware reset on master power off. Host settings survive.
    pub fn reset(&mut self, index: usize) {
        let muted = self.muted;
        *self = Self::new(index);
        self.muted = muted;
    }

    // Keeps every accumulator inside a (possibly smaller) reference.
    pub fn retime(&mut self, timebase: Timebase) {
        self.phase.clamp(timebase);
        self.length.clamp(timebase);
        self.envelope.clamp(timebase);
        if let Kind::Square(square) = &mut self.kind
            && let Some(sweep) = square.sweep_mut()
        {
            sweep.clamp(timebase);
        }
    }

    // Only a trigger brings a channel back once its DAC has been off.
    const fn set_powered(&mut self, powered: bool) {
        self.powered = powered;
        if !powered {
            self.dac_cut = true;
        }
    }

    pub const fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub const fn set_routing(&mut self, on_left: bool, on_right: bool) {
        self.on_left = on_left;
        self.on_right = on_right;
    }

    // Advances the channel by one output sample.
    pub fn tick(
        &mut self,
        timebase: Timebase,
        wave_ram: &[u8; WAVE_RAM_SIZE],
    ) -> Option<DisableReason> {
        let mut disabled = None;

        if self.enabled {
            self.advance_phase(timebase, wave_ram);
        }

        if matches!(
            self.length.step(timebase),
            LengthCalculationResult::DisableChannel
        ) && self.enabled
        {
            self.enabled = false;
            disabled = Some(DisableReason::LengthExpired);
        }

        if let Kind::Square(square) = &mut self.kind
            && let Some(sweep) = square.sweep_mut()
        {
            match sweep.step(timebase) {
                SweepCalculationResult::DisableChannel if self.enabled => {
                    self.enabled = false;
                    disabled = Some(DisableReason::SweepOverflow);
                }
                SweepCalculationResult::UpdateFreq { freq } if self.enabled => {
                    self.freq = freq;
                    self.reload_inc();
                }
                _ => (),
            }
        }

        if !matches!(self.kind, Kind::Wave(_)) {
            let mut volume = self.volume;
            self.envelope.step(timebase, &mut volume);
            if self.enabled {
                self.volume = volume;
            }
        }

        self.val = self.amplitude();
        disabled
    }

    pub fn trigger(&mut self, wave_ram: &[u8; WAVE_RAM_SIZE]) -> Option<DisableReason> {
        let mut disabled = None;

        self.enabled = true;
        self.dac_cut = false;
        self.length.trigger();

        self.reload_inc();
        self.phase.reset();

        match &mut self.kind {
            Kind::Square(square) => square.reset_phase(),
            Kind::Wave(wave) => wave.reset(wave_ram),
            Kind::Noise(noise) => noise.reset(),
        }

        if !matches!(self.kind, Kind::Wave(_)) {
            self.envelope.trigger();
            self.volume = self.volume_init;
        }

        if let Kind::Square(square) = &mut self.kind
            && let Some(sweep) = square.sweep_mut()
            && sweep.trigger(self.freq) == SweepCalculationResult::DisableChannel
        {
            self.enabled = false;
            disabled = Some(DisableReason::SweepOverflow);
        }

        if !self.powered {
            self.enabled = false;
            disabled = Some(DisableReason::Dac);
        }

        self.val = self.amplitude();
        disabled
    }

    #[must_use]
    #[inline]
    pub const fn val(&self) -> i16 {
        self.val
    }

    #[must_use]
    #[inline]
    pub const fn volume(&self) -> u8 {
        self.volume
    }

    #[must_use]
    #[inline]
    pub const fn volume_init(&self) -> u8 {
        self.volume_init
    }

    // NRx4: bit 7 trigger, bit 6 length enable, bits 2-0 frequency high.
    // Returns the trigger outcome when the trigger bit is set.
    pub fn write_control(
        &mut self,
        val: u8,
        wave_ram: &[u8; WAVE_RAM_SIZE],
    ) -> Option<Option<DisableReason>> {
        self.length.set_enabled(val & 0x40 != 0);

        if !matches!(self.kind, Kind::Noise(_)) {
            self.freq = (self.freq & 0xFF) | (u16::from(val & 7) << 8);
            self.reload_inc();
        }

        (val & 0x80 != 0).then(|| self.trigger(wave_ram))
    }

    // NR30: bit 7 is the DAC.
    pub fn write_dac(&mut self, val: u8) {
        self.set_powered(val & 0x80 != 0);
        self.val = self.amplitude();
    }

    // NRx2
    pub fn write_envelope(&mut self, val: u8) {
        self.volume_init = val >> 4;
        self.set_powered(val & 0xF8 != 0);

        if self.active() {
            self.envelope.write_while_playing(val, &mut self.volume);
        } else {
            self.envelope.write(val);
        }

        self.val = self.amplitude();
    }

    // NRx3
    pub fn write_freq_low(&mut self, val: u8) {
        self.freq = (self.freq & 0x700) | u16::from(val);
        self.reload_inc();
    }

    // NRx1: duty bits only exist on the square channels, the wave channel
    // takes all eight bits as length load.
    pub fn write_length_duty(&mut self, val: u8) {
        match &mut self.kind {
            Kind::Square(square) => {
                square.set_duty(Duty::from(val));
                self.length.write_load(val & 0x3F);
            }
            Kind::Wave(_) => self.length.write_load(val),
            Kind::Noise(_) => self.length.write_load(val & 0x3F),
        }
    }

    // NR32: bits 6-5
    pub fn write_output_level(&mut self, val: u8) {
        self.volume = (val >> 5) & 3;
        self.val = self.amplitude();
    }

    // NR43: the clock shift takes the place of the frequency.
    pub fn write_polynomial(&mut self, val: u8) {
        if let Kind::Noise(noise) = &mut self.kind {
            noise.write(val);
            self.freq = u16::from(val >> 4);
            self.reload_inc();
        }
    }

    // NR10
    pub fn write_sweep(&mut self, val: u8) {
        if let Kind::Square(square) = &mut self.kind
            && let Some(sweep) = square.sweep_mut()
        {
            sweep.write(val);
        }
    }

    pub fn save(&self, w: &mut Writer) {
        let start = w.position();

        let flags = u8::from(self.enabled)
            | u8::from(self.powered) << 1
            | u8::from(self.on_left) << 2
            | u8::from(self.on_right) << 3
            | u8::from(self.muted) << 4
            | u8::from(self.dac_cut) << 5;
        w.write_u8(flags);
        w.write_u8(self.volume);
        w.write_u8(self.volume_init);
        w.write_u16(self.freq);
        w.write_phase(self.phase);
        w.write_i16(self.val);

        w.write_u8(self.length.load());
        w.write_u16(self.length.counter());
        w.write_bool(self.length.enabled());
        w.write_phase(self.length.timer());

        w.write_u8(
            self.envelope.step_period()
                | u8::from(self.envelope.up()) << 3
                | u8::from(self.envelope.running()) << 4,
        );
        w.write_u8(self.envelope.counter());
        w.write_phase(self.envelope.timer());

        let kind_start = w.position();
        match &self.kind {
            Kind::Square(square) => {
                w.write_u8(square.duty() as u8);
                w.write_u8(square.phase());
                if let Some(sweep) = square.sweep() {
                    w.write_u8(
                        sweep.rate()
                            | (sweep.dir() as u8) << 3
                            | sweep.shift() << 4
                            | u8::from(sweep.enabled()) << 7,
                    );
                    w.write_u16(sweep.shadow());
                    w.write_u8(sweep.counter());
                    w.write_phase(sweep.timer());
                }
            }
            Kind::Wave(wave) => {
                w.write_u8(wave.index());
                w.write_u8(wave.sample());
            }
            Kind::Noise(noise) => {
                w.write_u16(noise.lfsr());
                w.write_bool(noise.narrow());
                w.write_u8(noise.divisor_code());
            }
        }
        w.write_zeroes_until(kind_start + Self::KIND_STATE_SIZE);

        debug_assert_eq!(w.position() - start, Self::STATE_SIZE);
    }

    pub fn load(index: usize, r: &mut Reader) -> Self {
        let start = r.position();
        let mut channel = Self::new(index);

        let flags = r.read_u8();
        channel.enabled = flags & 1 != 0;
        channel.powered = flags & 2 != 0;
        channel.on_left = flags & 4 != 0;
        channel.on_right = flags & 8 != 0;
        channel.muted = flags & 0x10 != 0;
        channel.dac_cut = flags & 0x20 != 0;
        channel.volume = r.read_u8() & 0xF;
        channel.volume_init = r.read_u8() & 0xF;
        channel.freq = r.read_u16() & 0x7FF;
        channel.phase = r.read_phase();
        channel.val = r.read_i16().clamp(-15, 15);

        let load = r.read_u8();
        let counter = r.read_u16();
        let length_enabled = r.read_bool();
        let length_timer = r.read_phase();
        channel.length = LengthCounter::from_raw(
            channel.length.max(),
            load,
            counter,
            length_enabled,
            length_timer,
        );

        let envelope_bits = r.read_u8();
        let envelope_counter = r.read_u8();
        let envelope_timer = r.read_phase();
        channel.envelope = Envelope::from_raw(
            envelope_bits & 7,
            envelope_bits & 8 != 0,
            envelope_bits & 0x10 != 0,
            envelope_counter,
            envelope_timer,
        );

        let kind_start = r.position();
        match &mut channel.kind {
            Kind::Square(square) => {
                let duty = Duty::from(r.read_u8() << 6);
                let phase = r.read_u8();
                let sweep = square.sweep().map(|_| {
                    let bits = r.read_u8();
                    let shadow = r.read_u16();
                    let counter = r.read_u8();
                    let timer = r.read_phase();
                    Sweep::from_raw(
                        bits & 7,
                        SweepDirection::from(bits),
                        (bits >> 4) & 7,
                        bits & 0x80 != 0,
                        shadow,
                        counter,
                        timer,
                    )
                });
                *square = Square::from_raw(duty, phase, sweep);
            }
            Kind::Wave(wave) => {
                let index = r.read_u8();
                let sample = r.read_u8();
                *wave = Wave::from_raw(index, sample);
            }
            Kind::Noise(noise) => {
                let lfsr = r.read_u16();
                let narrow = r.read_bool();
                let divisor_code = r.read_u8();
                *noise = Noise::from_raw(lfsr, narrow, divisor_code);
            }
        }
        r.skip_until(kind_start + Self::KIND_STATE_SIZE);

        debug_assert_eq!(r.position() - start, Self::STATE_SIZE);
        channel
    }
}
