mod channel;
mod mixer;
mod registers;
mod state;
mod timing;

pub use {
    channel::{CHANNEL_COUNT, Channel, DisableReason, Duty, Kind, Noise, Square, Wave},
    mixer::{AMPLITUDE_UNIT, MasterVolume},
    registers::{REGISTERS_END, REGISTERS_START, Register},
    timing::Timebase,
};

use {
    crate::{Error, MAX_SAMPLE_RATE, MIN_SAMPLE_RATE, trace},
    alloc::vec::Vec,
    channel::WAVE_RAM_SIZE,
    registers::{POWER_ON, REGISTER_COUNT, WAVE_PATTERN},
    state::{Reader, Writer},
};

// NR10 through NR51 are cleared when the master power goes off
const CLEARED_ON_POWER_OFF: usize = 0x16;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Apu {
    channels: [Channel; CHANNEL_COUNT],
    enabled: bool,
    master: MasterVolume,
    output_enabled: bool,
    regs: [u8; REGISTER_COUNT],
    timebase: Timebase,
    wave_ram: [u8; WAVE_RAM_SIZE],
}

impl Apu {
    pub const STATE_SIZE: usize =
        REGISTER_COUNT + WAVE_RAM_SIZE + 1 + 1 + 4 + CHANNEL_COUNT * Channel::STATE_SIZE;

    // Blank, unpowered APU. Used as the target of a state load.
    fn blank(timebase: Timebase) -> Self {
        Self {
            channels: core::array::from_fn(Channel::new),
            enabled: false,
            master: MasterVolume::default(),
            output_enabled: true,
            regs: [0; REGISTER_COUNT],
            timebase,
            wave_ram: WAVE_PATTERN,
        }
    }

    #[must_use]
    #[inline]
    pub fn channel(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    /// Hardware status of a channel, as reported by NR52.
    #[must_use]
    #[inline]
    pub fn channel_enabled(&self, index: usize) -> bool {
        self.channels
            .get(index)
            .is_some_and(Channel::active)
    }

    /// Restores a snapshot produced by [`Apu::save`]. On error `self` is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StateSizeMismatch`] if `state` is not exactly
    /// [`Apu::STATE_SIZE`] bytes long.
    #[inline]
    pub fn load(&mut self, state: &[u8]) -> Result<(), Error> {
        if state.len() != Self::STATE_SIZE {
            return Err(Error::StateSizeMismatch {
                expected: Self::STATE_SIZE,
                actual: state.len(),
            });
        }

        let mut r = Reader::new(state);

        let mut regs = [0; REGISTER_COUNT];
        r.read_exact(&mut regs);
        let mut wave_ram = [0; WAVE_RAM_SIZE];
        r.read_exact(&mut wave_ram);
        let master = MasterVolume::from_nr50(r.read_u8());
        let flags = r.read_u8();
        let timebase = Timebase::from_reference(r.read_u32());

        let mut apu = Self::blank(timebase);
        apu.regs = regs;
        apu.wave_ram = wave_ram;
        apu.master = master;
        apu.enabled = flags & 1 != 0;
        apu.output_enabled = flags & 2 != 0;

        for (index, channel) in apu.channels.iter_mut().enumerate() {
            *channel = Channel::load(index, &mut r);
            channel.retime(timebase);
        }

        debug_assert_eq!(r.position(), Self::STATE_SIZE);

        *self = apu;
        trace::state_loaded(state.len());
        Ok(())
    }

    #[must_use]
    #[inline]
    pub const fn master_volume(&self) -> MasterVolume {
        self.master
    }

    #[must_use]
    pub(crate) fn new(timebase: Timebase) -> Self {
        let mut apu = Self::blank(timebase);
        apu.enabled = true;

        for (address, val) in POWER_ON {
            apu.write(address, val);
        }

        apu
    }

    #[must_use]
    #[inline]
    pub const fn output_enabled(&self) -> bool {
        self.output_enabled
    }

    #[must_use]
    #[inline]
    pub const fn powered(&self) -> bool {
        self.enabled
    }

    /// Reads a sound register. Write-only bits read back as one.
    #[must_use]
    #[inline]
    pub fn read(&self, address: u16) -> u8 {
        let reg = Register::decode(address);
        debug_assert!(reg.is_some(), "read outside the sound registers: {address:#06X}");
        let Some(reg) = reg else {
            trace::invalid_address(address, "read");
            return 0xFF;
        };

        match reg {
            Register::Nr52 => {
                let status = self
                    .channels
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.active())
                    .fold(0, |acc, (i, _)| acc | (1 << i));

                reg.read_mask() | (u8::from(self.enabled) << 7) | status
            }
            Register::WaveRam(index) => self.wave_ram[usize::from(index) % WAVE_RAM_SIZE],
            _ => {
                let stored = Register::index(address)
                    .and_then(|i| self.regs.get(i))
                    .copied()
                    .unwrap_or(0);
                stored | reg.read_mask()
            }
        }
    }

    /// Fills `out` with interleaved stereo samples, advancing the APU by
    /// `out.len() / 2` samples. A trailing odd element is zeroed.
    #[inline]
    pub fn render(&mut self, out: &mut [i16]) {
        let mut frames = out.chunks_exact_mut(2);

        for frame in &mut frames {
            for (index, channel) in self.channels.iter_mut().enumerate() {
                if let Some(reason) = channel.tick(self.timebase, &self.wave_ram) {
                    trace::channel_disabled(index, reason);
                }
            }

            let (left, right) = if self.output_enabled {
                mixer::mix(&self.channels, self.master)
            } else {
                (0, 0)
            };

            frame[0] = left;
            frame[1] = right;
        }

        frames.into_remainder().fill(0);
    }

    #[must_use]
    #[inline]
    pub fn render_vec(&mut self, samples: usize) -> Vec<i16> {
        let mut out = alloc::vec![0; samples * 2];
        self.render(&mut out);
        out
    }

    #[must_use]
    #[inline]
    pub const fn sample_rate(&self) -> u32 {
        self.timebase.sample_rate()
    }

    /// Writes a snapshot of the whole APU into `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StateSizeMismatch`] if `buf` is not exactly
    /// [`Apu::STATE_SIZE`] bytes long.
    #[inline]
    pub fn save(&self, buf: &mut [u8]) -> Result<(), Error> {
        if buf.len() != Self::STATE_SIZE {
            return Err(Error::StateSizeMismatch {
                expected: Self::STATE_SIZE,
                actual: buf.len(),
            });
        }

        self.write_state(buf);
        Ok(())
    }

    #[must_use]
    #[inline]
    pub fn save_vec(&self) -> Vec<u8> {
        let mut buf = alloc::vec![0; Self::STATE_SIZE];
        self.write_state(&mut buf);
        buf
    }

    /// Host-level mute, independent of the hardware registers.
    #[inline]
    pub fn set_channel_muted(&mut self, index: usize, muted: bool) {
        if let Some(channel) = self.channels.get_mut(index) {
            channel.set_muted(muted);
        }
    }

    /// Gates the mixed output. A closed gate renders silence while the
    /// channels keep running.
    #[inline]
    pub const fn set_output_enabled(&mut self, enabled: bool) {
        self.output_enabled = enabled;
    }

    fn set_power(&mut self, on: bool) {
        if on == self.enabled {
            return;
        }

        if !on {
            self.regs[..CLEARED_ON_POWER_OFF].fill(0);
            for (index, channel) in self.channels.iter_mut().enumerate() {
                channel.reset(index);
            }
            self.master = MasterVolume::default();
        }

        self.enabled = on;
        trace::power(on);
    }

    /// Changes the output rate. Phase increments only depend on the
    /// emulated clock, so the accumulators are just clamped into the new
    /// reference.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSampleRate`] if the rate is out of range, in
    /// which case nothing changes.
    #[inline]
    pub fn set_sample_rate(&mut self, sample_rate: u32) -> Result<(), Error> {
        self.timebase = validated_timebase(sample_rate)?;

        for channel in &mut self.channels {
            channel.retime(self.timebase);
        }

        trace::sample_rate(sample_rate);
        Ok(())
    }

    #[must_use]
    #[inline]
    pub const fn state_size(&self) -> usize {
        Self::STATE_SIZE
    }

    #[must_use]
    #[inline]
    pub const fn wave_ram(&self) -> &[u8; WAVE_RAM_SIZE] {
        &self.wave_ram
    }

    fn write_state(&self, buf: &mut [u8]) {
        let mut w = Writer::new(buf);
        w.write_all(&self.regs);
        w.write_all(&self.wave_ram);
        w.write_u8(self.master.read_nr50());
        w.write_u8(u8::from(self.enabled) | (u8::from(self.output_enabled) << 1));
        w.write_u32(self.timebase.reference());

        for channel in &self.channels {
            channel.save(&mut w);
        }

        debug_assert_eq!(w.position(), Self::STATE_SIZE);
    }

    /// Writes a sound register, applying power gating and trigger
    /// transitions.
    #[inline]
    pub fn write(&mut self, address: u16, val: u8) {
        let reg = Register::decode(address);
        debug_assert!(reg.is_some(), "write outside the sound registers: {address:#06X}");
        let Some(reg) = reg else {
            trace::invalid_address(address, "write");
            return;
        };

        trace::register_write(address, val);

        match reg {
            Register::WaveRam(index) => {
                self.wave_ram[usize::from(index) % WAVE_RAM_SIZE] = val;
                return;
            }
            Register::Nr52 => {
                self.set_power(val & 0x80 != 0);
                return;
            }
            Register::Unused(_) => return,
            _ if !self.enabled => return,
            _ => (),
        }

        if let Some(slot) = Register::index(address).and_then(|i| self.regs.get_mut(i)) {
            *slot = val;
        }

        let Some(index) = reg.channel() else {
            match reg {
                Register::Nr50 => self.master.write_nr50(val),
                Register::Nr51 => {
                    for (i, channel) in self.channels.iter_mut().enumerate() {
                        channel.set_routing(val & (0x10 << i) != 0, val & (1 << i) != 0);
                    }
                }
                _ => (),
            }
            return;
        };

        let channel = &mut self.channels[index];

        match reg {
            Register::Nr10 => channel.write_sweep(val),
            Register::Nr11 | Register::Nr21 | Register::Nr31 | Register::Nr41 => {
                channel.write_length_duty(val);
            }
            Register::Nr12 | Register::Nr22 | Register::Nr42 => channel.write_envelope(val),
            Register::Nr13 | Register::Nr23 | Register::Nr33 => channel.write_freq_low(val),
            Register::Nr30 => channel.write_dac(val),
            Register::Nr32 => channel.write_output_level(val),
            Register::Nr43 => channel.write_polynomial(val),
            Register::Nr14 | Register::Nr24 | Register::Nr34 | Register::Nr44 => {
                if let Some(outcome) = channel.write_control(val, &self.wave_ram) {
                    trace::channel_trigger(index, channel.freq(), channel.enabled());
                    if let Some(reason) = outcome {
                        trace::channel_disabled(index, reason);
                    }
                }
            }
            _ => (),
        }
    }
}

pub(crate) fn validated_timebase(sample_rate: u32) -> Result<Timebase, Error> {
    if (MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
        Ok(Timebase::new(sample_rate))
    } else {
        Err(Error::InvalidSampleRate { sample_rate })
    }
}
