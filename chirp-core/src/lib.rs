//! # Chirp Game Boy APU
//!
//! Chirp emulates the audio processing unit of the original Game Boy: two
//! square channels (the first one with a frequency sweep), a programmable
//! wave channel and a noise channel, driven through the memory mapped
//! registers at `0xFF10..=0xFF3F` and rendered as interleaved 16-bit stereo.
//!
//! Time is counted in output samples, never in wall-clock time, so two APUs
//! fed the same register writes render byte-identical audio.
//!
//! ```rust
//! use chirp_core::ApuBuilder;
//!
//! let mut apu = ApuBuilder::new(48_000).build()?;
//! apu.write(0xFF12, 0xF0); // full volume, DAC on
//! apu.write(0xFF13, 0x00);
//! apu.write(0xFF14, 0x87); // trigger
//!
//! let mut samples = [0; 2 * 512];
//! apu.render(&mut samples);
//! # Ok::<(), chirp_core::Error>(())
//! ```
//!
//! ## Tracing
//!
//! State transitions are reported through the `tracing` crate under the
//! `apu` target, see [`trace`].

extern crate alloc;

mod apu;
mod error;
pub mod trace;

pub use {
    apu::{
        AMPLITUDE_UNIT, Apu, CHANNEL_COUNT, Channel, DisableReason, Duty, Kind, MasterVolume,
        Noise, REGISTERS_END, REGISTERS_START, Register, Square, Timebase, Wave,
    },
    error::Error,
};

/// Emulated master clock, in Hz.
pub const CLOCK_HZ: u32 = 4_194_304;
pub const MIN_SAMPLE_RATE: u32 = 1_000;
pub const MAX_SAMPLE_RATE: u32 = 192_000;

#[derive(Clone, Copy, Debug)]
pub struct ApuBuilder {
    muted: [bool; CHANNEL_COUNT],
    output_enabled: bool,
    sample_rate: u32,
}

impl ApuBuilder {
    /// Builds a powered APU with the post-boot register values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSampleRate`] if the sample rate is outside
    /// [`MIN_SAMPLE_RATE`]`..=`[`MAX_SAMPLE_RATE`].
    #[inline]
    pub fn build(self) -> Result<Apu, Error> {
        let timebase = apu::validated_timebase(self.sample_rate)?;
        let mut apu = Apu::new(timebase);

        apu.set_output_enabled(self.output_enabled);
        for (index, muted) in self.muted.into_iter().enumerate() {
            apu.set_channel_muted(index, muted);
        }

        Ok(apu)
    }

    #[must_use]
    #[inline]
    pub const fn new(sample_rate: u32) -> Self {
        Self {
            muted: [false; CHANNEL_COUNT],
            output_enabled: true,
            sample_rate,
        }
    }

    /// Mutes a channel on the host side. Out of range channels are ignored.
    #[must_use]
    #[inline]
    pub const fn with_muted(mut self, channel: usize, muted: bool) -> Self {
        if channel < CHANNEL_COUNT {
            self.muted[channel] = muted;
        }
        self
    }

    #[must_use]
    #[inline]
    pub const fn with_output_enabled(mut self, enabled: bool) -> Self {
        self.output_enabled = enabled;
        self
    }
}
