use crate::Error;
use chirp_core::Apu;
use std::sync::{Arc, Mutex};

/// Register access handed out while [`SharedApu::with_registers`] holds the
/// lock.
pub struct RegisterBus<'a> {
    apu: &'a mut Apu,
}

impl RegisterBus<'_> {
    #[must_use]
    #[inline]
    pub fn read(&self, address: u16) -> u8 {
        self.apu.read(address)
    }

    #[inline]
    pub fn write(&mut self, address: u16, val: u8) {
        self.apu.write(address, val);
    }
}

/// An [`Apu`] behind a mutex, shared between the emulation thread issuing
/// register writes and the audio thread pulling samples. Clones share the
/// same APU.
#[derive(Clone, Debug)]
pub struct SharedApu {
    apu: Arc<Mutex<Apu>>,
}

impl SharedApu {
    #[must_use]
    #[inline]
    pub fn new(apu: Apu) -> Self {
        Self {
            apu: Arc::new(Mutex::new(apu)),
        }
    }

    /// Hardware status of a channel, as reported by NR52.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Poisoned`] if another thread panicked with the lock.
    #[inline]
    pub fn channel_enabled(&self, channel: usize) -> Result<bool, Error> {
        self.with_apu(|apu| apu.channel_enabled(channel))
    }

    /// Restores a snapshot under one lock acquisition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Poisoned`] if the lock is poisoned, or the core error
    /// if the snapshot has the wrong size.
    #[inline]
    pub fn load(&self, state: &[u8]) -> Result<(), Error> {
        self.with_apu(|apu| apu.load(state))?.map_err(Error::from)
    }

    /// Reads one register.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Poisoned`] if another thread panicked with the lock.
    #[inline]
    pub fn read(&self, address: u16) -> Result<u8, Error> {
        self.with_apu(|apu| apu.read(address))
    }

    /// Renders interleaved stereo samples, holding the lock for the whole
    /// buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Poisoned`] if another thread panicked with the lock.
    #[inline]
    pub fn render(&self, out: &mut [i16]) -> Result<(), Error> {
        self.with_apu(|apu| apu.render(out))
    }

    /// # Errors
    ///
    /// Returns [`Error::Poisoned`] if another thread panicked with the lock.
    #[inline]
    pub fn save_vec(&self) -> Result<Vec<u8>, Error> {
        self.with_apu(|apu| apu.save_vec())
    }

    /// # Errors
    ///
    /// Returns [`Error::Poisoned`] if another thread panicked with the lock.
    #[inline]
    pub fn set_channel_muted(&self, channel: usize, muted: bool) -> Result<(), Error> {
        self.with_apu(|apu| apu.set_channel_muted(channel, muted))
    }

    /// # Errors
    ///
    /// Returns [`Error::Poisoned`] if another thread panicked with the lock.
    #[inline]
    pub fn set_output_enabled(&self, enabled: bool) -> Result<(), Error> {
        self.with_apu(|apu| apu.set_output_enabled(enabled))
    }

    /// Clones the current state, for inspection off the audio path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Poisoned`] if another thread panicked with the lock.
    #[inline]
    pub fn snapshot(&self) -> Result<Apu, Error> {
        self.with_apu(|apu| apu.clone())
    }

    fn with_apu<R>(&self, f: impl FnOnce(&mut Apu) -> R) -> Result<R, Error> {
        self.apu
            .lock()
            .map_or(Err(Error::Poisoned), |mut apu| Ok(f(&mut *apu)))
    }

    /// Runs `f` with the lock held, so a batch of reads and writes lands
    /// between two render calls in issue order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Poisoned`] if another thread panicked with the lock.
    #[inline]
    pub fn with_registers<R>(&self, f: impl FnOnce(&mut RegisterBus<'_>) -> R) -> Result<R, Error> {
        self.with_apu(|apu| f(&mut RegisterBus { apu }))
    }

    /// Writes one register.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Poisoned`] if another thread panicked with the lock.
    #[inline]
    pub fn write(&self, address: u16, val: u8) -> Result<(), Error> {
        self.with_apu(|apu| apu.write(address, val))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chirp_core::ApuBuilder;

    fn shared() -> SharedApu {
        match ApuBuilder::new(48_000).build() {
            Ok(apu) => SharedApu::new(apu),
            Err(err) => panic!("failed to build apu: {err}"),
        }
    }

    #[test]
    fn test_clones_share_state() {
        let a = shared();
        let b = a.clone();

        assert_eq!(a.write(0xFF24, 0x35), Ok(()));

        assert_eq!(b.read(0xFF24), Ok(0x35));
    }

    #[test]
    fn test_batch_reads_see_batch_writes() {
        let apu = shared();

        let status = apu.with_registers(|regs| {
            regs.write(0xFF12, 0xF0);
            regs.write(0xFF14, 0x80);
            regs.read(0xFF26)
        });

        assert_eq!(status, Ok(0xF1));
    }

    #[test]
    fn test_load_reports_size_error() {
        let apu = shared();

        assert_eq!(
            apu.load(&[1, 2, 3]),
            Err(Error::Apu(chirp_core::Error::StateSizeMismatch {
                expected: chirp_core::Apu::STATE_SIZE,
                actual: 3,
            }))
        );
    }
}
