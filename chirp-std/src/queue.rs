use crate::{Error, SharedApu};

/// Buffers register writes on the emulation thread and applies them to a
/// [`SharedApu`] in order, under a single lock acquisition per flush.
///
/// A full queue flushes itself before accepting the next write. Pending
/// writes are flushed on drop.
pub struct WriteQueue<const N: usize> {
    pending: heapless::Vec<(u16, u8), N>,
    shared: SharedApu,
}

impl<const N: usize> WriteQueue<N> {
    /// Applies every pending write and returns how many there were.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Poisoned`] if the lock is poisoned. The pending
    /// writes are kept in that case.
    #[inline]
    pub fn flush(&mut self) -> Result<usize, Error> {
        if self.pending.is_empty() {
            return Ok(0);
        }

        let pending = &self.pending;
        self.shared.with_registers(|regs| {
            for &(address, val) in pending {
                regs.write(address, val);
            }
        })?;

        let count = self.pending.len();
        self.pending.clear();
        Ok(count)
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    #[inline]
    pub const fn new(shared: SharedApu) -> Self {
        Self {
            pending: heapless::Vec::new(),
            shared,
        }
    }

    /// Queues a write, flushing first if the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Poisoned`] if a flush was needed and the lock is
    /// poisoned.
    #[inline]
    pub fn push(&mut self, address: u16, val: u8) -> Result<(), Error> {
        if self.pending.is_full() {
            self.flush()?;
        }

        if self.pending.push((address, val)).is_err() {
            // only reachable with a zero capacity queue
            self.shared.write(address, val)?;
        }

        Ok(())
    }
}

impl<const N: usize> Drop for WriteQueue<N> {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            tracing::warn!(
                target: "apu",
                dropped = self.pending.len(),
                "failed to flush queued register writes: {err}"
            );
        }
    }
}
