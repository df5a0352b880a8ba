//! Std glue for `chirp-core`: a lock-guarded APU shared between the emulation
//! and audio threads, and a batching write queue in front of it.
//!
//! Use [`chirp_core::Apu`] directly when everything runs on one thread; no
//! lock is involved there.

mod error;
mod queue;
mod shared;

pub use chirp_core::{Apu, ApuBuilder};
pub use {
    error::Error,
    queue::WriteQueue,
    shared::{RegisterBus, SharedApu},
};
