//! Structured APU events using the Rust tracing crate.
//!
//! Every event is emitted with the `apu` target so hosts can filter them with
//! an `EnvFilter` directive such as `RUST_LOG=apu=trace`. Nothing here fires
//! per rendered sample; the hot path only reports state transitions.
//!
//! # Example
//!
//! ```rust,ignore
//! use tracing_subscriber::{fmt, EnvFilter};
//!
//! tracing::subscriber::with_default(
//!     fmt::Subscriber::builder()
//!         .with_env_filter(EnvFilter::new("apu=debug"))
//!         .finish(),
//!     || {
//!         let mut apu = chirp_core::ApuBuilder::new(48_000).build().unwrap();
//!         apu.write(0xFF26, 0x00); // logs APU_POWER
//!     },
//! );
//! ```

use crate::apu::DisableReason;

pub const TARGET: &str = "apu";

/// A channel stopped producing sound because of a hardware condition.
#[inline]
pub fn channel_disabled(channel: usize, reason: DisableReason) {
    tracing::event!(
        target: TARGET,
        tracing::Level::TRACE,
        channel = channel,
        reason = reason.as_str(),
        "CHANNEL_DISABLED"
    );
}

/// A trigger write restarted a channel.
#[inline]
pub fn channel_trigger(channel: usize, freq: u16, enabled: bool) {
    tracing::event!(
        target: TARGET,
        tracing::Level::DEBUG,
        channel = channel,
        freq = freq,
        enabled = enabled,
        "CHANNEL_TRIGGER"
    );
}

#[inline]
pub fn invalid_address(address: u16, access: &'static str) {
    tracing::event!(
        target: TARGET,
        tracing::Level::WARN,
        address = address,
        access = access,
        "INVALID_ADDRESS"
    );
}

/// Master power was switched through NR52.
#[inline]
pub fn power(on: bool) {
    tracing::event!(target: TARGET, tracing::Level::DEBUG, on = on, "APU_POWER");
}

#[inline]
pub fn register_write(address: u16, val: u8) {
    tracing::event!(
        target: TARGET,
        tracing::Level::TRACE,
        address = address,
        val = val,
        "REGISTER_WRITE"
    );
}

#[inline]
pub fn sample_rate(sample_rate: u32) {
    tracing::event!(
        target: TARGET,
        tracing::Level::DEBUG,
        sample_rate = sample_rate,
        "SAMPLE_RATE"
    );
}

#[inline]
pub fn state_loaded(size: usize) {
    tracing::event!(target: TARGET, tracing::Level::DEBUG, size = size, "STATE_LOADED");
}
