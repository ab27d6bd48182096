//! CVNP driver interface
//!
//! The crate provides the interface between a CAN device driver and the CVNP engine.
//! Limited scope facilitates compatibility across versions.
//! Platform crates should depend on this crate. CVNP users should depend on the `cvnp` crate
//! instead.
//!
//! The platform side of the engine consists of two parts:
//! * `Hal` is a set of synchronous collaborator hooks the engine calls: frame transmission,
//!   the millisecond clock, the error sink and the system reset.
//! * `Link` is an optional pair of bounded frame channels. An interrupt handler pushes received
//!   frames into it and a transmit routine pulls outbound frames from it, so that all engine
//!   work happens in a single task instead of interrupt context.
//!
//! Transmission is best-effort. A driver that cannot queue or send a frame reports
//! `ErrorKind::TransmitFailed` through its own error sink; the engine never waits for the bus.

#![no_std]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod frame;
pub mod hal;
pub mod link;

pub mod time {
    pub use cvnp_core::Timestamp;
    pub use embassy_time::{Duration, Instant};

    /// Converts a monotonic instant to the wrapping millisecond clock used on the bus.
    pub fn timestamp(instant: Instant) -> Timestamp {
        // Truncation is the intended wrap of the 32-bit clock.
        Timestamp::from_millis(instant.as_millis() as u32)
    }

    /// Current value of the wrapping millisecond clock
    pub fn now() -> Timestamp {
        timestamp(Instant::now())
    }
}
