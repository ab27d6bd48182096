//! Channels connecting a CAN driver and the CVNP engine

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;

use crate::frame::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueFull;

/// Pair of bounded frame queues
///
/// The receive queue is filled by the driver, typically from the CAN receive interrupt, and
/// drained by the engine runner. The transmit queue is filled by a `Hal::send_frame`
/// implementation and drained by the driver.
///
/// Both sides are non-blocking on the producer end: a full queue drops the frame and
/// returns `QueueFull`, which the platform should report as `ErrorKind::TransmitFailed` on
/// transmission. Use `CriticalSectionRawMutex` when the producer runs in interrupt context.
pub struct Link<M: RawMutex, const RX: usize, const TX: usize> {
    rx: Channel<M, Frame, RX>,
    tx: Channel<M, Frame, TX>,
}

impl<M: RawMutex, const RX: usize, const TX: usize> Link<M, RX, TX> {
    pub const fn new() -> Self {
        Self {
            rx: Channel::new(),
            tx: Channel::new(),
        }
    }

    /// Queues a received frame. Safe to call from an interrupt handler.
    pub fn try_push_received(&self, frame: Frame) -> Result<(), QueueFull> {
        self.rx.try_send(frame).map_err(|_| {
            warn!("Receive queue full, frame {:x} dropped", frame.id);
            QueueFull
        })
    }

    /// Asynchronously fetches the next received frame. Safe to drop.
    pub async fn receive(&self) -> Frame {
        self.rx.receive().await
    }

    pub fn try_receive(&self) -> Option<Frame> {
        self.rx.try_receive().ok()
    }

    /// Queues a frame for transmission.
    pub fn try_transmit(&self, frame: Frame) -> Result<(), QueueFull> {
        self.tx.try_send(frame).map_err(|_| {
            warn!("Transmit queue full, frame {:x} dropped", frame.id);
            QueueFull
        })
    }

    /// Asynchronously fetches the next frame to transmit. Safe to drop.
    pub async fn pop_transmit(&self) -> Frame {
        self.tx.receive().await
    }

    /// Fetches the next frame to transmit, e.g. from a transmit-complete interrupt.
    pub fn try_pop_transmit(&self) -> Option<Frame> {
        self.tx.try_receive().ok()
    }
}

impl<M: RawMutex, const RX: usize, const TX: usize> Default for Link<M, RX, TX> {
    fn default() -> Self {
        Self::new()
    }
}
