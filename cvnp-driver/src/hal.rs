//! Platform collaborator hooks

use crate::frame::Frame;
use crate::time::Timestamp;

/// Anomaly reported through `Hal::handle_error`
///
/// None of these is fatal. The offending frame is dropped and processing continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// A response matched no live query: a duplicate device address, a late response after
    /// expiry or a spurious frame.
    UnmatchedResponse,
    /// A non-compliant frame matched no registered subscription.
    UnhandledNonCompliantFrame,
    /// The platform failed to queue or transmit a frame.
    TransmitFailed,
}

/// Target-specific access layer
///
/// Everything platform-dependent goes here; the engine itself is platform independent.
/// The hooks are called with no engine lock held and must not block.
pub trait Hal {
    /// Initializes the bus hardware. Returns true on success.
    fn init(&self) -> bool {
        true
    }

    /// Transmits a frame, best-effort.
    ///
    /// A failure should be reported as `ErrorKind::TransmitFailed` rather than returned.
    fn send_frame(&self, frame: &Frame);

    /// Current value of the monotonic millisecond clock
    fn now(&self) -> Timestamp;

    /// Sink for internally detected anomalies
    fn handle_error(&self, error: ErrorKind);

    /// Performs a system-level reset, as requested by the reset data definition.
    fn reset_system(&self);
}

impl<T: Hal + ?Sized> Hal for &T {
    fn init(&self) -> bool {
        T::init(self)
    }

    fn send_frame(&self, frame: &Frame) {
        T::send_frame(self, frame)
    }

    fn now(&self) -> Timestamp {
        T::now(self)
    }

    fn handle_error(&self, error: ErrorKind) {
        T::handle_error(self, error)
    }

    fn reset_system(&self) {
        T::reset_system(self)
    }
}
