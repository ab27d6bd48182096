//! Driver callback interfaces
//!
//! Device drivers own their handler objects and register references to them. Callbacks run
//! after the engine released its registry lock, so a handler may register subscriptions or
//! issue queries from inside a callback. They run in the context of the caller of
//! `Node::process` or `Node::tick` and must not block.

use crate::frame::{Data, Frame};

/// Request handler for one data definition code
///
/// Returns the response payload, or `None` to send no response.
/// Any `Fn(&Frame) -> Option<Data> + Sync` closure is a handler.
pub trait DdefHandler: Sync {
    fn handle(&self, request: &Frame) -> Option<Data>;
}

impl<F> DdefHandler for F
where
    F: Fn(&Frame) -> Option<Data> + Sync,
{
    fn handle(&self, request: &Frame) -> Option<Data> {
        self(request)
    }
}

/// Periodically published frame consumer
pub trait BroadcastHandler: Sync {
    fn on_frame(&self, frame: &Frame);

    /// The publisher stayed silent for longer than the subscription timeout.
    ///
    /// Fires again after each further timeout period of silence.
    fn on_timeout(&self) {}
}

/// Query response consumer
pub trait QueryHandler: Sync {
    fn on_response(&self, frame: &Frame);

    /// The query ended without (further) responses.
    ///
    /// `killed` is true if the query was evicted, replaced or cancelled, and false if its
    /// time to live expired.
    fn on_death(&self, killed: bool) {
        let _ = killed;
    }
}

/// Legacy frame consumer, also acting as a communication watchdog
pub trait NonCompliantHandler: Sync {
    fn on_frame(&self, frame: &Frame);

    /// No matching frame arrived within the subscription timeout.
    ///
    /// Fires again after each further timeout period of silence, with `killed` set to false.
    fn on_death(&self, killed: bool) {
        let _ = killed;
    }
}
