use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::core::Timestamp;
use crate::hal::Hal;
use crate::node::Node;

impl<M: RawMutex, H: Hal, const BC: usize, const SQ: usize, const MC: usize, const NC: usize>
    Node<'_, M, H, BC, SQ, MC, NC>
{
    /// Expires time-bounded entries.
    ///
    /// Call periodically, typically every 10 ms. Silent broadcast subscriptions get
    /// `on_timeout`, expired queries get `on_death(false)` and are removed, silent
    /// non-compliant subscriptions get `on_death(false)` and keep watching.
    ///
    /// Every slot is checked in its own critical section and callbacks run outside of it.
    pub fn tick(&self, now: Timestamp) {
        for index in 0..BC {
            if let Some(handler) = self.registries.broadcast.expire(index, now) {
                debug!("Broadcast subscription {} timed out", index);
                handler.on_timeout();
            }
        }

        for index in 0..SQ {
            if let Some(handler) = self.registries.query.expire(index, now) {
                debug!("Query {} expired", index);
                handler.on_death(false);
            }
        }

        for index in 0..MC {
            if let Some(handler) = self.registries.multicast.expire(index, now) {
                debug!("Multicast query {} expired", index);
                handler.on_death(false);
            }
        }

        for index in 0..NC {
            if let Some(handler) = self.registries.non_compliant.expire(index, now) {
                debug!("Non-compliant subscription {} timed out", index);
                handler.on_death(false);
            }
        }
    }
}
