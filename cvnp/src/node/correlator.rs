use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::core::{CompliantId, DataDef, DeviceAddress};
use crate::frame::{Data, Frame};
use crate::hal::Hal;
use crate::node::{Node, NotStarted, Query};
use crate::registry::query::Entry;

impl<'a, M: RawMutex, H: Hal, const BC: usize, const SQ: usize, const MC: usize, const NC: usize>
    Node<'a, M, H, BC, SQ, MC, NC>
{
    /// Sends a request and tracks its response.
    ///
    /// The correlation is keyed by the target address and data definition, since the target
    /// becomes the sender of the response. A wildcard target selects the multicast table.
    /// The correlation is installed before the request is sent, so a response processed
    /// from an interrupt during `Hal::send_frame` already finds it.
    ///
    /// Never fails for lack of space: the pending query with the same key, or else the
    /// oldest one, is displaced and notified with `on_death(true)`.
    pub fn query(&self, query: Query<'a>, payload: Data) -> Result<(), NotStarted> {
        let own = self.address().ok_or(NotStarted)?;
        let now = self.hal.now();

        let entry = Entry {
            responder: query.target,
            data_def: query.data_def,
            ttl_ms: query.ttl_ms,
            submitted: now,
            handler: query.handler,
        };
        let displaced = if query.target.has_wildcard() {
            self.registries.multicast.submit(entry, now)
        } else {
            self.registries.query.submit(entry, now)
        };

        let id = CompliantId::new(own, query.target, query.data_def);
        self.hal.send_frame(&Frame::compliant(id, true, payload));

        if let Some(handler) = displaced {
            debug!(
                "Query displaced for class {} instance {} ddef {}",
                query.target.class.into_u8(),
                query.target.instance.into_u8(),
                query.data_def.into_u8()
            );
            handler.on_death(true);
        }
        Ok(())
    }

    /// Drops a pending query, notifying it with `on_death(true)`.
    ///
    /// Returns false if no query for this target and data definition is pending.
    pub fn cancel_query(&self, target: DeviceAddress, data_def: DataDef) -> bool {
        let handler = if target.has_wildcard() {
            self.registries.multicast.cancel(target, data_def)
        } else {
            self.registries.query.cancel(target, data_def)
        };

        match handler {
            Some(handler) => {
                handler.on_death(true);
                true
            }
            None => false,
        }
    }

    /// Publishes a broadcast frame to every device on the bus.
    pub fn publish_broadcast(&self, data_def: DataDef, payload: Data) -> Result<(), NotStarted> {
        let own = self.address().ok_or(NotStarted)?;
        let mut id = CompliantId::new(own, DeviceAddress::WILDCARD, data_def);
        id.broadcast = true;
        self.hal.send_frame(&Frame::compliant(id, false, payload));
        Ok(())
    }

    /// Sends a data frame with a raw identifier, for peers that do not speak CVNP.
    pub fn send_raw(&self, id: u32, extended: bool, payload: Data) {
        self.hal.send_frame(&Frame::raw(id, extended, payload));
    }
}
