use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::core::{CompliantId, DeviceAddress};
use crate::frame::{Data, Frame};
use crate::hal::{ErrorKind, Hal};
use crate::node::{Node, builtin};
use crate::registry::ddef::{Binding, Builtin};

impl<M: RawMutex, H: Hal, const BC: usize, const SQ: usize, const MC: usize, const NC: usize>
    Node<'_, M, H, BC, SQ, MC, NC>
{
    /// Dispatches an incoming frame.
    ///
    /// Call for every received frame, e.g. from the CAN receive interrupt. Each frame takes
    /// exactly one path: a request is served by its data definition handler, a broadcast
    /// refreshes its subscription, a response resolves a pending query, and anything else
    /// is matched against the non-compliant subscriptions by raw identifier. A frame no
    /// subscription matches on that last path, including a compliant frame addressed to
    /// another device, is reported as `ErrorKind::UnhandledNonCompliantFrame`.
    pub fn process(&self, frame: &Frame) {
        let Some(own) = self.address() else {
            trace!("Not started, frame {:x} dropped", frame.id);
            return;
        };

        let id = frame.compliant_id();
        // Standard-format frames always take the compliant path, whatever their bits decode to.
        let compliant = !id.non_compliant || !frame.extended;

        if compliant && id.receiver.accepts(own) {
            if frame.request {
                self.serve_request(own, id, frame);
            } else if id.broadcast {
                self.deliver_broadcast(id, frame);
            } else {
                self.deliver_response(id, frame);
            }
        } else {
            self.deliver_non_compliant(frame);
        }
    }

    fn serve_request(&self, own: DeviceAddress, id: CompliantId, frame: &Frame) {
        let response = match self.registries.ddef.resolve(id.data_def) {
            Binding::Handler(handler) => handler.handle(frame),
            Binding::Builtin(builtin) => self.run_builtin(builtin, own, id, frame),
            Binding::Unbound => {
                debug!("No handler for ddef {}", id.data_def.into_u8());
                Some(builtin::error_report(frame, id.data_def))
            }
        };

        if let Some(data) = response {
            self.hal
                .send_frame(&Frame::compliant(id.reply(own), false, data));
        }
    }

    fn run_builtin(
        &self,
        builtin: Builtin,
        own: DeviceAddress,
        id: CompliantId,
        frame: &Frame,
    ) -> Option<Data> {
        match builtin {
            Builtin::ErrorReport => Some(builtin::error_report(frame, id.data_def)),
            Builtin::DeviceInfo => Some(builtin::device_info(own)),
            Builtin::Reset => {
                if builtin::is_reset_request(frame) {
                    warn!(
                        "Reset requested by class {} instance {}",
                        id.sender.class.into_u8(),
                        id.sender.instance.into_u8()
                    );
                    self.hal.reset_system();
                }
                None
            }
        }
    }

    fn deliver_broadcast(&self, id: CompliantId, frame: &Frame) {
        let now = self.hal.now();
        match self
            .registries
            .broadcast
            .hit(id.sender.class, id.data_def, now)
        {
            Some(handler) => handler.on_frame(frame),
            None => trace!(
                "Unsubscribed broadcast class {} ddef {}",
                id.sender.class.into_u8(),
                id.data_def.into_u8()
            ),
        }
    }

    fn deliver_response(&self, id: CompliantId, frame: &Frame) {
        let handler = self
            .registries
            .query
            .hit(id.sender, id.data_def)
            .or_else(|| self.registries.multicast.hit(id.sender, id.data_def));

        match handler {
            Some(handler) => handler.on_response(frame),
            None => {
                debug!(
                    "Unmatched response from class {} instance {} ddef {}",
                    id.sender.class.into_u8(),
                    id.sender.instance.into_u8(),
                    id.data_def.into_u8()
                );
                self.hal.handle_error(ErrorKind::UnmatchedResponse);
            }
        }
    }

    fn deliver_non_compliant(&self, frame: &Frame) {
        let now = self.hal.now();
        match self.registries.non_compliant.hit(frame.wire_id(), now) {
            Some(handler) => handler.on_frame(frame),
            None => {
                debug!("Unhandled non-compliant frame {:x}", frame.id);
                self.hal.handle_error(ErrorKind::UnhandledNonCompliantFrame);
            }
        }
    }
}
