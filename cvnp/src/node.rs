//! CVNP node implementation
//!
//! Node holds the device address, the platform collaborator and the handler registries. It
//! classifies incoming frames and routes each one to exactly one registry, correlates outbound
//! queries with their responses and expires time-bounded entries on every tick.
//!
//! ## Examples
//!
//! A node is typically allocated statically, so that `'static` references can be shared with
//! the receive interrupt, the timer and the device drivers:
//! ```
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex as Mutex;
//! use cvnp::core::{ClassId, InstanceId, Timestamp};
//! use cvnp::frame::Frame;
//! use cvnp::hal::{ErrorKind, Hal};
//! use cvnp::node::Node;
//! use static_cell::StaticCell;
//!
//! struct Board;
//!
//! impl Hal for Board {
//!     fn send_frame(&self, _frame: &Frame) {}
//!     fn now(&self) -> Timestamp {
//!         Timestamp::ZERO
//!     }
//!     fn handle_error(&self, _error: ErrorKind) {}
//!     fn reset_system(&self) {}
//! }
//!
//! // Vehicle control module, first instance
//! const CLASS: ClassId = ClassId::new(2).unwrap();
//! const INSTANCE: InstanceId = InstanceId::new(1).unwrap();
//!
//! static NODE: StaticCell<Node<'static, Mutex, Board>> = StaticCell::new();
//! let node = NODE.init(Node::new(Board));
//! node.start(CLASS, INSTANCE).unwrap();
//! ```

use core::cell::Cell;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::config;
use crate::core::{ClassId, DataDef, DeviceAddress, InstanceId, Timestamp};
use crate::frame::Frame;
use crate::hal::Hal;
use crate::handler::{BroadcastHandler, DdefHandler, NonCompliantHandler, QueryHandler};
use crate::registry::query::Retention;
use crate::registry::{self, Registration, RegistrationError};

mod builtin;
mod correlator;
mod dispatch;
mod runner;
mod sweep;

pub use runner::Runner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartError {
    /// `Hal::init` reported a failure
    HalInit,
}

/// The node has no address yet; call `Node::start` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NotStarted;

/// Subscription to frames periodically published by a device class
#[derive(Clone, Copy)]
pub struct Broadcast<'a> {
    pub sender_class: ClassId,
    pub data_def: DataDef,
    /// Silence interval in ms that triggers `on_timeout`, 0 disables it
    pub timeout_ms: u32,
    pub handler: &'a dyn BroadcastHandler,
}

/// Subscription to frames with a raw, non-CVNP identifier
#[derive(Clone, Copy)]
pub struct NonCompliant<'a> {
    pub id: u32,
    /// Silence interval in ms that triggers `on_death`, 0 disables it
    pub timeout_ms: u32,
    pub handler: &'a dyn NonCompliantHandler,
}

/// Outbound request description
///
/// A target with a wildcard class or instance makes a multicast query that stays alive for
/// its whole time to live and may be answered by several peers. Otherwise the query is
/// resolved by its first response.
#[derive(Clone, Copy)]
pub struct Query<'a> {
    pub target: DeviceAddress,
    pub data_def: DataDef,
    /// Time to live in ms, 0 keeps the query until it is answered, evicted or cancelled
    pub ttl_ms: u32,
    pub handler: &'a dyn QueryHandler,
}

/// CVNP protocol engine
///
/// All operations take `&self` and are safe to call from different execution contexts as
/// long as `M` is a suitable mutex: `CriticalSectionRawMutex` when frames are processed in
/// interrupt handlers, `ThreadModeRawMutex` or `NoopRawMutex` when everything runs in a
/// single executor, e.g. through a `Runner`. Each registry scan or mutation runs in its own
/// critical section, bounded by the table size. Driver callbacks run outside of it.
///
/// Table capacities are compile-time parameters: broadcast subscriptions (`BC`), standard
/// queries (`SQ`), multicast queries (`MC`) and non-compliant subscriptions (`NC`).
pub struct Node<
    'a,
    M: RawMutex,
    H: Hal,
    const BC: usize = { config::BROADCAST_TABLE_SIZE },
    const SQ: usize = { config::QUERY_TABLE_SIZE },
    const MC: usize = { config::MULTICAST_TABLE_SIZE },
    const NC: usize = { config::NON_COMPLIANT_TABLE_SIZE },
> {
    hal: H,
    address: Mutex<M, Cell<Option<DeviceAddress>>>,
    registries: Registries<'a, M, BC, SQ, MC, NC>,
}

struct Registries<'a, M: RawMutex, const BC: usize, const SQ: usize, const MC: usize, const NC: usize>
{
    ddef: registry::ddef::Registry<'a, M>,
    broadcast: registry::broadcast::Registry<'a, M, BC>,
    query: registry::query::Registry<'a, M, SQ>,
    multicast: registry::query::Registry<'a, M, MC>,
    non_compliant: registry::non_compliant::Registry<'a, M, NC>,
}

impl<'a, M: RawMutex, H: Hal, const BC: usize, const SQ: usize, const MC: usize, const NC: usize>
    Node<'a, M, H, BC, SQ, MC, NC>
{
    pub const fn new(hal: H) -> Self {
        Self {
            hal,
            address: Mutex::new(Cell::new(None)),
            registries: Registries {
                ddef: registry::ddef::Registry::new(),
                broadcast: registry::broadcast::Registry::new(),
                query: registry::query::Registry::new(Retention::OneShot),
                multicast: registry::query::Registry::new(Retention::Persistent),
                non_compliant: registry::non_compliant::Registry::new(),
            },
        }
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    /// Address of this device, `None` until started
    pub fn address(&self) -> Option<DeviceAddress> {
        self.address.lock(|cell| cell.get())
    }

    /// Starts the node on the bus under the given address.
    ///
    /// Initializes the platform, then binds the built-in error report, device info and reset
    /// handlers to codes no driver has claimed yet. Frames are dropped until the node started.
    pub fn start(&self, class: ClassId, instance: InstanceId) -> Result<(), StartError> {
        if !self.hal.init() {
            error!("Platform initialization failed");
            return Err(StartError::HalInit);
        }

        self.registries.ddef.bind_builtins();
        let address = DeviceAddress::new(class, instance);
        self.address.lock(|cell| cell.set(Some(address)));
        info!(
            "Started as class {} instance {}",
            class.into_u8(),
            instance.into_u8()
        );
        Ok(())
    }

    /// Binds a request handler to a data definition code, overriding built-ins.
    pub fn register_ddef_handler(
        &self,
        code: DataDef,
        handler: &'a dyn DdefHandler,
    ) -> Registration {
        self.registries.ddef.register(code, handler)
    }

    /// Removes a driver request handler; built-in codes fall back to their built-in handler.
    pub fn unregister_ddef_handler(&self, code: DataDef) -> bool {
        let started = self.address().is_some();
        self.registries.ddef.unregister(code, started)
    }

    /// Registers or replaces the subscription for its sender class and data definition.
    ///
    /// Fails with `TableFull` rather than displacing another subscription.
    pub fn register_broadcast(
        &self,
        subscription: Broadcast<'a>,
    ) -> Result<Registration, RegistrationError> {
        let result = self
            .registries
            .broadcast
            .register(subscription, self.hal.now());
        if result.is_err() {
            warn!(
                "Broadcast table full, class {} ddef {} rejected",
                subscription.sender_class.into_u8(),
                subscription.data_def.into_u8()
            );
        }
        result
    }

    pub fn unregister_broadcast(&self, sender_class: ClassId, data_def: DataDef) -> bool {
        self.registries.broadcast.unregister(sender_class, data_def)
    }

    /// Registers or replaces the subscription for its raw identifier.
    ///
    /// Fails with `TableFull` rather than displacing another subscription.
    pub fn register_non_compliant(
        &self,
        subscription: NonCompliant<'a>,
    ) -> Result<Registration, RegistrationError> {
        let result = self
            .registries
            .non_compliant
            .register(subscription, self.hal.now());
        if result.is_err() {
            warn!(
                "Non-compliant table full, id {:x} rejected",
                subscription.id
            );
        }
        result
    }

    pub fn unregister_non_compliant(&self, id: u32) -> bool {
        self.registries.non_compliant.unregister(id)
    }

    /// Number of live broadcast subscriptions
    pub fn broadcast_count(&self) -> usize {
        self.registries.broadcast.len()
    }

    /// Number of pending standard and multicast queries
    pub fn pending_queries(&self) -> (usize, usize) {
        (
            self.registries.query.len(),
            self.registries.multicast.len(),
        )
    }

    /// Number of live non-compliant subscriptions
    pub fn non_compliant_count(&self) -> usize {
        self.registries.non_compliant.len()
    }
}

/// Object-safe node view used by the runner
pub(crate) trait DynamicNode {
    fn now(&self) -> Timestamp;
    fn process(&self, frame: &Frame);
    fn tick(&self, now: Timestamp);
}

impl<M: RawMutex, H: Hal, const BC: usize, const SQ: usize, const MC: usize, const NC: usize>
    DynamicNode for Node<'_, M, H, BC, SQ, MC, NC>
{
    fn now(&self) -> Timestamp {
        self.hal.now()
    }

    fn process(&self, frame: &Frame) {
        Node::process(self, frame)
    }

    fn tick(&self, now: Timestamp) {
        Node::tick(self, now)
    }
}
