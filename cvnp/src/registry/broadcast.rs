use core::cell::RefCell;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::core::{ClassId, DataDef, Timestamp};
use crate::handler::BroadcastHandler;
use crate::node::Broadcast;
use crate::registry::table::{Keyed, Table};
use crate::registry::{Registration, RegistrationError};

struct Entry<'a> {
    sender_class: ClassId,
    data_def: DataDef,
    timeout_ms: u32,
    last_seen: Timestamp,
    handler: &'a dyn BroadcastHandler,
}

impl Keyed for Entry<'_> {
    type Key = (ClassId, DataDef);

    fn key(&self) -> Self::Key {
        (self.sender_class, self.data_def)
    }
}

/// Persistent broadcast subscriptions keyed by sender class and data definition
pub(crate) struct Registry<'a, M: RawMutex, const N: usize>(Mutex<M, RefCell<Table<Entry<'a>, N>>>);

impl<'a, M: RawMutex, const N: usize> Registry<'a, M, N> {
    pub const fn new() -> Self {
        Self(Mutex::new(RefCell::new(Table::new())))
    }

    /// Registers a subscription. Its silence interval starts at `now`.
    pub fn register(
        &self,
        subscription: Broadcast<'a>,
        now: Timestamp,
    ) -> Result<Registration, RegistrationError> {
        let entry = Entry {
            sender_class: subscription.sender_class,
            data_def: subscription.data_def,
            timeout_ms: subscription.timeout_ms,
            last_seen: now,
            handler: subscription.handler,
        };
        self.0.lock(|cell| cell.borrow_mut().register(entry))
    }

    pub fn unregister(&self, sender_class: ClassId, data_def: DataDef) -> bool {
        self.0
            .lock(|cell| cell.borrow_mut().remove((sender_class, data_def)))
            .is_some()
    }

    /// Refreshes the first matching subscription and returns its handler.
    pub fn hit(
        &self,
        sender_class: ClassId,
        data_def: DataDef,
        now: Timestamp,
    ) -> Option<&'a dyn BroadcastHandler> {
        self.0.lock(|cell| {
            let mut table = cell.borrow_mut();
            let index = table.find((sender_class, data_def))?;
            let entry = table.get_mut(index)?;
            entry.last_seen = now;
            Some(entry.handler)
        })
    }

    /// Checks a single slot for a timeout.
    ///
    /// A timed out subscription survives with its silence interval restarted at `now`.
    pub fn expire(&self, index: usize, now: Timestamp) -> Option<&'a dyn BroadcastHandler> {
        self.0.lock(|cell| {
            let mut table = cell.borrow_mut();
            let entry = table.get_mut(index)?;
            if now.expired(entry.last_seen, entry.timeout_ms) {
                entry.last_seen = now;
                Some(entry.handler)
            } else {
                None
            }
        })
    }

    pub fn len(&self) -> usize {
        self.0.lock(|cell| cell.borrow().len())
    }
}
