use core::cell::RefCell;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::core::{CAN_ID_MASK, Timestamp};
use crate::handler::NonCompliantHandler;
use crate::node::NonCompliant;
use crate::registry::table::{Keyed, Table};
use crate::registry::{Registration, RegistrationError};

struct Entry<'a> {
    id: u32,
    timeout_ms: u32,
    last_seen: Timestamp,
    handler: &'a dyn NonCompliantHandler,
}

impl Keyed for Entry<'_> {
    type Key = u32;

    fn key(&self) -> Self::Key {
        self.id
    }
}

/// Heartbeat-style subscriptions keyed by raw frame identifier
pub(crate) struct Registry<'a, M: RawMutex, const N: usize>(Mutex<M, RefCell<Table<Entry<'a>, N>>>);

impl<'a, M: RawMutex, const N: usize> Registry<'a, M, N> {
    pub const fn new() -> Self {
        Self(Mutex::new(RefCell::new(Table::new())))
    }

    pub fn register(
        &self,
        subscription: NonCompliant<'a>,
        now: Timestamp,
    ) -> Result<Registration, RegistrationError> {
        let entry = Entry {
            id: subscription.id & CAN_ID_MASK,
            timeout_ms: subscription.timeout_ms,
            last_seen: now,
            handler: subscription.handler,
        };
        self.0.lock(|cell| cell.borrow_mut().register(entry))
    }

    pub fn unregister(&self, id: u32) -> bool {
        self.0
            .lock(|cell| cell.borrow_mut().remove(id & CAN_ID_MASK))
            .is_some()
    }

    /// Refreshes the first subscription for `id` and returns its handler.
    pub fn hit(&self, id: u32, now: Timestamp) -> Option<&'a dyn NonCompliantHandler> {
        self.0.lock(|cell| {
            let mut table = cell.borrow_mut();
            let index = table.find(id & CAN_ID_MASK)?;
            let entry = table.get_mut(index)?;
            entry.last_seen = now;
            Some(entry.handler)
        })
    }

    /// Checks a single slot for a missed heartbeat.
    ///
    /// The subscription survives and the alarm repeats every timeout period.
    pub fn expire(&self, index: usize, now: Timestamp) -> Option<&'a dyn NonCompliantHandler> {
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
