use core::cell::RefCell;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::core::{DataDef, DeviceAddress, Timestamp};
use crate::handler::QueryHandler;
use crate::registry::table::{Keyed, Table};

/// Whether a correlation survives its first response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Retention {
    /// Removed on the first match
    OneShot,
    /// Kept until its time to live expires
    Persistent,
}

pub(crate) struct Entry<'a> {
    /// Expected response sender, wildcard parts match any value
    pub responder: DeviceAddress,
    pub data_def: DataDef,
    pub ttl_ms: u32,
    pub submitted: Timestamp,
    pub handler: &'a dyn QueryHandler,
}

impl Keyed for Entry<'_> {
    type Key = (DeviceAddress, DataDef);

    fn key(&self) -> Self::Key {
        (self.responder, self.data_def)
    }
}

impl Entry<'_> {
    fn matches(&self, sender: DeviceAddress, data_def: DataDef) -> bool {
        self.data_def == data_def && self.responder.accepts(sender)
    }
}

/// Pending query correlations keyed by the expected response sender
///
/// Submission never fails: a full table evicts its oldest correlation.
pub(crate) struct Registry<'a, M: RawMutex, const N: usize> {
    retention: Retention,
    table: Mutex<M, RefCell<Table<Entry<'a>, N>>>,
}

impl<'a, M: RawMutex, const N: usize> Registry<'a, M, N> {
    pub const fn new(retention: Retention) -> Self {
        Self {
            retention,
            table: Mutex::new(RefCell::new(Table::new())),
        }
    }

    /// Installs a correlation in exactly one slot.
    ///
    /// Returns the handler of a displaced correlation, to be notified with `on_death(true)`.
    pub fn submit(&self, entry: Entry<'a>, now: Timestamp) -> Option<&'a dyn QueryHandler> {
        self.table.lock(|cell| {
            cell.borrow_mut()
                .insert_evicting(entry, |entry| now.elapsed_since(entry.submitted))
                .map(|displaced| displaced.handler)
        })
    }

    /// Resolves a response against the first matching correlation.
    ///
    /// One-shot correlations are removed by the match.
    pub fn hit(&self, sender: DeviceAddress, data_def: DataDef) -> Option<&'a dyn QueryHandler> {
        self.table.lock(|cell| {
            let mut table = cell.borrow_mut();
            let index = table.position(|entry| entry.matches(sender, data_def))?;
            match self.retention {
                Retention::OneShot => table.take(index).map(|entry| entry.handler),
                Retention::Persistent => table.get_mut(index).map(|entry| entry.handler),
            }
        })
    }

    pub fn cancel(&self, responder: DeviceAddress, data_def: DataDef) -> Option<&'a dyn QueryHandler> {
        self.table.lock(|cell| {
            cell.borrow_mut()
                .remove((responder, data_def))
                .map(|entry| entry.handler)
        })
    }

    /// Checks a single slot, removing the correlation once its time to live has passed.
    pub fn expire(&self, index: usize, now: Timestamp) -> Option<&'a dyn QueryHandler> {
        self.table.lock(|cell| {
            let mut table = cell.borrow_mut();
            let entry = table.get_mut(index)?;
            if now.expired(entry.submitted, entry.ttl_ms) {
                table.take(index).map(|entry| entry.handler)
            } else {
                None
            }
        })
    }

    pub fn len(&self) -> usize {
        self.table.lock(|cell| cell.borrow().len())
    }
}
