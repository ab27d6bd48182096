use crate::registry::{Registration, RegistrationError};

pub(crate) trait Keyed {
    type Key: Copy + PartialEq;

    fn key(&self) -> Self::Key;
}

/// Fixed-capacity slot array
///
/// Entries never move once stored. Scans run in slot order and the first match wins.
pub(crate) struct Table<E, const N: usize> {
    slots: [Option<E>; N],
}

impl<E, const N: usize> Table<E, N> {
    pub const fn new() -> Self {
        Self {
            slots: [const { None }; N],
        }
    }

    pub fn position(&self, mut predicate: impl FnMut(&E) -> bool) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(&mut predicate))
    }

    pub fn free_slot(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut E> {
        self.slots.get_mut(index)?.as_mut()
    }

    pub fn take(&mut self, index: usize) -> Option<E> {
        self.slots.get_mut(index)?.take()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

impl<E: Keyed, const N: usize> Table<E, N> {
    pub fn find(&self, key: E::Key) -> Option<usize> {
        self.position(|entry| entry.key() == key)
    }

    /// Replaces the entry with the same key or takes the first free slot.
    pub fn register(&mut self, entry: E) -> Result<Registration, RegistrationError> {
        if let Some(index) = self.find(entry.key()) {
            self.slots[index] = Some(entry);
            Ok(Registration::Replaced)
        } else if let Some(index) = self.free_slot() {
            self.slots[index] = Some(entry);
            Ok(Registration::Inserted)
        } else {
            Err(RegistrationError::TableFull)
        }
    }

    pub fn remove(&mut self, key: E::Key) -> Option<E> {
        let index = self.find(key)?;
        self.slots[index].take()
    }

    /// Stores the entry in exactly one slot, never failing.
    ///
    /// Slot choice: the entry with the same key, else the first free slot, else the entry
    /// with the greatest `age`. Returns the displaced entry, if any. A zero-capacity table
    /// displaces the new entry itself.
    pub fn insert_evicting(&mut self, entry: E, age: impl Fn(&E) -> u32) -> Option<E> {
        let index = self
            .find(entry.key())
            .or_else(|| self.free_slot())
            .or_else(|| {
                self.slots
                    .iter()
                    .enumerate()
                    .filter_map(|(index, slot)| Some((index, age(slot.as_ref()?))))
                    .max_by_key(|&(index, age)| (age, core::cmp::Reverse(index)))
                    .map(|(index, _)| index)
            });

        match index {
            Some(index) => self.slots[index].replace(entry),
            None => Some(entry),
        }
    }
}
