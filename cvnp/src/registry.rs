pub(crate) mod broadcast;
pub(crate) mod ddef;
pub(crate) mod non_compliant;
pub(crate) mod query;
mod table;

/// Outcome of a successful registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Registration {
    /// The key was free and the entry took an empty slot
    Inserted,
    /// An entry with the same key was overwritten in place
    Replaced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistrationError {
    /// Every slot holds a subscription with a different key
    TableFull,
}
