//! CVNP protocol core data types
//!
//! This crate provides the address primitives and the 29-bit identifier codec used by the other
//! CVNP crates. CVNP users should not depend on this crate directly. Use `cvnp::core` reexport
//! instead.
#![no_std]

mod id;
mod time;

pub use id::{CAN_ID_MASK, CompliantId};
pub use time::Timestamp;

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidValue;

/// Device class, a 6-bit device type/role identifier
///
/// Class 0 is reserved as a receiver wildcard ("any class").
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClassId(u8);

impl ClassId {
    const MAX_VALUE: u8 = 0x3f;
    pub const MAX: ClassId = ClassId(Self::MAX_VALUE);
    pub const WILDCARD: ClassId = ClassId(0);

    pub const fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX_VALUE {
            Some(Self::from_u8_truncating(value))
        } else {
            None
        }
    }

    pub const fn from_u8_truncating(value: u8) -> Self {
        Self(value & Self::MAX_VALUE)
    }

    pub const fn into_u8(self) -> u8 {
        self.0
    }

    pub const fn is_wildcard(self) -> bool {
        self.0 == Self::WILDCARD.0
    }

    /// Tests a receiver class against the class of this device
    pub const fn accepts(self, own: ClassId) -> bool {
        self.is_wildcard() || self.0 == own.0
    }
}

impl From<ClassId> for u8 {
    fn from(value: ClassId) -> Self {
        value.into_u8()
    }
}

impl TryFrom<u8> for ClassId {
    type Error = InvalidValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidValue)
    }
}

/// Device instance, a 4-bit discriminator among devices of the same class
///
/// Instance 0 is reserved as a receiver wildcard ("any instance").
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InstanceId(u8);

impl InstanceId {
    const MAX_VALUE: u8 = 0xf;
    pub const MAX: InstanceId = InstanceId(Self::MAX_VALUE);
    pub const WILDCARD: InstanceId = InstanceId(0);

    pub const fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX_VALUE {
            Some(Self::from_u8_truncating(value))
        } else {
            None
        }
    }

    pub const fn from_u8_truncating(value: u8) -> Self {
        Self(value & Self::MAX_VALUE)
    }

    pub const fn into_u8(self) -> u8 {
        self.0
    }

    pub const fn is_wildcard(self) -> bool {
        self.0 == Self::WILDCARD.0
    }

    /// Tests a receiver instance against the instance of this device
    pub const fn accepts(self, own: InstanceId) -> bool {
        self.is_wildcard() || self.0 == own.0
    }
}

impl From<InstanceId> for u8 {
    fn from(value: InstanceId) -> Self {
        value.into_u8()
    }
}

impl TryFrom<u8> for InstanceId {
    type Error = InvalidValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidValue)
    }
}

/// Data definition code, a 7-bit command/message selector
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataDef(u8);

impl DataDef {
    const MAX_VALUE: u8 = 0x7f;
    pub const MAX: DataDef = DataDef(Self::MAX_VALUE);
    /// Number of distinct data definition codes
    pub const COUNT: usize = Self::MAX_VALUE as usize + 1;

    pub const fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX_VALUE {
            Some(Self::from_u8_truncating(value))
        } else {
            None
        }
    }

    pub const fn from_u8_truncating(value: u8) -> Self {
        Self(value & Self::MAX_VALUE)
    }

    pub const fn into_u8(self) -> u8 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<DataDef> for u8 {
    fn from(value: DataDef) -> Self {
        value.into_u8()
    }
}

impl From<DataDef> for usize {
    fn from(value: DataDef) -> Self {
        value.index()
    }
}

impl TryFrom<u8> for DataDef {
    type Error = InvalidValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidValue)
    }
}

/// Two-level device address
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceAddress {
    pub class: ClassId,
    pub instance: InstanceId,
}

impl DeviceAddress {
    /// Receiver address matching every device on the bus
    pub const WILDCARD: DeviceAddress = DeviceAddress::new(ClassId::WILDCARD, InstanceId::WILDCARD);

    pub const fn new(class: ClassId, instance: InstanceId) -> Self {
        Self { class, instance }
    }

    /// Returns true if either part is a wildcard
    pub const fn has_wildcard(self) -> bool {
        self.class.is_wildcard() || self.instance.is_wildcard()
    }

    /// Tests a receiver address against the address of this device
    pub const fn accepts(self, own: DeviceAddress) -> bool {
        self.class.accepts(own.class) && self.instance.accepts(own.instance)
    }
}
