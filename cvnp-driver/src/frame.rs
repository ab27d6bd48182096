//! Transport frame object

use cvnp_core::{CAN_ID_MASK, CompliantId};

/// Maximum data length of a classic CAN frame
pub const MAX_DATA_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidLength;

/// Classic CAN data field
///
/// Holds up to 8 bytes. Bytes past the length are kept zeroed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Data {
    length: u8,
    bytes: [u8; MAX_DATA_LENGTH],
}

impl Data {
    pub const EMPTY: Data = Data {
        length: 0,
        bytes: [0; MAX_DATA_LENGTH],
    };

    /// Creates a new vector from a slice of at most 8 bytes.
    pub fn new(data: &[u8]) -> Result<Self, InvalidLength> {
        if data.len() > MAX_DATA_LENGTH {
            return Err(InvalidLength);
        }
        let mut bytes = [0; MAX_DATA_LENGTH];
        bytes[..data.len()].copy_from_slice(data);

        Ok(Self {
            length: data.len() as u8,
            bytes,
        })
    }

    /// Creates a vector from the first `length` bytes of a raw data field.
    ///
    /// Lengths above 8 are clamped, as a data length code of 9..15 still carries 8 bytes.
    pub fn from_raw(length: usize, raw: [u8; MAX_DATA_LENGTH]) -> Self {
        let length = length.min(MAX_DATA_LENGTH);
        let mut bytes = [0; MAX_DATA_LENGTH];
        bytes[..length].copy_from_slice(&raw[..length]);
        Self {
            length: length as u8,
            bytes,
        }
    }

    pub fn length(&self) -> usize {
        usize::from(self.length)
    }

    /// Full 8-byte field, zero padded
    pub fn raw(&self) -> &[u8; MAX_DATA_LENGTH] {
        &self.bytes
    }
}

impl core::ops::Deref for Data {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.bytes[..usize::from(self.length)]
    }
}

impl core::ops::DerefMut for Data {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.bytes[..usize::from(self.length)]
    }
}

impl TryFrom<&[u8]> for Data {
    type Error = InvalidLength;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Classic CAN frame
///
/// The engine never keeps a frame past the call it was passed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Raw identifier, 29 bits for extended frames and 11 bits for standard ones
    pub id: u32,
    /// Extended (29-bit) identifier flag
    pub extended: bool,
    /// Request (remote transmission request) flag; data frames carry responses
    pub request: bool,
    pub data: Data,
}

impl Frame {
    /// Extended frame carrying a CVNP identifier
    pub fn compliant(id: CompliantId, request: bool, data: Data) -> Self {
        Self {
            id: id.encode(),
            extended: true,
            request,
            data,
        }
    }

    /// Data frame with an arbitrary identifier
    pub fn raw(id: u32, extended: bool, data: Data) -> Self {
        Self {
            id: id & CAN_ID_MASK,
            extended,
            request: false,
            data,
        }
    }

    /// Identifier decoded as a CVNP address, regardless of the frame format
    pub fn compliant_id(&self) -> CompliantId {
        CompliantId::decode(self.id)
    }

    /// Identifier bits carried on the wire
    pub fn wire_id(&self) -> u32 {
        self.id & CAN_ID_MASK
    }
}
