use crate::{ClassId, DataDef, DeviceAddress, InstanceId};

/// Bits of an extended (29-bit) CAN identifier
pub const CAN_ID_MASK: u32 = lsb_mask(29);
const DATA_DEF_MASK: u32 = lsb_mask(7);
const INSTANCE_MASK: u32 = lsb_mask(4);
const CLASS_MASK: u32 = lsb_mask(6);

const DATA_DEF_OFFSET: u32 = 0;
const RECEIVER_INSTANCE_OFFSET: u32 = 7;
const RECEIVER_CLASS_OFFSET: u32 = 11;
const SENDER_INSTANCE_OFFSET: u32 = 17;
const SENDER_CLASS_OFFSET: u32 = 21;

const BROADCAST_FLAG: u32 = 1 << 27;
const NON_COMPLIANT_FLAG: u32 = 1 << 28;

/// Structured view of a 29-bit CVNP frame identifier
///
/// Wire layout, LSB first:
/// ```text
///  28   27   26..21  20..17  16..11  10..7   6..0
/// ┌────┬────┬───────┬───────┬───────┬───────┬──────┐
/// │ NC │ BR │ SCLS  │ SINST │ RCLS  │ RINST │ DDEF │
/// └────┴────┴───────┴───────┴───────┴───────┴──────┘
/// ```
/// Bits 29..31 are never produced by `encode` and are ignored by `decode`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CompliantId {
    pub sender: DeviceAddress,
    pub receiver: DeviceAddress,
    pub data_def: DataDef,
    pub broadcast: bool,
    pub non_compliant: bool,
}

impl CompliantId {
    /// Plain point-to-point identifier
    pub const fn new(sender: DeviceAddress, receiver: DeviceAddress, data_def: DataDef) -> Self {
        Self {
            sender,
            receiver,
            data_def,
            broadcast: false,
            non_compliant: false,
        }
    }

    pub const fn decode(word: u32) -> Self {
        let word = word & CAN_ID_MASK;
        Self {
            sender: DeviceAddress::new(
                ClassId::from_u8_truncating((word >> SENDER_CLASS_OFFSET) as u8),
                InstanceId::from_u8_truncating((word >> SENDER_INSTANCE_OFFSET) as u8),
            ),
            receiver: DeviceAddress::new(
                ClassId::from_u8_truncating((word >> RECEIVER_CLASS_OFFSET) as u8),
                InstanceId::from_u8_truncating((word >> RECEIVER_INSTANCE_OFFSET) as u8),
            ),
            data_def: DataDef::from_u8_truncating((word >> DATA_DEF_OFFSET) as u8),
            broadcast: word & BROADCAST_FLAG != 0,
            non_compliant: word & NON_COMPLIANT_FLAG != 0,
        }
    }

    pub const fn encode(self) -> u32 {
        let mut word = (self.data_def.into_u8() as u32 & DATA_DEF_MASK) << DATA_DEF_OFFSET
            | (self.receiver.instance.into_u8() as u32 & INSTANCE_MASK) << RECEIVER_INSTANCE_OFFSET
            | (self.receiver.class.into_u8() as u32 & CLASS_MASK) << RECEIVER_CLASS_OFFSET
            | (self.sender.instance.into_u8() as u32 & INSTANCE_MASK) << SENDER_INSTANCE_OFFSET
            | (self.sender.class.into_u8() as u32 & CLASS_MASK) << SENDER_CLASS_OFFSET;
        if self.broadcast {
            word |= BROADCAST_FLAG;
        }
        if self.non_compliant {
            word |= NON_COMPLIANT_FLAG;
        }
        word
    }

    /// Identifier of the reply to this one: roles swapped, flags cleared
    pub const fn reply(self, from: DeviceAddress) -> Self {
        Self::new(from, self.sender, self.data_def)
    }
}

impl From<u32> for CompliantId {
    fn from(value: u32) -> Self {
        Self::decode(value)
    }
}

impl From<CompliantId> for u32 {
    fn from(value: CompliantId) -> Self {
        value.encode()
    }
}

const fn lsb_mask(n: u32) -> u32 {
    if n > 0 {
        u32::MAX >> (u32::BITS - n)
    } else {
        0
    }
}
