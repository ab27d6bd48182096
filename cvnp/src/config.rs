//! Deployment constants
//!
//! Table sizes are the defaults of the `Node` const parameters; a deployment with tighter
//! memory or heavier traffic overrides them on its `Node` type.

use crate::core::DataDef;
use crate::time::Duration;

/// One handler slot per data definition code
pub const DDEF_COUNT: usize = DataDef::COUNT;

/// Broadcast subscriptions. Should cover every broadcast the device listens on.
pub const BROADCAST_TABLE_SIZE: usize = 16;

/// Pending standard queries. As a rule of thumb, the number of CAN receive mailboxes.
pub const QUERY_TABLE_SIZE: usize = 16;

/// Pending multicast queries
pub const MULTICAST_TABLE_SIZE: usize = 4;

/// Non-compliant frame subscriptions. Should cover every legacy frame the device listens on.
pub const NON_COMPLIANT_TABLE_SIZE: usize = 16;

/// Error report, also the fallback for unbound codes
pub const DDEF_ERROR: DataDef = DataDef::from_u8_truncating(0);

/// Device class and instance report
pub const DDEF_DEVICE_INFO: DataDef = DataDef::from_u8_truncating(1);

/// Magic-guarded system reset
pub const DDEF_RESET: DataDef = DataDef::from_u8_truncating(4);

/// First byte of an error report
pub const ERROR_MARKER: u8 = 0xee;

/// Request payload bytes echoed back by an error report
pub const ERROR_ECHO_LENGTH: usize = 5;

/// Reset request payload, big-endian on the wire ("CVNPRST!")
pub const RESET_MAGIC: u64 = 0x4356_4e50_5253_5421;

/// Timeout sweep period of the node runner
pub const TICK_PERIOD: Duration = Duration::from_millis(10);
