/// Millisecond timestamp of a wrapping platform clock
///
/// Timestamps are only compared through `elapsed_since`, which uses wrapping subtraction,
/// so intervals stay correct across a clock rollover as long as they are shorter than
/// the clock period (about 49.7 days).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timestamp(u32);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    pub const fn from_millis(value: u32) -> Self {
        Self(value)
    }

    pub const fn as_millis(self) -> u32 {
        self.0
    }

    /// Milliseconds passed since `earlier`
    pub const fn elapsed_since(self, earlier: Timestamp) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// Returns true if more than `timeout` milliseconds passed since `earlier`.
    ///
    /// A zero timeout never expires, and neither does an `earlier` ahead of `self`.
    pub const fn expired(self, earlier: Timestamp, timeout: u32) -> bool {
        let elapsed = self.elapsed_since(earlier);
        timeout != 0 && elapsed <= u32::MAX / 2 && elapsed > timeout
    }

    pub const fn wrapping_add(self, millis: u32) -> Self {
        Self(self.0.wrapping_add(millis))
    }
}

impl From<u32> for Timestamp {
    fn from(value: u32) -> Self {
        Self::from_millis(value)
    }
}

impl From<Timestamp> for u32 {
    fn from(value: Timestamp) -> Self {
        value.as_millis()
    }
}
