use core::{fmt, num::ParseIntError, str::FromStr};

use crate::id::SnowflakeId;

/// A 64-bit record identifier.
///
/// - 1 bit reserved
/// - 41 bits timestamp (ms since the generator's epoch, see [`MEDIA_EPOCH`])
/// - 10 bits machine ID
/// - 12 bits sequence
///
/// ```text
///   63 | 62 .............. 22 | 21 ........ 12 | 11 ........ 0
///  ----+----------------------+----------------+---------------
///   0  | ms since epoch (41)  | machine (10)   | sequence (12)
/// ```
///
/// Identifiers are exchanged as decimal strings. Because the timestamp
/// occupies the high bits, numeric order is creation order, which is what
/// lets the ID act as the tie-break key of a keyset scan.
///
/// [`MEDIA_EPOCH`]: crate::time::MEDIA_EPOCH
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RecordId {
    id: u64,
}

impl RecordId {
    /// Width mask of the timestamp field (bits 22..=62).
    pub const TIMESTAMP_MASK: u64 = (1 << 41) - 1;
    /// Width mask of the machine field (bits 12..=21).
    pub const MACHINE_ID_MASK: u64 = (1 << 10) - 1;
    /// Width mask of the sequence field (bits 0..=11).
    pub const SEQUENCE_MASK: u64 = (1 << 12) - 1;

    pub const TIMESTAMP_SHIFT: u64 = 22;
    pub const MACHINE_ID_SHIFT: u64 = 12;
    pub const SEQUENCE_SHIFT: u64 = 0;

    /// Bitmask of the reserved sign bit.
    pub const RESERVED_MASK: u64 = 1 << 63;

    /// Packs the three fields. Out-of-range components are truncated to
    /// their field width.
    pub const fn from(timestamp: u64, machine_id: u64, sequence: u64) -> Self {
        Self {
            id: ((timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT)
                | ((machine_id & Self::MACHINE_ID_MASK) << Self::MACHINE_ID_SHIFT)
                | ((sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT),
        }
    }

    /// Milliseconds since the generator's epoch.
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    pub const fn machine_id(&self) -> u64 {
        (self.id >> Self::MACHINE_ID_SHIFT) & Self::MACHINE_ID_MASK
    }

    /// Position within the millisecond, `0..=4095`.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Returns the raw packed value.
    pub const fn to_u64(&self) -> u64 {
        self.id
    }

    /// Wall-clock time of the ID in milliseconds since the Unix epoch, given
    /// the epoch the generator was configured with.
    pub const fn unix_millis(&self, epoch_ms: u64) -> u64 {
        self.timestamp() + epoch_ms
    }
}

impl SnowflakeId for RecordId {
    fn timestamp(&self) -> u64 {
        self.timestamp()
    }

    fn max_timestamp() -> u64 {
        Self::TIMESTAMP_MASK
    }

    fn machine_id(&self) -> u64 {
        self.machine_id()
    }

    fn max_machine_id() -> u64 {
        Self::MACHINE_ID_MASK
    }

    fn sequence(&self) -> u64 {
        self.sequence()
    }

    fn max_sequence() -> u64 {
        Self::SEQUENCE_MASK
    }

    fn from_components(timestamp: u64, machine_id: u64, sequence: u64) -> Self {
        debug_assert!(timestamp <= Self::TIMESTAMP_MASK, "timestamp overflow");
        debug_assert!(machine_id <= Self::MACHINE_ID_MASK, "machine_id overflow");
        debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
        Self::from(timestamp, machine_id, sequence)
    }

    fn to_raw(&self) -> u64 {
        self.id
    }

    fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    fn is_valid(&self) -> bool {
        self.id & Self::RESERVED_MASK == 0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordId")
            .field("raw", &self.id)
            .field("timestamp", &self.timestamp())
            .field("machine_id", &self.machine_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}

/// Errors produced when parsing a [`RecordId`] from its decimal form.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ParseIdError {
    /// The input is not an unsigned 64-bit decimal integer.
    #[error("invalid record id: {0}")]
    NotDecimal(#[from] ParseIntError),

    /// The value sets the reserved bit and could never have been generated.
    #[error("record id {raw} sets the reserved bit")]
    ReservedBitSet { raw: u64 },
}

impl TryFrom<u64> for RecordId {
    type Error = ParseIdError;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        let id = Self::from_raw(raw);
        if !id.is_valid() {
            return Err(ParseIdError::ReservedBitSet { raw });
        }
        Ok(id)
    }
}

impl FromStr for RecordId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.trim().parse::<u64>()?)
    }
}

impl From<RecordId> for u64 {
    fn from(id: RecordId) -> Self {
        id.id
    }
}
