use core::{fmt, hash::Hash};

/// Bit-field access to a packed `(timestamp, machine, sequence)` identifier.
///
/// Generators only talk to IDs through this trait, so the generation logic
/// does not depend on where each field sits in the word.
///
/// # Example
///
/// ```
/// use keyflake::{RecordId, SnowflakeId};
///
/// let id = RecordId::from_components(1000, 2, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.machine_id(), 2);
/// assert_eq!(id.sequence(), 1);
/// ```
pub trait SnowflakeId:
    Sized + Copy + Clone + fmt::Display + fmt::Debug + PartialOrd + Ord + PartialEq + Eq + Hash
{
    fn timestamp(&self) -> u64;
    /// Largest timestamp the layout can hold.
    fn max_timestamp() -> u64;

    fn machine_id(&self) -> u64;
    fn max_machine_id() -> u64;

    fn sequence(&self) -> u64;
    /// Last sequence value within one millisecond.
    fn max_sequence() -> u64;

    /// Constructs a new ID from its components.
    fn from_components(timestamp: u64, machine_id: u64, sequence: u64) -> Self;

    /// Converts this type into its raw representation.
    fn to_raw(&self) -> u64;

    /// Converts a raw value into this type without validation.
    fn from_raw(raw: u64) -> Self;

    /// Returns `true` if no bits outside the layout's fields are set.
    fn is_valid(&self) -> bool;

    /// Whether another ID fits in this millisecond.
    fn has_sequence_room(&self) -> bool {
        self.sequence() < Self::max_sequence()
    }

    /// The next ID within the same millisecond.
    fn increment_sequence(&self) -> Self {
        Self::from_components(self.timestamp(), self.machine_id(), self.sequence() + 1)
    }

    /// The first ID of millisecond `ts`.
    fn rollover_to_timestamp(&self, ts: u64) -> Self {
        Self::from_components(ts, self.machine_id(), 0)
    }
}
