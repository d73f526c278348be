use crate::{
    generator::{Error, Poll, Result},
    id::SnowflakeId,
    time::TimeSource,
};

/// A minimal interface for generating Snowflake IDs.
///
/// Implementations hold the shared `(timestamp, sequence)` state and advance
/// it atomically in [`SnowflakeGenerator::try_poll_id`]. They never block:
/// throttling is reported through [`Poll`] and the caller decides how to
/// wait, so no critical section is ever held across a spin or sleep.
pub trait SnowflakeGenerator<ID>
where
    ID: SnowflakeId,
{
    /// The clock embedded into generated IDs.
    type Time: TimeSource;

    /// Creates a new generator for `machine_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MachineIdOutOfRange`] if `machine_id` does not fit the
    /// layout.
    fn try_new(machine_id: u64, time: Self::Time) -> Result<Self>
    where
        Self: Sized;

    /// The machine ID packed into every generated ID.
    fn machine_id(&self) -> u64;

    /// Attempts to generate the next ID without waiting.
    ///
    /// # Errors
    ///
    /// May return an error if the underlying implementation uses a lock and it
    /// is poisoned, or if the clock overflows the layout's timestamp field.
    fn try_poll_id(&self) -> Result<Poll<ID>>;
}

/// Validates a machine ID against the layout of `ID`.
pub(crate) fn check_machine_id<ID: SnowflakeId>(machine_id: u64) -> Result<()> {
    let max = ID::max_machine_id();
    if machine_id > max {
        return Err(Error::MachineIdOutOfRange { machine_id, max });
    }
    Ok(())
}

/// Validates a clock reading against the layout of `ID`.
#[inline]
pub(crate) fn check_timestamp<ID: SnowflakeId>(now: u64) -> Result<()> {
    if now > ID::max_timestamp() {
        return Err(cold_timestamp_overflow::<ID>(now));
    }
    Ok(())
}

#[cold]
#[inline(never)]
fn cold_timestamp_overflow<ID: SnowflakeId>(timestamp: u64) -> Error {
    Error::TimestampOverflow {
        timestamp,
        max: ID::max_timestamp(),
    }
}

/// Shared slow path for a clock that reads behind the last issued timestamp.
#[cold]
#[inline(never)]
pub(crate) fn cold_clock_behind<ID: SnowflakeId>(now: u64, current_ts: u64) -> Poll<ID> {
    debug_assert!(current_ts > now);
    Poll::ClockBehind {
        behind_ms: current_ts - now,
    }
}
