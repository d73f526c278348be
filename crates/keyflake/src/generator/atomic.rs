use core::{cmp, marker::PhantomData};

use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    generator::{
        Poll, Result, SnowflakeGenerator, check_machine_id, check_timestamp, cold_clock_behind,
    },
    id::SnowflakeId,
    time::TimeSource,
};

/// Lock-free generator: the last issued ID is one [`AtomicU64`], advanced
/// by a single compare-and-swap per attempt. A lost race is reported as
/// [`Poll::Pending`] with `yield_for == 0`, meaning "retry immediately".
///
/// The state is loaded (with acquire ordering) *before* the clock is read.
/// Any timestamp observed in the state was therefore read from the clock
/// before our own read, so a monotonic clock can never appear to roll back
/// because of a faster neighbour.
///
/// There is no lock to poison, but access is not fair: a thread can lose
/// the race repeatedly under contention. See [`LockSnowflakeGenerator`].
///
/// [`LockSnowflakeGenerator`]: crate::generator::LockSnowflakeGenerator
#[derive(Debug)]
pub struct AtomicSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU64,
    machine_id: u64,
    time: T,
    _id: PhantomData<ID>,
}

impl<ID, T> AtomicSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    /// Creates a new [`AtomicSnowflakeGenerator`] for `machine_id`, with the
    /// timestamp and sequence starting at zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MachineIdOutOfRange`] if `machine_id` does not fit the
    /// layout.
    ///
    /// # Example
    /// ```
    /// use keyflake::{AtomicSnowflakeGenerator, Poll, RecordId, SystemClock};
    ///
    /// let generator = AtomicSnowflakeGenerator::try_new(0, SystemClock::default()).unwrap();
    ///
    /// let id: RecordId = loop {
    ///     match generator.try_poll_id().unwrap() {
    ///         Poll::Ready { id } => break id,
    ///         Poll::Pending { .. } => core::hint::spin_loop(),
    ///         Poll::ClockBehind { .. } => std::thread::yield_now(),
    ///     }
    /// };
    /// ```
    ///
    /// [`Error::MachineIdOutOfRange`]: crate::generator::Error::MachineIdOutOfRange
    pub fn try_new(machine_id: u64, time: T) -> Result<Self> {
        check_machine_id::<ID>(machine_id)?;
        Ok(Self::from_components(0, machine_id, 0, time))
    }

    /// Creates a new generator from explicit component values.
    ///
    /// This is primarily useful for restoring state or for tests that need
    /// to start at a particular point, such as an exhausted sequence.
    pub fn from_components(timestamp: u64, machine_id: u64, sequence: u64, time: T) -> Self {
        let initial = ID::from_components(timestamp, machine_id, sequence);
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(AtomicU64::new(initial.to_raw())),
            #[cfg(not(feature = "cache-padded"))]
            state: AtomicU64::new(initial.to_raw()),
            machine_id: initial.machine_id(),
            time,
            _id: PhantomData,
        }
    }

    /// One generation attempt. `Pending { yield_for: 1 }` means the
    /// millisecond is exhausted, `Pending { yield_for: 0 }` a lost race.
    ///
    /// # Errors
    ///
    /// [`Error::TimestampOverflow`] if the clock is past the layout's range.
    ///
    /// [`Error::TimestampOverflow`]: crate::generator::Error::TimestampOverflow
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<Poll<ID>> {
        let current_raw = self.state.load(Ordering::Acquire);
        let now = self.time.current_millis();
        check_timestamp::<ID>(now)?;

        let current_id = ID::from_raw(current_raw);
        let current_ts = current_id.timestamp();

        let next_id = match now.cmp(&current_ts) {
            cmp::Ordering::Greater => current_id.rollover_to_timestamp(now),
            cmp::Ordering::Equal if current_id.has_sequence_room() => {
                current_id.increment_sequence()
            }
            cmp::Ordering::Equal => return Ok(Poll::Pending { yield_for: 1 }),
            cmp::Ordering::Less => return Ok(cold_clock_behind(now, current_ts)),
        };

        if self
            .state
            .compare_exchange(
                current_raw,
                next_id.to_raw(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
        {
            Ok(Poll::Ready { id: next_id })
        } else {
            // Another thread won the race; retry immediately.
            Ok(Poll::Pending { yield_for: 0 })
        }
    }
}

impl<ID, T> SnowflakeGenerator<ID> for AtomicSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    type Time = T;

    fn try_new(machine_id: u64, time: T) -> Result<Self> {
        Self::try_new(machine_id, time)
    }

    fn machine_id(&self) -> u64 {
        self.machine_id
    }

    fn try_poll_id(&self) -> Result<Poll<ID>> {
        self.try_poll_id()
    }
}
