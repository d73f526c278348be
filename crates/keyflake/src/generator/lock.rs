use core::cmp::Ordering;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    generator::{
        Mutex, Poll, Result, SnowflakeGenerator, check_machine_id, check_timestamp,
        cold_clock_behind,
    },
    id::SnowflakeId,
    time::TimeSource,
};

/// Generator whose last issued ID sits behind one shared mutex.
///
/// Clones share the state. The clock is read while the lock is held, so
/// concurrent callers are totally ordered and a slow thread can never
/// mistake a faster neighbour's timestamp for a clock rollback. Contended
/// callers queue on the lock instead of retrying, which keeps access fair.
///
/// See [`AtomicSnowflakeGenerator`] for the lock-free variant.
///
/// [`AtomicSnowflakeGenerator`]: crate::generator::AtomicSnowflakeGenerator
#[derive(Debug)]
pub struct LockSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    pub(crate) state: Arc<crossbeam_utils::CachePadded<Mutex<ID>>>,
    #[cfg(not(feature = "cache-padded"))]
    pub(crate) state: Arc<Mutex<ID>>,
    pub(crate) machine_id: u64,
    pub(crate) time: T,
}

impl<ID, T> Clone for LockSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource + Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            machine_id: self.machine_id,
            time: self.time.clone(),
        }
    }
}

impl<ID, T> LockSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    /// Creates a new [`LockSnowflakeGenerator`] for `machine_id`, with the
    /// timestamp and sequence starting at zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MachineIdOutOfRange`] if `machine_id` does not fit the
    /// layout.
    ///
    /// # Example
    /// ```
    /// use keyflake::{LockSnowflakeGenerator, Poll, RecordId, SystemClock};
    ///
    /// let generator = LockSnowflakeGenerator::try_new(2, SystemClock::default()).unwrap();
    ///
    /// let id: RecordId = loop {
    ///     match generator.try_poll_id().unwrap() {
    ///         Poll::Ready { id } => break id,
    ///         _ => std::thread::yield_now(),
    ///     }
    /// };
    /// assert_eq!(id.machine_id(), 2);
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
        let id = ID::from_components(timestamp, machine_id, sequence);
        Self {
            #[cfg(feature = "cache-padded")]
            state: Arc::new(crossbeam_utils::CachePadded::new(Mutex::new(id))),
            #[cfg(not(feature = "cache-padded"))]
            state: Arc::new(Mutex::new(id)),
            machine_id: id.machine_id(),
            time,
        }
    }

    /// One generation attempt. Never waits: an exhausted millisecond is
    /// `Pending { yield_for: 1 }` and a backward clock is `ClockBehind`.
    ///
    /// # Errors
    ///
    /// [`Error::LockPoisoned`] (std mutex only) or
    /// [`Error::TimestampOverflow`].
    ///
    /// [`Error::LockPoisoned`]: crate::generator::Error::LockPoisoned
    /// [`Error::TimestampOverflow`]: crate::generator::Error::TimestampOverflow
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<Poll<ID>> {
        #[cfg(feature = "parking-lot")]
        let mut last = self.state.lock();
        #[cfg(not(feature = "parking-lot"))]
        let mut last = self.state.lock()?;

        let now = self.time.current_millis();
        check_timestamp::<ID>(now)?;

        let last_ts = last.timestamp();
        let next = match now.cmp(&last_ts) {
            Ordering::Greater => last.rollover_to_timestamp(now),
            Ordering::Equal if last.has_sequence_room() => last.increment_sequence(),
            Ordering::Equal => return Ok(Poll::Pending { yield_for: 1 }),
            Ordering::Less => return Ok(cold_clock_behind(now, last_ts)),
        };
        *last = next;
        Ok(Poll::Ready { id: next })
    }
}

impl<ID, T> SnowflakeGenerator<ID> for LockSnowflakeGenerator<ID, T>
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
