/// A result type defaulting to the generator [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that ID generation can emit.
///
/// In steady state generation is infallible: sequence exhaustion and small
/// clock rollbacks are absorbed by waiting. The variants below cover
/// misconfiguration and the cases where waiting is refused.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The generator lock was **poisoned** by a thread that panicked while
    /// holding it. With the `parking-lot` feature mutexes do not poison and
    /// this variant does not exist.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,

    /// The configured machine ID does not fit the layout's machine field.
    #[error("machine id {machine_id} exceeds the layout maximum of {max}")]
    MachineIdOutOfRange { machine_id: u64, max: u64 },

    /// The wall clock moved backward further than the rollback policy
    /// tolerates. No ID was issued.
    #[error("clock moved backward by {behind_ms} ms")]
    ClockRollback { behind_ms: u64 },

    /// The clock reads past the largest timestamp the layout can hold.
    #[error("timestamp {timestamp} exceeds the layout maximum of {max}")]
    TimestampOverflow { timestamp: u64, max: u64 },

    /// The system clock reads earlier than the configured epoch.
    #[error("system clock is earlier than the configured epoch ({epoch_ms} ms)")]
    ClockBeforeEpoch { epoch_ms: u64 },

    /// The background ticker thread of a monotonic clock could not start.
    #[error("failed to spawn the clock ticker thread")]
    ClockThreadSpawn,
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};

#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
