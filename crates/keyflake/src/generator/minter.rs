use core::time::Duration;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    generator::{Error, LockSnowflakeGenerator, Poll, Result, SnowflakeGenerator},
    id::RecordId,
    time::{MEDIA_EPOCH, SystemClock},
};

/// Default tolerance for a backward clock step before minting fails.
pub const DEFAULT_MAX_ROLLBACK_MS: u64 = 5_000;

/// What [`IdMinter`] does when the clock reads behind the last issued ID.
///
/// Issuing an ID at that point would break the monotonic order that keyset
/// pagination tie-breaks on, so the minter never does it. It either waits for
/// the clock to catch up or refuses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RollbackPolicy {
    /// Sleep until the clock catches up, as long as it is at most `max_ms`
    /// behind. Larger rollbacks fail with [`Error::ClockRollback`].
    Stall { max_ms: u64 },
    /// Fail with [`Error::ClockRollback`] on any rollback.
    Reject,
}

impl Default for RollbackPolicy {
    fn default() -> Self {
        Self::Stall {
            max_ms: DEFAULT_MAX_ROLLBACK_MS,
        }
    }
}

impl RollbackPolicy {
    /// Returns how long to wait for a clock that is `behind_ms` behind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockRollback`] if the policy refuses to wait.
    pub fn wait_for(self, behind_ms: u64) -> Result<Duration> {
        match self {
            Self::Stall { max_ms } if behind_ms <= max_ms => Ok(Duration::from_millis(behind_ms)),
            _ => Err(Error::ClockRollback { behind_ms }),
        }
    }
}

/// Process-level settings for an [`IdMinter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MinterConfig {
    /// Unique per concurrently running process sharing `epoch_ms`.
    pub machine_id: u64,
    /// Milliseconds since the Unix epoch that timestamps count from.
    pub epoch_ms: u64,
    pub rollback: RollbackPolicy,
}

impl Default for MinterConfig {
    fn default() -> Self {
        Self {
            machine_id: 2,
            epoch_ms: u64::try_from(MEDIA_EPOCH.as_millis()).unwrap_or(u64::MAX),
            rollback: RollbackPolicy::default(),
        }
    }
}

/// The default generator stack: wall clock, one mutex.
pub type DefaultGenerator = LockSnowflakeGenerator<RecordId, SystemClock>;

/// Mints [`RecordId`]s for write paths.
///
/// One instance is created at process start and shared by handle; clones
/// share the underlying generator. Each call either returns a fresh ID that
/// is strictly greater than every ID previously returned by this minter, or
/// an error. It never returns a duplicate or a smaller ID.
///
/// Waiting happens here, outside the generator's critical section:
/// - sequence exhausted: spin/yield until the next millisecond,
/// - lost CAS race: retry immediately,
/// - clock rollback: apply the [`RollbackPolicy`].
///
/// # Example
///
/// ```
/// use keyflake::{IdMinter, MinterConfig, RecordId};
///
/// let minter = IdMinter::from_config(&MinterConfig::default()).unwrap();
/// let a: RecordId = minter.next_id().unwrap().parse().unwrap();
/// let b: RecordId = minter.next_id().unwrap().parse().unwrap();
/// assert!(a < b);
/// ```
#[derive(Debug)]
pub struct IdMinter<G = DefaultGenerator> {
    generator: Arc<G>,
    rollback: RollbackPolicy,
}

impl<G> Clone for IdMinter<G> {
    fn clone(&self) -> Self {
        Self {
            generator: Arc::clone(&self.generator),
            rollback: self.rollback,
        }
    }
}

impl IdMinter<DefaultGenerator> {
    /// Builds a minter backed by [`SystemClock`] and a lock-based generator.
    ///
    /// # Errors
    ///
    /// - [`Error::MachineIdOutOfRange`] if the configured machine ID does not
    ///   fit the layout.
    /// - [`Error::ClockBeforeEpoch`] if the epoch is later than the current
    ///   time. The clock would read 0 until then and the first millisecond's
    ///   sequence would run out.
    pub fn from_config(config: &MinterConfig) -> Result<Self> {
        let clock = SystemClock::with_epoch(Duration::from_millis(config.epoch_ms));
        if !clock.has_started() {
            return Err(Error::ClockBeforeEpoch {
                epoch_ms: clock.epoch_ms(),
            });
        }
        let generator = LockSnowflakeGenerator::try_new(config.machine_id, clock)?;
        Ok(Self::new(generator, config.rollback))
    }
}

impl<G> IdMinter<G>
where
    G: SnowflakeGenerator<RecordId>,
{
    /// Wraps an existing generator.
    pub fn new(generator: G, rollback: RollbackPolicy) -> Self {
        Self {
            generator: Arc::new(generator),
            rollback,
        }
    }

    /// The machine ID stamped into every minted ID.
    pub fn machine_id(&self) -> u64 {
        self.generator.machine_id()
    }

    /// The rollback policy in effect.
    pub fn rollback_policy(&self) -> RollbackPolicy {
        self.rollback
    }

    /// Mints a new identifier as a decimal string.
    ///
    /// # Errors
    ///
    /// See [`Self::next_record_id`].
    pub fn next_id(&self) -> Result<String> {
        self.next_record_id().map(|id| id.to_string())
    }

    /// Mints a new identifier, blocking the calling thread while the
    /// generator is throttled.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRollback`] if the clock moved backward further than
    ///   the rollback policy tolerates.
    /// - Any error surfaced by the generator (poisoned lock, timestamp
    ///   overflow).
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_record_id(&self) -> Result<RecordId> {
        loop {
            match self.generator.try_poll_id()? {
                Poll::Ready { id } => break Ok(id),
                Poll::Pending { yield_for: 0 } => core::hint::spin_loop(),
                Poll::Pending { .. } => std::thread::yield_now(),
                Poll::ClockBehind { behind_ms } => {
                    std::thread::sleep(self.on_clock_behind(behind_ms)?);
                }
            }
        }
    }

    /// Async counterpart of [`Self::next_id`].
    ///
    /// # Errors
    ///
    /// See [`Self::next_record_id`].
    #[cfg_attr(docsrs, doc(cfg(feature = "async-tokio")))]
    #[cfg(feature = "async-tokio")]
    pub async fn next_id_async(&self) -> Result<String> {
        self.next_record_id_async().await.map(|id| id.to_string())
    }

    /// Mints a new identifier, yielding to the Tokio runtime instead of
    /// blocking while the generator is throttled.
    ///
    /// # Errors
    ///
    /// See [`Self::next_record_id`].
    #[cfg_attr(docsrs, doc(cfg(feature = "async-tokio")))]
    #[cfg(feature = "async-tokio")]
    pub async fn next_record_id_async(&self) -> Result<RecordId> {
        loop {
            match self.generator.try_poll_id()? {
                Poll::Ready { id } => break Ok(id),
                Poll::Pending { .. } => tokio::task::yield_now().await,
                Poll::ClockBehind { behind_ms } => {
                    tokio::time::sleep(self.on_clock_behind(behind_ms)?).await;
                }
            }
        }
    }

    #[cold]
    fn on_clock_behind(&self, behind_ms: u64) -> Result<Duration> {
        let decision = self.rollback.wait_for(behind_ms);
        #[cfg(feature = "tracing")]
        match &decision {
            Ok(_) => tracing::warn!(
                behind_ms,
                machine_id = self.generator.machine_id(),
                "clock moved backward; stalling until it catches up"
            ),
            Err(_) => tracing::error!(
                behind_ms,
                machine_id = self.generator.machine_id(),
                policy = ?self.rollback,
                "clock moved backward; refusing to mint"
            ),
        }
        decision
    }
}
