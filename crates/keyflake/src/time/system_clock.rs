use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::time::{MEDIA_EPOCH, TimeSource};

/// A wall-clock time source that reads [`SystemTime`] on every call.
///
/// Unlike [`MonotonicClock`], this clock follows NTP corrections and VM
/// migrations, so it **can move backward**. Generators detect that and stall
/// rather than mint a smaller ID; see [`RollbackPolicy`].
///
/// Times before the epoch read as `0`.
///
/// [`MonotonicClock`]: crate::time::MonotonicClock
/// [`RollbackPolicy`]: crate::generator::RollbackPolicy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SystemClock {
    epoch_ms: u64,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::with_epoch(MEDIA_EPOCH)
    }
}

impl SystemClock {
    /// Constructs a wall clock whose origin (t = 0) is `epoch`, given as a
    /// duration since 1970-01-01 UTC.
    pub fn with_epoch(epoch: Duration) -> Self {
        Self {
            epoch_ms: u64::try_from(epoch.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// The configured epoch in milliseconds since the Unix epoch.
    pub const fn epoch_ms(&self) -> u64 {
        self.epoch_ms
    }

    /// Whether the wall clock has reached the epoch.
    pub fn has_started(&self) -> bool {
        unix_millis() >= self.epoch_ms
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        unix_millis().saturating_sub(self.epoch_ms)
    }
}
