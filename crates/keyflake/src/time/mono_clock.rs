use core::time::Duration;
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    thread,
    time::{Instant, SystemTime, UNIX_EPOCH},
};

use crate::{
    generator::{Error, Result},
    time::{MEDIA_EPOCH, TimeSource},
};

/// Shared ticker state that a background thread updates every millisecond.
#[derive(Debug)]
struct SharedTickerInner {
    current: AtomicU64,
}

/// A monotonic time source that returns elapsed time since construction,
/// offset from a user-defined epoch.
///
/// This avoids wall-clock adjustments (e.g., NTP corrections) while still
/// aligning timestamps to a fixed origin. A generator driven by this clock
/// never observes a rollback within one process.
///
/// Clones share one ticker thread, which exits once the last clone is
/// dropped.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    inner: Arc<SharedTickerInner>,
    epoch_offset: u64, // in milliseconds
}

impl MonotonicClock {
    /// Constructs a monotonic clock aligned to [`MEDIA_EPOCH`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockBeforeEpoch`] if the system time is earlier than
    /// the epoch.
    pub fn try_default() -> Result<Self> {
        Self::try_with_epoch(MEDIA_EPOCH)
    }

    /// Constructs a monotonic clock using `epoch` as the origin (t = 0),
    /// specified as a duration since the Unix epoch.
    ///
    /// A background thread stores the elapsed milliseconds, measured with
    /// [`Instant`], into a shared atomic once per millisecond. Reads add the
    /// fixed offset between the wall clock at construction and `epoch`, so
    /// the hot path never makes a syscall and time never goes backward.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockBeforeEpoch`] if the system time is earlier than
    /// `epoch`.
    ///
    /// # Example
    ///
    /// ```
    /// use keyflake::{MEDIA_EPOCH, MonotonicClock, TimeSource};
    ///
    /// let clock = MonotonicClock::try_with_epoch(MEDIA_EPOCH).unwrap();
    /// let a = clock.current_millis();
    /// std::thread::sleep(std::time::Duration::from_millis(5));
    /// assert!(clock.current_millis() >= a);
    /// ```
    pub fn try_with_epoch(epoch: Duration) -> Result<Self> {
        let epoch_ms = u64::try_from(epoch.as_millis()).unwrap_or(u64::MAX);
        let start = Instant::now();
        let offset = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .and_then(|now| now.checked_sub(epoch))
            .ok_or(Error::ClockBeforeEpoch { epoch_ms })?
            .as_millis();
        let epoch_offset = u64::try_from(offset).unwrap_or(u64::MAX);

        let inner = Arc::new(SharedTickerInner {
            current: AtomicU64::new(0),
        });

        let weak_inner = Arc::downgrade(&inner);
        thread::Builder::new()
            .name("keyflake-ticker".into())
            .spawn(move || {
                let mut tick = 0;

                loop {
                    let Some(inner_ref) = weak_inner.upgrade() else {
                        break;
                    };

                    // Absolute target time of the next tick
                    let target = start + Duration::from_millis(tick);

                    let now = Instant::now();
                    if now < target {
                        thread::sleep(target - now);
                    }

                    let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    inner_ref.current.store(now_ms, Ordering::Relaxed);

                    // Align to next tick after the current actual time
                    tick = now_ms + 1;
                }
            })
            .map_err(|_| Error::ClockThreadSpawn)?;

        Ok(Self {
            inner,
            epoch_offset,
        })
    }
}

impl TimeSource for MonotonicClock {
    /// Returns the number of milliseconds since the configured epoch, based on
    /// the elapsed monotonic time since construction.
    fn current_millis(&self) -> u64 {
        self.epoch_offset + self.inner.current.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_goes_backward() {
        let clock = MonotonicClock::try_default().unwrap();
        let mut last = clock.current_millis();
        for _ in 0..10_000 {
            let now = clock.current_millis();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn advances_with_real_time() {
        let clock = MonotonicClock::try_default().unwrap();
        let before = clock.current_millis();
        thread::sleep(Duration::from_millis(20));
        assert!(clock.current_millis() > before);
    }

    #[test]
    fn clones_share_the_ticker() {
        let a = MonotonicClock::try_default().unwrap();
        let b = a.clone();
        thread::sleep(Duration::from_millis(5));
        assert!(a.current_millis().abs_diff(b.current_millis()) <= 1);
    }

    #[test]
    fn future_epoch_is_rejected() {
        let epoch = Duration::from_millis(u64::MAX / 2);
        assert!(matches!(
            MonotonicClock::try_with_epoch(epoch),
            Err(Error::ClockBeforeEpoch { .. })
        ));
    }
}
