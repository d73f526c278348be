use core::time::Duration;
use std::sync::Arc;

/// Default epoch: Tuesday, November 14, 2023 22:13:20 UTC
///
/// Every replica that must compare identifiers has to share this value.
pub const MEDIA_EPOCH: Duration = Duration::from_millis(1_700_000_000_000);

/// A trait for time sources that return a monotonic or wall-clock timestamp.
///
/// This abstraction allows you to plug in a real system clock, a monotonic
/// timer, or a mocked time source in tests.
///
/// The unit is **milliseconds** relative to the origin the clock was built
/// with, which is the value packed into an ID's timestamp field.
///
/// # Example
///
/// ```
/// use keyflake::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}
