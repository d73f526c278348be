use crate::id::SnowflakeId;

/// Represents the result of a single, non-blocking generation attempt.
///
/// - [`Poll::Ready`] indicates a new ID was successfully generated.
/// - [`Poll::Pending`] means the generator is throttled: the sequence for the
///   current millisecond is exhausted (`yield_for == 1`) or another thread won
///   a compare-and-swap race (`yield_for == 0`).
/// - [`Poll::ClockBehind`] means the clock reads earlier than the last issued
///   timestamp. Issuing now would produce a smaller ID, so the attempt is
///   refused until the clock catches up.
///
/// A generator never waits itself. Whatever waiting happens is done by the
/// caller, outside the generator's critical section.
///
/// # Example
///
/// ```
/// use keyflake::{LockSnowflakeGenerator, Poll, RecordId, SnowflakeId, TimeSource};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1
///     }
/// }
///
/// let generator = LockSnowflakeGenerator::<RecordId, _>::from_components(
///     1,
///     2,
///     RecordId::max_sequence(),
///     FixedTime,
/// );
/// match generator.try_poll_id().unwrap() {
///     Poll::Ready { id } => println!("ID: {id}"),
///     Poll::Pending { yield_for } => println!("Back off for: {yield_for} ms"),
///     Poll::ClockBehind { behind_ms } => println!("Clock is {behind_ms} ms behind"),
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll<ID: SnowflakeId> {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: ID,
    },
    /// No ID could be generated right now. Retry after `yield_for`
    /// milliseconds (0 means retry immediately).
    Pending {
        /// Milliseconds to wait before the next attempt.
        yield_for: u64,
    },
    /// The clock moved backward relative to the last issued ID.
    ClockBehind {
        /// How far the clock is behind the last issued timestamp.
        behind_ms: u64,
    },
}
