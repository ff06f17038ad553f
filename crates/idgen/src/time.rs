use std::time::{SystemTime, UNIX_EPOCH};

/// A trait for time sources that return a nanosecond timestamp relative to the
/// UNIX epoch.
///
/// This abstraction allows you to plug in the real system clock or a mocked
/// time source in tests, e.g. to force two producers onto the same nanosecond.
///
/// Implementations are shared by every producer in a pool, so they must be
/// cheap to clone and safe to send across threads.
///
/// # Example
///
/// ```
/// use idgen::TimeSource;
///
/// #[derive(Clone)]
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_nanos(&self) -> i64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_nanos(), 1234);
/// ```
pub trait TimeSource: Clone + Send + 'static {
    /// Returns the current time in nanoseconds since 1970-01-01 UTC.
    fn current_nanos(&self) -> i64;
}

/// Wall-clock time source backed by [`SystemTime`].
///
/// Values are not monotonic: an NTP step backwards is visible in the embedded
/// timestamp. Times before the epoch are reported as negative values and
/// times past year 2262 saturate at [`i64::MAX`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_nanos(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since) => i64::try_from(since.as_nanos()).unwrap_or(i64::MAX),
            Err(before) => i64::try_from(before.duration().as_nanos())
                .map(|n| -n)
                .unwrap_or(i64::MIN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_after_2017() {
        // 2017-05-12, the timestamp carried by the reference identifiers.
        assert!(SystemClock.current_nanos() > 1_494_590_520_160_966_782);
    }
}
