//! Sources of the current local date used to complete truncated
//! representations.

use crate::Time;
#[cfg(feature = "std")]
use crate::Offset;

/// A source of the current local date-time.
///
/// The parser consults the clock only when an input omits high-order fields
/// (as in `--02-12` or `-W32`), and reads it at most once per parse so that
/// the completion is based on a consistent snapshot.
///
/// Implementations must return a valid [`Time`].
///
/// # Examples
///
/// ```
/// use iso8601_time::{LocalClock, Offset, Time};
///
/// /// A clock stuck on the first day of each year.
/// struct NewYear(i32);
///
/// impl LocalClock for NewYear {
///     fn now(&self) -> Time {
///         Time::new(self.0, 1, 1).unwrap()
///     }
/// }
///
/// let time = Time::parse_with_clock("---15", &NewYear(2024)).unwrap();
/// assert_eq!((time.year, time.month, time.day), (2024, 1, 15));
/// ```
pub trait LocalClock {
    /// Returns the current local date-time.
    fn now(&self) -> Time;
}

impl<C: LocalClock + ?Sized> LocalClock for &C {
    fn now(&self) -> Time {
        (**self).now()
    }
}

/// A clock that always reports the same date-time.
///
/// A `FixedClock` makes the completion of truncated representations
/// deterministic.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FixedClock(Time);

impl FixedClock {
    /// Creates a clock stopped at the provided date-time.
    pub const fn new(now: Time) -> Self {
        Self(now)
    }
}

impl LocalClock for FixedClock {
    fn now(&self) -> Time {
        self.0
    }
}

/// The system wall clock.
///
/// With the `local_clock` feature, the date-time is expressed in the host's
/// local time zone through chrono. Otherwise the UTC date-time of the system
/// clock is reported.
#[cfg(feature = "std")]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl LocalClock for SystemClock {
    #[cfg(feature = "local_clock")]
    fn now(&self) -> Time {
        let now = chrono::Local::now();

        Time::from_chrono_date_time(&now)
            .or_else(|_| Time::from_chrono_date_time(&now.with_timezone(&chrono::Utc)))
            .unwrap_or_else(|_| system_utc_now())
    }

    #[cfg(not(feature = "local_clock"))]
    fn now(&self) -> Time {
        system_utc_now()
    }
}

/// Returns the UTC date-time of the system clock.
///
/// Dates before the Unix epoch are reported as such; a clock too far in the
/// future to be represented falls back to the epoch.
#[cfg(feature = "std")]
fn system_utc_now() -> Time {
    use std::time::SystemTime;

    let (secs, usecs) = match SystemTime::now().duration_since(SystemTime::UNIX_EPOCH) {
        Ok(elapsed) => (
            i64::try_from(elapsed.as_secs()).unwrap_or(0),
            elapsed.subsec_micros(),
        ),
        Err(err) => {
            let before = err.duration();
            let mut secs = -i64::try_from(before.as_secs()).unwrap_or(0);
            let mut usecs = before.subsec_micros();
            if usecs > 0 {
                secs -= 1;
                usecs = 1_000_000 - usecs;
            }
            (secs, usecs)
        }
    };

    let mut time = Time::from_epoch_seconds(secs).unwrap_or(Time {
        offset: Offset::Utc,
        ..Time::midnight(1970, 1, 1)
    });
    time.usecond = usecs;

    time
}
