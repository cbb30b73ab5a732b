//! Liberal ISO 8601 date-time parsing and exact ISO 8601 formatting.
//!
//! # Overview
//!
//! This crate converts between textual ISO 8601 representations and a plain,
//! normalized [`Time`] value, and back. It is meant for applications that
//! receive date-times from many different producers and must accept as much
//! of the standard as reasonably possible, while emitting a single canonical
//! representation.
//!
//! The parser understands:
//!
//! - calendar dates (`1989-02-12`, `19890212`), ordinal dates (`1989-234`,
//!   `1989234`) and week dates (`1989-W32-4`, `1989W324`),
//! - reduced precision dates (`1989`, `1989-02`),
//! - signed extended years (`-0001-01-01`, `+10000-01-01`),
//! - truncated representations (`--02-12`, `-W32-4`, `---12`...) completed
//!   from the current local date supplied by a [`LocalClock`],
//! - times with hours, minutes and seconds, each optionally followed by a
//!   decimal fraction, including `24:00:00` and the `23:59:60` leap second,
//! - `Z` and numeric UTC offsets, including the non-standard form where an
//!   offset directly follows a date.
//!
//! Basic (`20000303T030303Z`) and extended (`2000-03-03T03:03:03Z`)
//! punctuation are both accepted and may even be mixed.
//!
//! The formatter ([`Unparser`]) renders calendar, ordinal or week dates in
//! basic or extended format, with a configurable minimum year width and
//! truncation level. It computes the exact output length before writing so
//! that it can work on caller-provided buffers without allocation.
//!
//! [`Time`] values can also be converted to and from signed seconds since
//! 1970-01-01 00:00:00 UTC, and shifted field by field with the `add_*`
//! methods.
//!
//!
//! # Design choices and limitations
//!
//! Years are limited to the `i32` range, and the proleptic Gregorian calendar
//! is used throughout. No time zone database is consulted: a [`Time`] carries
//! either no offset (local time), UTC, or a raw offset in minutes. For epoch
//! conversion purposes, a [`Time`] without offset is considered to be in UTC.
//!
//!
//! # Features flags
//!
//! ### Support for `no-std`
//!
//! By default, this crate enables the `std` feature to access the system
//! clock, implement `std::error::Error` and provide [`FromStr`]-based parsing,
//! but specifying `default-features = false` makes it `no-std`-compatible.
//!
//! ### Support for time-related crates
//!
//! Conversion methods to and from date-time stamps of the [chrono] crate are
//! available with the `chrono` feature. The `local_clock` feature makes
//! [`SystemClock`] report the host's local time zone through chrono instead of
//! UTC.
//!
//! ### Serialization
//!
//! [`Time`] and related types can be (de)serialized with `serde` by activating
//! the `serde` feature.
//!
//! ### Logging
//!
//! With the `log` feature, rejected field values are reported through the
//! [log] crate at the `debug` level.
//!
//! [chrono]: https://crates.io/crates/chrono
//! [log]: https://crates.io/crates/log
//!
//!
//! # Examples
#![cfg_attr(
    feature = "std",
    doc = r##"
```
use iso8601_time::{Format, Time, Truncate, Unparser};

let time: Time = "1989-W32-4T22:59:32.5+06:30".parse().unwrap();
assert_eq!((time.year, time.month, time.day), (1989, 8, 10));
assert_eq!(time.usecond, 500_000);

// Default rendering: extended calendar date with microseconds.
assert_eq!(time.to_string(), "1989-08-10T22:59:32.500000+06:30");

// Basic ordinal date truncated to the minute.
let unparser = Unparser::new()
    .basic(true)
    .format(Format::Ordinal)
    .truncate(Truncate::Minute);
let mut buf = [0u8; 32];
assert_eq!(unparser.unparse(&time, &mut buf).unwrap(), "1989222T2259+0630");

assert_eq!(time.to_epoch_seconds().unwrap(), 618_769_772);
```"##
)]
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

use core::fmt;
#[cfg(feature = "std")]
use core::str::FromStr;

/// Returns early with the provided error if the condition does not hold, or
/// with the error of a failed check, logging the rejection when the `log`
/// feature is enabled.
macro_rules! ensure {
    ($condition:expr, $err:expr) => {
        if !$condition {
            let err = $err;
            #[cfg(feature = "log")]
            log::debug!("rejected date-time: {}", err);
            return Err(err.into());
        }
    };
    ($check:expr) => {
        if let Err(err) = $check {
            #[cfg(feature = "log")]
            log::debug!("rejected date-time: {}", err);
            return Err(err.into());
        }
    };
}

mod calendar;
mod clock;
mod epoch;
mod errors;
mod parse;
mod unparse;

pub use calendar::{
    date_from_iso_week, day_of_year, days_in_month, days_in_year, is_leap_year, iso_week,
    month_and_day_of_month, weekday, weeks_in_year,
};
#[cfg(feature = "std")]
pub use clock::SystemClock;
pub use clock::{FixedClock, LocalClock};
pub use errors::{DateTimeError, OutOfRangeError, ParseError, UnparseError};
pub use unparse::{Displayed, Format, Truncate, Unparser};

/// UTC offset state of a [`Time`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Offset {
    /// No offset was specified: the time is local time.
    #[default]
    Local,
    /// Coordinated Universal Time, written `Z`.
    Utc,
    /// An explicit signed offset from UTC in minutes, strictly within ±24h and
    /// on a quarter of an hour.
    Minutes(i16),
}

/// A broken-down ISO 8601 date-time.
///
/// This is a plain record: every field is public and the value may be built
/// directly. Values produced by the parser and by the `add_*` methods always
/// satisfy the following invariants, which can be checked with
/// [`validate`](Time::validate):
///
/// - `month` is between 1 and 12,
/// - `day` is between 1 and the length of the month in this year,
/// - `hour` is between 0 and 24, 24 being only valid at `24:00:00.000000`
///   (midnight at the end of the day),
/// - `minute` is between 0 and 59,
/// - `second` is between 0 and 59, or 60 for a leap second at `23:59:60`,
/// - `usecond` is between 0 and 999 999.
///
/// # Examples
///
/// ```
/// use iso8601_time::{Offset, Time};
///
/// let mut time = Time::new(2000, 6, 30).unwrap();
/// time.hour = 23;
/// time.minute = 59;
/// time.second = 60;
/// time.offset = Offset::Utc;
///
/// assert!(time.validate().is_ok());
/// assert_eq!(time.to_epoch_seconds(), Ok(962_409_600));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Time {
    /// The proleptic Gregorian year, year 0 being 1 BC.
    pub year: i32,
    /// The month, from 1 to 12.
    pub month: u8,
    /// The day of the month, from 1 to 31.
    pub day: u8,
    /// The hour, from 0 to 24.
    pub hour: u8,
    /// The minute, from 0 to 59.
    pub minute: u8,
    /// The second, from 0 to 60.
    pub second: u8,
    /// The microsecond, from 0 to 999 999.
    pub usecond: u32,
    /// The UTC offset.
    pub offset: Offset,
}

impl Time {
    /// Creates a local time set at midnight of the provided date.
    ///
    /// Returns an error if the month or the day of the month is invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use iso8601_time::{DateTimeError, Time};
    ///
    /// assert!(Time::new(1988, 2, 29).is_ok());
    /// assert_eq!(
    ///     Time::new(1989, 2, 29),
    ///     Err(DateTimeError::InvalidDayOfMonth(29))
    /// );
    /// ```
    pub fn new(year: i32, month: u8, day: u8) -> Result<Self, DateTimeError> {
        let time = Self::midnight(year, month, day);
        time.validate()?;

        Ok(time)
    }

    /// Creates a local time at midnight without validation.
    pub(crate) const fn midnight(year: i32, month: u8, day: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
            usecond: 0,
            offset: Offset::Local,
        }
    }

    /// Parses an ISO 8601 date-time, completing truncated representations
    /// with the current local date of the system clock.
    ///
    /// See [`parse_with_clock`](Time::parse_with_clock) for details.
    ///
    /// # Examples
    ///
    /// ```
    /// use iso8601_time::{Offset, Time};
    ///
    /// let time = Time::parse("1999-12-31T24:00:00Z").unwrap();
    /// assert_eq!(time.hour, 24);
    /// assert_eq!(time.offset, Offset::Utc);
    /// assert_eq!(time.to_epoch_seconds(), Ok(946_684_800));
    /// ```
    #[cfg(feature = "std")]
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Self::parse_with_clock(text, &SystemClock)
    }

    /// Parses an ISO 8601 date-time, completing truncated representations
    /// with the current local date reported by the provided clock.
    ///
    /// The clock is only consulted when the input omits high-order fields,
    /// as in `--02-12` or `-W32-4`.
    ///
    /// Malformed input is reported as a syntax error, while fields that are
    /// recognized but numerically invalid are reported with
    /// [`ParseError::RangeError`].
    ///
    /// # Examples
    ///
    /// ```
    /// use iso8601_time::{FixedClock, Time};
    ///
    /// let clock = FixedClock::new(Time::new(1989, 6, 15).unwrap());
    ///
    /// let time = Time::parse_with_clock("--02-12T09:28", &clock).unwrap();
    /// assert_eq!((time.year, time.month, time.day), (1989, 2, 12));
    /// assert_eq!((time.hour, time.minute), (9, 28));
    /// ```
    pub fn parse_with_clock<C>(text: &str, clock: &C) -> Result<Self, ParseError>
    where
        C: LocalClock + ?Sized,
    {
        parse::parse(text, clock)
    }

    /// Returns the ISO day of the week, from 1 (Monday) to 7 (Sunday).
    ///
    /// The date is expected to be valid.
    pub const fn weekday(&self) -> u8 {
        calendar::weekday(self.year, self.month, self.day)
    }

    /// Returns the 1-based day of the year.
    ///
    /// The date is expected to be valid.
    pub const fn day_of_year(&self) -> u16 {
        calendar::day_of_year(self.year, self.month, self.day)
    }

    /// Returns the ISO week-numbering year, week and weekday, or `None` if the
    /// week-numbering year overflows.
    ///
    /// The date is expected to be valid.
    pub fn iso_week(&self) -> Option<(i32, u8, u8)> {
        calendar::iso_week(self.year, self.month, self.day)
    }
}

impl fmt::Display for Time {
    /// Formats the date-time as an extended calendar date with microseconds,
    /// e.g. `2000-03-03T03:03:03.123456Z`.
    ///
    /// The fields are rendered as they are, without validation. Use
    /// [`Unparser::display`] to reject invalid values.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Unparser::new().write_to(self, f)
    }
}

#[cfg(feature = "std")]
impl FromStr for Time {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality() {
        let t0 = Time::new(2000, 3, 3).unwrap();
        let mut t1 = t0;
        let mut t2 = t0;
        t1.offset = Offset::Utc;
        t2.offset = Offset::Minutes(0);

        assert_eq!(t0, Time::new(2000, 3, 3).unwrap());
        assert_ne!(t0, t1);
        assert_ne!(t1, t2);
    }

    #[test]
    fn new_invalid() {
        assert_eq!(Time::new(2000, 0, 1), Err(DateTimeError::InvalidMonth(0)));
        assert_eq!(Time::new(2000, 13, 1), Err(DateTimeError::InvalidMonth(13)));
        assert_eq!(
            Time::new(2012, 4, 31),
            Err(DateTimeError::InvalidDayOfMonth(31))
        );
    }

    #[test]
    fn display_default() {
        let mut time = Time::new(2000, 3, 3).unwrap();
        time.hour = 3;
        time.minute = 3;
        time.second = 3;
        time.usecond = 123_456;
        time.offset = Offset::Utc;

        let mut buf = [0u8; 64];
        let expected = Unparser::new().unparse(&time, &mut buf).unwrap();
        assert_eq!(expected, "2000-03-03T03:03:03.123456Z");

        #[cfg(feature = "std")]
        assert_eq!(time.to_string(), expected);
    }

    #[cfg(feature = "std")]
    #[test]
    fn from_str_round_trip() {
        for text in [
            "2000-03-03T03:03:03.123456Z",
            "-2000-03-03T03:03:03.123456Z",
            "1999-12-31T24:00:00.000000Z",
            "2000-06-30T23:59:60.000000Z",
            "2000-03-03T03:03:03.123456+01:30",
            "2000-03-03T03:03:03.123456-01:30",
            "2000-03-03T03:03:03.123456",
        ] {
            let time: Time = text.parse().unwrap();
            assert_eq!(time.to_string(), text);
        }
    }

    #[test]
    fn week_and_ordinal_accessors() {
        let time = Time::new(2000, 3, 3).unwrap();

        assert_eq!(time.weekday(), 5);
        assert_eq!(time.day_of_year(), 63);
        assert_eq!(time.iso_week(), Some((2000, 9, 5)));
        assert_eq!(Time::new(i32::MAX, 12, 31).unwrap().iso_week(), None);
    }

    #[test]
    fn display_invalid_fields() {
        let mut time = Time::new(2000, 3, 3).unwrap();
        time.month = 13;
        time.offset = Offset::Utc;

        assert_eq!(time.to_string(), "2000-13-03T00:00:00.000000Z");

        time.month = 3;
        time.day = 0;
        time.hour = 25;
        time.usecond = 1_234_567;
        assert_eq!(time.to_string(), "2000-03-00T25:00:00.1234567Z");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip() {
        let mut time = Time::new(2000, 3, 3).unwrap();
        time.offset = Offset::Minutes(-90);

        let json = serde_json::to_string(&time).unwrap();
        let back: Time = serde_json::from_str(&json).unwrap();

        assert_eq!(back, time);
    }
}
