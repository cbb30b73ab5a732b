//! Conversion to and from seconds since 1970-01-01 00:00:00 UTC.

use crate::calendar::{self, DAYS_PER_CYCLE, DAYS_TO_UNIX_EPOCH};
use crate::{DateTimeError, Offset, OutOfRangeError, Time};

/// Returns the number of days from the start of a 400-year cycle to the
/// start of its `year`-th year, for `year` between 0 and 400.
///
/// The first year of each cycle is a leap year.
const fn days_before_year_in_cycle(year: i64) -> i64 {
    365 * year + (year + 3) / 4 - (year + 99) / 100 + (year + 399) / 400
}

/// Splits a day count from 0000-01-01 into a year and a 0-based day of the
/// year.
fn year_and_day_of_year(days: i64) -> (i64, i64) {
    let cycles = days.div_euclid(DAYS_PER_CYCLE);
    let day = days.rem_euclid(DAYS_PER_CYCLE);

    // The estimate is off by at most one year.
    let mut year = day * 400 / DAYS_PER_CYCLE;
    if days_before_year_in_cycle(year) > day {
        year -= 1;
    } else if days_before_year_in_cycle(year + 1) <= day {
        year += 1;
    }

    (cycles * 400 + year, day - days_before_year_in_cycle(year))
}

impl Time {
    /// Returns the signed number of seconds since 1970-01-01 00:00:00 UTC.
    ///
    /// The UTC offset, if any, is subtracted; a time without offset is
    /// considered to be in UTC. The `23:59:60` leap second yields the same
    /// value as `00:00:00` of the next day, and so does `24:00:00`.
    ///
    /// Sub-second precision is discarded.
    ///
    /// Returns an error if the value does not satisfy its invariants.
    ///
    /// # Examples
    ///
    /// ```
    /// use iso8601_time::{Offset, Time};
    ///
    /// let mut time = Time::new(2000, 1, 1).unwrap();
    /// assert_eq!(time.to_epoch_seconds(), Ok(946_684_800));
    ///
    /// time.offset = Offset::Minutes(90);
    /// assert_eq!(time.to_epoch_seconds(), Ok(946_684_800 - 5400));
    /// ```
    pub fn to_epoch_seconds(&self) -> Result<i64, DateTimeError> {
        self.validate()?;

        let days = calendar::days_from_unix_epoch(self.year, self.month, self.day);
        let secs = days * 86400
            + self.hour as i64 * 3600
            + self.minute as i64 * 60
            + self.second as i64;

        Ok(match self.offset {
            Offset::Local | Offset::Utc => secs,
            Offset::Minutes(minutes) => secs - minutes as i64 * 60,
        })
    }

    /// Creates a UTC date-time from a signed number of seconds since
    /// 1970-01-01 00:00:00 UTC.
    ///
    /// Returns an error if the year does not fit in an `i32`.
    ///
    /// # Examples
    ///
    /// ```
    /// use iso8601_time::{Offset, Time};
    ///
    /// let time = Time::from_epoch_seconds(-1).unwrap();
    ///
    /// assert_eq!((time.year, time.month, time.day), (1969, 12, 31));
    /// assert_eq!((time.hour, time.minute, time.second), (23, 59, 59));
    /// assert_eq!(time.offset, Offset::Utc);
    /// ```
    pub fn from_epoch_seconds(secs: i64) -> Result<Self, OutOfRangeError> {
        let sec = secs.rem_euclid(86400);
        let (year, doy) = year_and_day_of_year(secs.div_euclid(86400) + DAYS_TO_UNIX_EPOCH);
        let year: i32 = year.try_into().map_err(|_| OutOfRangeError(()))?;
        let (month, day) = calendar::month_and_day_of_month(year, doy as u16 + 1);

        Ok(Self {
            year,
            month,
            day,
            hour: (sec / 3600) as u8,
            minute: (sec / 60 % 60) as u8,
            second: (sec % 60) as u8,
            usecond: 0,
            offset: Offset::Utc,
        })
    }

    /// Creates a date-time from a `chrono::DateTime`, keeping its fixed UTC
    /// offset.
    ///
    /// A chrono leap second (nanoseconds beyond one second) becomes second 60.
    ///
    /// Returns an error if the offset is not on a quarter of an hour.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::DateTime;
    /// use iso8601_time::{Offset, Time};
    ///
    /// let date_time = DateTime::parse_from_rfc3339("2001-09-15T05:05:00.005+02:00").unwrap();
    /// let time = Time::from_chrono_date_time(&date_time).unwrap();
    ///
    /// assert_eq!((time.year, time.month, time.day, time.hour), (2001, 9, 15, 5));
    /// assert_eq!(time.usecond, 5_000);
    /// assert_eq!(time.offset, Offset::Minutes(120));
    /// ```
    #[cfg(feature = "chrono")]
    pub fn from_chrono_date_time<Tz: chrono::TimeZone>(
        date_time: &chrono::DateTime<Tz>,
    ) -> Result<Self, DateTimeError> {
        use chrono::{Datelike, Offset as _, Timelike};

        let local = date_time.naive_local();
        let offset_secs = date_time.offset().fix().local_minus_utc();
        if offset_secs % 60 != 0 {
            return Err(DateTimeError::OutOfRange);
        }
        let (second, nanos) = match local.nanosecond() {
            n if n >= 1_000_000_000 => (60, n - 1_000_000_000),
            n => (local.second() as u8, n),
        };

        let time = Self {
            year: local.year(),
            month: local.month() as u8,
            day: local.day() as u8,
            hour: local.hour() as u8,
            minute: local.minute() as u8,
            second,
            usecond: nanos / 1000,
            offset: Offset::Minutes((offset_secs / 60) as i16),
        };
        time.validate()?;

        Ok(time)
    }

    /// Returns a `chrono::DateTime` with the fixed UTC offset of this value.
    ///
    /// A time without offset is considered to be in UTC. A leap second is
    /// folded into the first second of the next minute.
    ///
    /// Returns an error if the value is invalid or cannot be represented by
    /// chrono.
    #[cfg(feature = "chrono")]
    pub fn to_chrono_date_time(
        &self,
    ) -> Result<chrono::DateTime<chrono::FixedOffset>, DateTimeError> {
        let secs = self.to_epoch_seconds()?;
        let offset_secs = match self.offset {
            Offset::Local | Offset::Utc => 0,
            Offset::Minutes(minutes) => minutes as i32 * 60,
        };
        let offset = chrono::FixedOffset::east_opt(offset_secs).ok_or(DateTimeError::OutOfRange)?;

        chrono::DateTime::from_timestamp(secs, self.usecond * 1000)
            .map(|date_time| date_time.with_timezone(&offset))
            .ok_or(DateTimeError::OutOfRange)
    }
}
