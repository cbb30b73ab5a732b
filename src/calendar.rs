//! Calendar arithmetic on the proleptic Gregorian calendar.

use crate::{DateTimeError, Offset, Time};

const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const DAYS_IN_MONTH_LEAP: [u8; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const DOY_AT_MONTH: [i32; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];
const DOY_AT_MONTH_LEAP: [i32; 12] = [0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335];

/// Number of days in a 400-year Gregorian cycle.
pub(crate) const DAYS_PER_CYCLE: i64 = 146_097;

/// Number of days between 0000-01-01 and 1970-01-01.
pub(crate) const DAYS_TO_UNIX_EPOCH: i64 = 719_528;

/// Returns whether the year is a leap year.
///
/// Years are proleptic Gregorian years where year 0 is 1 BC, which makes year
/// 0 and every multiple of 400 before it leap years.
pub const fn is_leap_year(year: i32) -> bool {
    (year & 0b11) == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Returns the number of days in a month, or 0 if the month is not between 1
/// and 12.
pub const fn days_in_month(year: i32, month: u8) -> u8 {
    if month < 1 || month > 12 {
        return 0;
    }
    let month_idx = (month - 1) as usize;

    if is_leap_year(year) {
        DAYS_IN_MONTH_LEAP[month_idx]
    } else {
        DAYS_IN_MONTH[month_idx]
    }
}

/// Returns the number of days in a year.
pub const fn days_in_year(year: i32) -> u16 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Calculates the 1-based day of the year.
///
/// The month and day are expected to be valid.
pub const fn day_of_year(year: i32, month: u8, day: u8) -> u16 {
    let month_idx = (month - 1) as usize;
    let table = if is_leap_year(year) {
        &DOY_AT_MONTH_LEAP
    } else {
        &DOY_AT_MONTH
    };

    (day as i32 + table[month_idx]) as u16
}

/// Calculates the month and the day of the month for a 1-based day of the
/// year.
///
/// The day of the year is expected to be valid for this year.
pub fn month_and_day_of_month(year: i32, doy: u16) -> (u8, u8) {
    let table = if is_leap_year(year) {
        &DOY_AT_MONTH_LEAP
    } else {
        &DOY_AT_MONTH
    };

    let doy = doy as i32 - 1;
    let idx = table.binary_search(&doy).unwrap_or_else(|e| e - 1);
    let month = idx as u8 + 1;
    let day = (doy - table[idx]) as u8 + 1;

    (month, day)
}

/// Returns the signed number of days from 0000-01-01 to January 1st of the
/// year.
pub(crate) const fn days_from_year_0(year: i32) -> i64 {
    let year = year as i64;
    let offset = (year > 0) as i64;
    let y = year - offset;
    let m4 = y / 4 + offset;
    let m100 = y / 100;
    let m400 = m100 / 4;

    year * 365 + m4 - m100 + m400
}

/// Returns the signed number of days between 1970-01-01 and the date.
///
/// The month and day are expected to be valid.
pub(crate) const fn days_from_unix_epoch(year: i32, month: u8, day: u8) -> i64 {
    days_from_year_0(year) - DAYS_TO_UNIX_EPOCH + day_of_year(year, month, day) as i64 - 1
}

/// Returns the ISO day of the week, from 1 (Monday) to 7 (Sunday).
///
/// The month and day are expected to be valid.
pub const fn weekday(year: i32, month: u8, day: u8) -> u8 {
    // 1970-01-01 was a Thursday.
    (days_from_unix_epoch(year, month, day) + 3).rem_euclid(7) as u8 + 1
}

/// Returns the number of ISO weeks (52 or 53) in a week-numbering year.
///
/// Long years are those starting on a Thursday, and leap years starting on a
/// Wednesday.
pub const fn weeks_in_year(year: i32) -> u8 {
    match weekday(year, 1, 1) {
        4 => 53,
        3 if is_leap_year(year) => 53,
        _ => 52,
    }
}

/// Returns the ISO week-numbering year, the week and the weekday of a date.
///
/// The week-numbering year differs from the calendar year for dates around
/// January 1st. `None` is returned if it cannot be represented, as for the
/// last days of year `i32::MAX`.
///
/// The month and day are expected to be valid.
pub fn iso_week(year: i32, month: u8, day: u8) -> Option<(i32, u8, u8)> {
    let wday = weekday(year, month, day);
    let doy = day_of_year(year, month, day) as i32;
    let week = (doy - wday as i32 + 10) / 7;

    if week < 1 {
        let year = year.checked_sub(1)?;
        return Some((year, weeks_in_year(year), wday));
    }
    if week > weeks_in_year(year) as i32 {
        return Some((year.checked_add(1)?, 1, wday));
    }

    Some((year, week as u8, wday))
}

/// Returns the calendar date of a week date.
///
/// Week 1 is the week containing January 4th. The week and weekday are
/// expected to be valid for this week-numbering year.
pub fn date_from_iso_week(week_year: i32, week: u8, wday: u8) -> (i32, u8, u8) {
    let mut time = Time::midnight(week_year, 1, 4);
    let jan4 = weekday(week_year, 1, 4) as i64;
    time.add_days((week as i64 - 1) * 7 + wday as i64 - jan4);

    (time.year, time.month, time.day)
}

/// Converts an `i64` year to the `i32` range.
///
/// # Panics
///
/// Panics if the year cannot be represented.
fn to_year(year: i64) -> i32 {
    i32::try_from(year).expect("overflow when adjusting the year")
}

/// Adds a delta to a field value.
///
/// # Panics
///
/// Panics on `i64` overflow, which can only happen for deltas that would
/// overflow the year anyway.
fn carry(value: i64, delta: i64) -> i64 {
    value
        .checked_add(delta)
        .expect("overflow when adding to a date-time field")
}

impl Time {
    /// Adds a number of years, leaving the month and day untouched.
    ///
    /// The day of the month may need to be validated again afterwards, e.g.
    /// when adding one year to February 29th.
    ///
    /// # Panics
    ///
    /// Panics if the resulting year cannot be represented.
    pub fn add_years(&mut self, years: i64) {
        self.year = to_year(carry(self.year as i64, years));
    }

    /// Adds a number of months, carrying whole years and leaving the day
    /// untouched.
    ///
    /// # Panics
    ///
    /// Panics if the resulting year cannot be represented.
    ///
    /// # Examples
    ///
    /// ```
    /// use iso8601_time::Time;
    ///
    /// let mut time = Time::new(2000, 1, 15).unwrap();
    /// time.add_months(-1);
    ///
    /// assert_eq!((time.year, time.month, time.day), (1999, 12, 15));
    /// ```
    pub fn add_months(&mut self, months: i64) {
        let months = carry(self.month as i64 - 1, months);
        let year = to_year(self.year as i64 + months.div_euclid(12));

        self.year = year;
        self.month = months.rem_euclid(12) as u8 + 1;
    }

    /// Adds a number of days, carrying months and years.
    ///
    /// Whole month lengths are consumed one month at a time until the
    /// remaining offset fits the current month. When going backwards, the
    /// month is stepped back first and its length then added to the deficit,
    /// so that day 0 of March becomes the last day of February.
    ///
    /// # Panics
    ///
    /// Panics if the resulting year cannot be represented.
    pub fn add_days(&mut self, days: i64) {
        let mut time = *self;
        let mut days = carry(time.day as i64, days);

        // Skip whole 400-year cycles so that the month walk stays short.
        let mut year = time.year as i64;
        if days > DAYS_PER_CYCLE {
            let n_cycles = (days - 1) / DAYS_PER_CYCLE;
            days -= n_cycles * DAYS_PER_CYCLE;
            year += 400 * n_cycles;
        } else if days < -DAYS_PER_CYCLE {
            let n_cycles = -days / DAYS_PER_CYCLE;
            days += n_cycles * DAYS_PER_CYCLE;
            year -= 400 * n_cycles;
        }
        time.year = to_year(year);

        if days > 0 {
            while days > days_in_month(time.year, time.month) as i64 {
                days -= days_in_month(time.year, time.month) as i64;
                time.add_months(1);
            }
        } else {
            loop {
                time.add_months(-1);
                days += days_in_month(time.year, time.month) as i64;
                if days >= 1 {
                    break;
                }
            }
        }

        time.day = days as u8;
        *self = time;
    }

    /// Adds a number of hours, carrying days.
    ///
    /// # Panics
    ///
    /// Panics if the resulting year cannot be represented.
    pub fn add_hours(&mut self, hours: i64) {
        let hours = carry(self.hour as i64, hours);
        let mut time = *self;
        time.add_days(hours.div_euclid(24));
        time.hour = hours.rem_euclid(24) as u8;
        *self = time;
    }

    /// Adds a number of minutes, carrying hours.
    ///
    /// # Panics
    ///
    /// Panics if the resulting year cannot be represented.
    pub fn add_minutes(&mut self, minutes: i64) {
        let minutes = carry(self.minute as i64, minutes);
        let mut time = *self;
        time.add_hours(minutes.div_euclid(60));
        time.minute = minutes.rem_euclid(60) as u8;
        *self = time;
    }

    /// Adds a number of seconds, carrying minutes.
    ///
    /// # Panics
    ///
    /// Panics if the resulting year cannot be represented.
    ///
    /// # Examples
    ///
    /// ```
    /// use iso8601_time::Time;
    ///
    /// let mut time = Time::new(1999, 12, 31).unwrap();
    /// time.hour = 23;
    /// time.minute = 59;
    /// time.second = 59;
    /// time.add_seconds(1);
    ///
    /// assert_eq!(time, Time::new(2000, 1, 1).unwrap());
    /// ```
    pub fn add_seconds(&mut self, seconds: i64) {
        let seconds = carry(self.second as i64, seconds);
        let mut time = *self;
        time.add_minutes(seconds.div_euclid(60));
        time.second = seconds.rem_euclid(60) as u8;
        *self = time;
    }

    /// Adds a number of microseconds, carrying seconds.
    ///
    /// # Panics
    ///
    /// Panics if the resulting year cannot be represented.
    pub fn add_useconds(&mut self, useconds: i64) {
        let useconds = carry(self.usecond as i64, useconds);
        let mut time = *self;
        time.add_seconds(useconds.div_euclid(1_000_000));
        time.usecond = useconds.rem_euclid(1_000_000) as u32;
        *self = time;
    }

    /// Checks every field against its valid range.
    ///
    /// Hour 24 is only valid as `24:00:00.000000`, and second 60 only at
    /// `23:59:60`.
    pub fn validate(&self) -> Result<(), DateTimeError> {
        if !(1..=12).contains(&self.month) {
            return Err(DateTimeError::InvalidMonth(self.month));
        }
        if self.day < 1 || self.day > days_in_month(self.year, self.month) {
            return Err(DateTimeError::InvalidDayOfMonth(self.day));
        }
        validate_time_of_day(self.hour, self.minute, self.second, self.usecond)?;
        if let Offset::Minutes(minutes) = self.offset {
            validate_offset(minutes)?;
        }

        Ok(())
    }
}

/// Checks the time-of-day fields, including the hour-24 and leap second
/// rules.
pub(crate) fn validate_time_of_day(
    hour: u8,
    minute: u8,
    second: u8,
    usecond: u32,
) -> Result<(), DateTimeError> {
    if hour > 24 || (hour == 24 && (minute != 0 || second != 0 || usecond != 0)) {
        return Err(DateTimeError::InvalidHour(hour));
    }
    if minute > 59 {
        return Err(DateTimeError::InvalidMinute(minute));
    }
    if second > 60 || (second == 60 && (hour != 23 || minute != 59)) {
        return Err(DateTimeError::InvalidSecond(second));
    }
    if usecond > 999_999 {
        return Err(DateTimeError::InvalidUsecond(usecond));
    }

    Ok(())
}

/// Checks that an offset lies strictly within ±24h and falls on a quarter
/// hour.
pub(crate) fn validate_offset(minutes: i16) -> Result<(), DateTimeError> {
    if minutes <= -1440 || minutes >= 1440 || minutes % 15 != 0 {
        return Err(DateTimeError::InvalidOffset(minutes));
    }

    Ok(())
}
