//! ISO 8601 parser.
//!
//! Parsing happens in two passes. The first pass recognizes the grammar and
//! collects raw field values without judging them, so that malformed input is
//! always reported as a syntax error. The second pass checks every field
//! against its range and resolves ordinal and week dates to calendar dates.
//!
//! The grammar is deliberately liberal. Basic and extended punctuation may be
//! mixed, a time may follow a basic date without `T`, and an offset may
//! directly follow a date. Digit runs are disambiguated by their length:
//!
//! - after a year, 2 digits are a month, an odd count starts with an ordinal
//!   day and an even count starts with a month and a day, any remaining
//!   digits being the time,
//! - after a week, an odd count starts with the weekday and an even count has
//!   no weekday; in particular a `-` after the week followed by an even count
//!   is the sign of a UTC offset (`1989W01-06`) rather than a separator,
//! - a signed year of 6 digits or more followed by `-` ends with a month, as
//!   in `+197101-01`.

use crate::calendar::{
    self, date_from_iso_week, days_in_month, days_in_year, iso_week, month_and_day_of_month,
    weeks_in_year,
};
use crate::{DateTimeError, LocalClock, Offset, ParseError, Time};

/// Number of significant fraction digits kept; enough for a microsecond
/// resolution of a fraction of an hour.
const FRACTION_DIGITS: u32 = 12;

/// A date as written, before range checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawDate {
    Calendar { year: i64, month: u8, day: u8 },
    Ordinal { year: i64, day: u16 },
    Week { year: i64, week: u8, weekday: u8 },
}

/// The field a decimal fraction applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Precision {
    Hour,
    Minute,
    Second,
}

/// A time of day as written, before range checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawTime {
    hour: u8,
    minute: u8,
    second: u8,
    precision: Precision,
    /// Significant fraction digits as an integer, and their count.
    fraction: (u64, u32),
}

impl RawTime {
    const MIDNIGHT: Self = Self {
        hour: 0,
        minute: 0,
        second: 0,
        precision: Precision::Hour,
        fraction: (0, 0),
    };
}

/// A UTC offset as written, before range checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawOffset {
    Local,
    Utc,
    Numeric {
        negative: bool,
        hours: u8,
        minutes: u8,
    },
}

/// A byte cursor over the input.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn bump(&mut self, count: usize) {
        self.pos = (self.pos + count).min(self.bytes.len());
    }

    /// Consumes the byte if it is the next one.
    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.bump(1);
            return true;
        }

        false
    }

    /// Counts the digits starting `offset` bytes ahead.
    fn digit_run_at(&self, offset: usize) -> usize {
        self.bytes
            .get(self.pos + offset..)
            .map(|rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
            .unwrap_or(0)
    }

    fn digit_run(&self) -> usize {
        self.digit_run_at(0)
    }

    /// Consumes exactly `width` digits (at most 4) and returns their value.
    fn take_digits(&mut self, width: usize) -> Result<u16, ParseError> {
        let run = self.digit_run();
        if run == 0 {
            return Err(self.unexpected());
        }
        if run < width {
            return Err(ParseError::InvalidFieldWidth);
        }

        let value = self.bytes[self.pos..self.pos + width]
            .iter()
            .fold(0u16, |acc, b| acc * 10 + (b - b'0') as u16);
        self.bump(width);

        Ok(value)
    }

    /// Consumes `width` digits of a signed year, saturating on overflow.
    fn take_year(&mut self, width: usize, negative: bool) -> i64 {
        let value = self.bytes[self.pos..self.pos + width]
            .iter()
            .fold(0i64, |acc, b| {
                acc.saturating_mul(10).saturating_add((b - b'0') as i64)
            });
        self.bump(width);

        if negative {
            -value
        } else {
            value
        }
    }

    /// Returns the error for the current position.
    fn unexpected(&self) -> ParseError {
        if self.is_at_end() {
            ParseError::MissingField
        } else {
            ParseError::UnexpectedCharacter(self.pos)
        }
    }
}

pub(crate) fn parse<C>(text: &str, clock: &C) -> Result<Time, ParseError>
where
    C: LocalClock + ?Sized,
{
    let mut cursor = Cursor::new(text);

    // Syntax.
    let date = parse_date(&mut cursor, clock)?;
    let time = match cursor.peek() {
        Some(b'T' | b't') => {
            cursor.bump(1);
            parse_time(&mut cursor)?
        }
        Some(b) if b.is_ascii_digit() => parse_time(&mut cursor)?,
        _ => RawTime::MIDNIGHT,
    };
    let offset = parse_offset(&mut cursor)?;
    if !cursor.is_at_end() {
        return Err(cursor.unexpected());
    }

    // Ranges.
    let (year, month, day) = resolve_date(date)?;
    let (hour, minute, second, usecond) = resolve_time(time)?;
    let offset = resolve_offset(offset)?;

    Ok(Time {
        year,
        month,
        day,
        hour,
        minute,
        second,
        usecond,
        offset,
    })
}

fn parse_date<C>(cursor: &mut Cursor<'_>, clock: &C) -> Result<RawDate, ParseError>
where
    C: LocalClock + ?Sized,
{
    match cursor.peek() {
        Some(b'-') if matches!(cursor.peek_at(1), Some(b'-' | b'W')) => {
            parse_truncated(cursor, clock)
        }
        Some(sign @ (b'+' | b'-')) => {
            let run = cursor.digit_run_at(1);
            if sign == b'-' && (run == 2 || run == 3) {
                return parse_truncated(cursor, clock);
            }
            cursor.bump(1);
            if run == 0 {
                return Err(cursor.unexpected());
            }
            if run < 4 {
                return Err(ParseError::InvalidFieldWidth);
            }

            // A long year followed by an extended day ends with a basic month.
            let negative = sign == b'-';
            if run >= 6
                && cursor.peek_at(run) == Some(b'-')
                && cursor.peek_at(run + 1).map_or(false, |b| b.is_ascii_digit())
            {
                let year = cursor.take_year(run - 2, negative);
                let month = cursor.take_digits(2)? as u8;
                return parse_day_after_month(cursor, year, month);
            }

            let year = cursor.take_year(run, negative);
            parse_after_year(cursor, year)
        }
        Some(b) if b.is_ascii_digit() => {
            if cursor.digit_run() < 4 {
                return Err(ParseError::InvalidFieldWidth);
            }
            let year = cursor.take_year(4, false);
            parse_after_year(cursor, year)
        }
        _ => Err(cursor.unexpected()),
    }
}

/// Parses whatever follows a complete year.
fn parse_after_year(cursor: &mut Cursor<'_>, year: i64) -> Result<RawDate, ParseError> {
    match (cursor.peek(), cursor.peek_at(1)) {
        (Some(b'W'), _) => {
            cursor.bump(1);
            parse_week(cursor, year)
        }
        (Some(b'-'), Some(b'W')) => {
            cursor.bump(2);
            parse_week(cursor, year)
        }
        (Some(b'-'), Some(b)) if b.is_ascii_digit() => {
            cursor.bump(1);
            parse_date_digits(cursor, year)
        }
        (Some(b), _) if b.is_ascii_digit() => parse_date_digits(cursor, year),
        _ => Ok(RawDate::Calendar {
            year,
            month: 1,
            day: 1,
        }),
    }
}

/// Splits a digit run following a year into month, day or ordinal day.
///
/// Digits not consumed here are left for the time of day.
fn parse_date_digits(cursor: &mut Cursor<'_>, year: i64) -> Result<RawDate, ParseError> {
    match cursor.digit_run() {
        0 => Err(cursor.unexpected()),
        1 => Err(ParseError::InvalidFieldWidth),
        2 => {
            let month = cursor.take_digits(2)? as u8;
            parse_day_after_month(cursor, year, month)
        }
        run if run % 2 == 1 => {
            let day = cursor.take_digits(3)?;
            Ok(RawDate::Ordinal { year, day })
        }
        _ => {
            let month = cursor.take_digits(2)? as u8;
            let day = cursor.take_digits(2)? as u8;
            Ok(RawDate::Calendar { year, month, day })
        }
    }
}

/// Parses the optional extended day following a month.
fn parse_day_after_month(
    cursor: &mut Cursor<'_>,
    year: i64,
    month: u8,
) -> Result<RawDate, ParseError> {
    let mut day = 1;
    if cursor.peek() == Some(b'-') && cursor.digit_run_at(1) > 0 {
        cursor.bump(1);
        day = cursor.take_digits(2)? as u8;
    }

    Ok(RawDate::Calendar { year, month, day })
}

/// Parses a week and optional weekday, the `W` being already consumed.
fn parse_week(cursor: &mut Cursor<'_>, year: i64) -> Result<RawDate, ParseError> {
    let week = cursor.take_digits(2)? as u8;

    // Only an odd digit run carries a weekday: an even one is the time of day,
    // or the hours of an offset when introduced by a dash.
    let mut weekday = 1;
    if cursor.peek() == Some(b'-') && cursor.digit_run_at(1) % 2 == 1 {
        cursor.bump(1);
        weekday = cursor.take_digits(1)? as u8;
    } else if cursor.digit_run() % 2 == 1 {
        weekday = cursor.take_digits(1)? as u8;
    }

    Ok(RawDate::Week {
        year,
        week,
        weekday,
    })
}

/// Parses a representation with omitted high-order fields, completing it from
/// the clock's current local date.
///
/// Supported forms: `-YY[-MM[-DD]]`, `-YY[-]DDD`, `-YY[-]Www[-D]`,
/// `--MM[[-]DD]`, `---DD`, `-DDD`, `-Www[[-]D]` and `-W-D`.
fn parse_truncated<C>(cursor: &mut Cursor<'_>, clock: &C) -> Result<RawDate, ParseError>
where
    C: LocalClock + ?Sized,
{
    cursor.bump(1);

    match (cursor.peek(), cursor.peek_at(1)) {
        (Some(b'-'), Some(b'-')) => {
            cursor.bump(2);
            let day = cursor.take_digits(2)? as u8;
            let now = clock_now(clock)?;

            Ok(RawDate::Calendar {
                year: now.year as i64,
                month: now.month,
                day,
            })
        }
        (Some(b'-'), _) => {
            cursor.bump(1);
            let month = cursor.take_digits(2)? as u8;
            let year = clock_now(clock)?.year as i64;
            if cursor.digit_run() >= 2 {
                let day = cursor.take_digits(2)? as u8;
                return Ok(RawDate::Calendar { year, month, day });
            }

            parse_day_after_month(cursor, year, month)
        }
        (Some(b'W'), Some(b'-')) => {
            cursor.bump(2);
            let weekday = cursor.take_digits(1)? as u8;
            let (year, week) = clock_week(clock)?;

            Ok(RawDate::Week {
                year: year as i64,
                week,
                weekday,
            })
        }
        (Some(b'W'), _) => {
            cursor.bump(1);
            let (year, _) = clock_week(clock)?;
            parse_week(cursor, year as i64)
        }
        _ => match cursor.digit_run() {
            3 => {
                let day = cursor.take_digits(3)?;
                Ok(RawDate::Ordinal {
                    year: clock_now(clock)?.year as i64,
                    day,
                })
            }
            _ => {
                let yy = cursor.take_digits(2)? as i64;
                let now = clock_now(clock)?.year as i64;
                parse_after_year(cursor, now - now.rem_euclid(100) + yy)
            }
        },
    }
}

/// Reads the clock, rejecting an invalid date-time.
fn clock_now<C>(clock: &C) -> Result<Time, ParseError>
where
    C: LocalClock + ?Sized,
{
    let now = clock.now();
    ensure!(now.validate());

    Ok(now)
}

/// Reads the clock's current ISO week-numbering year and week.
fn clock_week<C>(clock: &C) -> Result<(i32, u8), ParseError>
where
    C: LocalClock + ?Sized,
{
    let now = clock_now(clock)?;
    let (year, week, _) =
        iso_week(now.year, now.month, now.day).ok_or(DateTimeError::OutOfRange)?;

    Ok((year, week))
}

/// Parses `hh[[:]mm[[:]ss]]` with an optional decimal fraction on the last
/// field.
fn parse_time(cursor: &mut Cursor<'_>) -> Result<RawTime, ParseError> {
    let mut time = RawTime {
        hour: cursor.take_digits(2)? as u8,
        ..RawTime::MIDNIGHT
    };

    for precision in [Precision::Minute, Precision::Second] {
        if cursor.peek() == Some(b':') {
            cursor.bump(1);
        } else if cursor.digit_run() == 0 {
            break;
        }
        let value = cursor.take_digits(2)? as u8;
        match precision {
            Precision::Minute => time.minute = value,
            _ => time.second = value,
        }
        time.precision = precision;
    }
    if cursor.digit_run() > 0 {
        return Err(cursor.unexpected());
    }

    if matches!(cursor.peek(), Some(b'.' | b',')) {
        cursor.bump(1);
        let run = cursor.digit_run();
        if run == 0 {
            return Err(cursor.unexpected());
        }

        let mut value = 0u64;
        let mut digits = 0u32;
        for &b in &cursor.bytes[cursor.pos..cursor.pos + run] {
            if digits == FRACTION_DIGITS {
                break;
            }
            value = value * 10 + (b - b'0') as u64;
            digits += 1;
        }
        cursor.bump(run);
        time.fraction = (value, digits);
    }

    Ok(time)
}

/// Parses `Z`, `±hh`, `±hh:mm` or `±hhmm`, or nothing.
fn parse_offset(cursor: &mut Cursor<'_>) -> Result<RawOffset, ParseError> {
    match cursor.peek() {
        None => Ok(RawOffset::Local),
        Some(b'Z' | b'z') => {
            cursor.bump(1);
            Ok(RawOffset::Utc)
        }
        Some(sign @ (b'+' | b'-')) => {
            cursor.bump(1);
            let hours = cursor.take_digits(2)? as u8;
            let minutes = if cursor.eat(b':') || cursor.digit_run() > 0 {
                cursor.take_digits(2)? as u8
            } else {
                0
            };

            Ok(RawOffset::Numeric {
                negative: sign == b'-',
                hours,
                minutes,
            })
        }
        Some(_) => Err(cursor.unexpected()),
    }
}

fn resolve_date(date: RawDate) -> Result<(i32, u8, u8), ParseError> {
    match date {
        RawDate::Calendar { year, month, day } => {
            let year = to_year(year)?;
            ensure!((1..=12).contains(&month), DateTimeError::InvalidMonth(month));
            ensure!(
                day >= 1 && day <= days_in_month(year, month),
                DateTimeError::InvalidDayOfMonth(day)
            );

            Ok((year, month, day))
        }
        RawDate::Ordinal { year, day } => {
            let year = to_year(year)?;
            ensure!(
                day >= 1 && day <= days_in_year(year),
                DateTimeError::InvalidDayOfYear(day)
            );
            let (month, day) = month_and_day_of_month(year, day);

            Ok((year, month, day))
        }
        RawDate::Week {
            year,
            week,
            weekday,
        } => {
            // A week date may fall in the previous or next calendar year.
            let year = to_year(year)?;
            ensure!(
                year > i32::MIN && year < i32::MAX,
                DateTimeError::OutOfRange
            );
            ensure!(
                week >= 1 && week <= weeks_in_year(year),
                DateTimeError::InvalidWeek(week)
            );
            ensure!(
                (1..=7).contains(&weekday),
                DateTimeError::InvalidWeekday(weekday)
            );

            Ok(date_from_iso_week(year, week, weekday))
        }
    }
}

fn to_year(year: i64) -> Result<i32, ParseError> {
    i32::try_from(year).map_err(|_| DateTimeError::OutOfRange.into())
}

/// Spreads the fraction of the last field over the lower fields and checks
/// the result.
fn resolve_time(time: RawTime) -> Result<(u8, u8, u8, u32), ParseError> {
    let unit: u128 = match time.precision {
        Precision::Hour => 3_600_000_000,
        Precision::Minute => 60_000_000,
        Precision::Second => 1_000_000,
    };
    let (value, digits) = time.fraction;
    let useconds = (value as u128 * unit / 10u128.pow(digits)) as u64;

    let (mut minute, mut second) = (time.minute as u64, time.second as u64);
    let usecond = useconds % 1_000_000;
    match time.precision {
        Precision::Hour => {
            minute = useconds / 60_000_000;
            second = useconds / 1_000_000 % 60;
        }
        Precision::Minute => second = useconds / 1_000_000,
        Precision::Second => {}
    }
    let (minute, second, usecond) = (minute as u8, second as u8, usecond as u32);

    ensure!(calendar::validate_time_of_day(time.hour, minute, second, usecond));

    Ok((time.hour, minute, second, usecond))
}

fn resolve_offset(offset: RawOffset) -> Result<Offset, ParseError> {
    match offset {
        RawOffset::Local => Ok(Offset::Local),
        RawOffset::Utc => Ok(Offset::Utc),
        RawOffset::Numeric {
            negative,
            hours,
            minutes,
        } => {
            let total = hours as i16 * 60 + minutes as i16;
            let total = if negative { -total } else { total };
            ensure!(
                hours < 24 && minutes < 60 && minutes % 15 == 0,
                DateTimeError::InvalidOffset(total)
            );

            Ok(Offset::Minutes(total))
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::format;
    use std::string::{String, ToString};
    use std::vec::Vec;

    use proptest::prelude::*;

    use super::*;
    use crate::FixedClock;

    const MINUTES: i64 = 60;
    const HOURS: i64 = 60 * MINUTES;
    const DAYS: i64 = 24 * HOURS;
    const WEEKS: i64 = 7 * DAYS;

    fn clock() -> FixedClock {
        FixedClock::new(Time::new(1989, 6, 15).unwrap())
    }

    fn parse_str(text: &str) -> Result<Time, ParseError> {
        Time::parse_with_clock(text, &clock())
    }

    fn epoch(text: &str) -> i64 {
        parse_str(text)
            .unwrap_or_else(|e| panic!("failed to parse '{}': {}", text, e))
            .to_epoch_seconds()
            .unwrap()
    }

    /// A parse case: the input and the expected epoch value, `None` standing
    /// for an expected failure.
    struct Case {
        text: String,
        expected: Option<i64>,
        /// Only the extended and basic-with-`T` forms are valid.
        keep_t: bool,
    }

    #[derive(Default)]
    struct Cases(Vec<Case>);

    impl Cases {
        fn one(&mut self, text: &str, expected: Option<i64>) {
            self.0.push(Case {
                text: text.to_string(),
                expected,
                keep_t: false,
            });
        }

        fn gmt(&mut self, text: &str, val: Option<i64>) {
            self.one(text, val);
            self.one(&format!("{}Z", text), val);
        }

        fn zoned(&mut self, text: &str, val: Option<i64>) {
            self.gmt(text, val);
            self.one(&format!("{}+06", text), val.map(|v| v - 6 * HOURS));
            self.one(&format!("{}+06:30", text), val.map(|v| v - 6 * HOURS - 30 * MINUTES));
            self.one(&format!("{}-06", text), val.map(|v| v + 6 * HOURS));
            self.one(&format!("{}-06:30", text), val.map(|v| v + 6 * HOURS + 30 * MINUTES));
        }

        fn fraction(&mut self, text: &str, half: i64, val: Option<i64>) {
            self.zoned(text, val);
            self.zoned(&format!("{}.5", text), val.map(|v| v + half));
        }

        fn date(&mut self, text: &str, val: Option<i64>) {
            let at = |secs: i64| val.map(|v| v + secs);

            self.zoned(text, val);
            self.fraction(&format!("{}T09", text), 1800, at(9 * HOURS));
            self.fraction(&format!("{}T22", text), 1800, at(22 * HOURS));
            self.fraction(&format!("{}T09:28", text), 30, at(9 * HOURS + 28 * MINUTES));
            self.fraction(&format!("{}T22:59", text), 30, at(22 * HOURS + 59 * MINUTES));
            self.fraction(&format!("{}T09:28:12", text), 0, at(9 * HOURS + 28 * MINUTES + 12));
            self.fraction(&format!("{}T22:59:32", text), 0, at(22 * HOURS + 59 * MINUTES + 32));
        }

        fn weekdate(&mut self, year: &str, val: i64) {
            self.date(&format!("{}-W01", year), Some(val));
            self.date(&format!("{}-W01-1", year), Some(val));
            self.date(&format!("{}-W01-4", year), Some(val + 3 * DAYS));
            self.date(&format!("{}-W32", year), Some(val + 31 * WEEKS));
            self.date(&format!("{}-W32-1", year), Some(val + 31 * WEEKS));
            self.date(&format!("{}-W32-4", year), Some(val + 31 * WEEKS + 3 * DAYS));
        }

        fn keep_t(&mut self, text: &str, val: i64) {
            self.0.push(Case {
                text: text.to_string(),
                expected: Some(val),
                keep_t: true,
            });
        }
    }

    /// Rewrites an extended representation in basic format, keeping `T`.
    ///
    /// Dashes are only removed from the first 7 output characters, except
    /// the dash following a week which is removed when followed by an odd
    /// number of digits (a weekday, possibly followed by a basic time).
    fn basic_with_t(text: &str) -> String {
        let src = text.as_bytes();
        let start = usize::from(matches!(src.first(), Some(b'+' | b'-')));
        let mut out: Vec<u8> = src[..start].to_vec();

        for (i, &c) in src.iter().enumerate().skip(start) {
            let j = out.len();
            match c {
                b':' => continue,
                b'-' => {
                    if j == 7 && out.get(4) == Some(&b'W') {
                        let digits = src[i + 1..]
                            .iter()
                            .take_while(|b| b.is_ascii_digit())
                            .count();
                        if digits % 2 == 1 {
                            continue;
                        }
                    }
                    if j < 7 {
                        continue;
                    }
                }
                _ => {}
            }
            out.push(c);
        }

        String::from_utf8(out).unwrap()
    }

    /// Removes the time designator from a basic representation.
    fn basic_without_t(text: &str) -> String {
        let start = usize::from(text.starts_with(['+', '-']));
        let (sign, rest) = text.split_at(start);

        sign.chars().chain(rest.chars().filter(|&c| c != 'T')).collect()
    }

    /// Expected values are UTC epoch seconds of the written local time; a
    /// time without offset is taken as UTC.
    fn reference_cases() -> Vec<Case> {
        let mut cases = Cases::default();

        // Year only.
        cases.gmt("1965", Some(-157_766_400));
        cases.gmt("1989", Some(599_616_000));

        // Year and month.
        cases.gmt("1965-02", Some(-155_088_000));
        cases.gmt("1989-02", Some(602_294_400));

        // Full dates before and after the epoch.
        cases.date("1965-02-12", Some(-154_137_600));
        cases.date("1965-234", Some(-137_635_200));
        cases.date("1989-02-12", Some(603_244_800));
        cases.date("1989-234", Some(619_747_200));

        // Week dates, with week 1 starting in the current or previous year.
        cases.weekdate("1965", -157_507_200);
        cases.weekdate("1963", -221_011_200);
        cases.weekdate("1989", 599_702_400);
        cases.weekdate("1985", 473_299_200);

        // Extended years.
        cases.date("-0001-01-01", Some(-62_198_755_200));
        cases.weekdate("-0001", -62_198_496_000);
        cases.date("+9999-01-01", Some(253_370_764_800));
        cases.weekdate("+9999", 253_371_024_000);
        cases.date("+1971-01-01", Some(31_536_000));
        cases.weekdate("+1971", 31_795_200);

        // Midnight at the end and at the start of the day.
        cases.one("2000-01-01T00:00:00Z", Some(946_684_800));
        cases.one("1999-12-31T24:00:00Z", Some(946_684_800));

        // Reduced precision dates followed by a time.
        cases.keep_t("2000T00:00:00Z", 946_684_800);
        cases.keep_t("2000-01T00:00:00Z", 946_684_800);
        cases.keep_t("1965T00:00:00Z", -157_766_400);
        cases.keep_t("1965-01T00:00:00Z", -157_766_400);

        // Leap second.
        cases.one("2000-06-30T23:59:59Z", Some(962_409_599));
        cases.one("2000-06-30T23:59:60Z", Some(962_409_600));

        // Invalid dates and times.
        cases.gmt("2000-00", None);
        cases.gmt("2000-13", None);
        cases.date("2000-01-00", None);
        cases.date("2000-01-32", None);
        cases.date("2012-04-31", None);
        cases.fraction("2000-01-01T25", 0, None);
        cases.zoned("2000-01-01T24.05", None);
        cases.fraction("2000-01-01T24:01", 0, None);
        cases.fraction("2000-01-01T24:00:01", 0, None);
        cases.zoned("2000-01-01T24:00:00.1", None);
        cases.fraction("2000-01-01T00:60", 0, None);
        cases.fraction("2000-01-01T00:00:61", 0, None);
        cases.one("2000-01-01T00:00:00+25", None);
        cases.one("2000-01-01T00:00:00-25", None);
        cases.one("2000-01-01T00:00:00+00:60", None);
        cases.one("2000-01-01T00:00:00-00:60", None);

        // Leap day.
        cases.date("1989-02-29", None);
        cases.date("1988-02-29", Some(573_091_200));

        cases.0
    }

    #[test]
    fn reference_table() {
        for case in reference_cases() {
            let basic_t = basic_with_t(&case.text);
            let mut variants = Vec::from([case.text.clone(), basic_t.clone()]);
            if !case.keep_t {
                variants.push(basic_without_t(&basic_t));
            }
            variants.dedup();

            for text in &variants {
                let result = parse_str(text).map(|time| time.to_epoch_seconds().unwrap());
                match case.expected {
                    Some(expected) => assert_eq!(result, Ok(expected), "input: '{}'", text),
                    None => assert!(result.is_err(), "input '{}' should fail", text),
                }
            }
        }
    }

    #[test]
    fn basic_rewrites() {
        assert_eq!(basic_with_t("1965-02-12T09:28:12-06:30"), "19650212T092812-0630");
        assert_eq!(basic_with_t("1989-W01-1T09"), "1989W011T09");
        assert_eq!(basic_with_t("1989-W01-06:30"), "1989W01-0630");
        assert_eq!(basic_with_t("+1971-01-01"), "+197101-01");
        assert_eq!(basic_with_t("-0001-W01-1"), "-0001W01-1");
        assert_eq!(basic_without_t("1989W011T092812"), "1989W011092812");
        assert_eq!(basic_without_t("+197101-01T09"), "+197101-0109");
    }

    #[test]
    fn fields() {
        let time = parse_str("1989-02-12T09:28:12.123456789+06:30").unwrap();

        assert_eq!(
            time,
            Time {
                year: 1989,
                month: 2,
                day: 12,
                hour: 9,
                minute: 28,
                second: 12,
                usecond: 123_456,
                offset: Offset::Minutes(390),
            }
        );
    }

    #[test]
    fn fractions() {
        let time = parse_str("2000-01-01T09,25").unwrap();
        assert_eq!((time.hour, time.minute, time.second), (9, 15, 0));

        let time = parse_str("2000-01-01T09:28.0001").unwrap();
        assert_eq!((time.minute, time.second, time.usecond), (28, 0, 6_000));

        let time = parse_str("2000-01-01T23:59:60.999999999Z").unwrap();
        assert_eq!((time.second, time.usecond), (60, 999_999));

        let time = parse_str("2000-01-01T24.0").unwrap();
        assert_eq!((time.hour, time.minute), (24, 0));
    }

    #[test]
    fn offsets() {
        assert_eq!(parse_str("2000-01-01T00Z").unwrap().offset, Offset::Utc);
        assert_eq!(parse_str("2000-01-01T00").unwrap().offset, Offset::Local);
        assert_eq!(
            parse_str("2000-01-01T00-0545").unwrap().offset,
            Offset::Minutes(-345)
        );
        assert_eq!(
            parse_str("2000-01-01T00+23:45").unwrap().offset,
            Offset::Minutes(1425)
        );
        assert_eq!(
            parse_str("2000-01-01T00+24"),
            Err(ParseError::RangeError(DateTimeError::InvalidOffset(1440)))
        );
        assert_eq!(
            parse_str("2000-01-01T00+01:10"),
            Err(ParseError::RangeError(DateTimeError::InvalidOffset(70)))
        );
    }

    #[test]
    fn range_errors() {
        for (text, err) in [
            ("1989-02-29", DateTimeError::InvalidDayOfMonth(29)),
            ("2000-13", DateTimeError::InvalidMonth(13)),
            ("1989-366", DateTimeError::InvalidDayOfYear(366)),
            ("1989-000", DateTimeError::InvalidDayOfYear(0)),
            ("1989-W53", DateTimeError::InvalidWeek(53)),
            ("1989-W00", DateTimeError::InvalidWeek(0)),
            ("1989-W01-8", DateTimeError::InvalidWeekday(8)),
            ("2000-01-01T25", DateTimeError::InvalidHour(25)),
            ("2000-01-01T24:00:00.1", DateTimeError::InvalidHour(24)),
            ("2000-01-01T00:60", DateTimeError::InvalidMinute(60)),
            ("2000-01-01T23:58:60", DateTimeError::InvalidSecond(60)),
            ("+99999999999", DateTimeError::OutOfRange),
        ] {
            let result = parse_str(text);
            assert_eq!(result, Err(ParseError::RangeError(err)), "input: '{}'", text);
            assert!(!result.unwrap_err().is_syntax_error());
        }

        // Leap years accept their extra day.
        assert!(parse_str("1988-366").is_ok());
        assert!(parse_str("2004-W53-7").is_ok());
    }

    #[test]
    fn syntax_errors() {
        for (text, err) in [
            ("", ParseError::MissingField),
            ("19", ParseError::InvalidFieldWidth),
            ("1989-", ParseError::MissingField),
            ("1989-1", ParseError::InvalidFieldWidth),
            ("1989-02-12T", ParseError::MissingField),
            ("1989-02-12T9", ParseError::InvalidFieldWidth),
            ("1989-02-12T09:", ParseError::MissingField),
            ("1989-02-12T09:28:12:00", ParseError::UnexpectedCharacter(19)),
            ("1989-02-12T0928123", ParseError::UnexpectedCharacter(17)),
            ("1989-02-12T09.", ParseError::MissingField),
            ("1989-02-12T09Zjunk", ParseError::UnexpectedCharacter(14)),
            ("1989-02-12 09:28", ParseError::UnexpectedCharacter(10)),
            ("+123-01-01", ParseError::InvalidFieldWidth),
            ("1989-W1", ParseError::InvalidFieldWidth),
            ("1989-02-12+6", ParseError::InvalidFieldWidth),
            ("x", ParseError::UnexpectedCharacter(0)),
        ] {
            let result = parse_str(text);
            assert_eq!(result, Err(err), "input: '{}'", text);
            assert!(result.unwrap_err().is_syntax_error());
        }
    }

    #[test]
    fn syntax_checked_before_ranges() {
        assert!(parse_str("2000-13-01Tjunk").unwrap_err().is_syntax_error());
        assert!(parse_str("2000-01-01T25:00+99junk").unwrap_err().is_syntax_error());
    }

    #[test]
    fn truncated() {
        // The clock is stopped at 1989-06-15, a Thursday of week 24.
        let date = |text: &str| {
            let time = parse_str(text).unwrap_or_else(|e| panic!("'{}': {}", text, e));
            (time.year, time.month, time.day)
        };

        assert_eq!(date("-65"), (1965, 1, 1));
        assert_eq!(date("-65-02"), (1965, 2, 1));
        assert_eq!(date("-65-02-12"), (1965, 2, 12));
        assert_eq!(date("-65-234"), (1965, 8, 22));
        assert_eq!(date("-65W011"), (1965, 1, 4));
        assert_eq!(date("-65-W01-4"), (1965, 1, 7));
        assert_eq!(date("--02-12"), (1989, 2, 12));
        assert_eq!(date("--0212"), (1989, 2, 12));
        assert_eq!(date("--02"), (1989, 2, 1));
        assert_eq!(date("---12"), (1989, 6, 12));
        assert_eq!(date("-234"), (1989, 8, 22));
        assert_eq!(date("-W32-4"), (1989, 8, 10));
        assert_eq!(date("-W324"), (1989, 8, 10));
        assert_eq!(date("-W32"), (1989, 8, 7));
        assert_eq!(date("-W-1"), (1989, 6, 12));

        let time = parse_str("--02-12T09:28Z").unwrap();
        assert_eq!((time.hour, time.minute), (9, 28));
        assert_eq!(time.offset, Offset::Utc);

        assert_eq!(
            parse_str("--02-30"),
            Err(ParseError::RangeError(DateTimeError::InvalidDayOfMonth(30)))
        );
    }

    #[test]
    fn truncated_week_year() {
        // 2005-01-01 belongs to week 53 of 2004.
        let clock = FixedClock::new(Time::new(2005, 1, 1).unwrap());
        let time = Time::parse_with_clock("-W-1", &clock).unwrap();

        assert_eq!((time.year, time.month, time.day), (2004, 12, 27));
    }

    #[test]
    fn invalid_clock() {
        let mut now = Time::new(1989, 6, 15).unwrap();
        now.month = 0;
        let clock = FixedClock::new(now);

        for text in ["-W-1", "-W32", "---12", "--02-12", "-89", "-163"] {
            assert_eq!(
                Time::parse_with_clock(text, &clock),
                Err(ParseError::RangeError(DateTimeError::InvalidMonth(0))),
                "{}",
                text
            );
        }

        let clock = FixedClock::new(Time::new(i32::MAX, 12, 31).unwrap());
        assert_eq!(
            Time::parse_with_clock("-W-1", &clock),
            Err(ParseError::RangeError(DateTimeError::OutOfRange))
        );
        assert_eq!(
            Time::parse_with_clock("---12", &clock).map(|time| time.day),
            Ok(12)
        );
    }

    #[test]
    fn clock_only_consulted_for_truncated() {
        struct PanicClock;

        impl LocalClock for PanicClock {
            fn now(&self) -> Time {
                panic!("clock consulted");
            }
        }

        assert!(Time::parse_with_clock("1989-W32-4T09:28:12.5-06:30", &PanicClock).is_ok());
        assert!(Time::parse_with_clock("-0001-01-01", &PanicClock).is_ok());
        assert!(Time::parse_with_clock("junk", &PanicClock).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(10_000))]

        #[test]
        fn prop_arbitrary_input_never_panics(text in "[0-9TZW:+.,-]{0,64}") {
            if let Ok(time) = parse_str(&text) {
                prop_assert!(time.validate().is_ok());
            }
        }

        #[test]
        fn prop_long_digit_runs_are_bounded(
            sign in "[+-]?",
            run in "[0-9]{0,200}",
            tail in "[0-9TZW:+.,-]{0,16}",
        ) {
            let text = format!("{}{}{}", sign, run, tail);
            let _ = parse_str(&text);
        }

        #[test]
        fn prop_valid_dates_are_accepted(
            year in 1i32..=9999,
            month in 1u8..=12,
            day in 1u8..=28,
            hour in 0u8..=23,
            minute in 0u8..=59,
            second in 0u8..=59,
        ) {
            let text = format!(
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
                year, month, day, hour, minute, second
            );
            let time = parse_str(&text).unwrap();

            prop_assert_eq!(
                (time.year, time.month, time.day, time.hour, time.minute, time.second),
                (year, month, day, hour, minute, second)
            );
        }
    }
}
