//! Error types.

use core::fmt;

use crate::{Format, Truncate};

/// The error type returned when a conversion from an epoch timestamp yields a
/// year outside the representable range.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRangeError(pub(crate) ());

impl fmt::Display for OutOfRangeError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str("timestamp out of representable range")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for OutOfRangeError {}

/// The error type returned when date-time components are out of range.
///
/// Each variant carries the offending value as it was supplied.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DateTimeError {
    /// The month is not between 1 and 12.
    InvalidMonth(u8),
    /// The day of the month is less than 1, or more than the maximum value for
    /// this combination of year and month.
    InvalidDayOfMonth(u8),
    /// The day of the year is less than 1, or more than the number of days in
    /// the year.
    InvalidDayOfYear(u16),
    /// The week is less than 1, or more than the number of ISO weeks in the
    /// week-numbering year.
    InvalidWeek(u8),
    /// The day of the week is not between 1 (Monday) and 7 (Sunday).
    InvalidWeekday(u8),
    /// The hour is more than 24, or is 24 with non-zero lower fields.
    InvalidHour(u8),
    /// The minute is more than 59.
    InvalidMinute(u8),
    /// The second is more than 59, or is 60 anywhere but at 23:59.
    InvalidSecond(u8),
    /// The microsecond value is more than 999 999.
    InvalidUsecond(u32),
    /// The UTC offset in minutes is not strictly within ±24h or its minute
    /// component is not a quarter of an hour.
    InvalidOffset(i16),
    /// The value cannot be represented, e.g. the year overflows.
    OutOfRange,
}

impl fmt::Display for DateTimeError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMonth(month) => write!(fmt, "month numeral '{}' is not valid", month),
            Self::InvalidDayOfMonth(day) => {
                write!(fmt, "day of month '{}' is not valid for this date", day)
            }
            Self::InvalidDayOfYear(day) => {
                write!(fmt, "day of year '{}' is not valid for this year", day)
            }
            Self::InvalidWeek(week) => write!(fmt, "week '{}' is not valid for this year", week),
            Self::InvalidWeekday(day) => write!(fmt, "weekday numeral '{}' is not valid", day),
            Self::InvalidHour(hour) => write!(fmt, "hour numeral '{}' is not valid", hour),
            Self::InvalidMinute(min) => write!(fmt, "minute numeral '{}' is not valid", min),
            Self::InvalidSecond(sec) => write!(fmt, "second numeral '{}' is not valid", sec),
            Self::InvalidUsecond(usec) => {
                write!(fmt, "microsecond value '{}' is not valid", usec)
            }
            Self::InvalidOffset(offset) => {
                write!(fmt, "UTC offset of {} minutes is not valid", offset)
            }
            Self::OutOfRange => fmt.write_str("date-time outside representable range"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DateTimeError {}

/// The error type returned when an ISO 8601 string cannot be parsed.
///
/// All variants but [`RangeError`](ParseError::RangeError) report malformed
/// syntax.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// A character that no grammar rule accepts was found at this byte
    /// position.
    UnexpectedCharacter(usize),
    /// The width of a fixed-width or minimum-width field is invalid.
    InvalidFieldWidth,
    /// A field is missing.
    MissingField,
    /// A field was recognized but its value is out of range.
    RangeError(DateTimeError),
}

impl ParseError {
    /// Returns `true` if no recognized grammar matches the input, and `false`
    /// if a recognized field is numerically invalid.
    pub const fn is_syntax_error(&self) -> bool {
        !matches!(self, Self::RangeError(_))
    }
}

impl From<DateTimeError> for ParseError {
    fn from(err: DateTimeError) -> Self {
        Self::RangeError(err)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedCharacter(pos) => write!(fmt, "unexpected character at position {}", pos),
            Self::InvalidFieldWidth => fmt.write_str("the width of one of the fields is invalid"),
            Self::MissingField => fmt.write_str("a field is missing"),
            Self::RangeError(err) => fmt::Display::fmt(err, fmt),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

/// The error type returned when a date-time cannot be rendered.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UnparseError {
    /// No output space was provided at all.
    InvalidArgument,
    /// The truncation level does not exist for the selected format.
    InvalidConfiguration(Format, Truncate),
    /// The output buffer is shorter than the required length, which includes
    /// the terminating NUL.
    InsufficientSpace {
        /// Exact number of bytes needed.
        required: usize,
    },
    /// The date-time value does not satisfy its invariants.
    InvalidValue(DateTimeError),
}

impl fmt::Display for UnparseError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => fmt.write_str("no output buffer was provided"),
            Self::InvalidConfiguration(format, truncate) => write!(
                fmt,
                "truncation {:?} is not supported by the {:?} format",
                truncate, format
            ),
            Self::InsufficientSpace { required } => {
                write!(fmt, "output buffer too small, {} bytes required", required)
            }
            Self::InvalidValue(err) => fmt::Display::fmt(err, fmt),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnparseError {}
