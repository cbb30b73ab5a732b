//! ISO 8601 formatter.

use core::fmt::{self, Write};

use crate::{DateTimeError, Offset, Time, UnparseError};

/// Representation of the date portion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Format {
    /// Calendar date, e.g. `2000-03-03`.
    Normal,
    /// Ordinal date, e.g. `2000-063`.
    Ordinal,
    /// Week date in the ISO week-numbering year, e.g. `2000-W09-5`.
    WeekDate,
}

/// The coarsest field still rendered.
///
/// Truncating to [`Day`](Truncate::Day) or coarser omits the time of day and
/// the UTC offset altogether.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Truncate {
    /// Render everything down to microseconds.
    None,
    /// Render down to seconds.
    Second,
    /// Render down to minutes.
    Minute,
    /// Render down to hours.
    Hour,
    /// Render the full date.
    Day,
    /// Render the year and month (or week, for week dates).
    ///
    /// Not supported by [`Format::Ordinal`].
    Month,
    /// Render the year and day of the year.
    ///
    /// Only supported by [`Format::Ordinal`], where it is equivalent to
    /// [`Day`](Truncate::Day).
    Ordinal,
    /// Render the year alone.
    Year,
}

/// A configurable ISO 8601 formatter.
///
/// The default configuration renders extended calendar dates with a 4-digit
/// year, down to microseconds.
///
/// The exact output length is computed before anything is written, so that
/// formatting into a caller-provided buffer either succeeds completely or
/// leaves the buffer untouched.
///
/// # Examples
///
/// ```
/// use iso8601_time::{Format, Offset, Time, Truncate, Unparser};
///
/// let mut time = Time::new(2000, 3, 3).unwrap();
/// time.hour = 3;
/// time.offset = Offset::Minutes(90);
///
/// let unparser = Unparser::new().format(Format::WeekDate).truncate(Truncate::Hour);
/// let mut buf = [0u8; 20];
///
/// assert_eq!(unparser.required_len(&time), Ok(20));
/// assert_eq!(unparser.unparse(&time, &mut buf), Ok("2000-W09-5T03+01:30"));
/// assert_eq!(buf[19], 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Unparser {
    basic: bool,
    year_digits: u8,
    format: Format,
    truncate: Truncate,
}

impl Unparser {
    /// Creates a formatter with the default configuration.
    pub const fn new() -> Self {
        Self {
            basic: false,
            year_digits: 4,
            format: Format::Normal,
            truncate: Truncate::None,
        }
    }

    /// Selects the basic format (`20000303T030303Z`) rather than the extended
    /// one (`2000-03-03T03:03:03Z`).
    ///
    /// The basic format is ignored when the year is rendered with more than 4
    /// digits.
    pub const fn basic(self, yes: bool) -> Self {
        Self { basic: yes, ..self }
    }

    /// Sets the minimum number of year digits.
    ///
    /// Years are zero-padded to this width; years needing more digits are
    /// rendered in full. A width of more than 4 digits forces the extended
    /// format.
    pub const fn year_digits(self, digits: u8) -> Self {
        Self {
            year_digits: digits,
            ..self
        }
    }

    /// Sets the representation of the date.
    pub const fn format(self, format: Format) -> Self {
        Self { format, ..self }
    }

    /// Sets the coarsest rendered field.
    pub const fn truncate(self, truncate: Truncate) -> Self {
        Self { truncate, ..self }
    }

    /// Returns the exact number of bytes needed to format the date-time,
    /// including the terminating NUL written by [`unparse`](Self::unparse).
    pub fn required_len(&self, time: &Time) -> Result<usize, UnparseError> {
        self.check(time)?;

        let mut counter = Counter(0);
        // Counting never fails.
        let _ = self.write_to(time, &mut counter);

        Ok(counter.0 + 1)
    }

    /// Formats the date-time into the buffer, followed by a NUL byte, and
    /// returns the formatted text.
    ///
    /// An empty buffer is rejected with [`UnparseError::InvalidArgument`]. If
    /// the buffer is shorter than [`required_len`](Self::required_len), an
    /// [`UnparseError::InsufficientSpace`] error is returned and the buffer
    /// is left untouched.
    pub fn unparse<'a>(&self, time: &Time, buf: &'a mut [u8]) -> Result<&'a str, UnparseError> {
        if buf.is_empty() {
            return Err(UnparseError::InvalidArgument);
        }
        let required = self.required_len(time)?;
        if buf.len() < required {
            return Err(UnparseError::InsufficientSpace { required });
        }

        let len = required - 1;
        let mut writer = SliceWriter {
            buf: &mut buf[..len],
            pos: 0,
        };
        self.write_to(time, &mut writer)
            .map_err(|_| UnparseError::InsufficientSpace { required })?;
        buf[len] = 0;

        // Only ASCII is ever written.
        core::str::from_utf8(&buf[..len]).map_err(|_| UnparseError::InsufficientSpace { required })
    }

    /// Returns an adapter formatting the date-time with this configuration
    /// through [`fmt::Display`], without allocation.
    ///
    /// Formatting fails with [`fmt::Error`] if the configuration or the
    /// date-time is invalid.
    pub fn display<'a>(&self, time: &'a Time) -> Displayed<'a> {
        Displayed {
            unparser: *self,
            time,
        }
    }

    fn check(&self, time: &Time) -> Result<(), UnparseError> {
        let unsupported = matches!(
            (self.format, self.truncate),
            (Format::Normal, Truncate::Ordinal)
                | (Format::Ordinal, Truncate::Month)
                | (Format::WeekDate, Truncate::Ordinal)
        );
        ensure!(
            !unsupported,
            UnparseError::InvalidConfiguration(self.format, self.truncate)
        );
        ensure!(time.validate().map_err(UnparseError::InvalidValue));
        ensure!(
            self.format != Format::WeekDate || time.iso_week().is_some(),
            UnparseError::InvalidValue(DateTimeError::OutOfRange)
        );

        Ok(())
    }

    /// Writes the representation.
    ///
    /// Fields are written as they are, but ordinal and week dates expect a
    /// valid date. Besides writer errors, only a week date whose
    /// week-numbering year overflows makes it fail.
    pub(crate) fn write_to<W: Write>(&self, time: &Time, w: &mut W) -> fmt::Result {
        let (year, week, weekday) = match self.format {
            Format::WeekDate => time.iso_week().ok_or(fmt::Error)?,
            _ => (time.year, 0, 0),
        };
        // Fields cannot be told apart in basic format past 4 year digits.
        let extended = !self.basic || self.year_digits > 4 || year.unsigned_abs() > 9999;
        let sep = if extended { "-" } else { "" };
        if year < 0 {
            w.write_char('-')?;
        }
        write!(
            w,
            "{:0width$}",
            year.unsigned_abs(),
            width = self.year_digits as usize
        )?;
        if self.truncate == Truncate::Year {
            return Ok(());
        }

        match self.format {
            Format::Normal => {
                write!(w, "{}{:02}", sep, time.month)?;
                if self.truncate == Truncate::Month {
                    return Ok(());
                }
                write!(w, "{}{:02}", sep, time.day)?;
            }
            Format::Ordinal => write!(w, "{}{:03}", sep, time.day_of_year())?,
            Format::WeekDate => {
                write!(w, "{}W{:02}", sep, week)?;
                if self.truncate == Truncate::Month {
                    return Ok(());
                }
                write!(w, "{}{}", sep, weekday)?;
            }
        }
        if matches!(self.truncate, Truncate::Day | Truncate::Ordinal) {
            return Ok(());
        }

        let sep = if extended { ":" } else { "" };
        write!(w, "T{:02}", time.hour)?;
        if self.truncate != Truncate::Hour {
            write!(w, "{}{:02}", sep, time.minute)?;
            if self.truncate != Truncate::Minute {
                write!(w, "{}{:02}", sep, time.second)?;
                if self.truncate == Truncate::None {
                    write!(w, ".{:06}", time.usecond)?;
                }
            }
        }

        match time.offset {
            Offset::Local => Ok(()),
            Offset::Utc => w.write_char('Z'),
            Offset::Minutes(minutes) => {
                let sign = if minutes < 0 { '-' } else { '+' };
                let minutes = minutes.unsigned_abs();
                write!(w, "{}{:02}{}{:02}", sign, minutes / 60, sep, minutes % 60)
            }
        }
    }
}

impl Default for Unparser {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`Time`] formatted through [`fmt::Display`] by an [`Unparser`].
///
/// Created by [`Unparser::display`].
#[derive(Debug, Clone, Copy)]
pub struct Displayed<'a> {
    unparser: Unparser,
    time: &'a Time,
}

impl fmt::Display for Displayed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.unparser.check(self.time).map_err(|_| fmt::Error)?;

        self.unparser.write_to(self.time, f)
    }
}

/// A writer that only counts bytes.
struct Counter(usize);

impl Write for Counter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();

        Ok(())
    }
}

/// A writer into a fixed-size byte slice.
struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.pos + s.len();
        let dst = self.buf.get_mut(self.pos..end).ok_or(fmt::Error)?;
        dst.copy_from_slice(s.as_bytes());
        self.pos = end;

        Ok(())
    }
}
