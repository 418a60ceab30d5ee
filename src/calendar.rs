//! Civil calendar dates and their conversion into Julian Day Numbers.
//!
//! The propagator measures time in days. Every absolute date that enters
//! the engine goes through [`julian_day_number`] first.

use core::{fmt, str::FromStr};

use hifitime::Epoch;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::DateError;

/// A civil date and time of day in UTC, on the proleptic Gregorian calendar.
///
/// # Example
/// ```
/// use orrery_kepler::CalendarDate;
///
/// let date: CalendarDate = "2000-01-01T12:00:00".parse().unwrap();
/// assert_eq!(date.julian_day_number(), 2_451_545);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalendarDate {
    /// The year. Year 0 is 1 BC.
    pub year: i32,
    /// The month, from 1 to 12.
    pub month: u8,
    /// The day of the month, from 1 to 31.
    pub day: u8,
    /// The hour of the day, from 0 to 23.
    pub hour: u8,
    /// The minute, from 0 to 59.
    pub minute: u8,
    /// The second, from 0 to 60.
    pub second: u8,
}

/// How much of a date's time of day reaches the propagator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EpochPrecision {
    /// Only the calendar day counts; the time of day is dropped.
    ///
    /// Sub-day offsets of up to a day are absorbed into the body's phase
    /// and are not corrected. This keeps positions identical to the
    /// established visual calibration.
    #[default]
    Day,
    /// The time of day is kept as a fractional astronomical Julian Date.
    SubDay,
}

impl CalendarDate {
    /// Creates a date at midnight UTC.
    pub const fn new(year: i32, month: u8, day: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }

    /// Returns this date with the given time of day.
    pub const fn with_time(self, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            hour,
            minute,
            second,
            ..self
        }
    }

    /// Gets the Julian Day Number of this date.
    ///
    /// See [`julian_day_number`].
    pub fn julian_day_number(&self) -> i64 {
        julian_day_number(self)
    }

    /// Gets the epoch of this date as a day count, honouring the
    /// given precision.
    ///
    /// With [`EpochPrecision::Day`] this is exactly the Julian Day Number.
    /// With [`EpochPrecision::SubDay`] the time of day is added, counting
    /// from noon as astronomical Julian Dates do.
    ///
    /// # Example
    /// ```
    /// use orrery_kepler::{CalendarDate, EpochPrecision};
    ///
    /// let date = CalendarDate::new(2000, 1, 1).with_time(18, 0, 0);
    ///
    /// assert_eq!(date.epoch(EpochPrecision::Day), 2_451_545.0);
    /// assert_eq!(date.epoch(EpochPrecision::SubDay), 2_451_545.25);
    /// ```
    pub fn epoch(&self, precision: EpochPrecision) -> f64 {
        let jdn = self.julian_day_number() as f64;
        match precision {
            EpochPrecision::Day => jdn,
            EpochPrecision::SubDay => {
                jdn + (f64::from(self.hour) - 12.0) / 24.0
                    + f64::from(self.minute) / 1440.0
                    + f64::from(self.second) / 86400.0
            }
        }
    }

    /// Converts this date into a `hifitime` UTC epoch.
    ///
    /// # Errors
    /// Fails if the fields don't name a real instant, such as February 30
    /// or hour 25.
    pub fn to_epoch(&self) -> Result<Epoch, DateError> {
        Epoch::maybe_from_gregorian_utc(
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            0,
        )
        .map_err(|source| DateError {
            text: self.to_string(),
            source,
        })
    }
}

/// Converts a civil date into its Julian Day Number.
///
/// Uses the standard Gregorian-calendar algorithm. All divisions are
/// floored, so any proleptic Gregorian date is accepted.
///
/// The time of day is ignored: every instant of a civil day maps to the
/// same integer.
///
/// # Example
/// ```
/// use orrery_kepler::{julian_day_number, CalendarDate};
///
/// assert_eq!(julian_day_number(&CalendarDate::new(2000, 1, 1)), 2_451_545);
/// assert_eq!(julian_day_number(&CalendarDate::new(1970, 1, 1)), 2_440_588);
/// ```
pub fn julian_day_number(date: &CalendarDate) -> i64 {
    let year = i64::from(date.year);
    let month = i64::from(date.month);
    let day = i64::from(date.day);

    let a = (14 - month).div_euclid(12);
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;

    day + (153 * m + 2).div_euclid(5) + 365 * y + y.div_euclid(4) - y.div_euclid(100)
        + y.div_euclid(400)
        - 32045
}

impl From<Epoch> for CalendarDate {
    fn from(epoch: Epoch) -> Self {
        let (year, month, day, hour, minute, second, _) = epoch.to_gregorian_utc();
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

impl FromStr for CalendarDate {
    type Err = DateError;

    /// Parses an ISO 8601 date with `hifitime`, e.g. `2024-03-20`,
    /// `2024-03-20T06:30:15` or `2024-03-20 06:30:15 UTC`.
    ///
    /// Impossible dates such as `2023-02-30` are rejected. Negative years
    /// can't be parsed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Epoch::from_gregorian_str(s)
            .map(Self::from)
            .map_err(|source| DateError {
                text: s.trim().to_string(),
                source,
            })
    }
}
