//! BCD encoded calendar types.
//!
//! The controller transmits dates and times as packed BCD digits:
//!
//! | Type | Bytes | Digits |
//! |------|-------|--------|
//! | [`Date`] | 4 | `YYYYMMDD` |
//! | [`DateTime`] | 7 | `YYYYMMDDHHMMSS` |
//! | [`SystemDate`] | 3 | `YYMMDD` (year modulo 100) |
//! | [`SystemTime`] | 3 | `HHMMSS` |
//!
//! Each type wraps the matching `chrono` value and converts to and from its
//! wire form with `to_bcd`/`from_bcd`.

use crate::{Error, Result, bcd, types::serde_via_string};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::fmt;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TIME_FORMAT: &str = "%H:%M:%S";

fn four_digit_year(year: i32) -> Result<i32> {
    if (0..=9999).contains(&year) {
        Ok(year)
    } else {
        Err(Error::InvalidDateTime(format!(
            "year {year} cannot be BCD encoded"
        )))
    }
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        Error::InvalidDateTime(format!("{year:04}-{month:02}-{day:02}"))
    })
}

fn hms(hour: u32, minute: u32, second: u32) -> Result<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| {
        Error::InvalidDateTime(format!("{hour:02}:{minute:02}:{second:02}"))
    })
}

/// Parse the decimal number at `digits[range]`.
///
/// `digits` always comes from [`bcd::decode`] so it is pure ASCII digits.
fn number(digits: &str, range: std::ops::Range<usize>) -> u32 {
    digits[range]
        .bytes()
        .fold(0, |acc, d| acc * 10 + u32::from(d - b'0'))
}

fn copy_into<const N: usize>(bytes: Vec<u8>) -> Result<[u8; N]> {
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| Error::InvalidBcd(format!("expected {N} bytes, got {}", b.len())))
}

/// Calendar date, 4 BCD bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Date(NaiveDate);

impl Date {
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Date(date)
    }

    /// Create a date from year, month and day.
    ///
    /// # Errors
    /// Returns `Error::InvalidDateTime` if the date does not exist.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        ymd(year, month, day).map(Date)
    }

    #[must_use]
    pub const fn inner(&self) -> NaiveDate {
        self.0
    }

    /// Encode as `YYYYMMDD`.
    ///
    /// # Errors
    /// Returns `Error::InvalidDateTime` for years outside 0-9999.
    pub fn to_bcd(&self) -> Result<[u8; 4]> {
        let year = four_digit_year(self.0.year())?;
        let digits = format!("{year:04}{:02}{:02}", self.0.month(), self.0.day());
        copy_into(bcd::encode(&digits)?)
    }

    /// Decode from `YYYYMMDD`.
    ///
    /// # Errors
    /// Returns `Error::InvalidBcd` for non-decimal nibbles and
    /// `Error::InvalidDateTime` for dates that do not exist.
    pub fn from_bcd(bytes: &[u8; 4]) -> Result<Self> {
        let digits = bcd::decode(bytes)?;
        let year = number(&digits, 0..4) as i32;
        ymd(year, number(&digits, 4..6), number(&digits, 6..8)).map(Date)
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date(date)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for Date {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Date)
            .map_err(|e| Error::InvalidDateTime(format!("'{s}': {e}")))
    }
}

serde_via_string!(Date);

/// Date and time to the second, 7 BCD bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateTime(NaiveDateTime);

impl DateTime {
    #[must_use]
    pub const fn new(datetime: NaiveDateTime) -> Self {
        DateTime(datetime)
    }

    /// Create a datetime from its calendar components.
    ///
    /// # Errors
    /// Returns `Error::InvalidDateTime` if any component is out of range.
    pub fn from_ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Self> {
        Ok(DateTime(NaiveDateTime::new(
            ymd(year, month, day)?,
            hms(hour, minute, second)?,
        )))
    }

    /// Clamp `datetime` to the range a 7-byte timestamp can carry,
    /// 0000-01-01 00:00:00 to 9999-12-31 23:59:59. Sub-second precision is
    /// dropped.
    #[must_use]
    pub fn saturating(datetime: NaiveDateTime) -> Self {
        let clamped = match datetime.year() {
            year if year < 0 => NaiveDate::from_ymd_opt(0, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)),
            year if year > 9999 => {
                NaiveDate::from_ymd_opt(9999, 12, 31).and_then(|d| d.and_hms_opt(23, 59, 59))
            }
            _ => datetime.with_nanosecond(0),
        };
        DateTime(clamped.unwrap_or(datetime))
    }

    #[must_use]
    pub const fn inner(&self) -> NaiveDateTime {
        self.0
    }

    /// Encode as `YYYYMMDDHHMMSS`.
    ///
    /// Sub-second precision is dropped.
    ///
    /// # Errors
    /// Returns `Error::InvalidDateTime` for years outside 0-9999.
    pub fn to_bcd(&self) -> Result<[u8; 7]> {
        let year = four_digit_year(self.0.year())?;
        let digits = format!(
            "{year:04}{:02}{:02}{:02}{:02}{:02}",
            self.0.month(),
            self.0.day(),
            self.0.hour(),
            self.0.minute(),
            self.0.second()
        );
        copy_into(bcd::encode(&digits)?)
    }

    /// Decode from `YYYYMMDDHHMMSS`.
    ///
    /// # Errors
    /// Returns `Error::InvalidBcd` for non-decimal nibbles and
    /// `Error::InvalidDateTime` for values that do not exist.
    pub fn from_bcd(bytes: &[u8; 7]) -> Result<Self> {
        let d = bcd::decode(bytes)?;
        DateTime::from_ymd_hms(
            number(&d, 0..4) as i32,
            number(&d, 4..6),
            number(&d, 6..8),
            number(&d, 8..10),
            number(&d, 10..12),
            number(&d, 12..14),
        )
    }
}

impl From<NaiveDateTime> for DateTime {
    fn from(datetime: NaiveDateTime) -> Self {
        DateTime(datetime)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.format(DATETIME_FORMAT))
    }
}

impl FromStr for DateTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NaiveDateTime::parse_from_str(s.trim(), DATETIME_FORMAT)
            .map(DateTime)
            .map_err(|e| Error::InvalidDateTime(format!("'{s}': {e}")))
    }
}

serde_via_string!(DateTime);

/// Controller system date, 3 BCD bytes with a two digit year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemDate(NaiveDate);

impl SystemDate {
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        SystemDate(date)
    }

    /// Create a system date from year, month and day.
    ///
    /// # Errors
    /// Returns `Error::InvalidDateTime` if the date does not exist.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        ymd(year, month, day).map(SystemDate)
    }

    #[must_use]
    pub const fn inner(&self) -> NaiveDate {
        self.0
    }

    /// Encode as `YYMMDD`. Only the last two digits of the year are sent.
    ///
    /// # Errors
    /// Never fails for a valid `NaiveDate`; the `Result` mirrors the other
    /// calendar types.
    pub fn to_bcd(&self) -> Result<[u8; 3]> {
        let year = self.0.year().rem_euclid(100);
        let digits = format!("{year:02}{:02}{:02}", self.0.month(), self.0.day());
        copy_into(bcd::encode(&digits)?)
    }

    /// Decode from `YYMMDD`, interpreting the year as 20YY.
    ///
    /// # Errors
    /// Returns `Error::InvalidBcd` or `Error::InvalidDateTime`.
    pub fn from_bcd(bytes: &[u8; 3]) -> Result<Self> {
        let d = bcd::decode(bytes)?;
        let year = 2000 + number(&d, 0..2) as i32;
        ymd(year, number(&d, 2..4), number(&d, 4..6)).map(SystemDate)
    }
}

impl fmt::Display for SystemDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

/// Controller system time of day, 3 BCD bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemTime(NaiveTime);

impl SystemTime {
    #[must_use]
    pub const fn new(time: NaiveTime) -> Self {
        SystemTime(time)
    }

    /// Create a time of day from hours, minutes and seconds.
    ///
    /// # Errors
    /// Returns `Error::InvalidDateTime` if the time does not exist.
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Result<Self> {
        hms(hour, minute, second).map(SystemTime)
    }

    #[must_use]
    pub const fn inner(&self) -> NaiveTime {
        self.0
    }

    /// Encode as `HHMMSS`.
    ///
    /// # Errors
    /// Never fails for a valid `NaiveTime`; the `Result` mirrors the other
    /// calendar types.
    pub fn to_bcd(&self) -> Result<[u8; 3]> {
        let digits = format!(
            "{:02}{:02}{:02}",
            self.0.hour(),
            self.0.minute(),
            self.0.second()
        );
        copy_into(bcd::encode(&digits)?)
    }

    /// Decode from `HHMMSS`.
    ///
    /// # Errors
    /// Returns `Error::InvalidBcd` or `Error::InvalidDateTime`.
    pub fn from_bcd(bytes: &[u8; 3]) -> Result<Self> {
        let d = bcd::decode(bytes)?;
        hms(number(&d, 0..2), number(&d, 2..4), number(&d, 4..6)).map(SystemTime)
    }
}

impl fmt::Display for SystemTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.format(TIME_FORMAT))
    }
}

impl From<NaiveDateTime> for SystemDate {
    fn from(datetime: NaiveDateTime) -> Self {
        SystemDate(datetime.date())
    }
}

impl From<NaiveDateTime> for SystemTime {
    fn from(datetime: NaiveDateTime) -> Self {
        // Leap seconds have no BCD representation.
        SystemTime(datetime.time().with_nanosecond(0).unwrap_or(datetime.time()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_date_bcd() {
        let date = Date::from_ymd(2018, 8, 16).unwrap();
        assert_eq!(date.to_bcd().unwrap(), [0x20, 0x18, 0x08, 0x16]);
        assert_eq!(Date::from_bcd(&[0x20, 0x18, 0x08, 0x16]).unwrap(), date);
    }

    #[test]
    fn test_datetime_bcd() {
        let datetime = DateTime::from_ymd_hms(2019, 4, 16, 12, 34, 56).unwrap();
        let bytes = [0x20, 0x19, 0x04, 0x16, 0x12, 0x34, 0x56];
        assert_eq!(datetime.to_bcd().unwrap(), bytes);
        assert_eq!(DateTime::from_bcd(&bytes).unwrap(), datetime);
    }

    #[test]
    fn test_system_date_and_time_bcd() {
        let date = SystemDate::from_bcd(&[0x19, 0x04, 0x20]).unwrap();
        assert_eq!(date.inner(), NaiveDate::from_ymd_opt(2019, 4, 20).unwrap());
        assert_eq!(date.to_bcd().unwrap(), [0x19, 0x04, 0x20]);

        let time = SystemTime::from_bcd(&[0x12, 0x36, 0x38]).unwrap();
        assert_eq!(time.to_string(), "12:36:38");
        assert_eq!(time.to_bcd().unwrap(), [0x12, 0x36, 0x38]);
    }

    #[rstest]
    #[case([0x20, 0x19, 0x02, 0x30])] // 30 February
    #[case([0x20, 0x19, 0x13, 0x01])] // month 13
    #[case([0x20, 0x19, 0x0a, 0x01])] // non-decimal nibble
    #[case([0x00, 0x00, 0x00, 0x00])] // month 0
    fn test_date_invalid(#[case] bytes: [u8; 4]) {
        assert!(Date::from_bcd(&bytes).is_err());
    }

    #[test]
    fn test_date_year_out_of_range() {
        let date = Date::new(NaiveDate::from_ymd_opt(10000, 1, 1).unwrap());
        assert!(matches!(date.to_bcd(), Err(Error::InvalidDateTime(_))));
    }

    #[rstest]
    #[case(1999, 12, 31, [0x99, 0x12, 0x31])]
    #[case(2100, 1, 1, [0x00, 0x01, 0x01])]
    #[case(9999, 6, 15, [0x99, 0x06, 0x15])]
    fn test_system_date_outside_century_keeps_two_digits(
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
        #[case] expected: [u8; 3],
    ) {
        let date = SystemDate::from_ymd(year, month, day).unwrap();
        assert_eq!(date.to_bcd().unwrap(), expected);
    }

    #[rstest]
    #[case(2019, 4, 16, 12, 34, 56, "2019-04-16 12:34:56")]
    #[case(9999, 12, 31, 23, 59, 59, "9999-12-31 23:59:59")]
    #[case(10000, 1, 1, 0, 0, 0, "9999-12-31 23:59:59")]
    #[case(14702, 6, 1, 12, 0, 0, "9999-12-31 23:59:59")]
    #[case(-1, 12, 31, 23, 59, 59, "0000-01-01 00:00:00")]
    fn test_saturating_stays_encodable(
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
        #[case] hour: u32,
        #[case] minute: u32,
        #[case] second: u32,
        #[case] expected: &str,
    ) {
        let input = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, second))
            .unwrap();
        let datetime = DateTime::saturating(input);

        assert_eq!(datetime.to_string(), expected);
        assert!(datetime.to_bcd().is_ok());
    }

    #[test]
    fn test_string_forms() {
        let date: Date = "2024-12-31".parse().unwrap();
        assert_eq!(date.to_string(), "2024-12-31");

        let datetime: DateTime = "2019-04-16 12:34:56".parse().unwrap();
        assert_eq!(datetime.to_string(), "2019-04-16 12:34:56");

        assert!("2024-13-01".parse::<Date>().is_err());
    }
}
