//! UTC dates for front matter, permalinks and feeds.
//!
//! Front matter accepts `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SSZ`. Everything
//! downstream (post URLs, aggregate ordering, RSS/Atom, sitemap `lastmod`)
//! goes through [`DateTimeUtc`], so formatting lives in one place.

use std::fmt;

use thiserror::Error;

/// Why a date string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SSZ, got `{0}`")]
    Format(String),
    #[error("{field} out of range: {value}")]
    Range { field: &'static str, value: u16 },
}

/// UTC datetime without timezone complexity.
///
/// Field order makes the derived `Ord` chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTimeUtc {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTimeUtc {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    pub const fn from_ymd(year: u16, month: u8, day: u8) -> Self {
        Self::new(year, month, day, 0, 0, 0)
    }

    /// Parse `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn parse(s: &str) -> Result<Self, DateError> {
        let s = s.trim();
        let bytes = s.as_bytes();
        let bad = || DateError::Format(s.to_string());

        if bytes.len() != 10 && bytes.len() != 20 {
            return Err(bad());
        }
        if bytes[4] != b'-' || bytes[7] != b'-' {
            return Err(bad());
        }

        let year = digits(&bytes[0..4]).ok_or_else(bad)?;
        let month = digits(&bytes[5..7]).ok_or_else(bad)?;
        let day = digits(&bytes[8..10]).ok_or_else(bad)?;

        let (hour, minute, second) = if bytes.len() == 20 {
            if bytes[10] != b'T' || bytes[13] != b':' || bytes[16] != b':' || bytes[19] != b'Z' {
                return Err(bad());
            }
            (
                digits(&bytes[11..13]).ok_or_else(bad)?,
                digits(&bytes[14..16]).ok_or_else(bad)?,
                digits(&bytes[17..19]).ok_or_else(bad)?,
            )
        } else {
            (0, 0, 0)
        };

        #[allow(clippy::cast_possible_truncation)] // two-digit fields fit in u8
        let dt = Self::new(
            year,
            month as u8,
            day as u8,
            hour as u8,
            minute as u8,
            second as u8,
        );
        dt.validate()?;
        Ok(dt)
    }

    pub fn validate(self) -> Result<(), DateError> {
        let range = |field, value: u8| DateError::Range {
            field,
            value: u16::from(value),
        };

        if !(1..=12).contains(&self.month) {
            return Err(range("month", self.month));
        }
        if self.day == 0 || self.day > days_in_month(self.year, self.month) {
            return Err(range("day", self.day));
        }
        if self.hour > 23 {
            return Err(range("hour", self.hour));
        }
        if self.minute > 59 {
            return Err(range("minute", self.minute));
        }
        if self.second > 59 {
            return Err(range("second", self.second));
        }
        Ok(())
    }

    /// `YYYY-MM-DD`, used for sitemap `lastmod`.
    pub fn ymd(self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// `YYYY/MM/DD`, the date segment of a post permalink.
    pub fn url_segment(self) -> String {
        format!("{:04}/{:02}/{:02}", self.year, self.month, self.day)
    }

    /// RFC 3339 for Atom: `YYYY-MM-DDTHH:MM:SSZ`
    pub fn to_rfc3339(self) -> String {
        format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }

    /// RFC 2822 for RSS: `Sat, 15 Jun 2024 14:30:45 GMT`
    pub fn to_rfc2822(self) -> String {
        const WEEKDAYS: [&str; 7] = ["Sat", "Sun", "Mon", "Tue", "Wed", "Thu", "Fri"];
        const MONTHS: [&str; 12] = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];

        format!(
            "{}, {:02} {} {:04} {:02}:{:02}:{:02} GMT",
            WEEKDAYS[self.weekday_index()],
            self.day,
            MONTHS[usize::from(self.month - 1)],
            self.year,
            self.hour,
            self.minute,
            self.second
        )
    }

    /// Zeller's congruence, 0 = Saturday.
    #[allow(clippy::cast_sign_loss)] // result of % 7 on a positive sum
    fn weekday_index(self) -> usize {
        let (y, m) = if self.month < 3 {
            (i32::from(self.year) - 1, i32::from(self.month) + 12)
        } else {
            (i32::from(self.year), i32::from(self.month))
        };
        let d = i32::from(self.day);
        ((d + (13 * (m + 1)) / 5 + y + y / 4 - y / 100 + y / 400) % 7) as usize
    }
}

impl fmt::Display for DateTimeUtc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (self.hour, self.minute, self.second) == (0, 0, 0) {
            f.write_str(&self.ymd())
        } else {
            f.write_str(&self.to_rfc3339())
        }
    }
}

const fn is_leap_year(year: u16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

const fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Parse a fixed-width run of ASCII digits.
fn digits(bytes: &[u8]) -> Option<u16> {
    bytes.iter().try_fold(0u16, |acc, &b| {
        let d = b.wrapping_sub(b'0');
        (d <= 9).then(|| acc * 10 + u16::from(d))
    })
}
