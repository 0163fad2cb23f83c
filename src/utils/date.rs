//! UTC datetime utilities without timezone dependencies.
//!
//! Provides a lightweight `DateTimeUtc` struct for the dates found in feeds:
//!
//! - RFC 2822 (`pubDate` in RSS): `Tue, 10 Sep 2024 14:30:00 +0200`
//! - RFC 3339 (Atom `published`/`updated`): `2024-09-10T14:30:00Z`
//! - plain ISO dates (`2024-09-10`) from notebook frontmatter
//!
//! Zone offsets are applied, so the stored value is always UTC.
//!
//! # Examples
//!
//! ```ignore
//! let dt = DateTimeUtc::parse_rfc2822("Tue, 10 Sep 2024 23:30:00 -0200").unwrap();
//! assert_eq!(dt.to_iso_date(), "2024-09-11");
//! ```

use anyhow::{Result, bail};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// UTC datetime without timezone complexity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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

    /// Parse any date format a feed or frontmatter may carry.
    pub fn parse_any(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        Self::parse_rfc3339(s).or_else(|| Self::parse_rfc2822(s))
    }

    /// Parse "YYYY-MM-DD" or "YYYY-MM-DD[T ]HH:MM[:SS][.fff][Z|±HH:MM|±HHMM]".
    pub fn parse_rfc3339(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();

        // Minimum: "YYYY-MM-DD" (10 chars)
        if bytes.len() < 10 {
            return None;
        }

        let year = parse_u16(&bytes[0..4])?;
        if bytes[4] != b'-' {
            return None;
        }
        let month = parse_u8(&bytes[5..7])?;
        if bytes[7] != b'-' {
            return None;
        }
        let day = parse_u8(&bytes[8..10])?;

        if bytes.len() == 10 {
            let dt = Self::from_ymd(year, month, day);
            dt.validate().ok()?;
            return Some(dt);
        }

        if bytes[10] != b'T' && bytes[10] != b' ' {
            return None;
        }
        let rest = &bytes[11..];
        if rest.len() < 5 || rest[2] != b':' {
            return None;
        }
        let hour = parse_u8(&rest[0..2])?;
        let minute = parse_u8(&rest[3..5])?;
        let mut pos = 5;
        let mut second = 0;
        if rest.len() >= 8 && rest[5] == b':' {
            second = parse_u8(&rest[6..8])?;
            pos = 8;
        }
        // Fractional seconds are dropped
        if rest.get(pos) == Some(&b'.') {
            pos += 1;
            while rest.get(pos).is_some_and(u8::is_ascii_digit) {
                pos += 1;
            }
        }

        let zone = std::str::from_utf8(&rest[pos..]).ok()?;
        let offset = if zone.is_empty() {
            0
        } else {
            parse_zone(zone)?
        };

        let dt = Self::new(year, month, day, hour, minute, second);
        dt.validate().ok()?;
        Some(dt.shift_minutes(-offset))
    }

    /// Parse an RFC 2822 date: `[Day, ]DD Mon YYYY HH:MM[:SS] [zone]`.
    pub fn parse_rfc2822(s: &str) -> Option<Self> {
        let s = s.trim();
        // Weekday is informational only
        let s = match s.find(',') {
            Some(idx) => &s[idx + 1..],
            None => s,
        };

        let mut parts = s.split_whitespace();
        let day: u8 = parts.next()?.parse().ok()?;
        let month_abbrev = parts.next()?.get(..3)?;
        let month = MONTHS
            .iter()
            .position(|m| m.eq_ignore_ascii_case(month_abbrev))?;
        let year: u16 = match parts.next()?.parse::<u16>().ok()? {
            y @ 0..=49 => 2000 + y,
            y @ 50..=99 => 1900 + y,
            y => y,
        };

        let (mut hour, mut minute, mut second) = (0, 0, 0);
        if let Some(time) = parts.next() {
            let mut fields = time.split(':');
            hour = fields.next()?.parse().ok()?;
            minute = fields.next()?.parse().ok()?;
            if let Some(sec) = fields.next() {
                second = sec.parse().ok()?;
            }
        }

        let offset = match parts.next() {
            Some(zone) => parse_zone(zone)?,
            None => 0,
        };

        #[allow(clippy::cast_possible_truncation)] // position() < 12
        let dt = Self::new(year, month as u8 + 1, day, hour, minute, second);
        dt.validate().ok()?;
        Some(dt.shift_minutes(-offset))
    }

    #[allow(clippy::trivially_copy_pass_by_ref)] // Method style is more idiomatic
    pub fn validate(&self) -> Result<()> {
        let Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        } = *self;

        if !(1..=12).contains(&month) {
            bail!("month is invalid: {month}");
        }

        let max_days = Self::days_in_month(year, month);
        if day == 0 || day > max_days {
            bail!("day is invalid: {day}");
        }
        if hour > 23 {
            bail!("hour is invalid: {hour}");
        }
        if minute > 59 {
            bail!("minute is invalid: {minute}");
        }
        // 60 allowed for leap seconds
        if second > 60 {
            bail!("second is invalid: {second}");
        }

        Ok(())
    }

    #[inline]
    #[allow(clippy::manual_is_multiple_of)] // Manual impl for const fn
    const fn is_leap_year(year: u16) -> bool {
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    #[inline]
    const fn days_in_month(year: u16, month: u8) -> u8 {
        match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if Self::is_leap_year(year) => 29,
            2 => 28,
            _ => 0,
        }
    }

    /// Move the datetime by a signed number of minutes, rolling the date over.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn shift_minutes(self, minutes: i64) -> Self {
        if minutes == 0 {
            return self;
        }
        let days = days_from_civil(i64::from(self.year), self.month, self.day);
        let total = days * 1440 + i64::from(self.hour) * 60 + i64::from(self.minute) + minutes;
        let (days, minute_of_day) = (total.div_euclid(1440), total.rem_euclid(1440));
        let (year, month, day) = civil_from_days(days);
        Self::new(
            year as u16,
            month,
            day,
            (minute_of_day / 60) as u8,
            (minute_of_day % 60) as u8,
            self.second,
        )
    }

    /// Format as `YYYY-MM-DD`, the shape stored in the JSON contract.
    pub fn to_iso_date(self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// Human display for page meta rows: `Sep 10, 2024`.
    pub fn to_display(self) -> String {
        format!(
            "{} {}, {:04}",
            MONTHS[(self.month - 1) as usize],
            self.day,
            self.year
        )
    }
}

/// Parse a zone designator into minutes east of UTC.
fn parse_zone(zone: &str) -> Option<i64> {
    match zone.to_ascii_uppercase().as_str() {
        "Z" | "GMT" | "UT" | "UTC" => return Some(0),
        "EST" => return Some(-5 * 60),
        "EDT" => return Some(-4 * 60),
        "CST" => return Some(-6 * 60),
        "CDT" => return Some(-5 * 60),
        "MST" => return Some(-7 * 60),
        "MDT" => return Some(-6 * 60),
        "PST" => return Some(-8 * 60),
        "PDT" => return Some(-7 * 60),
        _ => {}
    }

    let bytes = zone.as_bytes();
    let sign = match bytes.first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let digits: Vec<u8> = bytes[1..].iter().copied().filter(|b| *b != b':').collect();
    if digits.len() != 4 {
        return None;
    }
    let hours = i64::from(parse_u8(&digits[0..2])?);
    let minutes = i64::from(parse_u8(&digits[2..4])?);
    Some(sign * (hours * 60 + minutes))
}

/// Days since 1970-01-01 for a proleptic Gregorian date.
fn days_from_civil(year: i64, month: u8, day: u8) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let m = i64::from(month);
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Inverse of [`days_from_civil`].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// Parse 2-digit ASCII number
#[inline]
fn parse_u8(bytes: &[u8]) -> Option<u8> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = bytes[0].wrapping_sub(b'0');
    let d2 = bytes[1].wrapping_sub(b'0');
    if d1 > 9 || d2 > 9 {
        return None;
    }
    Some(d1 * 10 + d2)
}

/// Parse 4-digit ASCII number
#[inline]
fn parse_u16(bytes: &[u8]) -> Option<u16> {
    if bytes.len() != 4 {
        return None;
    }
    let mut result = 0u16;
    for &b in bytes {
        let d = b.wrapping_sub(b'0');
        if d > 9 {
            return None;
        }
        result = result * 10 + u16::from(d);
    }
    Some(result)
}

/// Normalize any feed/frontmatter date into `YYYY-MM-DD`, or empty when unparseable.
pub fn to_iso_date(s: &str) -> String {
    DateTimeUtc::parse_any(s)
        .map(DateTimeUtc::to_iso_date)
        .unwrap_or_default()
}
