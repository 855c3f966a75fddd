//! Timezone-safe date parsing and canonical formatting.
//!
//! Accepted forms are ISO-8601 dates and date-times:
//! `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, `YYYYMMDD`, and
//! `YYYY-MM-DD[T| ]HH:MM[:SS[.fff]]` with an optional `Z`, `±HH:MM`,
//! `±HHMM` or `±HH` suffix. Date-times also come in basic form
//! (`YYYYMMDDTHHMMSS`), the fraction may use `,` as separator, and
//! `24:00:00` is midnight at the end of the day.
//!
//! Text without an offset is read as wall-clock UTC. Text with an offset is
//! shifted to UTC rather than having the offset dropped.

use crate::{Error, Result};
use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc,
};

/// Canonical output format: `YYYY-MM-DDTHH:MM:SS`, no timezone suffix.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Text produced when formatting a date that failed to parse.
pub const INVALID_DATE: &str = "Invalid date";

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

/// Parses ISO date or date-time text into a UTC instant.
pub fn parse(input: &str) -> Result<DateTime<Utc>> {
    let text = input.trim();
    if text.is_empty() {
        return Err(Error::InvalidDate(input.to_string()));
    }

    let normalized = text.replacen(' ', "T", 1);
    let invalid = || Error::InvalidDate(input.to_string());
    let (local, offset) = split_offset(&normalized).ok_or_else(invalid)?;
    let naive = parse_naive(local).ok_or_else(invalid)?;

    match offset {
        None => Ok(naive.and_utc()),
        Some(offset) => offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(invalid),
    }
}

/// Builds a UTC instant from milliseconds since the Unix epoch.
pub fn from_millis(millis: f64) -> Result<DateTime<Utc>> {
    if !millis.is_finite() {
        return Err(Error::InvalidDate(millis.to_string()));
    }
    DateTime::<Utc>::from_timestamp_millis(millis.trunc() as i64)
        .ok_or_else(|| Error::InvalidDate(millis.to_string()))
}

/// Formats a date with a `strftime`-style pattern.
pub fn format(date: &DateTime<Utc>, pattern: &str) -> String {
    date.format(pattern).to_string()
}

/// Formats a date in [`CANONICAL_FORMAT`].
pub fn format_canonical(date: &DateTime<Utc>) -> String {
    format(date, CANONICAL_FORMAT)
}

/// Splits a trailing timezone designator off the time part.
///
/// Returns `None` if a designator is present but malformed.
fn split_offset(text: &str) -> Option<(&str, Option<FixedOffset>)> {
    let Some(t_pos) = text.find('T') else {
        return Some((text, None));
    };

    if let Some(stripped) = text.strip_suffix(['Z', 'z']) {
        return Some((stripped, FixedOffset::east_opt(0)));
    }

    let time = &text[t_pos + 1..];
    let Some(sign_pos) = time.rfind(['+', '-']) else {
        return Some((text, None));
    };

    let designator = &time[sign_pos..];
    let offset = parse_offset(designator)?;
    Some((&text[..t_pos + 1 + sign_pos], Some(offset)))
}

fn parse_offset(designator: &str) -> Option<FixedOffset> {
    let sign = match designator.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let digits: String = designator[1..].chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    let Some((date, time)) = text.split_once('T') else {
        return parse_date_only(text).map(|d| d.and_time(NaiveTime::MIN));
    };

    let date = parse_date_only(date)?;
    let (time, end_of_day) = normalize_time(time)?;
    let time = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(&time, fmt).ok())?;
    let naive = date.and_time(time);
    if end_of_day {
        naive.checked_add_signed(TimeDelta::days(1))
    } else {
        Some(naive)
    }
}

/// Rewrites a time of day into `HH:MM[:SS[.fff]]`.
///
/// The flag is set when the input was `24:00[:00[.000]]`, which comes back
/// as `00:00` of the same day.
fn normalize_time(time: &str) -> Option<(String, bool)> {
    let time = time.replacen(',', ".", 1);
    let (clock, fraction) = match time.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (time.as_str(), None),
    };

    let mut clock = if clock.contains(':') {
        clock.to_string()
    } else {
        if !clock.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        match clock.len() {
            2 => format!("{clock}:00"),
            4 => format!("{}:{}", &clock[..2], &clock[2..]),
            6 => format!("{}:{}:{}", &clock[..2], &clock[2..4], &clock[4..]),
            _ => return None,
        }
    };

    let end_of_day = clock.starts_with("24")
        && clock[2..].chars().all(|c| c == '0' || c == ':')
        && fraction.is_none_or(|f| f.chars().all(|c| c == '0'));
    if end_of_day {
        clock.replace_range(..2, "00");
    }

    let normalized = match fraction {
        Some(fraction) => format!("{clock}.{fraction}"),
        None => clock,
    };
    Some((normalized, end_of_day))
}

fn parse_date_only(text: &str) -> Option<NaiveDate> {
    let all_digits = text.chars().all(|c| c.is_ascii_digit());
    match text.len() {
        4 if all_digits => NaiveDate::from_ymd_opt(text.parse().ok()?, 1, 1),
        7 if text.as_bytes()[4] == b'-' => {
            NaiveDate::from_ymd_opt(text[..4].parse().ok()?, text[5..].parse().ok()?, 1)
        }
        8 if all_digits => NaiveDate::from_ymd_opt(
            text[..4].parse().ok()?,
            text[4..6].parse().ok()?,
            text[6..].parse().ok()?,
        ),
        _ => NaiveDate::parse_from_str(text, "%Y-%m-%d").ok(),
    }
}
