//! Issuance time resolution
//!
//! Products carry a human-readable issuance line such as
//! `1058 AM EDT Wed Jul 3 2024` or `1500 UTC Wed Jul 3 2024`. The resolver
//! normalizes it to a UTC instant using a fixed table of timezone
//! abbreviations passed in explicitly; there is no daylight-saving calendar.

use crate::{Error, Result};
use chrono::{DateTime, Datelike, FixedOffset, TimeZone, Utc};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// A resolved issuance instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Issuance {
    /// The instant, in UTC
    pub time: DateTime<Utc>,

    /// True when no issuance line was present and the instant defaulted to
    /// now; processing continues but downstream consumers can tell
    pub degraded: bool,
}

fn issuance_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[0-9]{3,4} ((AM|PM) [A-Za-z]{3,4}|UTC) ([A-Za-z]{3} ){2}[0-9]{1,2} [0-9]{4}")
            .expect("issuance regex is valid")
    })
}

/// Resolve the product's issuance line to a UTC instant.
///
/// Fails with [`Error::TimezoneUnknown`] when the line names an abbreviation
/// outside the table and [`Error::TimeUnparseable`] when a matched line does
/// not decode. A missing line is not an error: the result defaults to now
/// (UTC) and is flagged degraded.
pub fn resolve_issuance(
    text: &str,
    timezones: &HashMap<&'static str, FixedOffset>,
) -> Result<Issuance> {
    let Some(found) = issuance_regex().find(text) else {
        return Ok(Issuance {
            time: Utc::now(),
            degraded: true,
        });
    };

    let line = found.as_str();
    let fields: Vec<&str> = line.split_whitespace().collect();

    let time = if fields.get(1).copied() == Some("UTC") {
        // "1500 UTC Wed Jul 3 2024" - date fields start at the weekday
        resolve_fields(fields[0], None, &fields[2..], line, timezones)?
    } else {
        // "1058 AM EDT Wed Jul 3 2024"
        let pm = match fields.get(1).copied() {
            Some("AM") => false,
            Some("PM") => true,
            _ => return Err(Error::time_unparseable(line)),
        };
        resolve_fields(fields[0], Some((pm, fields[2])), &fields[3..], line, timezones)?
    };

    Ok(Issuance {
        time,
        degraded: false,
    })
}

/// Decode the clock token plus `Mon D YYYY` date fields into a UTC instant.
///
/// `meridiem_tz` carries the PM flag and timezone abbreviation for local
/// time lines; `None` means the line was already in UTC.
fn resolve_fields(
    clock: &str,
    meridiem_tz: Option<(bool, &str)>,
    date_fields: &[&str],
    line: &str,
    timezones: &HashMap<&'static str, FixedOffset>,
) -> Result<DateTime<Utc>> {
    // date_fields is [weekday, month, day, year]
    if clock.len() < 3 || date_fields.len() < 4 {
        return Err(Error::time_unparseable(line));
    }

    // The clock token has no separator: minutes are the last two digits
    let split = clock.len() - 2;
    let mut hour: u32 = clock[..split]
        .parse()
        .map_err(|_| Error::time_unparseable(line))?;
    let minute: u32 = clock[split..]
        .parse()
        .map_err(|_| Error::time_unparseable(line))?;

    let month = month_number(date_fields[1]).ok_or_else(|| Error::time_unparseable(line))?;
    let day: u32 = date_fields[2]
        .parse()
        .map_err(|_| Error::time_unparseable(line))?;
    let year: i32 = date_fields[3]
        .parse()
        .map_err(|_| Error::time_unparseable(line))?;

    let Some((pm, tz_name)) = meridiem_tz else {
        return Utc
            .with_ymd_and_hms(year, month, day, hour, minute, 0)
            .single()
            .ok_or_else(|| Error::time_unparseable(line));
    };

    let tz_name = tz_name.to_uppercase();
    let offset = timezones
        .get(tz_name.as_str())
        .copied()
        .ok_or_else(|| Error::timezone_unknown(&tz_name))?;

    if hour > 12 || hour == 0 {
        return Err(Error::time_unparseable(line));
    }
    hour = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };

    offset
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| Error::time_unparseable(line))
}

fn month_number(name: &str) -> Option<u32> {
    match name {
        "Jan" => Some(1),
        "Feb" => Some(2),
        "Mar" => Some(3),
        "Apr" => Some(4),
        "May" => Some(5),
        "Jun" => Some(6),
        "Jul" => Some(7),
        "Aug" => Some(8),
        "Sep" => Some(9),
        "Oct" => Some(10),
        "Nov" => Some(11),
        "Dec" => Some(12),
        _ => None,
    }
}

/// Resolve a compact day/hour/minute group against an issuance date.
///
/// The month and year come from the issuance instant; `issuance_day` is the
/// day carried by the WMO heading. A group on day 1 of a bulletin issued
/// later in the month has rolled past the month boundary, so the month
/// advances by one (wrapping the year in December).
pub(crate) fn resolve_compact_instant(
    issued: DateTime<Utc>,
    issuance_day: u32,
    day: u32,
    hour: u32,
    minute: u32,
) -> Option<DateTime<Utc>> {
    let mut year = issued.year();
    let mut month = issued.month();

    if day == 1 && issuance_day != 1 {
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }

    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).single()
}
