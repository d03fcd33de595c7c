//! TIME...MOT...LOC storm motion parser
//!
//! The line carries a reference time, a bearing, a speed token and the
//! storm's current track points: `TIME...MOT...LOC 1755Z 240DEG 25KT 4812
//! 9345`. The reference time is hour-minute only and combines with the
//! product's issuance date.

use super::latlon::flip_longitude;
use crate::app::models::Tml;
use crate::{Error, Result};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use regex::Regex;
use std::sync::OnceLock;

fn tml_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^(TIME\.\.\.MOT\.\.\.LOC)([A-Za-z0-9 ]*)").expect("TML regex is valid")
    })
}

/// Parse the segment's storm motion line, if any.
///
/// Returns `Ok(None)` when no TML line is present; [`Error::TmlMalformed`]
/// when a line is present but any field does not decode.
pub fn parse_tml(text: &str, issued: DateTime<Utc>) -> Result<Option<Tml>> {
    let Some(found) = tml_regex().find(text) else {
        return Ok(None);
    };

    let raw = found.as_str().trim().to_string();
    let fields: Vec<&str> = raw.split_whitespace().skip(1).collect();

    if fields.len() < 3 {
        return Err(Error::tml_malformed("expected time, bearing and speed"));
    }

    let time = decode_reference_time(fields[0], issued)?;

    let direction: u16 = fields[1]
        .get(..3)
        .and_then(|d| d.parse().ok())
        .ok_or_else(|| Error::tml_malformed(format!("bad bearing '{}'", fields[1])))?;

    let speed_text = fields[2].to_string();
    let speed: i32 = speed_text
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .map_err(|_| Error::tml_malformed(format!("bad speed token '{speed_text}'")))?;

    // Remaining fields are track points; a trailing odd token is ignored
    let mut track = Vec::new();
    for pair in fields[3..].chunks_exact(2) {
        let lat = decode_track_coordinate(pair[0])?;
        let lon = decode_track_coordinate(pair[1])?;
        track.push((flip_longitude(lon), lat));
    }

    Ok(Some(Tml {
        raw,
        time,
        direction,
        speed,
        speed_text,
        track,
    }))
}

/// Decode an `HHMMZ` token against the issuance date
fn decode_reference_time(token: &str, issued: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let digits = token.strip_suffix('Z').unwrap_or(token);
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::tml_malformed(format!("bad reference time '{token}'")));
    }

    let hour: u32 = digits[..2].parse().unwrap_or_default();
    let minute: u32 = digits[2..].parse().unwrap_or_default();

    Utc.with_ymd_and_hms(issued.year(), issued.month(), issued.day(), hour, minute, 0)
        .single()
        .ok_or_else(|| Error::tml_malformed(format!("bad reference time '{token}'")))
}

fn decode_track_coordinate(token: &str) -> Result<f64> {
    let value: i64 = token
        .parse()
        .map_err(|_| Error::tml_malformed(format!("bad track coordinate '{token}'")))?;
    Ok(value as f64 / 100.0)
}
