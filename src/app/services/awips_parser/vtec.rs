//! P-VTEC code parser
//!
//! Codes look like `/O.NEW.KFFC.TO.W.0045.240601T1200Z-240601T1300Z/`:
//! class, action, office, phenomena, significance, event number and a
//! start-end window. An all-zero time group means "not yet known" and
//! decodes to `None`, never to epoch zero. A segment may carry any number
//! of codes; malformed ones are collected without blocking their siblings.

use crate::app::models::vtec::{Phenomena, Significance, VtecAction, VtecClass, VtecCode};
use crate::{Error, Result};
use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

fn vtec_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"/([A-Z])\.([A-Z]{3})\.([A-Z]{4})\.([A-Z]{2})\.([A-Z])\.([0-9]{4})\.([0-9]{6}T[0-9]{4}Z)-([0-9]{6}T[0-9]{4}Z)/",
        )
        .expect("VTEC regex is valid")
    })
}

/// The all-zero time group marking an explicitly absent instant
const ABSENT_TIME: &str = "000000T0000Z";

/// Parse every VTEC code in a segment.
///
/// Returns the codes that decoded together with one [`Error::VtecMalformed`]
/// per code that did not; a bad code never blocks its siblings. The event
/// year is the start time's year when the code carries one, otherwise the
/// issuance year.
pub fn parse_vtec(text: &str, issued: DateTime<Utc>) -> (Vec<VtecCode>, Vec<Error>) {
    let mut codes = Vec::new();
    let mut errors = Vec::new();

    for captures in vtec_regex().captures_iter(text) {
        let raw = captures
            .get(0)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        match decode_code(&captures, &raw, issued) {
            Ok(code) => codes.push(code),
            Err(error) => errors.push(error),
        }
    }

    (codes, errors)
}

fn decode_code(
    captures: &regex::Captures<'_>,
    raw: &str,
    issued: DateTime<Utc>,
) -> Result<VtecCode> {
    let event_number: u32 = captures[6]
        .parse()
        .map_err(|_| Error::vtec_malformed(raw, "bad event number"))?;

    let start = decode_time(&captures[7], raw)?;
    let end = decode_time(&captures[8], raw)?;

    let year = match start {
        Some(start) => start.year(),
        None => issued.year(),
    };

    Ok(VtecCode {
        raw: raw.to_string(),
        class: VtecClass::from_code(&captures[1]),
        action: VtecAction::from_code(&captures[2]),
        office: captures[3].to_string(),
        phenomena: Phenomena::from_code(&captures[4]),
        significance: Significance::from_code(&captures[5]),
        event_number,
        year,
        start,
        end,
    })
}

/// Decode a `YYMMDDThhmmZ` group, mapping the all-zero group to `None`
fn decode_time(group: &str, raw: &str) -> Result<Option<DateTime<Utc>>> {
    if group == ABSENT_TIME {
        return Ok(None);
    }

    let parsed = NaiveDateTime::parse_from_str(group, "%y%m%dT%H%MZ")
        .map_err(|_| Error::vtec_malformed(raw, format!("bad time group '{group}'")))?;

    Ok(Some(DateTime::<Utc>::from_naive_utc_and_offset(parsed, Utc)))
}
