//! WMO abbreviated heading parser
//!
//! The heading is a fixed-column line of the form `TTAAII CCCC DDHHMM` with
//! an optional three-letter BBB amendment group. The six-digit group encodes
//! day-of-month, hour and minute only; the month and year are inferred from
//! receipt context downstream.

use crate::app::models::WmoHeading;
use crate::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;

fn wmo_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([A-Z]{4}[0-9]{2})\s([A-Z]{4})\s([0-9]{6})( [A-Z]{3})?")
            .expect("WMO regex is valid")
    })
}

/// Parse the WMO abbreviated heading out of product text.
///
/// Fails with [`Error::WmoMissing`] when no heading line is present and with
/// [`Error::TimeUnparseable`] when the six-digit group is not a valid
/// day-hour-minute.
pub fn parse_wmo(text: &str) -> Result<WmoHeading> {
    let captures = wmo_regex().captures(text).ok_or(Error::WmoMissing)?;

    let raw = captures
        .get(0)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let data_type = captures[1].to_string();
    let office = captures[2].to_string();
    let dhm = &captures[3];

    // Indexing is safe: the regex guarantees exactly six digits
    let day: u32 = dhm[0..2].parse().map_err(|_| Error::time_unparseable(&raw))?;
    let hour: u32 = dhm[2..4].parse().map_err(|_| Error::time_unparseable(&raw))?;
    let minute: u32 = dhm[4..6].parse().map_err(|_| Error::time_unparseable(&raw))?;

    if !(1..=31).contains(&day) || hour > 23 || minute > 59 {
        return Err(Error::time_unparseable(&raw));
    }

    let bbb = captures.get(4).map(|m| m.as_str().trim().to_string());

    Ok(WmoHeading {
        raw,
        data_type,
        office,
        day,
        hour,
        minute,
        bbb,
    })
}

/// Whether the text contains a WMO heading at all
pub fn has_wmo(text: &str) -> bool {
    wmo_regex().is_match(text)
}
