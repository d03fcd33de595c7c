//! Universal Geographic Code parser
//!
//! A UGC block lists the zones or counties a segment affects, as dash
//! separated `SSFNNN` groups with `NNN>NNN` ranges expanding inside the
//! current state/format prefix, terminated by a six-digit `DDHHMM` expiry.
//! The block may wrap onto continuation lines.
//!
//! Example: `GAC121-135-287-011200-` or `ILZ027>031-037-011200-`

use crate::app::models::Ugc;
use crate::{Error, Result};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

fn ugc_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // From the first SSFNNN group through the expiry, tolerating line wraps
        Regex::new(r"(?m)^[A-Z]{2}[CZ][0-9]{3}[->][\s\S]*?[0-9]{6}-")
            .expect("UGC regex is valid")
    })
}

/// Parse the segment's UGC block, if any.
///
/// Returns `Ok(None)` when the segment has no UGC block;
/// [`Error::UgcMalformed`] when a block is present but does not decode.
pub fn parse_ugc(text: &str) -> Result<Option<Ugc>> {
    let Some(found) = ugc_regex().find(text) else {
        return Ok(None);
    };

    let raw = found.as_str().to_string();

    // Collapse line wraps, then walk the dash-separated groups
    let compact: String = raw.split_whitespace().collect();
    let groups: Vec<&str> = compact
        .trim_end_matches('-')
        .split('-')
        .filter(|g| !g.is_empty())
        .collect();

    let Some((&expiry, zone_groups)) = groups.split_last() else {
        return Err(Error::ugc_malformed("empty UGC block"));
    };

    if expiry.len() != 6 || !expiry.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::ugc_malformed(format!(
            "expected DDHHMM expiry, found '{expiry}'"
        )));
    }
    // All six characters are digits, so these parses cannot fail
    let day: u32 = expiry[0..2].parse().unwrap_or_default();
    let hour: u32 = expiry[2..4].parse().unwrap_or_default();
    let minute: u32 = expiry[4..6].parse().unwrap_or_default();

    if !(1..=31).contains(&day) || hour > 23 || minute > 59 {
        return Err(Error::ugc_malformed(format!(
            "expiry '{expiry}' is not a valid day-hour-minute"
        )));
    }

    let mut zones = BTreeSet::new();
    let mut prefix: Option<String> = None;

    for group in zone_groups {
        let (group_prefix, numbers) = split_group(group)?;
        if let Some(p) = group_prefix {
            prefix = Some(p);
        }
        let prefix = prefix
            .as_ref()
            .ok_or_else(|| Error::ugc_malformed(format!("zone group '{group}' has no prefix")))?;

        match numbers.split_once('>') {
            Some((from, to)) => {
                let from: u32 = from
                    .parse()
                    .map_err(|_| Error::ugc_malformed(format!("bad range start in '{group}'")))?;
                let to: u32 = to
                    .parse()
                    .map_err(|_| Error::ugc_malformed(format!("bad range end in '{group}'")))?;
                if from > to {
                    return Err(Error::ugc_malformed(format!(
                        "range '{group}' runs backwards"
                    )));
                }
                for n in from..=to {
                    zones.insert(format!("{prefix}{n:03}"));
                }
            }
            None => {
                if numbers.len() != 3 || !numbers.chars().all(|c| c.is_ascii_digit()) {
                    return Err(Error::ugc_malformed(format!("bad zone number '{group}'")));
                }
                zones.insert(format!("{prefix}{numbers}"));
            }
        }
    }

    if zones.is_empty() {
        return Err(Error::ugc_malformed("UGC block lists no zones"));
    }

    Ok(Some(Ugc {
        raw,
        zones,
        day,
        hour,
        minute,
    }))
}

/// Split a zone group into its optional `SSF` prefix and numeric remainder
fn split_group(group: &str) -> Result<(Option<String>, &str)> {
    let bytes = group.as_bytes();
    if bytes.len() >= 4
        && bytes[0].is_ascii_uppercase()
        && bytes[1].is_ascii_uppercase()
        && (bytes[2] == b'C' || bytes[2] == b'Z')
    {
        Ok((Some(group[..3].to_string()), &group[3..]))
    } else if group.chars().all(|c| c.is_ascii_digit() || c == '>') {
        Ok((None, group))
    } else {
        Err(Error::ugc_malformed(format!("bad zone group '{group}'")))
    }
}
