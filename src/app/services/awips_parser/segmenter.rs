//! Product segmentation
//!
//! Splits a bulletin on the `$$` terminator and runs the leaf parsers over
//! each surviving segment. A parser failing for one segment never blocks
//! its siblings, and a malformed VTEC code never blocks the other codes in
//! its segment.

use super::{issuance, latlon, tags, tml, ugc, vtec};
use crate::app::models::{Segment, WmoHeading};
use crate::constants::{MIN_SEGMENT_LENGTH, SEGMENT_TERMINATOR};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// Split product text into segments and decode each one's hazard payloads.
///
/// Segments shorter than [`MIN_SEGMENT_LENGTH`] after trimming are trailing
/// boilerplate and are dropped silently. Segment-level parse failures skip
/// that segment with a warning; code-level VTEC failures skip only the code.
pub fn split_segments(text: &str, issued: DateTime<Utc>, wmo: &WmoHeading) -> Vec<Segment> {
    let mut segments = Vec::new();

    for (index, split) in text.split(SEGMENT_TERMINATOR).enumerate() {
        let segment_text = split.trim();

        // The end of the product usually trails a short sign-off
        if segment_text.len() < MIN_SEGMENT_LENGTH {
            continue;
        }

        let ugc = match ugc::parse_ugc(segment_text) {
            Ok(ugc) => ugc,
            Err(error) => {
                warn!("segment {index}: {error}; skipping segment");
                continue;
            }
        };

        // The segment expiry only encodes day/hour/minute; the month and
        // year come from the issuance context, rolling into the next month
        // for bulletins whose validity crosses a month boundary
        let expires = match &ugc {
            Some(ugc) => {
                match issuance::resolve_compact_instant(
                    issued, wmo.day, ugc.day, ugc.hour, ugc.minute,
                ) {
                    Some(expires) => expires,
                    None => {
                        warn!(
                            "segment {index}: expiry day {} does not exist in issuance month; skipping segment",
                            ugc.day
                        );
                        continue;
                    }
                }
            }
            None => Utc::now(),
        };

        let (vtec, vtec_errors) = vtec::parse_vtec(segment_text, issued);
        for error in &vtec_errors {
            warn!("segment {index}: {error}; skipping code");
        }

        let latlon = match latlon::parse_latlon(segment_text) {
            Ok(latlon) => latlon,
            Err(error) => {
                warn!("segment {index}: {error}; skipping segment");
                continue;
            }
        };

        let tml = match tml::parse_tml(segment_text, issued) {
            Ok(tml) => tml,
            Err(error) => {
                warn!("segment {index}: {error}; skipping segment");
                continue;
            }
        };

        let tags = tags::parse_tags(segment_text);

        debug!(
            "segment {index}: {} VTEC codes, UGC: {}, polygon: {}",
            vtec.len(),
            ugc.is_some(),
            latlon.is_some()
        );

        segments.push(Segment {
            text: segment_text.to_string(),
            vtec,
            ugc,
            expires,
            latlon,
            tags,
            tml,
        });
    }

    segments
}
