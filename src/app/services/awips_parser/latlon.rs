//! LAT...LON polygon parser
//!
//! Warning polygons are encoded as repeated integer pairs in hundredths of a
//! degree, latitude first: `LAT...LON 4812 9345 4810 9340`. Longitudes are
//! western, so the sign flips; values at or below -180 wrap by adding 360.
//! The block may continue onto following lines. Ring closure is not
//! enforced here.

use crate::app::models::Polygon;
use crate::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;

const LATLON_LABEL: &str = "LAT...LON";

fn latlon_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^LAT\.\.\.LON((?:\s+[0-9]{4,5})+)").expect("LAT...LON regex is valid")
    })
}

/// Parse the segment's warning polygon, if any.
///
/// Returns `Ok(None)` when no coordinate block is present;
/// [`Error::PolygonMalformed`] when a block is present but does not decode.
pub fn parse_latlon(text: &str) -> Result<Option<Polygon>> {
    let Some(captures) = latlon_regex().captures(text) else {
        if text.contains(LATLON_LABEL) {
            return Err(Error::polygon_malformed(
                "LAT...LON label present but no coordinates follow",
            ));
        }
        return Ok(None);
    };

    let tokens: Vec<&str> = captures[1].split_whitespace().collect();
    if tokens.len() % 2 != 0 {
        return Err(Error::polygon_malformed(format!(
            "odd coordinate count ({})",
            tokens.len()
        )));
    }

    let mut points = Vec::with_capacity(tokens.len() / 2);
    for pair in tokens.chunks_exact(2) {
        let lat = decode_coordinate(pair[0])?;
        let lon = decode_coordinate(pair[1])?;
        points.push((flip_longitude(lon), lat));
    }

    Ok(Some(Polygon { points }))
}

/// Decode a 4-5 digit integer token as hundredths of a degree
fn decode_coordinate(token: &str) -> Result<f64> {
    let value: i64 = token
        .parse()
        .map_err(|_| Error::polygon_malformed(format!("bad coordinate token '{token}'")))?;
    Ok(value as f64 / 100.0)
}

/// Negate for the western hemisphere and wrap values past the antimeridian
pub(crate) fn flip_longitude(lon: f64) -> f64 {
    let lon = -lon;
    if lon <= -180.0 { lon + 360.0 } else { lon }
}
