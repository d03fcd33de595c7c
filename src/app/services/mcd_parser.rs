//! Mesoscale Discussion parser
//!
//! MCDs are forecaster discussion products, independent of the VTEC
//! pipeline. The discussion number, the valid window and the concerning
//! text are mandatory; the watch probability and the most-probable
//! intensity fields degrade to empty/zero when absent.

use crate::app::models::Polygon;
use crate::app::services::awips_parser::{issuance, latlon};
use crate::{Error, Result};
use chrono::{DateTime, Datelike, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A decoded Mesoscale Discussion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mcd {
    /// Discussion number
    pub number: u32,

    /// Start of the valid window (UTC)
    pub valid_from: DateTime<Utc>,

    /// End of the valid window (UTC)
    pub valid_to: DateTime<Utc>,

    /// The hazard or watch situation the discussion concerns
    pub concerning: String,

    /// Discussion area polygon
    pub polygon: Polygon,

    /// Probability of watch issuance in percent; 0 when not stated
    pub watch_probability: u32,

    /// Most probable peak tornado intensity, empty when not stated
    pub most_prob_tornado: String,

    /// Most probable peak wind gust, empty when not stated
    pub most_prob_gust: String,

    /// Most probable peak hail size, empty when not stated
    pub most_prob_hail: String,
}

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Mesoscale Discussion ([0-9]{4})").expect("MCD number regex is valid")
    })
}

fn valid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:Valid|VALID) ([0-9]{6})Z - ([0-9]{6})Z").expect("valid regex is valid")
    })
}

fn concerning_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Concerning\.\.\.(.+)").expect("concerning regex is valid"))
}

fn probability_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Probability of Watch Issuance\.\.\.([0-9]+)")
            .expect("probability regex is valid")
    })
}

fn intensity_regex(kind: &str) -> Regex {
    // kind is a literal from this module, so the pattern always compiles
    Regex::new(&format!(
        r"MOST PROBABLE PEAK {kind}\.\.\.([\w\-\. ]+)"
    ))
    .expect("intensity regex is valid")
}

fn tornado_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| intensity_regex("TORNADO INTENSITY"))
}

fn gust_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| intensity_regex("WIND GUST"))
}

fn hail_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| intensity_regex("HAIL SIZE"))
}

/// Parse a Mesoscale Discussion product.
///
/// `issued` anchors the valid window's month and year, since the window
/// itself only encodes day-hour-minute groups.
pub fn parse_mcd(text: &str, issued: DateTime<Utc>) -> Result<Mcd> {
    let number: u32 = number_regex()
        .captures(text)
        .and_then(|c| c[1].parse().ok())
        .ok_or_else(|| Error::mcd_malformed("no MCD number found"))?;

    let valid = valid_regex()
        .captures(text)
        .ok_or_else(|| Error::mcd_malformed("no valid window found"))?;

    let valid_from = resolve_window_instant(&valid[1], issued, issued.day())?;
    // The window end rolls months relative to its own start day
    let valid_to = resolve_window_instant(&valid[2], valid_from, valid_from.day())?;

    let concerning = concerning_regex()
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .ok_or_else(|| Error::mcd_malformed("no concerning text found"))?;

    let polygon = latlon::parse_latlon(text)
        .map_err(|e| Error::mcd_malformed(e.to_string()))?
        .ok_or_else(|| Error::mcd_malformed("no LAT...LON block found"))?;

    let watch_probability = probability_regex()
        .captures(text)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(0);

    let most_prob_tornado = optional_field(tornado_regex(), text);
    let most_prob_gust = optional_field(gust_regex(), text);
    let most_prob_hail = optional_field(hail_regex(), text);

    Ok(Mcd {
        number,
        valid_from,
        valid_to,
        concerning,
        polygon,
        watch_probability,
        most_prob_tornado,
        most_prob_gust,
        most_prob_hail,
    })
}

fn optional_field(regex: &Regex, text: &str) -> String {
    regex
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default()
}

/// Decode a `DDHHMM` window group against a reference instant
fn resolve_window_instant(
    group: &str,
    reference: DateTime<Utc>,
    reference_day: u32,
) -> Result<DateTime<Utc>> {
    let day: u32 = group[0..2].parse().unwrap_or_default();
    let hour: u32 = group[2..4].parse().unwrap_or_default();
    let minute: u32 = group[4..6].parse().unwrap_or_default();

    if !(1..=31).contains(&day) || hour > 23 || minute > 59 {
        return Err(Error::mcd_malformed(format!(
            "bad valid window group '{group}'"
        )));
    }

    issuance::resolve_compact_instant(reference, reference_day, day, hour, minute)
        .ok_or_else(|| Error::mcd_malformed(format!("bad valid window group '{group}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE_MCD: &str = "\
ACUS11 KWNS 021858
SWOMCD
SPC MCD 021857

Mesoscale Discussion 1234
NWS Storm Prediction Center Norman OK
0157 PM CDT Mon Jun 2 2025

Areas affected...portions of central Oklahoma

Concerning...Severe potential...Watch possible

Valid 021857Z - 022100Z

Probability of Watch Issuance...60 percent

SUMMARY...Supercells capable of large hail are expected to develop.

MOST PROBABLE PEAK TORNADO INTENSITY...85-115 MPH
MOST PROBABLE PEAK WIND GUST...55-70 MPH
MOST PROBABLE PEAK HAIL SIZE...1.00-1.75 IN

LAT...LON 3530 9735 3540 9658 3510 9640 3498 9723 3530 9735
";

    fn issued() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 18, 58, 0).unwrap()
    }

    #[test]
    fn test_parse_complete_mcd() {
        let mcd = parse_mcd(SAMPLE_MCD, issued()).unwrap();

        assert_eq!(mcd.number, 1234);
        assert_eq!(
            mcd.valid_from,
            Utc.with_ymd_and_hms(2025, 6, 2, 18, 57, 0).unwrap()
        );
        assert_eq!(
            mcd.valid_to,
            Utc.with_ymd_and_hms(2025, 6, 2, 21, 0, 0).unwrap()
        );
        assert_eq!(mcd.concerning, "Severe potential...Watch possible");
        assert_eq!(mcd.watch_probability, 60);
        assert_eq!(mcd.polygon.len(), 5);
        assert_eq!(mcd.most_prob_tornado, "85-115 MPH");
        assert_eq!(mcd.most_prob_gust, "55-70 MPH");
        assert_eq!(mcd.most_prob_hail, "1.00-1.75 IN");
    }

    #[test]
    fn test_optional_fields_degrade() {
        let text = SAMPLE_MCD
            .lines()
            .filter(|line| {
                !line.starts_with("Probability of Watch Issuance")
                    && !line.starts_with("MOST PROBABLE")
            })
            .collect::<Vec<_>>()
            .join("\n");

        let mcd = parse_mcd(&text, issued()).unwrap();
        assert_eq!(mcd.watch_probability, 0);
        assert!(mcd.most_prob_tornado.is_empty());
        assert!(mcd.most_prob_gust.is_empty());
        assert!(mcd.most_prob_hail.is_empty());
    }

    #[test]
    fn test_mandatory_fields_fail_parse() {
        let no_number = SAMPLE_MCD.replace("Mesoscale Discussion 1234", "");
        assert!(parse_mcd(&no_number, issued()).is_err());

        let no_valid = SAMPLE_MCD.replace("Valid 021857Z - 022100Z", "");
        assert!(parse_mcd(&no_valid, issued()).is_err());

        let no_concerning = SAMPLE_MCD.replace("Concerning...Severe potential...Watch possible", "");
        assert!(parse_mcd(&no_concerning, issued()).is_err());
    }

    #[test]
    fn test_valid_window_crossing_month_boundary() {
        let text = SAMPLE_MCD
            .replace("Valid 021857Z - 022100Z", "Valid 312330Z - 010130Z")
            .replace("Mesoscale Discussion 1234", "Mesoscale Discussion 0070");
        let issued = Utc.with_ymd_and_hms(2025, 1, 31, 23, 30, 0).unwrap();

        let mcd = parse_mcd(&text, issued).unwrap();
        assert_eq!(mcd.number, 70);
        assert_eq!(
            mcd.valid_from,
            Utc.with_ymd_and_hms(2025, 1, 31, 23, 30, 0).unwrap()
        );
        assert_eq!(
            mcd.valid_to,
            Utc.with_ymd_and_hms(2025, 2, 1, 1, 30, 0).unwrap()
        );
    }
}
