//! Data models for AWIPS text products
//!
//! This module contains the core data structures for representing parsed
//! AWIPS text bulletins: the WMO heading, the AWIPS product identifier, the
//! segment tree and its hazard payloads. Definitions follow NWS Directive
//! 10-1701.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

pub mod vtec;

use vtec::VtecCode;

// =============================================================================
// Headers
// =============================================================================

/// WMO abbreviated heading: `TTAAII CCCC DDHHMM( BBB)?`
///
/// The six-digit group carries only day, hour and minute; the month and year
/// are inferred from receipt context further down the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WmoHeading {
    /// The heading line exactly as matched
    pub raw: String,

    /// Data-type designator (e.g. "WFUS54")
    pub data_type: String,

    /// Issuing office (e.g. "KFFC")
    pub office: String,

    /// Issuance day of month (01..31)
    pub day: u32,

    /// Issuance hour (00..23)
    pub hour: u32,

    /// Issuance minute (00..59)
    pub minute: u32,

    /// Optional amendment indicator (BBB group, e.g. "CCA", "RRB")
    pub bbb: Option<String>,
}

/// AWIPS product identifier: 3-character product code + 3-character office
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwipsHeader {
    /// The identifier line exactly as matched (e.g. "TORFFC")
    pub raw: String,

    /// Product category (e.g. "TOR")
    pub product_code: String,

    /// Issuing office portion (e.g. "FFC")
    pub office: String,
}

// =============================================================================
// Segment Payloads
// =============================================================================

/// Universal Geographic Code block: affected zones plus a compact expiry.
///
/// The expiry carries only day, hour and minute; month and year are resolved
/// against the product's issuance date by the segmenter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ugc {
    /// The UGC block exactly as matched
    pub raw: String,

    /// Affected zone codes (e.g. "GAC121"), deduplicated
    pub zones: BTreeSet<String>,

    /// Expiry day of month
    pub day: u32,

    /// Expiry hour
    pub hour: u32,

    /// Expiry minute
    pub minute: u32,
}

/// Polygon decoded from a LAT...LON block, as ordered (lon, lat) pairs in
/// decimal degrees. Ring closure is not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<(f64, f64)>,
}

impl Polygon {
    /// Number of vertices
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the polygon has no vertices
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Storm motion vector from a TIME...MOT...LOC line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tml {
    /// The TML line exactly as matched
    pub raw: String,

    /// Reference instant (hour/minute combined with the issuance date)
    pub time: DateTime<Utc>,

    /// Storm bearing in degrees
    pub direction: u16,

    /// Speed value parsed out of the speed token
    pub speed: i32,

    /// The verbatim speed token, unit suffix included (e.g. "25KT")
    pub speed_text: String,

    /// Track points as (lon, lat) pairs
    pub track: Vec<(f64, f64)>,
}

// =============================================================================
// Segment
// =============================================================================

/// A text product segment: the unit of hazard data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// Segment text, trimmed
    pub text: String,

    /// VTEC codes carried by this segment (zero to many)
    pub vtec: Vec<VtecCode>,

    /// UGC zone block, if present
    pub ugc: Option<Ugc>,

    /// Concrete segment expiry resolved against the issuance date
    pub expires: DateTime<Utc>,

    /// Warning polygon, if present
    pub latlon: Option<Polygon>,

    /// LABEL...VALUE annotation tags; absence of any tag is normal
    pub tags: HashMap<String, String>,

    /// Storm motion vector, if present
    pub tml: Option<Tml>,
}

fn emergency_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(TORNADO|FLASH\s+FLOOD)\s+EMERGENCY").expect("emergency regex is valid")
    })
}

fn pds_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(THIS\s+IS\s+A|This\s+is\s+a)\s+PARTICULARLY\s+DANGEROUS\s+SITUATION")
            .expect("PDS regex is valid")
    })
}

impl Segment {
    /// Whether this segment carries at least one VTEC code
    pub fn has_vtec(&self) -> bool {
        !self.vtec.is_empty()
    }

    /// Whether this segment carries a UGC block
    pub fn has_ugc(&self) -> bool {
        self.ugc.is_some()
    }

    /// Whether the segment declares a tornado or flash flood emergency
    pub fn is_emergency(&self) -> bool {
        emergency_regex().is_match(&self.text)
    }

    /// Whether the segment declares a Particularly Dangerous Situation
    pub fn is_pds(&self) -> bool {
        pds_regex().is_match(&self.text)
    }
}

// =============================================================================
// Text Product
// =============================================================================

/// A fully assembled AWIPS text product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextProduct {
    /// Raw bulletin text
    pub text: String,

    /// WMO abbreviated heading
    pub wmo: WmoHeading,

    /// AWIPS product identifier
    pub awips: AwipsHeader,

    /// Resolved issuance instant (UTC)
    pub issued: DateTime<Utc>,

    /// True when no issuance line was present and `issued` defaulted to now
    pub issuance_degraded: bool,

    /// Issuing office, from the WMO heading
    pub office: String,

    /// Product category, from the AWIPS identifier
    pub product_code: String,

    /// Ordered segments
    pub segments: Vec<Segment>,
}

fn correction_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r".{3}(RESENT|RETRANSMITTED|CORRECTED)").expect("correction regex is valid")
    })
}

impl TextProduct {
    /// Derived product identity, used downstream for dedupe and correction
    /// detection:
    /// `{issuanceUTC:%Y%m%d%H%M}-{office}-{wmoDataType}-{awipsOriginal}`
    /// with the amendment code appended when the heading carries one.
    pub fn product_id(&self) -> String {
        let mut id = format!(
            "{}-{}-{}-{}",
            self.issued.format("%Y%m%d%H%M"),
            self.office,
            self.wmo.data_type,
            self.awips.raw,
        );
        if let Some(bbb) = &self.wmo.bbb {
            id.push('-');
            id.push_str(bbb);
        }
        id
    }

    /// Whether this bulletin is a correction or retransmission of an earlier
    /// one: a RESENT/RETRANSMITTED/CORRECTED marker near the start of the
    /// body, or an amendment code beginning with 'A' or 'C'
    pub fn is_correction(&self) -> bool {
        if correction_regex().is_match(&self.text) {
            return true;
        }
        matches!(
            self.wmo.bbb.as_deref().and_then(|bbb| bbb.chars().next()),
            Some('A') | Some('C')
        )
    }

    /// Whether any segment carries a VTEC code
    pub fn has_vtec(&self) -> bool {
        self.segments.iter().any(Segment::has_vtec)
    }
}

// =============================================================================
// Product Archive Record
// =============================================================================

/// Archive row for a received product, stored before any handler runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Derived product identity string
    pub product_id: String,

    /// When the transport delivered the bulletin
    pub received_at: DateTime<Utc>,

    /// Resolved issuance instant
    pub issued: DateTime<Utc>,

    /// Issuing office from the AWIPS identifier
    pub source: String,

    /// Raw bulletin text
    pub data: String,

    /// WMO data-type designator
    pub wmo: String,

    /// AWIPS identifier as matched
    pub awips: String,

    /// Amendment code, empty when absent
    pub bbb: String,
}

impl ProductRecord {
    /// Build the archive record for an assembled product
    pub fn from_product(product: &TextProduct, received_at: DateTime<Utc>) -> Self {
        Self {
            product_id: product.product_id(),
            received_at,
            issued: product.issued,
            source: product.awips.office.clone(),
            data: product.text.clone(),
            wmo: product.wmo.data_type.clone(),
            awips: product.awips.raw.clone(),
            bbb: product.wmo.bbb.clone().unwrap_or_default(),
        }
    }
}
