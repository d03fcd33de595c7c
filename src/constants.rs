//! Application constants for the AWIPS processor
//!
//! This module contains the fixed tables, default values and product
//! routing vocabulary used throughout the AWIPS processor.

use chrono::FixedOffset;
use std::collections::HashMap;

// =============================================================================
// Segmentation
// =============================================================================

/// Token terminating a product segment
pub const SEGMENT_TERMINATOR: &str = "$$";

/// Segments shorter than this after trimming are trailing boilerplate
pub const MIN_SEGMENT_LENGTH: usize = 20;

// =============================================================================
// Product Routing
// =============================================================================

/// AWIPS product codes that carry VTEC hazard information
pub const VTEC_PRODUCT_CODES: &[&str] = &[
    "MWW", "FWW", "CFW", "TCV", "RFW", "FFA", "SVR", "TOR", "SVS", "SMW", "MWS", "NPW", "WCN",
    "WSW", "EWW", "FLS",
];

/// AWIPS identifier carried by Mesoscale Discussion products
pub const MCD_PRODUCT_CODE: &str = "SWOMCD";

// =============================================================================
// Reconciliation Defaults
// =============================================================================

/// Deadline for a single repository call, in seconds
pub const REPOSITORY_DEADLINE_SECS: u64 = 10;

/// Startup health-check deadline, in seconds
pub const HEALTH_CHECK_DEADLINE_SECS: u64 = 5;

// =============================================================================
// Timezones
// =============================================================================

const HOUR: i32 = 3600;

/// Fixed UTC offsets for the timezone abbreviations NWS products use.
///
/// There is deliberately no daylight-saving calendar here: products name the
/// abbreviation that is in force, so each abbreviation maps to exactly one
/// offset. Built once at startup and passed to the issuance resolver.
pub fn timezone_table() -> HashMap<&'static str, FixedOffset> {
    // Offsets are all whole hours, so the unwraps cannot fail
    let entries: &[(&str, i32)] = &[
        ("GMT", 0),
        ("UTC", 0),
        ("AST", -4),
        ("EST", -5),
        ("EDT", -4),
        ("CST", -6),
        ("CDT", -5),
        ("MST", -7),
        ("MDT", -6),
        ("PST", -8),
        ("PDT", -7),
        ("AKST", -9),
        ("AKDT", -8),
        ("HST", -10),
        ("SST", -11),
        ("CHST", 10),
    ];

    entries
        .iter()
        .filter_map(|&(name, hours)| FixedOffset::east_opt(hours * HOUR).map(|off| (name, off)))
        .collect()
}

// =============================================================================
// Tag Catalog
// =============================================================================

/// The fixed catalog of "LABEL...VALUE" annotation labels scanned for in
/// warning segments
pub const TAG_LABELS: &[&str] = &[
    "HAIL",
    "WIND",
    "TORNADO",
    "WATERSPOUT",
    "TORNADO DAMAGE THREAT",
    "THUNDERSTORM DAMAGE THREAT",
    "FLASH FLOOD",
    "FLASH FLOOD DAMAGE THREAT",
    "EXPECTED RAINFALL",
    "DAM FAILURE",
    "SNOW SQUALL",
    "SNOW SQUALL IMPACT",
];

// =============================================================================
// Helper Functions
// =============================================================================

/// Check whether an AWIPS product code routes to the VTEC reconciler
pub fn is_vtec_product(product_code: &str) -> bool {
    VTEC_PRODUCT_CODES.contains(&product_code)
}
