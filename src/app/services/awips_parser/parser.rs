//! Product assembly orchestration
//!
//! Combines the header parsers, the issuance resolver and the segmenter
//! into one structured [`TextProduct`]. Definitions follow NWS Directive
//! 10-1701.

use super::{header, issuance, segmenter, wmo};
use crate::app::models::TextProduct;
use crate::constants::timezone_table;
use crate::Result;
use chrono::FixedOffset;
use std::collections::HashMap;
use tracing::{debug, info};

/// AWIPS text product parser
///
/// Holds the immutable timezone table the issuance resolver needs; parsing
/// itself is a pure function of the bulletin text.
#[derive(Debug)]
pub struct AwipsParser {
    timezones: HashMap<&'static str, FixedOffset>,
}

impl Default for AwipsParser {
    fn default() -> Self {
        Self::new()
    }
}

impl AwipsParser {
    /// Create a parser with the standard timezone table
    pub fn new() -> Self {
        Self {
            timezones: timezone_table(),
        }
    }

    /// Parse a raw bulletin into a structured product.
    ///
    /// Fails when the WMO heading or AWIPS identifier is missing, or when a
    /// present issuance line does not resolve; every such failure aborts the
    /// whole bulletin. Segment-level problems degrade per segment instead.
    pub fn parse(&self, text: &str) -> Result<TextProduct> {
        let wmo = wmo::parse_wmo(text)?;

        // No point continuing without an AWIPS identifier: the product
        // cannot be routed or archived
        let awips = header::parse_awips(text)?;

        let resolved = issuance::resolve_issuance(text, &self.timezones)?;
        if resolved.degraded {
            info!(
                awips = %awips.raw,
                "product has no issuance line; defaulting to now (UTC)"
            );
        }

        let segments = segmenter::split_segments(text, resolved.time, &wmo);
        debug!(awips = %awips.raw, segments = segments.len(), "assembled product");

        Ok(TextProduct {
            text: text.to_string(),
            office: wmo.office.clone(),
            product_code: awips.product_code.clone(),
            issued: resolved.time,
            issuance_degraded: resolved.degraded,
            wmo,
            awips,
            segments,
        })
    }
}
