//! AWIPS product identifier parser
//!
//! The identifier is a line of four to six upper-case alphanumerics on its
//! own: a three-character product category followed by the issuing office.
//! A bulletin without one is discarded entirely.

use crate::app::models::AwipsHeader;
use crate::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;

fn awips_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[A-Z0-9]{4,6}[ ]*$").expect("AWIPS regex is valid"))
}

/// Parse the AWIPS product identifier out of product text.
///
/// Fails with [`Error::HeaderMissing`] when no identifier line is found.
pub fn parse_awips(text: &str) -> Result<AwipsHeader> {
    let raw = awips_regex()
        .find(text)
        .map(|m| m.as_str().trim().to_string())
        .ok_or(Error::HeaderMissing)?;

    // Product category is the first three characters, office the remainder
    let product_code = raw[0..3].trim().to_string();
    let office = raw[3..].trim().to_string();

    Ok(AwipsHeader {
        raw,
        product_code,
        office,
    })
}

/// Whether the text contains an AWIPS identifier at all
pub fn has_awips(text: &str) -> bool {
    awips_regex().is_match(text)
}
