//! AWIPS text product parser
//!
//! A fixed-grammar decoder for NWS AWIPS text bulletins. Parsing is
//! synchronous and side-effect-free: a pure function of the bulletin text
//! and its receipt time.
//!
//! ## Architecture
//!
//! The parser is organized into leaf decoders with no dependencies on each
//! other, composed by the segmenter and the product assembler:
//! - [`wmo`] - WMO abbreviated heading
//! - [`header`] - AWIPS product identifier
//! - [`issuance`] - issuance line resolution against the fixed timezone table
//! - [`ugc`] - geographic zone lists and compact expiries
//! - [`vtec`] - P-VTEC hazard codes
//! - [`latlon`] - warning polygons
//! - [`tml`] - storm motion vectors
//! - [`tags`] - LABEL...VALUE annotation lines
//! - [`segmenter`] - `$$` segmentation and per-segment fan-out
//! - [`parser`] - product assembly orchestration

pub mod header;
pub mod issuance;
pub mod latlon;
pub mod parser;
pub mod segmenter;
pub mod tags;
pub mod tml;
pub mod ugc;
pub mod vtec;
pub mod wmo;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use issuance::Issuance;
pub use parser::AwipsParser;
