//! AWIPS Processor Library
//!
//! A Rust library for parsing NWS AWIPS text bulletins and reconciling the
//! Valid Time Event Codes (VTEC) they carry into canonical severe-weather
//! event timelines.
//!
//! This library provides tools for:
//! - Decoding WMO abbreviated headings and AWIPS product identifiers
//! - Resolving human-readable issuance lines to UTC instants
//! - Segmenting bulletins and decoding UGC, VTEC, LAT...LON, TML and tag lines
//! - Decoding Mesoscale Discussion products
//! - Reconciling VTEC codes against persisted events through a repository
//! - Comprehensive error handling and recovery

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod awips_parser;
        pub mod dispatch;
        pub mod mcd_parser;
        pub mod pipeline;
        pub mod vtec_reconciler;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::vtec::{EventKey, VtecAction, VtecClass, VtecCode, VtecEvent};
pub use app::models::{Segment, TextProduct};
pub use config::Config;

/// Result type alias for the AWIPS processor
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for AWIPS parsing and VTEC reconciliation
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// No AWIPS product identifier line was found; the bulletin is discarded
    #[error("no AWIPS header found in product text")]
    HeaderMissing,

    /// No WMO abbreviated heading was found
    #[error("no WMO heading found in product text")]
    WmoMissing,

    /// An issuance line was found but could not be resolved to an instant
    #[error("could not parse issuance line: '{line}'")]
    TimeUnparseable { line: String },

    /// The issuance line names a timezone abbreviation outside the fixed table
    #[error("unknown timezone abbreviation '{abbreviation}' in issuance line")]
    TimezoneUnknown { abbreviation: String },

    /// A UGC zone block was found but failed to decode
    #[error("malformed UGC block: {message}")]
    UgcMalformed { message: String },

    /// A VTEC code line failed to decode
    #[error("malformed VTEC code '{raw}': {message}")]
    VtecMalformed { raw: String, message: String },

    /// A LAT...LON block was found but failed to decode
    #[error("malformed LAT...LON block: {message}")]
    PolygonMalformed { message: String },

    /// A TIME...MOT...LOC line was found but failed to decode
    #[error("malformed TML line: {message}")]
    TmlMalformed { message: String },

    /// A Mesoscale Discussion product is missing a mandatory field
    #[error("malformed Mesoscale Discussion: {message}")]
    McdMalformed { message: String },

    /// A repository call exceeded its deadline; the current update is dropped
    #[error("repository deadline exceeded during {operation}")]
    RepositoryTimeout { operation: String },

    /// A concurrent writer created the event first
    #[error("event already exists for key {key}")]
    RepositoryConflict { key: String },

    /// Repository/driver failure
    #[error("repository error: {message}")]
    Repository {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create an unparseable-issuance-line error
    pub fn time_unparseable(line: impl Into<String>) -> Self {
        Self::TimeUnparseable { line: line.into() }
    }

    /// Create an unknown-timezone error
    pub fn timezone_unknown(abbreviation: impl Into<String>) -> Self {
        Self::TimezoneUnknown {
            abbreviation: abbreviation.into(),
        }
    }

    /// Create a malformed-UGC error
    pub fn ugc_malformed(message: impl Into<String>) -> Self {
        Self::UgcMalformed {
            message: message.into(),
        }
    }

    /// Create a malformed-VTEC error
    pub fn vtec_malformed(raw: impl Into<String>, message: impl Into<String>) -> Self {
        Self::VtecMalformed {
            raw: raw.into(),
            message: message.into(),
        }
    }

    /// Create a malformed-polygon error
    pub fn polygon_malformed(message: impl Into<String>) -> Self {
        Self::PolygonMalformed {
            message: message.into(),
        }
    }

    /// Create a malformed-TML error
    pub fn tml_malformed(message: impl Into<String>) -> Self {
        Self::TmlMalformed {
            message: message.into(),
        }
    }

    /// Create a malformed-MCD error
    pub fn mcd_malformed(message: impl Into<String>) -> Self {
        Self::McdMalformed {
            message: message.into(),
        }
    }

    /// Create a repository-timeout error
    pub fn repository_timeout(operation: impl Into<String>) -> Self {
        Self::RepositoryTimeout {
            operation: operation.into(),
        }
    }

    /// Create a repository-conflict error
    pub fn repository_conflict(key: impl Into<String>) -> Self {
        Self::RepositoryConflict { key: key.into() }
    }

    /// Create a repository error with context
    pub fn repository(message: impl Into<String>) -> Self {
        Self::Repository {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Whether this error aborts the whole bulletin rather than a single
    /// segment or code
    pub fn aborts_bulletin(&self) -> bool {
        matches!(
            self,
            Self::HeaderMissing
                | Self::WmoMissing
                | Self::TimeUnparseable { .. }
                | Self::TimezoneUnknown { .. }
        )
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(error: sqlx::Error) -> Self {
        Self::Repository {
            message: "database operation failed".to_string(),
            source: Some(Box::new(error)),
        }
    }
}
