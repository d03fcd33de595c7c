//! Command-line argument definitions for the AWIPS processor
//!
//! This module defines the CLI interface using the clap derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the AWIPS text product processor
///
/// Parses NWS AWIPS text bulletins and reconciles the VTEC severe-weather
/// events they carry into canonical timelines.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "awips-processor",
    version,
    about = "Parse NWS AWIPS text bulletins and reconcile VTEC events",
    long_about = "Decodes AWIPS text products - WMO heading, issuance time, UGC zones, \
                  VTEC codes, warning polygons, storm motion and tags - and reconciles \
                  each VTEC code against a persisted event timeline through PostgreSQL."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands for the AWIPS processor
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Parse a single bulletin file and print the decoded product as JSON
    Parse(ParseArgs),
    /// Consume bulletin messages and reconcile VTEC events (main command)
    Serve(ServeArgs),
}

/// Arguments for the parse command
#[derive(Debug, Clone, Parser)]
pub struct ParseArgs {
    /// Path to a file containing one raw AWIPS bulletin
    #[arg(value_name = "FILE", help = "Bulletin file to decode")]
    pub file: PathBuf,

    /// Also decode the bulletin as a Mesoscale Discussion
    #[arg(long = "mcd", help = "Decode as a Mesoscale Discussion as well")]
    pub mcd: bool,
}

/// Arguments for the serve command
///
/// Messages arrive as NDJSON envelopes on stdin, one
/// `{"text": ..., "received_at": ...}` object per line - the transport's
/// exact payload, minus the transport.
#[derive(Debug, Clone, Parser)]
pub struct ServeArgs {
    /// PostgreSQL connection string; falls back to DATABASE_URL
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Maximum number of bulletins processed concurrently
    #[arg(long = "max-concurrent", value_name = "N")]
    pub max_concurrent: Option<usize>,
}
