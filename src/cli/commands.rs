//! Command implementations for the AWIPS processor CLI
//!
//! Connection management lives here, at the binary edge; the core only ever
//! sees the repository trait and the message envelope.

use crate::app::services::awips_parser::AwipsParser;
use crate::app::services::mcd_parser;
use crate::app::services::pipeline::{Pipeline, ProductMessage};
use crate::app::services::vtec_reconciler::{EventRepository, PostgresRepository};
use crate::cli::args::{Args, Commands, ParseArgs, ServeArgs};
use crate::constants::HEALTH_CHECK_DEADLINE_SECS;
use crate::{Config, Error, Result};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Run the selected command
pub async fn run(args: Args, cancel: CancellationToken) -> Result<()> {
    match args.command {
        Some(Commands::Parse(parse_args)) => run_parse(parse_args).await,
        Some(Commands::Serve(serve_args)) => run_serve(serve_args, cancel).await,
        None => Ok(()),
    }
}

/// Decode one bulletin file and print the product as JSON
async fn run_parse(args: ParseArgs) -> Result<()> {
    let text = tokio::fs::read_to_string(&args.file)
        .await
        .map_err(|e| Error::io(format!("failed to read {}", args.file.display()), e))?;

    let parser = AwipsParser::new();
    let product = parser.parse(&text)?;

    let json = serde_json::to_string_pretty(&product)
        .map_err(|e| Error::configuration(format!("failed to encode product: {e}")))?;
    println!("{json}");

    if args.mcd {
        let mcd = mcd_parser::parse_mcd(&product.text, product.issued)?;
        let json = serde_json::to_string_pretty(&mcd)
            .map_err(|e| Error::configuration(format!("failed to encode MCD: {e}")))?;
        println!("{json}");
    }

    Ok(())
}

/// Consume message envelopes from stdin and reconcile VTEC events
async fn run_serve(args: ServeArgs, cancel: CancellationToken) -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(url) = args.database_url {
        config.database_url = Some(url);
    }
    if let Some(max) = args.max_concurrent {
        config = config.with_max_concurrent_bulletins(max);
        config.validate()?;
    }

    let database_url = config
        .database_url
        .clone()
        .ok_or_else(|| Error::configuration("DATABASE_URL is not set"))?;

    // Startup is the only place a connection failure is fatal
    let pool = PgPoolOptions::new()
        .max_connections(config.max_concurrent_bulletins as u32)
        .connect(&database_url)
        .await?;
    let repo = Arc::new(PostgresRepository::new(pool));

    timeout(
        Duration::from_secs(HEALTH_CHECK_DEADLINE_SECS),
        repo.health_check(),
    )
    .await
    .map_err(|_| Error::repository_timeout("startup health check"))??;
    info!("*** database connected ***");

    let pipeline = Arc::new(Pipeline::new(repo, config));
    let (tx, rx) = mpsc::channel::<ProductMessage>(64);

    // Feed the pipeline from stdin: one JSON envelope per line
    let reader_cancel = cancel.clone();
    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                _ = reader_cancel.cancelled() => break,
                line = lines.next_line() => {
                    let Ok(Some(line)) = line else { break };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<ProductMessage>(&line) {
                        Ok(message) => {
                            if tx.send(message).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("discarding undecodable message envelope: {e}"),
                    }
                }
            }
        }
    });

    info!("*** consumer listening ***");
    pipeline.run(rx, cancel).await;

    if let Err(e) = reader.await {
        error!("stdin reader task failed: {e}");
    }

    Ok(())
}
