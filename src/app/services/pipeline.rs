//! Bulletin processing pipeline
//!
//! Consumes delivered messages, parses each bulletin on its own task and
//! drives the matched handlers. Delivery is unordered and at-least-once;
//! nothing here assumes otherwise. Cancellation applies only before a task
//! starts - in-flight bulletins drain on shutdown.

use crate::app::models::ProductRecord;
use crate::app::services::awips_parser::AwipsParser;
use crate::app::services::dispatch::{self, RouteTarget};
use crate::app::services::mcd_parser;
use crate::app::services::vtec_reconciler::{EventRepository, VtecReconciler};
use crate::{Config, Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// The transport's message envelope: a raw bulletin plus its receipt time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductMessage {
    #[serde(alias = "Text")]
    pub text: String,

    #[serde(alias = "ReceivedAt")]
    pub received_at: DateTime<Utc>,
}

/// The bulletin pipeline: parser, route dispatch and reconciler
#[derive(Debug)]
pub struct Pipeline<R> {
    parser: AwipsParser,
    reconciler: VtecReconciler<R>,
    repo: Arc<R>,
    config: Config,
}

impl<R: EventRepository + 'static> Pipeline<R> {
    pub fn new(repo: Arc<R>, config: Config) -> Self {
        Self {
            parser: AwipsParser::new(),
            reconciler: VtecReconciler::new(Arc::clone(&repo), config.repository_deadline()),
            repo,
            config,
        }
    }

    /// Process one bulletin end to end: parse, archive, dispatch.
    ///
    /// Bulletin-aborting parse failures surface as errors; everything below
    /// the bulletin level degrades internally per segment or per code.
    pub async fn handle(&self, text: &str, received_at: DateTime<Utc>) -> Result<()> {
        let product = self.parser.parse(text)?;

        let routes = dispatch::matching_routes(&product);
        if routes.is_empty() {
            debug!(awips = %product.awips.raw, "no routes matched, product will not be stored");
            return Ok(());
        }

        // Archive the product before any handler runs
        let record = ProductRecord::from_product(&product, received_at);
        match timeout(
            self.config.repository_deadline(),
            self.repo.store_product(&record),
        )
        .await
        {
            Ok(Ok(_)) => debug!(product = %record.product_id, "archived product"),
            Ok(Err(e)) => {
                error!(product = %record.product_id, "failed to archive product: {e}");
                return Err(e);
            }
            Err(_) => {
                let e = Error::repository_timeout("product archive");
                error!(product = %record.product_id, "{e}");
                return Err(e);
            }
        }

        for route in routes {
            debug!(route = route.name, product = %record.product_id, "dispatching product");
            match route.target {
                RouteTarget::VtecReconcile => {
                    self.reconciler.handle_product(&product).await;
                }
                RouteTarget::McdDecode => {
                    match mcd_parser::parse_mcd(&product.text, product.issued) {
                        Ok(mcd) => info!(
                            number = mcd.number,
                            concerning = %mcd.concerning,
                            watch_probability = mcd.watch_probability,
                            "decoded Mesoscale Discussion"
                        ),
                        Err(e) => error!(product = %record.product_id, "{e}"),
                    }
                }
            }
        }

        Ok(())
    }

    /// Consume messages until the channel closes or shutdown is requested.
    ///
    /// Each message is processed on its own task, capped by the configured
    /// concurrency limit. There is no ordering guarantee across tasks; the
    /// reconciler's per-key locks provide the only cross-task coordination.
    pub async fn run(self: Arc<Self>, mut rx: mpsc::Receiver<ProductMessage>, cancel: CancellationToken) {
        let limit = Arc::new(Semaphore::new(self.config.max_concurrent_bulletins));
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("shutdown requested, draining in-flight bulletins");
                    break;
                }
                message = rx.recv() => {
                    let Some(message) = message else {
                        debug!("message channel closed");
                        break;
                    };

                    // Reap whatever has already finished
                    while tasks.try_join_next().is_some() {}

                    let Ok(permit) = Arc::clone(&limit).acquire_owned().await else {
                        break;
                    };
                    let pipeline = Arc::clone(&self);
                    tasks.spawn(async move {
                        let _permit = permit;
                        match pipeline.handle(&message.text, message.received_at).await {
                            Ok(()) => {}
                            Err(Error::HeaderMissing) => {
                                info!("AWIPS header not found, product will not be stored");
                            }
                            Err(e) if e.aborts_bulletin() => warn!("bulletin aborted: {e}"),
                            Err(e) => warn!("failed to handle product: {e}"),
                        }
                    });
                }
            }
        }

        while tasks.join_next().await.is_some() {}
    }
}
