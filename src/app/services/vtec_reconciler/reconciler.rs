//! VTEC event reconciliation
//!
//! Stitches an unordered, at-least-once stream of bulletins into one event
//! row per identity key. Per key the state machine runs absent -> open ->
//! closed; concurrent bulletins sharing a key are serialized by a per-key
//! lock while different keys proceed fully in parallel. Repository calls
//! are deadline-bounded: a timeout abandons only the current code's update,
//! and the next bulletin for the key re-drives the machine.

use super::repository::EventRepository;
use crate::app::models::vtec::{VtecAction, VtecClass, VtecCode, VtecEvent};
use crate::app::models::{Segment, TextProduct};
use crate::{Error, Result};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info};

/// The VTEC event reconciler
#[derive(Debug)]
pub struct VtecReconciler<R> {
    repo: Arc<R>,
    deadline: Duration,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<R: EventRepository> VtecReconciler<R> {
    /// Create a reconciler over a repository with the given call deadline
    pub fn new(repo: Arc<R>, deadline: Duration) -> Self {
        Self {
            repo,
            deadline,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Reconcile every VTEC code in an assembled product.
    ///
    /// Failures are per code: a repository timeout or conflict on one code
    /// never raises past its own bulletin.
    pub async fn handle_product(&self, product: &TextProduct) {
        for (index, segment) in product.segments.iter().enumerate() {
            if !segment.has_vtec() {
                debug!("product segment {index} has no VTECs, skipping");
                continue;
            }

            for code in &segment.vtec {
                // Test and routine codes never create or mutate events
                if code.class == VtecClass::Test || code.action == VtecAction::Routine {
                    continue;
                }

                let guard = self.key_lock(&code.key().to_string());
                let _held = guard.lock().await;

                if let Err(e) = self.reconcile_code(code, product, segment).await {
                    error!(vtec = %code.raw, "failed to reconcile VTEC event: {e}");
                }
            }
        }
    }

    /// The per-key serialization point: one lock per identity key
    fn key_lock(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Find or create the event for a code, then apply the action policy
    async fn reconcile_code(
        &self,
        code: &VtecCode,
        product: &TextProduct,
        segment: &Segment,
    ) -> Result<()> {
        let key = code.key();

        let existing = self
            .with_deadline("event lookup", self.repo.get_event_by_key(&key))
            .await?;

        let event = match existing {
            Some(event) => event,
            None => {
                let mut event = build_event(code, product, segment);
                match self
                    .with_deadline("event create", self.repo.create_event(&event))
                    .await
                {
                    Ok(id) => {
                        info!(key = %key, title = %event.title, "created VTEC event");
                        event.id = Some(id);
                        event
                    }
                    Err(Error::RepositoryConflict { .. }) => {
                        // A concurrent bulletin created the row first;
                        // re-check and fall through to the update path
                        self.with_deadline("event re-lookup", self.repo.get_event_by_key(&key))
                            .await?
                            .ok_or_else(|| {
                                Error::repository(format!("event {key} vanished after conflict"))
                            })?
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        let id = event
            .id
            .ok_or_else(|| Error::repository(format!("event {key} has no id")))?;

        let mut event = event;
        apply_action(&mut event, code, product, segment);

        self.with_deadline(
            "event time update",
            self.repo.update_event_times(id, event.expires, event.ends),
        )
        .await
    }

    async fn with_deadline<T>(
        &self,
        operation: &str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        timeout(self.deadline, call)
            .await
            .map_err(|_| Error::repository_timeout(operation))?
    }
}

/// Build a fresh event from the first non-test, non-routine code for a key.
///
/// The VTEC window may leave either bound absent: the start defaults to the
/// product's issuance and the end to the segment's resolved expiry. These
/// defaults apply once, here, and are never re-applied on later updates.
pub fn build_event(code: &VtecCode, product: &TextProduct, segment: &Segment) -> VtecEvent {
    let starts = code.start.unwrap_or(product.issued);
    let end = code.end.unwrap_or(segment.expires);
    let is_emergency = segment.is_emergency();

    VtecEvent {
        id: None,
        key: code.key(),
        created_at: None,
        updated_at: None,
        issued: product.issued,
        starts,
        expires: segment.expires,
        ends: end,
        end_initial: end,
        class: code.class.clone(),
        title: code.title(is_emergency),
        is_emergency,
        is_pds: segment.is_pds(),
        polygon_start: segment.latlon.clone(),
    }
}

/// Apply the action-driven time policy to an open event.
///
/// CAN/UPG close at the closing bulletin's issuance; EXP closes at the
/// code's end; EXT/EXB move the end while the segment expiry stays
/// authoritative for `expires`; everything else (NEW, CON and the
/// unrecognized actions they stand in for) extends monotonically and never
/// moves a bound backwards.
pub fn apply_action(
    event: &mut VtecEvent,
    code: &VtecCode,
    product: &TextProduct,
    segment: &Segment,
) {
    let end = code.end.unwrap_or(segment.expires);

    match code.action {
        VtecAction::Cancelled | VtecAction::Upgraded => {
            event.expires = segment.expires;
            event.ends = product.issued;
        }
        VtecAction::Expired => {
            event.expires = end;
            event.ends = end;
        }
        VtecAction::ExtendedTime | VtecAction::ExtendedBoth => {
            event.ends = end;
            event.expires = segment.expires;
        }
        _ => {
            if event.ends < end {
                event.ends = end;
            }
            if event.expires < segment.expires {
                event.expires = segment.expires;
            }
        }
    }
}
