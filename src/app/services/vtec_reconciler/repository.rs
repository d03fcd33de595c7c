//! Event repository contract
//!
//! The reconciler owns the state machine; the repository owns persistence
//! and the uniqueness guarantee on the event identity key. Two bulletins
//! for the same key must never both succeed in creating a row - the create
//! path rejects duplicates and the caller re-fetches.

use crate::app::models::vtec::{EventKey, VtecEvent};
use crate::app::models::ProductRecord;
use crate::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::RwLock;

/// Persistence collaborator for VTEC events and the product archive
pub trait EventRepository: Send + Sync {
    /// Look an event up by its identity key
    fn get_event_by_key(
        &self,
        key: &EventKey,
    ) -> impl Future<Output = Result<Option<VtecEvent>>> + Send;

    /// Look an event up by its repository-assigned id (read path for
    /// downstream consumers; the reconciler itself never needs it)
    fn get_event_by_id(&self, id: i64) -> impl Future<Output = Result<Option<VtecEvent>>> + Send;

    /// Create an event and return its assigned id.
    ///
    /// Must reject a duplicate create for an existing key with
    /// [`crate::Error::RepositoryConflict`]; the uniqueness guarantee is
    /// owned here, not by the caller.
    fn create_event(&self, event: &VtecEvent) -> impl Future<Output = Result<i64>> + Send;

    /// Persist the reconciler's time policy for an existing event
    fn update_event_times(
        &self,
        id: i64,
        expires: DateTime<Utc>,
        ends: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Archive a received product before any handler runs
    fn store_product(&self, record: &ProductRecord) -> impl Future<Output = Result<i64>> + Send;

    /// Verify the backing store is reachable
    fn health_check(&self) -> impl Future<Output = Result<()>> + Send;
}

/// In-process repository used by tests and offline parsing.
///
/// Uniqueness is enforced the same way the database enforces it: a create
/// for an existing key is rejected, never overwritten.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    inner: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i64,
    events: HashMap<EventKey, VtecEvent>,
    ids: HashMap<i64, EventKey>,
    products: Vec<ProductRecord>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events
    pub async fn event_count(&self) -> usize {
        self.inner.read().await.events.len()
    }

    /// Number of archived products
    pub async fn product_count(&self) -> usize {
        self.inner.read().await.products.len()
    }
}

impl EventRepository for MemoryRepository {
    async fn get_event_by_key(&self, key: &EventKey) -> Result<Option<VtecEvent>> {
        Ok(self.inner.read().await.events.get(key).cloned())
    }

    async fn get_event_by_id(&self, id: i64) -> Result<Option<VtecEvent>> {
        let state = self.inner.read().await;
        Ok(state
            .ids
            .get(&id)
            .and_then(|key| state.events.get(key))
            .cloned())
    }

    async fn create_event(&self, event: &VtecEvent) -> Result<i64> {
        let mut state = self.inner.write().await;

        if state.events.contains_key(&event.key) {
            return Err(crate::Error::repository_conflict(event.key.to_string()));
        }

        state.next_id += 1;
        let id = state.next_id;

        let mut stored = event.clone();
        stored.id = Some(id);
        stored.created_at = Some(Utc::now());
        stored.updated_at = stored.created_at;

        state.ids.insert(id, stored.key.clone());
        state.events.insert(stored.key.clone(), stored);
        Ok(id)
    }

    async fn update_event_times(
        &self,
        id: i64,
        expires: DateTime<Utc>,
        ends: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.inner.write().await;

        let key = state
            .ids
            .get(&id)
            .cloned()
            .ok_or_else(|| crate::Error::repository(format!("no event with id {id}")))?;

        if let Some(event) = state.events.get_mut(&key) {
            event.expires = expires;
            event.ends = ends;
            event.updated_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn store_product(&self, record: &ProductRecord) -> Result<i64> {
        let mut state = self.inner.write().await;
        state.products.push(record.clone());
        Ok(state.products.len() as i64)
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
