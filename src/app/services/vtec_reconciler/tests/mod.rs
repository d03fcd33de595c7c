//! Test fixtures and fake repositories for reconciler testing

use crate::app::models::vtec::{
    Phenomena, Significance, VtecAction, VtecClass, VtecCode,
};
use crate::app::models::{AwipsHeader, ProductRecord, Segment, TextProduct, WmoHeading};
use crate::app::services::vtec_reconciler::repository::{EventRepository, MemoryRepository};
use crate::app::models::vtec::{EventKey, VtecEvent};
use crate::Result;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

mod reconciler_tests;

pub fn base_issued() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 15, 58, 0).unwrap()
}

pub fn base_expires() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 16, 45, 0).unwrap()
}

/// Build a code against the fixed test identity KFFC.TO.W.0045.2024
pub fn make_code(
    action: VtecAction,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> VtecCode {
    VtecCode {
        raw: format!("/O.{}.KFFC.TO.W.0045.../", action.code()),
        class: VtecClass::Operational,
        action,
        office: "KFFC".to_string(),
        phenomena: Phenomena::Tornado,
        significance: Significance::Warning,
        event_number: 45,
        year: 2024,
        start,
        end,
    }
}

pub fn make_segment(expires: DateTime<Utc>, vtec: Vec<VtecCode>) -> Segment {
    Segment {
        text: "A warning segment used by reconciler tests".to_string(),
        vtec,
        ugc: None,
        expires,
        latlon: None,
        tags: HashMap::new(),
        tml: None,
    }
}

pub fn make_product(issued: DateTime<Utc>, segments: Vec<Segment>) -> TextProduct {
    TextProduct {
        text: "test product".to_string(),
        wmo: WmoHeading {
            raw: "WFUS52 KFFC 011558".to_string(),
            data_type: "WFUS52".to_string(),
            office: "KFFC".to_string(),
            day: 1,
            hour: 15,
            minute: 58,
            bbb: None,
        },
        awips: AwipsHeader {
            raw: "TORFFC".to_string(),
            product_code: "TOR".to_string(),
            office: "FFC".to_string(),
        },
        issued,
        issuance_degraded: false,
        office: "KFFC".to_string(),
        product_code: "TOR".to_string(),
        segments,
    }
}

/// One bulletin carrying one code for the test identity
pub fn single_code_product(
    action: VtecAction,
    issued: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    expires: DateTime<Utc>,
) -> TextProduct {
    let code = make_code(action, Some(base_issued()), end);
    make_product(issued, vec![make_segment(expires, vec![code])])
}

pub fn minutes(n: i64) -> ChronoDuration {
    ChronoDuration::minutes(n)
}

/// Repository whose update path stalls past any reasonable deadline when
/// armed, for pinning timeout behavior
#[derive(Debug, Default)]
pub struct StallingRepository {
    pub inner: MemoryRepository,
    pub stall_updates: AtomicBool,
}

impl StallingRepository {
    pub fn arm(&self) {
        self.stall_updates.store(true, Ordering::SeqCst);
    }
}

impl EventRepository for StallingRepository {
    async fn get_event_by_key(&self, key: &EventKey) -> Result<Option<VtecEvent>> {
        self.inner.get_event_by_key(key).await
    }

    async fn get_event_by_id(&self, id: i64) -> Result<Option<VtecEvent>> {
        self.inner.get_event_by_id(id).await
    }

    async fn create_event(&self, event: &VtecEvent) -> Result<i64> {
        self.inner.create_event(event).await
    }

    async fn update_event_times(
        &self,
        id: i64,
        expires: DateTime<Utc>,
        ends: DateTime<Utc>,
    ) -> Result<()> {
        if self.stall_updates.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        self.inner.update_event_times(id, expires, ends).await
    }

    async fn store_product(&self, record: &ProductRecord) -> Result<i64> {
        self.inner.store_product(record).await
    }

    async fn health_check(&self) -> Result<()> {
        self.inner.health_check().await
    }
}

/// Repository that pretends the first lookup misses even though the row
/// exists, forcing the duplicate-create path a racing writer would hit
#[derive(Debug, Default)]
pub struct RacingRepository {
    pub inner: MemoryRepository,
    pub miss_next_lookup: AtomicBool,
}

impl RacingRepository {
    pub fn arm(&self) {
        self.miss_next_lookup.store(true, Ordering::SeqCst);
    }
}

impl EventRepository for RacingRepository {
    async fn get_event_by_key(&self, key: &EventKey) -> Result<Option<VtecEvent>> {
        if self.miss_next_lookup.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.get_event_by_key(key).await
    }

    async fn get_event_by_id(&self, id: i64) -> Result<Option<VtecEvent>> {
        self.inner.get_event_by_id(id).await
    }

    async fn create_event(&self, event: &VtecEvent) -> Result<i64> {
        self.inner.create_event(event).await
    }

    async fn update_event_times(
        &self,
        id: i64,
        expires: DateTime<Utc>,
        ends: DateTime<Utc>,
    ) -> Result<()> {
        self.inner.update_event_times(id, expires, ends).await
    }

    async fn store_product(&self, record: &ProductRecord) -> Result<i64> {
        self.inner.store_product(record).await
    }

    async fn health_check(&self) -> Result<()> {
        self.inner.health_check().await
    }
}
