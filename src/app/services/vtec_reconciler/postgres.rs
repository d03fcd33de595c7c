//! PostgreSQL event repository
//!
//! Backed by `sqlx::PgPool`. The identity-key uniqueness lives in a unique
//! index on (wfo, phenomena, significance, event_number, year); a racing
//! create surfaces as `RepositoryConflict` through `ON CONFLICT DO NOTHING`
//! returning no row. The starting polygon is stored as JSONB.

use super::repository::EventRepository;
use crate::app::models::vtec::{EventKey, Phenomena, Significance, VtecClass, VtecEvent};
use crate::app::models::{Polygon, ProductRecord};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// PostgreSQL-backed event repository
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    issued: DateTime<Utc>,
    starts: DateTime<Utc>,
    expires: DateTime<Utc>,
    ends: DateTime<Utc>,
    end_initial: DateTime<Utc>,
    class: String,
    phenomena: String,
    wfo: String,
    significance: String,
    event_number: i32,
    year: i32,
    title: String,
    is_emergency: bool,
    is_pds: bool,
    polygon_start: Option<serde_json::Value>,
}

impl EventRow {
    fn into_event(self) -> VtecEvent {
        let polygon_start = self
            .polygon_start
            .and_then(|value| serde_json::from_value::<Polygon>(value).ok());

        VtecEvent {
            id: Some(self.id),
            key: EventKey {
                office: self.wfo,
                phenomena: Phenomena::from_code(&self.phenomena),
                significance: Significance::from_code(&self.significance),
                event_number: self.event_number as u32,
                year: self.year,
            },
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
            issued: self.issued,
            starts: self.starts,
            expires: self.expires,
            ends: self.ends,
            end_initial: self.end_initial,
            class: VtecClass::from_code(&self.class),
            title: self.title,
            is_emergency: self.is_emergency,
            is_pds: self.is_pds,
            polygon_start,
        }
    }
}

const EVENT_COLUMNS: &str = "id, created_at, updated_at, issued, starts, expires, ends, \
     end_initial, class, phenomena, wfo, significance, event_number, year, title, \
     is_emergency, is_pds, polygon_start";

impl PostgresRepository {
    /// Create a repository over an established connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl EventRepository for PostgresRepository {
    async fn get_event_by_key(&self, key: &EventKey) -> Result<Option<VtecEvent>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM vtec.events \
             WHERE wfo = $1 AND phenomena = $2 AND significance = $3 \
             AND event_number = $4 AND year = $5"
        ))
        .bind(&key.office)
        .bind(key.phenomena.code())
        .bind(key.significance.code())
        .bind(key.event_number as i32)
        .bind(key.year)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(EventRow::into_event))
    }

    async fn get_event_by_id(&self, id: i64) -> Result<Option<VtecEvent>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM vtec.events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(EventRow::into_event))
    }

    async fn create_event(&self, event: &VtecEvent) -> Result<i64> {
        let polygon = event
            .polygon_start
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| Error::repository(format!("could not encode polygon: {e}")))?;

        // The unique index on the identity key turns a racing create into
        // "no row returned" rather than a second event
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO vtec.events \
             (issued, starts, expires, ends, end_initial, class, phenomena, wfo, \
              significance, event_number, year, title, is_emergency, is_pds, polygon_start) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             ON CONFLICT (wfo, phenomena, significance, event_number, year) DO NOTHING \
             RETURNING id",
        )
        .bind(event.issued)
        .bind(event.starts)
        .bind(event.expires)
        .bind(event.ends)
        .bind(event.end_initial)
        .bind(event.class.code())
        .bind(event.key.phenomena.code())
        .bind(&event.key.office)
        .bind(event.key.significance.code())
        .bind(event.key.event_number as i32)
        .bind(event.key.year)
        .bind(&event.title)
        .bind(event.is_emergency)
        .bind(event.is_pds)
        .bind(polygon)
        .fetch_optional(&self.pool)
        .await?;

        id.ok_or_else(|| Error::repository_conflict(event.key.to_string()))
    }

    async fn update_event_times(
        &self,
        id: i64,
        expires: DateTime<Utc>,
        ends: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query("UPDATE vtec.events SET expires = $2, ends = $3, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(expires)
            .bind(ends)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn store_product(&self, record: &ProductRecord) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO awips.products \
             (product_id, received_at, issued, source, data, wmo, awips, bbb) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(&record.product_id)
        .bind(record.received_at)
        .bind(record.issued)
        .bind(&record.source)
        .bind(&record.data)
        .bind(&record.wmo)
        .bind(&record.awips)
        .bind(&record.bbb)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
