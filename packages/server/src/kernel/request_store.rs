// Postgres-backed request record store.
//
// Upserts the terminal outcome keyed by request_id. Last write wins when
// callers race on the same id. Best-effort: the orchestrator only calls
// persist_safe.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::kernel::traits::{BaseRequestStore, RequestRecord};

pub struct PgRequestStore {
    pool: PgPool,
}

impl PgRequestStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseRequestStore for PgRequestStore {
    async fn upsert(&self, record: &RequestRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO image_engine_requests (
                request_id, consumer_app, platform, category, status, error_code,
                fallback_reason, image_url, width, height, content_type, alt_text, timings_ms
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (request_id) DO UPDATE SET
                consumer_app = EXCLUDED.consumer_app,
                platform = EXCLUDED.platform,
                category = EXCLUDED.category,
                status = EXCLUDED.status,
                error_code = EXCLUDED.error_code,
                fallback_reason = EXCLUDED.fallback_reason,
                image_url = EXCLUDED.image_url,
                width = EXCLUDED.width,
                height = EXCLUDED.height,
                content_type = EXCLUDED.content_type,
                alt_text = EXCLUDED.alt_text,
                timings_ms = EXCLUDED.timings_ms,
                updated_at = now()",
        )
        .bind(&record.request_id)
        .bind(&record.consumer_app)
        .bind(&record.platform)
        .bind(&record.category)
        .bind(record.status.as_str())
        .bind(&record.error_code)
        .bind(&record.fallback_reason)
        .bind(&record.image_url)
        .bind(record.width)
        .bind(record.height)
        .bind(&record.content_type)
        .bind(&record.alt_text)
        .bind(&record.timings_ms)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
