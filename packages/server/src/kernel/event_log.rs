// Postgres-backed pipeline event log.
//
// Append-only, keyed by request_id + event_type. Writes are best-effort:
// the orchestrator only ever calls log_safe, which swallows failures.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::kernel::traits::{BaseEventLog, PipelineEvent};

pub struct PgEventLog {
    pool: PgPool,
}

impl PgEventLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseEventLog for PgEventLog {
    async fn append(&self, event: &PipelineEvent) -> Result<()> {
        sqlx::query(
            "INSERT INTO image_engine_events (id, request_id, event_type, ok, error_code)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(&event.request_id)
        .bind(event.event_type.as_str())
        .bind(event.ok)
        .bind(&event.error_code)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
