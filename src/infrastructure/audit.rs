//! Audit logger implementations

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::domain::audit::{AuditEvent, AuditLogger};

/// Audit logger writing to the `activity_logs` table
///
/// Fire-and-forget: insert failures are reported through tracing and never
/// propagated to the operation that emitted the event.
#[derive(Debug, Clone)]
pub struct PostgresAuditLogger {
    pool: PgPool,
}

impl PostgresAuditLogger {
    /// Create a new logger with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogger for PostgresAuditLogger {
    async fn log(&self, event: AuditEvent) {
        let result = sqlx::query(
            r#"
            INSERT INTO activity_logs (id, company_id, user_id, action, resource_type,
                                       resource_id, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event.company_id.map(|id| *id.as_uuid()))
        .bind(event.user_id)
        .bind(&event.action)
        .bind(&event.resource_type)
        .bind(&event.resource_id)
        .bind(&event.metadata)
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            error!(
                action = %event.action,
                resource_type = %event.resource_type,
                error = %e,
                "Failed to record audit event"
            );
        }
    }
}
