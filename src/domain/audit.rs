//! Activity audit collaborator
//!
//! Issuance and revocation emit audit events through this seam. Logging is
//! fire-and-forget: implementations swallow their own failures and report
//! them through tracing, so a broken audit sink never fails the primary
//! operation.

use async_trait::async_trait;
use std::fmt::Debug;

use serde_json::Value;
use uuid::Uuid;

use crate::domain::company::CompanyId;

/// A single audit event
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    /// Company the action happened under, when known
    pub company_id: Option<CompanyId>,
    /// Dashboard user who triggered the action, when known
    pub user_id: Option<Uuid>,
    /// Action name, e.g. `api_key_created`
    pub action: String,
    /// Kind of resource the action touched
    pub resource_type: String,
    /// Identifier of the touched resource
    pub resource_id: Option<String>,
    /// Free-form structured context
    pub metadata: Option<Value>,
}

impl AuditEvent {
    /// Create an event with the mandatory fields
    pub fn new(action: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            company_id: None,
            user_id: None,
            action: action.into(),
            resource_type: resource_type.into(),
            resource_id: None,
            metadata: None,
        }
    }

    /// Set the company
    pub fn with_company(mut self, company_id: CompanyId) -> Self {
        self.company_id = Some(company_id);
        self
    }

    /// Set the acting user
    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Set the resource identifier
    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Attach structured metadata
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Sink for audit events
#[async_trait]
pub trait AuditLogger: Send + Sync + Debug {
    /// Record an event
    ///
    /// Must not fail the caller: implementations handle their own errors.
    async fn log(&self, event: AuditEvent);
}

/// Audit logger that discards every event
#[derive(Debug, Clone, Default)]
pub struct NoopAuditLogger;

#[async_trait]
impl AuditLogger for NoopAuditLogger {
    async fn log(&self, _event: AuditEvent) {}
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Audit logger that records events for assertions
    #[derive(Debug, Default)]
    pub struct RecordingAuditLogger {
        events: Arc<RwLock<Vec<AuditEvent>>>,
    }

    impl RecordingAuditLogger {
        pub fn new() -> Self {
            Self::default()
        }

        /// Snapshot of all recorded events
        pub async fn events(&self) -> Vec<AuditEvent> {
            self.events.read().await.clone()
        }

        /// Recorded events with the given action name
        pub async fn events_with_action(&self, action: &str) -> Vec<AuditEvent> {
            self.events
                .read()
                .await
                .iter()
                .filter(|e| e.action == action)
                .cloned()
                .collect()
        }
    }

    #[async_trait]
    impl AuditLogger for RecordingAuditLogger {
        async fn log(&self, event: AuditEvent) {
            self.events.write().await.push(event);
        }
    }
}
