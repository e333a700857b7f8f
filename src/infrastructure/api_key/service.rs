//! API key lifecycle service
//!
//! Issuance, company-scoped listing and revocation. Every mutation emits an
//! audit event; the cleartext key leaves this module exactly once, in the
//! issuance result.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::task;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::api_client::{validate_label, ApiClient, ApiClientId};
use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyStore, RevokeOutcome};
use crate::domain::audit::{AuditEvent, AuditLogger};
use crate::domain::company::CompanyId;
use crate::domain::DomainError;

use super::codec::KeyCodec;
use super::hasher::SecretHasher;

/// Result of issuing a new API key
#[derive(Debug, Clone)]
pub struct IssuedApiKey {
    /// Identifier of the stored key record
    pub id: ApiKeyId,
    /// The full cleartext key; not retrievable through any later operation
    pub full_key: String,
    /// Label of the client the key was issued for
    pub label: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// One row of a company-scoped key listing
#[derive(Debug, Clone)]
pub struct ApiKeyListing {
    pub id: ApiKeyId,
    pub api_client_id: ApiClientId,
    pub label: String,
    /// Prefix and client id with the secret masked out
    pub masked_key: String,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Service for managing the API key lifecycle
#[derive(Debug)]
pub struct ApiKeyService<S: ApiKeyStore, H: SecretHasher> {
    store: Arc<S>,
    codec: KeyCodec,
    hasher: Arc<H>,
    audit: Arc<dyn AuditLogger>,
}

impl<S, H> ApiKeyService<S, H>
where
    S: ApiKeyStore,
    H: SecretHasher + 'static,
{
    /// Create a new lifecycle service
    pub fn new(
        store: Arc<S>,
        codec: KeyCodec,
        hasher: Arc<H>,
        audit: Arc<dyn AuditLogger>,
    ) -> Self {
        Self {
            store,
            codec,
            hasher,
            audit,
        }
    }

    /// Issue a new API key for a company
    ///
    /// Creates a dedicated client, generates key material, stores only the
    /// digest and returns the cleartext once. If anything fails after the
    /// client record exists, the client is deleted again so no half-created
    /// identity stays reachable.
    pub async fn issue(
        &self,
        company_id: CompanyId,
        label: impl Into<String>,
        user_id: Option<Uuid>,
    ) -> Result<IssuedApiKey, DomainError> {
        let label = label.into();
        validate_label(&label).map_err(|e| DomainError::validation(e.to_string()))?;

        info!(%company_id, label = %label, "Issuing API key");

        let client = self
            .store
            .create_client(ApiClient::new(company_id, label.clone()))
            .await?;

        let material = self.codec.generate(client.id());

        let hasher = Arc::clone(&self.hasher);
        let cleartext = material.full_key.clone();
        let digest = match task::spawn_blocking(move || hasher.hash(&cleartext)).await {
            Ok(Ok(digest)) => digest,
            Ok(Err(e)) => {
                self.compensate_client(client.id()).await;
                return Err(e);
            }
            Err(e) => {
                self.compensate_client(client.id()).await;
                return Err(DomainError::hashing(format!(
                    "Hashing worker failed: {}",
                    e
                )));
            }
        };

        let key = ApiKey::new(*client.id(), digest, material.prefix.as_str());
        let created = match self.store.create_key(key).await {
            Ok(created) => created,
            Err(e) => {
                self.compensate_client(client.id()).await;
                return Err(e);
            }
        };

        let event = AuditEvent::new("api_key_created", "api_key")
            .with_company(company_id)
            .with_resource_id(created.id().to_string())
            .with_metadata(json!({
                "apiClientId": client.id().to_string(),
                "label": label,
            }));
        self.audit.log(with_actor(event, user_id)).await;

        info!(
            %company_id,
            api_key_id = %created.id(),
            api_client_id = %client.id(),
            "API key created successfully"
        );

        Ok(IssuedApiKey {
            id: *created.id(),
            full_key: material.full_key,
            label: client.label().to_string(),
            created_at: created.created_at(),
        })
    }

    /// List all keys of a company, newest first, secrets masked
    pub async fn list(&self, company_id: &CompanyId) -> Result<Vec<ApiKeyListing>, DomainError> {
        let rows = self.store.list_keys_for_company(company_id).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let masked_key = self.codec.masked(&row.key_prefix, &row.api_client_id);
                ApiKeyListing {
                    id: row.id,
                    api_client_id: row.api_client_id,
                    label: row.label,
                    masked_key,
                    revoked: row.revoked,
                    created_at: row.created_at,
                    revoked_at: row.revoked_at,
                }
            })
            .collect())
    }

    /// Revoke a key on behalf of a company
    ///
    /// The key must belong to the requesting company; an unknown id and a key
    /// owned by another tenant are indistinguishable to the caller. A key
    /// that was already revoked is reported as such without re-writing it or
    /// emitting a second audit event.
    pub async fn revoke(
        &self,
        api_key_id: &ApiKeyId,
        company_id: &CompanyId,
        user_id: Option<Uuid>,
    ) -> Result<RevokeOutcome, DomainError> {
        let owner = self.store.find_key_owner(api_key_id).await?;

        match owner {
            Some(owner) if owner.company_id == *company_id => {}
            Some(_) => {
                warn!(
                    %api_key_id,
                    %company_id,
                    "Revocation refused: key belongs to another company"
                );
                return Err(self.revoke_not_found(api_key_id));
            }
            None => {
                warn!(%api_key_id, %company_id, "Revocation refused: key not found");
                return Err(self.revoke_not_found(api_key_id));
            }
        }

        let outcome = self
            .store
            .revoke_key(api_key_id, Utc::now())
            .await?
            .ok_or_else(|| self.revoke_not_found(api_key_id))?;

        match outcome {
            RevokeOutcome::Revoked => {
                let event = AuditEvent::new("api_key_revoked", "api_key")
                    .with_company(*company_id)
                    .with_resource_id(api_key_id.to_string());
                self.audit.log(with_actor(event, user_id)).await;

                info!(%api_key_id, %company_id, "API key revoked successfully");
            }
            RevokeOutcome::AlreadyRevoked => {
                debug!(%api_key_id, %company_id, "API key was already revoked");
            }
        }

        Ok(outcome)
    }

    fn revoke_not_found(&self, api_key_id: &ApiKeyId) -> DomainError {
        DomainError::not_found(format!("API key '{}' not found", api_key_id))
    }

    async fn compensate_client(&self, client_id: &ApiClientId) {
        // Best effort; an orphan that survives this is logged, not fatal
        match self.store.delete_client(client_id).await {
            Ok(_) => debug!(%client_id, "Rolled back client after failed issuance"),
            Err(e) => warn!(%client_id, error = %e, "Failed to roll back client"),
        }
    }
}

fn with_actor(event: AuditEvent, user_id: Option<Uuid>) -> AuditEvent {
    match user_id {
        Some(id) => event.with_user(id),
        None => event,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HashingConfig;
    use crate::domain::api_key::mock::MockApiKeyStore;
    use crate::domain::audit::mock::RecordingAuditLogger;
    use crate::infrastructure::api_key::authenticator::ApiKeyAuthenticator;
    use crate::infrastructure::api_key::hasher::Argon2SecretHasher;

    struct Fixture {
        store: Arc<MockApiKeyStore>,
        audit: Arc<RecordingAuditLogger>,
        service: ApiKeyService<MockApiKeyStore, Argon2SecretHasher>,
        authenticator: ApiKeyAuthenticator<MockApiKeyStore, Argon2SecretHasher>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MockApiKeyStore::new());
        let audit = Arc::new(RecordingAuditLogger::new());
        let codec = KeyCodec::new("sk_", 16);
        let hasher = Arc::new(
            Argon2SecretHasher::new(&HashingConfig {
                memory_kib: 1024,
                time_cost: 1,
                parallelism: 1,
            })
            .unwrap(),
        );

        let service = ApiKeyService::new(
            Arc::clone(&store),
            codec.clone(),
            Arc::clone(&hasher),
            Arc::clone(&audit) as Arc<dyn AuditLogger>,
        );
        let authenticator = ApiKeyAuthenticator::new(Arc::clone(&store), codec, hasher);

        Fixture {
            store,
            audit,
            service,
            authenticator,
        }
    }

    fn company() -> CompanyId {
        CompanyId::from_uuid(Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_issue_returns_cleartext_once() {
        let fx = fixture();
        let company_id = company();

        let issued = fx
            .service
            .issue(company_id, "Production", None)
            .await
            .unwrap();

        assert!(issued.full_key.starts_with("sk_"));
        assert_eq!(issued.label, "Production");

        // The listing never exposes the secret portion
        let listings = fx.service.list(&company_id).await.unwrap();
        assert_eq!(listings.len(), 1);
        let secret = issued.full_key.rsplit('_').next().unwrap();
        assert!(!listings[0].masked_key.contains(secret));
        assert!(listings[0].masked_key.ends_with("_****"));
    }

    #[tokio::test]
    async fn test_issue_rejects_empty_label() {
        let fx = fixture();

        let result = fx.service.issue(company(), "  ", None).await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
        assert_eq!(fx.store.client_count().await, 0);
    }

    #[tokio::test]
    async fn test_issued_key_authenticates() {
        let fx = fixture();
        let company_id = company();

        let issued = fx.service.issue(company_id, "Integration", None).await.unwrap();

        let header = format!("Bearer {}", issued.full_key);
        let auth = fx
            .authenticator
            .authenticate(Some(&header), "POST", "/api/v1/bookings")
            .await
            .unwrap();

        assert_eq!(auth.company_id, company_id);
        assert_eq!(auth.api_key_id, issued.id);
    }

    #[tokio::test]
    async fn test_issue_emits_audit_event() {
        let fx = fixture();
        let company_id = company();
        let user_id = Uuid::new_v4();

        let issued = fx
            .service
            .issue(company_id, "Audited", Some(user_id))
            .await
            .unwrap();

        let events = fx.audit.events_with_action("api_key_created").await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].company_id, Some(company_id));
        assert_eq!(events[0].user_id, Some(user_id));
        assert_eq!(events[0].resource_id, Some(issued.id.to_string()));
    }

    #[tokio::test]
    async fn test_issue_compensates_on_key_failure() {
        let fx = fixture();
        fx.store.set_fail_create_key(true).await;

        let result = fx.service.issue(company(), "Doomed", None).await;

        assert!(result.is_err());
        // The half-created client was rolled back
        assert_eq!(fx.store.client_count().await, 0);
        assert_eq!(fx.store.key_count().await, 0);
        assert!(fx.audit.events().await.is_empty());
    }

    #[tokio::test]
    async fn test_revoke_then_sibling_still_authenticates() {
        let fx = fixture();
        let company_id = company();

        let first = fx.service.issue(company_id, "First", None).await.unwrap();
        let second = fx.service.issue(company_id, "Second", None).await.unwrap();

        let outcome = fx
            .service
            .revoke(&first.id, &company_id, None)
            .await
            .unwrap();
        assert_eq!(outcome, RevokeOutcome::Revoked);

        let first_header = format!("Bearer {}", first.full_key);
        assert!(fx
            .authenticator
            .authenticate(Some(&first_header), "GET", "/api/v1/bookings")
            .await
            .is_none());

        let second_header = format!("Bearer {}", second.full_key);
        assert!(fx
            .authenticator
            .authenticate(Some(&second_header), "GET", "/api/v1/bookings")
            .await
            .is_some());
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent_without_second_audit() {
        let fx = fixture();
        let company_id = company();

        let issued = fx.service.issue(company_id, "Once", None).await.unwrap();

        let first = fx
            .service
            .revoke(&issued.id, &company_id, None)
            .await
            .unwrap();
        let second = fx
            .service
            .revoke(&issued.id, &company_id, None)
            .await
            .unwrap();

        assert_eq!(first, RevokeOutcome::Revoked);
        assert_eq!(second, RevokeOutcome::AlreadyRevoked);
        assert_eq!(fx.audit.events_with_action("api_key_revoked").await.len(), 1);
    }

    #[tokio::test]
    async fn test_revoke_cross_company_fails() {
        let fx = fixture();
        let company_a = company();
        let company_b = company();

        let issued = fx.service.issue(company_a, "Owned by A", None).await.unwrap();

        let result = fx.service.revoke(&issued.id, &company_b, None).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));

        // The key is still active for company A
        let header = format!("Bearer {}", issued.full_key);
        assert!(fx
            .authenticator
            .authenticate(Some(&header), "GET", "/api/v1/bookings")
            .await
            .is_some());
        assert!(fx.audit.events_with_action("api_key_revoked").await.is_empty());
    }

    #[tokio::test]
    async fn test_revoke_unknown_key_fails() {
        let fx = fixture();

        let result = fx
            .service
            .revoke(&ApiKeyId::generate(), &company(), None)
            .await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_listing_order_and_revocation_fields() {
        let fx = fixture();
        let company_id = company();

        let first = fx.service.issue(company_id, "Older", None).await.unwrap();
        let second = fx.service.issue(company_id, "Newer", None).await.unwrap();

        fx.service
            .revoke(&first.id, &company_id, None)
            .await
            .unwrap();

        let listings = fx.service.list(&company_id).await.unwrap();
        assert_eq!(listings.len(), 2);
        // Newest first
        assert_eq!(listings[0].id, second.id);
        assert!(!listings[0].revoked);
        assert_eq!(listings[1].id, first.id);
        assert!(listings[1].revoked);
        assert!(listings[1].revoked_at.is_some());
    }

    #[tokio::test]
    async fn test_list_scoped_to_company() {
        let fx = fixture();
        let company_a = company();
        let company_b = company();

        fx.service.issue(company_a, "A key", None).await.unwrap();

        assert_eq!(fx.service.list(&company_a).await.unwrap().len(), 1);
        assert!(fx.service.list(&company_b).await.unwrap().is_empty());
    }
}
