//! In-memory credential store implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::api_client::{ApiClient, ApiClientId};
use crate::domain::api_key::{
    ApiKey, ApiKeyId, ApiKeyStore, CompanyKey, KeyCandidate, KeyOwner, RevokeOutcome,
};
use crate::domain::company::CompanyId;
use crate::domain::DomainError;

/// In-memory implementation of [`ApiKeyStore`]
///
/// Suitable for tests and single-process deployments; durable installations
/// use the Postgres-backed store.
#[derive(Debug, Default)]
pub struct InMemoryApiKeyStore {
    clients: Arc<RwLock<HashMap<ApiClientId, ApiClient>>>,
    keys: Arc<RwLock<HashMap<ApiKeyId, ApiKey>>>,
}

impl InMemoryApiKeyStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApiKeyStore for InMemoryApiKeyStore {
    async fn create_client(&self, client: ApiClient) -> Result<ApiClient, DomainError> {
        let mut clients = self.clients.write().await;

        if clients.contains_key(client.id()) {
            return Err(DomainError::conflict(format!(
                "API client '{}' already exists",
                client.id()
            )));
        }

        clients.insert(*client.id(), client.clone());
        Ok(client)
    }

    async fn delete_client(&self, id: &ApiClientId) -> Result<bool, DomainError> {
        let mut clients = self.clients.write().await;
        Ok(clients.remove(id).is_some())
    }

    async fn find_client(&self, id: &ApiClientId) -> Result<Option<ApiClient>, DomainError> {
        let clients = self.clients.read().await;
        Ok(clients.get(id).cloned())
    }

    async fn create_key(&self, key: ApiKey) -> Result<ApiKey, DomainError> {
        let mut keys = self.keys.write().await;

        if keys.contains_key(key.id()) {
            return Err(DomainError::conflict(format!(
                "API key '{}' already exists",
                key.id()
            )));
        }

        keys.insert(*key.id(), key.clone());
        Ok(key)
    }

    async fn list_active_keys(
        &self,
        client_id: &ApiClientId,
    ) -> Result<Vec<KeyCandidate>, DomainError> {
        let keys = self.keys.read().await;

        Ok(keys
            .values()
            .filter(|k| k.api_client_id() == client_id && k.is_active())
            .map(|k| KeyCandidate {
                id: *k.id(),
                key_hash: k.key_hash().to_string(),
            })
            .collect())
    }

    async fn list_keys_for_company(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<CompanyKey>, DomainError> {
        let clients = self.clients.read().await;
        let keys = self.keys.read().await;

        let mut rows: Vec<CompanyKey> = keys
            .values()
            .filter_map(|k| {
                let client = clients.get(k.api_client_id())?;
                if client.company_id() != company_id {
                    return None;
                }
                Some(CompanyKey {
                    id: *k.id(),
                    api_client_id: *k.api_client_id(),
                    label: client.label().to_string(),
                    key_prefix: k.key_prefix().to_string(),
                    revoked: k.is_revoked(),
                    created_at: k.created_at(),
                    revoked_at: k.revoked_at(),
                })
            })
            .collect();

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find_key_owner(&self, id: &ApiKeyId) -> Result<Option<KeyOwner>, DomainError> {
        let clients = self.clients.read().await;
        let keys = self.keys.read().await;

        Ok(keys.get(id).and_then(|k| {
            clients.get(k.api_client_id()).map(|c| KeyOwner {
                company_id: *c.company_id(),
                api_client_id: *c.id(),
            })
        }))
    }

    async fn revoke_key(
        &self,
        id: &ApiKeyId,
        at: DateTime<Utc>,
    ) -> Result<Option<RevokeOutcome>, DomainError> {
        let mut keys = self.keys.write().await;
        Ok(keys.get_mut(id).map(|k| k.revoke(at)))
    }
}
