//! Credential store gateway trait
//!
//! Abstraction over the persistence collaborator holding clients and key
//! digests. Tenant scoping is enforced by the callers (authenticator and
//! lifecycle service), not by the gateway itself.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use super::entity::{ApiKey, ApiKeyId, RevokeOutcome};
use crate::domain::api_client::{ApiClient, ApiClientId};
use crate::domain::company::CompanyId;
use crate::domain::DomainError;

/// A non-revoked key candidate considered during authentication
#[derive(Debug, Clone)]
pub struct KeyCandidate {
    pub id: ApiKeyId,
    pub key_hash: String,
}

/// Ownership of a key, used for tenant checks before revocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOwner {
    pub company_id: CompanyId,
    pub api_client_id: ApiClientId,
}

/// A key row joined with its client, as returned by company-scoped listings
#[derive(Debug, Clone)]
pub struct CompanyKey {
    pub id: ApiKeyId,
    pub api_client_id: ApiClientId,
    pub label: String,
    pub key_prefix: String,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Gateway trait for client and key persistence
#[async_trait]
pub trait ApiKeyStore: Send + Sync + Debug {
    /// Persist a new API client
    async fn create_client(&self, client: ApiClient) -> Result<ApiClient, DomainError>;

    /// Delete a client record
    ///
    /// Compensation hook for issuance: a client whose key could not be
    /// persisted must not remain reachable for future authentication.
    async fn delete_client(&self, id: &ApiClientId) -> Result<bool, DomainError>;

    /// Look up a client by its identifier
    async fn find_client(&self, id: &ApiClientId) -> Result<Option<ApiClient>, DomainError>;

    /// Persist a new API key
    async fn create_key(&self, key: ApiKey) -> Result<ApiKey, DomainError>;

    /// List the digests of all non-revoked keys of a client
    async fn list_active_keys(
        &self,
        client_id: &ApiClientId,
    ) -> Result<Vec<KeyCandidate>, DomainError>;

    /// List all keys issued under a company, newest first
    async fn list_keys_for_company(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<CompanyKey>, DomainError>;

    /// Resolve the company and client a key belongs to
    async fn find_key_owner(&self, id: &ApiKeyId) -> Result<Option<KeyOwner>, DomainError>;

    /// Mark a key revoked
    ///
    /// Conditional on the key still being active: an already-revoked key is
    /// left untouched and reported as [`RevokeOutcome::AlreadyRevoked`].
    /// Returns `None` when no key with this ID exists.
    async fn revoke_key(
        &self,
        id: &ApiKeyId,
        at: DateTime<Utc>,
    ) -> Result<Option<RevokeOutcome>, DomainError>;
}
