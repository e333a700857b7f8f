//! API key entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::api_client::ApiClientId;
use crate::domain::company::CompanyId;
use crate::domain::DomainError;

/// API key identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKeyId(Uuid);

impl ApiKeyId {
    /// Generate a fresh key identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse a key ID from its string form
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|e| DomainError::invalid_id(format!("Invalid API key ID '{}': {}", value, e)))
    }

    /// Get the inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ApiKeyId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ApiKeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// API key entity
///
/// Holds only the one-way digest of the issued key; the cleartext is returned
/// once at issuance and is never recoverable afterwards. Keys are soft-deleted
/// only: `revoked` moves from `false` to `true` exactly once and `revoked_at`
/// is set if and only if the key is revoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    /// Unique identifier for the key
    id: ApiKeyId,
    /// Client this key was issued for
    api_client_id: ApiClientId,
    /// One-way digest of the full cleartext key (PHC string, salt and
    /// parameters embedded). Never exposed in listings.
    key_hash: String,
    /// Configured prefix literal at issuance time, kept for display/audit
    key_prefix: String,
    /// Whether the key has been revoked
    revoked: bool,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Revocation timestamp, set exactly when `revoked` becomes true
    #[serde(skip_serializing_if = "Option::is_none")]
    revoked_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    /// Create a new active API key
    pub fn new(
        api_client_id: ApiClientId,
        key_hash: impl Into<String>,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            id: ApiKeyId::generate(),
            api_client_id,
            key_hash: key_hash.into(),
            key_prefix: key_prefix.into(),
            revoked: false,
            created_at: Utc::now(),
            revoked_at: None,
        }
    }

    /// Reconstruct a key from stored fields
    pub fn from_parts(
        id: ApiKeyId,
        api_client_id: ApiClientId,
        key_hash: impl Into<String>,
        key_prefix: impl Into<String>,
        revoked: bool,
        created_at: DateTime<Utc>,
        revoked_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            api_client_id,
            key_hash: key_hash.into(),
            key_prefix: key_prefix.into(),
            revoked,
            created_at,
            revoked_at,
        }
    }

    pub fn id(&self) -> &ApiKeyId {
        &self.id
    }

    pub fn api_client_id(&self) -> &ApiClientId {
        &self.api_client_id
    }

    pub fn key_hash(&self) -> &str {
        &self.key_hash
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    /// Check if the key can still authenticate requests
    pub fn is_active(&self) -> bool {
        !self.revoked
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn revoked_at(&self) -> Option<DateTime<Utc>> {
        self.revoked_at
    }

    /// Revoke the key
    ///
    /// Monotonic: the first call sets `revoked` and `revoked_at`; later calls
    /// leave both untouched and report that the key was already revoked.
    pub fn revoke(&mut self, at: DateTime<Utc>) -> RevokeOutcome {
        if self.revoked {
            return RevokeOutcome::AlreadyRevoked;
        }

        self.revoked = true;
        self.revoked_at = Some(at);
        RevokeOutcome::Revoked
    }
}

/// Outcome of a revocation attempt on an existing key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    /// The key transitioned from active to revoked
    Revoked,
    /// The key was revoked before this call; nothing changed
    AlreadyRevoked,
}

/// Result of a successful authentication
///
/// Request-scoped: the company is always derived from the verified key, never
/// from anything the caller supplied, and downstream handlers rely on it for
/// tenant isolation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    /// Company (tenant) the verified key belongs to
    pub company_id: CompanyId,
    /// Client the key was issued for
    pub api_client_id: ApiClientId,
    /// The key that verified
    pub api_key_id: ApiKeyId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_key() -> ApiKey {
        ApiKey::new(ApiClientId::generate(), "$argon2id$stub", "sk_")
    }

    #[test]
    fn test_new_key_is_active() {
        let key = create_test_key();

        assert!(key.is_active());
        assert!(!key.is_revoked());
        assert!(key.revoked_at().is_none());
    }

    #[test]
    fn test_revoke_sets_timestamp() {
        let mut key = create_test_key();
        let at = Utc::now();

        assert_eq!(key.revoke(at), RevokeOutcome::Revoked);
        assert!(key.is_revoked());
        assert_eq!(key.revoked_at(), Some(at));
    }

    #[test]
    fn test_revoke_is_monotonic() {
        let mut key = create_test_key();
        let first = Utc::now();

        key.revoke(first);

        let later = first + chrono::Duration::hours(1);
        assert_eq!(key.revoke(later), RevokeOutcome::AlreadyRevoked);

        // The original timestamp is preserved
        assert_eq!(key.revoked_at(), Some(first));
    }

    #[test]
    fn test_revoked_at_iff_revoked() {
        let mut key = create_test_key();
        assert_eq!(key.is_revoked(), key.revoked_at().is_some());

        key.revoke(Utc::now());
        assert_eq!(key.is_revoked(), key.revoked_at().is_some());
    }

    #[test]
    fn test_key_ids_unique() {
        assert_ne!(create_test_key().id(), create_test_key().id());
    }
}
