//! API client entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::company::CompanyId;
use crate::domain::DomainError;

/// API client identifier
///
/// Rendered in hyphenated UUID form inside every issued key, so it can never
/// contain the `_` separator that delimits the key's secret portion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiClientId(Uuid);

impl ApiClientId {
    /// Generate a fresh client identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse a client ID from its string form
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|e| DomainError::invalid_id(format!("Invalid client ID '{}': {}", value, e)))
    }

    /// Get the inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ApiClientId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ApiClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// API client entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiClient {
    /// Unique identifier, embedded in the cleartext of every key it issues
    id: ApiClientId,
    /// Company (tenant) that owns this client
    company_id: CompanyId,
    /// Human-readable label chosen at key creation
    label: String,
    /// Creation timestamp
    created_at: DateTime<Utc>,
}

impl ApiClient {
    /// Create a new API client with a generated identifier
    pub fn new(company_id: CompanyId, label: impl Into<String>) -> Self {
        Self {
            id: ApiClientId::generate(),
            company_id,
            label: label.into(),
            created_at: Utc::now(),
        }
    }

    /// Reconstruct a client from stored fields
    pub fn from_parts(
        id: ApiClientId,
        company_id: CompanyId,
        label: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            company_id,
            label: label.into(),
            created_at,
        }
    }

    pub fn id(&self) -> &ApiClientId {
        &self.id
    }

    pub fn company_id(&self) -> &CompanyId {
        &self.company_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
