//! Slotwise API authentication core
//!
//! Issues and verifies the long-lived API keys external integrations use to
//! call the multi-tenant booking API on behalf of a company. Keys are never
//! stored in recoverable form: the cleartext embeds a routable client id and
//! a random secret, and only an Argon2id digest of the full key survives
//! issuance. Supports:
//! - Key issuance with a one-time cleartext result
//! - Bearer-token authentication with tenant-scoped results
//! - Company-scoped listings with masked keys
//! - Monotonic, audited revocation

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{AuthConfig, HashingConfig, KeyConfig};
pub use domain::{
    ApiClient, ApiClientId, ApiKey, ApiKeyId, ApiKeyStore, AuditEvent, AuditLogger,
    Authenticated, CompanyId, DomainError, NoopAuditLogger, RevokeOutcome,
};
pub use infrastructure::api_key::{
    ApiKeyAuthenticator, ApiKeyListing, ApiKeyService, Argon2SecretHasher, InMemoryApiKeyStore,
    IssuedApiKey, KeyCodec, PostgresApiKeyStore, SecretHasher,
};
pub use infrastructure::audit::PostgresAuditLogger;
