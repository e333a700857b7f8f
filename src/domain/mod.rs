//! Domain layer - Core business logic and entities

pub mod api_client;
pub mod api_key;
pub mod audit;
pub mod company;
pub mod error;

pub use api_client::{validate_label, ApiClient, ApiClientId, ApiClientValidationError};
pub use api_key::{
    ApiKey, ApiKeyId, ApiKeyStore, Authenticated, CompanyKey, KeyCandidate, KeyOwner,
    RevokeOutcome,
};
pub use audit::{AuditEvent, AuditLogger, NoopAuditLogger};
pub use company::CompanyId;
pub use error::DomainError;
