//! API key domain
//!
//! Domain types and the store gateway trait for hashed, revocable API keys.

mod entity;
mod repository;

pub use entity::{ApiKey, ApiKeyId, Authenticated, RevokeOutcome};
pub use repository::{ApiKeyStore, CompanyKey, KeyCandidate, KeyOwner};

#[cfg(test)]
pub use repository::mock;
