//! API key infrastructure implementations
//!
//! Key material generation, Argon2 hashing, authentication and the key
//! lifecycle, plus the in-memory and Postgres credential stores.

mod authenticator;
mod codec;
mod hasher;
mod in_memory;
mod postgres;
mod service;

pub use authenticator::ApiKeyAuthenticator;
pub use codec::{KeyCodec, KeyMaterial};
pub use hasher::{Argon2SecretHasher, SecretHasher};
pub use in_memory::InMemoryApiKeyStore;
pub use postgres::PostgresApiKeyStore;
pub use service::{ApiKeyListing, ApiKeyService, IssuedApiKey};
