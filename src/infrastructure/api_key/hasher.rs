//! Secret hashing using Argon2id
//!
//! Digests are PHC strings with salt and parameters embedded, so verification
//! is self-describing. Verification is fail-closed: a digest that cannot be
//! parsed simply does not verify.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use std::fmt::Debug;

use crate::config::HashingConfig;
use crate::domain::DomainError;

/// Trait for one-way hashing of key cleartexts
pub trait SecretHasher: Send + Sync + Debug {
    /// Hash a cleartext key
    ///
    /// Failures here are fatal to the issuance that requested them.
    fn hash(&self, secret: &str) -> Result<String, DomainError>;

    /// Verify a cleartext key against a stored digest
    ///
    /// Never fails: malformed digests and mismatches both yield `false`.
    fn verify(&self, secret: &str, digest: &str) -> bool;
}

/// Argon2id-based secret hasher
#[derive(Debug, Clone)]
pub struct Argon2SecretHasher {
    params: Params,
}

impl Argon2SecretHasher {
    /// Create a hasher with the given cost parameters
    pub fn new(config: &HashingConfig) -> Result<Self, DomainError> {
        let params = Params::new(config.memory_kib, config.time_cost, config.parallelism, None)
            .map_err(|e| {
                DomainError::configuration(format!("Invalid Argon2 parameters: {}", e))
            })?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'_> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl SecretHasher for Argon2SecretHasher {
    fn hash(&self, secret: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::hashing(format!("Failed to hash API key: {}", e)))
    }

    fn verify(&self, secret: &str, digest: &str) -> bool {
        let parsed = match PasswordHash::new(digest) {
            Ok(h) => h,
            Err(_) => return false,
        };

        self.argon2()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Lighter costs than production so the suite stays fast
    fn test_hasher() -> Argon2SecretHasher {
        Argon2SecretHasher::new(&HashingConfig {
            memory_kib: 1024,
            time_cost: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = test_hasher();
        let secret = "sk_client_deadbeefcafe";

        let digest = hasher.hash(secret).unwrap();

        assert!(hasher.verify(secret, &digest));
        assert!(!hasher.verify("sk_client_wrongsecret", &digest));
    }

    #[test]
    fn test_digest_is_phc_argon2id() {
        let hasher = test_hasher();
        let digest = hasher.hash("secret").unwrap();

        assert!(digest.starts_with("$argon2id$"));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = test_hasher();
        let secret = "same-secret";

        let first = hasher.hash(secret).unwrap();
        let second = hasher.hash(secret).unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify(secret, &first));
        assert!(hasher.verify(secret, &second));
    }

    #[test]
    fn test_verify_malformed_digest_is_false() {
        let hasher = test_hasher();

        assert!(!hasher.verify("secret", ""));
        assert!(!hasher.verify("secret", "not-a-phc-string"));
        assert!(!hasher.verify("secret", "$argon2id$corrupt"));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let result = Argon2SecretHasher::new(&HashingConfig {
            memory_kib: 0,
            time_cost: 0,
            parallelism: 0,
        });

        assert!(matches!(
            result,
            Err(DomainError::Configuration { .. })
        ));
    }
}
