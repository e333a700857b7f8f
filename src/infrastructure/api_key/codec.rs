//! Key material codec
//!
//! Composes and decomposes the printable key string. The cleartext embeds the
//! issuing client's identifier so that authentication can route to that
//! client's digests in one lookup instead of scanning every stored hash; only
//! the random secret portion is protected by hashing.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::config::KeyConfig;
use crate::domain::api_client::ApiClientId;

/// Material produced for a freshly issued key
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    /// The full cleartext key, shown to the caller exactly once
    pub full_key: String,
    /// The configured prefix literal, stored for display
    pub prefix: String,
    /// The client embedded in the key
    pub client_id: ApiClientId,
    /// The hex-encoded random portion
    pub secret: String,
}

/// Codec for the `<prefix><client-id>_<secret>` key format
#[derive(Debug, Clone)]
pub struct KeyCodec {
    prefix: String,
    secret_bytes: usize,
}

impl KeyCodec {
    /// Create a codec with an explicit prefix and secret byte length
    pub fn new(prefix: impl Into<String>, secret_bytes: usize) -> Self {
        Self {
            prefix: prefix.into(),
            secret_bytes,
        }
    }

    /// Create a codec from configuration
    pub fn from_config(config: &KeyConfig) -> Self {
        Self::new(&config.prefix, config.secret_bytes)
    }

    /// The configured prefix literal
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generate fresh key material for a client
    ///
    /// The secret is read from the operating system's CSPRNG. Client ids are
    /// hyphenated UUIDs and can never contain the `_` separator, so the first
    /// `_` after the prefix always delimits the secret.
    pub fn generate(&self, client_id: &ApiClientId) -> KeyMaterial {
        let mut random_bytes = vec![0u8; self.secret_bytes];
        OsRng.fill_bytes(&mut random_bytes);
        let secret = hex::encode(random_bytes);

        let full_key = format!("{}{}_{}", self.prefix, client_id, secret);

        KeyMaterial {
            full_key,
            prefix: self.prefix.clone(),
            client_id: *client_id,
            secret,
        }
    }

    /// Extract the embedded client identifier from a presented key
    ///
    /// Returns `None` for anything that does not carry the configured prefix,
    /// a separator and a well-formed client segment. Never panics.
    pub fn extract_client_id(&self, presented: &str) -> Option<ApiClientId> {
        let rest = presented.strip_prefix(self.prefix.as_str())?;
        let (client_segment, _secret) = rest.split_once('_')?;

        ApiClientId::parse(client_segment).ok()
    }

    /// Display-safe rendering of a key: prefix and client id, secret masked
    pub fn masked(&self, key_prefix: &str, client_id: &ApiClientId) -> String {
        format!("{}{}_****", key_prefix, client_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_codec() -> KeyCodec {
        KeyCodec::new("sk_", 32)
    }

    #[test]
    fn test_generate_format() {
        let codec = test_codec();
        let client_id = ApiClientId::generate();

        let material = codec.generate(&client_id);

        assert!(material.full_key.starts_with("sk_"));
        assert_eq!(
            material.full_key,
            format!("sk_{}_{}", client_id, material.secret)
        );
        // 32 random bytes hex-encode to 64 characters
        assert_eq!(material.secret.len(), 64);
        assert!(material.secret.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_unique_secrets() {
        let codec = test_codec();
        let client_id = ApiClientId::generate();

        let first = codec.generate(&client_id);
        let second = codec.generate(&client_id);

        assert_ne!(first.secret, second.secret);
    }

    #[test]
    fn test_extract_roundtrip() {
        let codec = test_codec();
        let client_id = ApiClientId::generate();

        let material = codec.generate(&client_id);

        assert_eq!(codec.extract_client_id(&material.full_key), Some(client_id));
    }

    #[test]
    fn test_extract_wrong_prefix() {
        let codec = test_codec();
        let client_id = ApiClientId::generate();
        let material = codec.generate(&client_id);

        let other = KeyCodec::new("bk_", 32);
        assert_eq!(other.extract_client_id(&material.full_key), None);
    }

    #[test]
    fn test_extract_malformed() {
        let codec = test_codec();

        assert_eq!(codec.extract_client_id(""), None);
        assert_eq!(codec.extract_client_id("sk_"), None);
        assert_eq!(codec.extract_client_id("no-prefix-at-all"), None);
        // Separator present but the client segment is not a UUID
        assert_eq!(codec.extract_client_id("sk_notauuid_deadbeef"), None);
        // No separator after the prefix
        assert_eq!(
            codec.extract_client_id("sk_8e2f3f3e9a1f4d338f6f0a2b1c3d4e5f"),
            None
        );
    }

    #[test]
    fn test_configurable_secret_length() {
        let codec = KeyCodec::new("sk_", 16);
        let material = codec.generate(&ApiClientId::generate());

        assert_eq!(material.secret.len(), 32);
    }

    #[test]
    fn test_masked_hides_secret() {
        let codec = test_codec();
        let client_id = ApiClientId::generate();
        let material = codec.generate(&client_id);

        let masked = codec.masked(&material.prefix, &client_id);

        assert_eq!(masked, format!("sk_{}_****", client_id));
        assert!(!masked.contains(&material.secret));
    }
}
