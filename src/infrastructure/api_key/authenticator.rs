//! Bearer-token authentication
//!
//! Single-pass state machine over one authentication attempt: extract the
//! client id from the presented key, resolve the client, fetch its active
//! digests and verify the cleartext against each in turn. Every failure
//! collapses to a uniform "not authenticated" result for the caller; the
//! distinguishing reason is only recorded in the logs.

use std::sync::Arc;

use thiserror::Error;
use tokio::task;
use tracing::{info, warn};

use crate::domain::api_key::{ApiKeyStore, Authenticated};
use crate::domain::DomainError;

use super::codec::KeyCodec;
use super::hasher::SecretHasher;

/// Why an authentication attempt terminated without a match
///
/// Internal diagnostics only; callers observe a uniform failure.
#[derive(Debug, Error)]
enum AuthFailure {
    #[error("missing or malformed bearer credential")]
    MalformedCredential,

    #[error("API client not found")]
    UnknownClient,

    #[error("no active keys for client")]
    NoActiveCredentials,

    #[error("no candidate digest matched")]
    VerificationFailed,

    #[error("persistence failure: {0}")]
    Persistence(#[from] DomainError),
}

/// Authenticator for inbound bearer tokens
#[derive(Debug)]
pub struct ApiKeyAuthenticator<S: ApiKeyStore, H: SecretHasher> {
    store: Arc<S>,
    codec: KeyCodec,
    hasher: Arc<H>,
}

impl<S, H> ApiKeyAuthenticator<S, H>
where
    S: ApiKeyStore,
    H: SecretHasher + 'static,
{
    /// Create a new authenticator
    pub fn new(store: Arc<S>, codec: KeyCodec, hasher: Arc<H>) -> Self {
        Self {
            store,
            codec,
            hasher,
        }
    }

    /// Authenticate one request from its `Authorization` header value
    ///
    /// `method` and `path` are only used for logging. Returns `None` for
    /// every failure, whatever the stage, so callers cannot distinguish why
    /// an attempt was rejected.
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
        method: &str,
        path: &str,
    ) -> Option<Authenticated> {
        match self.try_authenticate(authorization).await {
            Ok(auth) => {
                info!(
                    method,
                    path,
                    company_id = %auth.company_id,
                    api_client_id = %auth.api_client_id,
                    api_key_id = %auth.api_key_id,
                    "API key authenticated successfully"
                );
                Some(auth)
            }
            Err(failure) => {
                warn!(method, path, reason = %failure, "API key authentication failed");
                None
            }
        }
    }

    async fn try_authenticate(
        &self,
        authorization: Option<&str>,
    ) -> Result<Authenticated, AuthFailure> {
        let token = authorization
            .and_then(|header| header.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthFailure::MalformedCredential)?;

        let client_id = self
            .codec
            .extract_client_id(token)
            .ok_or(AuthFailure::MalformedCredential)?;

        let client = self
            .store
            .find_client(&client_id)
            .await?
            .ok_or(AuthFailure::UnknownClient)?;

        let candidates = self.store.list_active_keys(client.id()).await?;
        if candidates.is_empty() {
            return Err(AuthFailure::NoActiveCredentials);
        }

        // Memory-hard verification runs on the blocking pool; a single call
        // may legitimately take tens of milliseconds.
        for candidate in candidates {
            let hasher = Arc::clone(&self.hasher);
            let presented = token.to_string();
            let digest = candidate.key_hash;

            let matched = task::spawn_blocking(move || hasher.verify(&presented, &digest))
                .await
                .map_err(|e| {
                    DomainError::internal(format!("Verification worker failed: {}", e))
                })?;

            if matched {
                return Ok(Authenticated {
                    company_id: *client.company_id(),
                    api_client_id: *client.id(),
                    api_key_id: candidate.id,
                });
            }
        }

        Err(AuthFailure::VerificationFailed)
    }
}
