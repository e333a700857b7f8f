//! PostgreSQL credential store implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::api_client::{ApiClient, ApiClientId};
use crate::domain::api_key::{
    ApiKey, ApiKeyId, ApiKeyStore, CompanyKey, KeyCandidate, KeyOwner, RevokeOutcome,
};
use crate::domain::company::CompanyId;
use crate::domain::DomainError;

/// PostgreSQL implementation of [`ApiKeyStore`]
///
/// Backed by the `api_clients` and `api_keys` tables. Revocation uses a
/// conditional update so an already-revoked key is never rewritten.
#[derive(Debug, Clone)]
pub struct PostgresApiKeyStore {
    pool: PgPool,
}

impl PostgresApiKeyStore {
    /// Create a new store with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiKeyStore for PostgresApiKeyStore {
    async fn create_client(&self, client: ApiClient) -> Result<ApiClient, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO api_clients (id, company_id, label, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(client.id().as_uuid())
        .bind(client.company_id().as_uuid())
        .bind(client.label())
        .bind(client.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict(format!("API client '{}' already exists", client.id()))
            } else {
                DomainError::storage(format!("Failed to create API client: {}", e))
            }
        })?;

        Ok(client)
    }

    async fn delete_client(&self, id: &ApiClientId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM api_clients WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete API client: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_client(&self, id: &ApiClientId) -> Result<Option<ApiClient>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, company_id, label, created_at
            FROM api_clients
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get API client: {}", e)))?;

        Ok(row.map(|row| row_to_client(&row)))
    }

    async fn create_key(&self, key: ApiKey) -> Result<ApiKey, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO api_keys (id, api_client_id, key_hash, key_prefix, revoked,
                                  created_at, revoked_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(key.id().as_uuid())
        .bind(key.api_client_id().as_uuid())
        .bind(key.key_hash())
        .bind(key.key_prefix())
        .bind(key.is_revoked())
        .bind(key.created_at())
        .bind(key.revoked_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict(format!("API key '{}' already exists", key.id()))
            } else {
                DomainError::storage(format!("Failed to create API key: {}", e))
            }
        })?;

        Ok(key)
    }

    async fn list_active_keys(
        &self,
        client_id: &ApiClientId,
    ) -> Result<Vec<KeyCandidate>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, key_hash
            FROM api_keys
            WHERE api_client_id = $1 AND revoked = FALSE
            "#,
        )
        .bind(client_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list active API keys: {}", e)))?;

        Ok(rows
            .iter()
            .map(|row| {
                let id: Uuid = row.get("id");
                let key_hash: String = row.get("key_hash");

                KeyCandidate {
                    id: ApiKeyId::from_uuid(id),
                    key_hash,
                }
            })
            .collect())
    }

    async fn list_keys_for_company(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<CompanyKey>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT k.id, k.api_client_id, c.label, k.key_prefix, k.revoked,
                   k.created_at, k.revoked_at
            FROM api_keys k
            INNER JOIN api_clients c ON c.id = k.api_client_id
            WHERE c.company_id = $1
            ORDER BY k.created_at DESC
            "#,
        )
        .bind(company_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list API keys: {}", e)))?;

        Ok(rows.iter().map(row_to_company_key).collect())
    }

    async fn find_key_owner(&self, id: &ApiKeyId) -> Result<Option<KeyOwner>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT c.company_id, c.id AS api_client_id
            FROM api_keys k
            INNER JOIN api_clients c ON c.id = k.api_client_id
            WHERE k.id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to resolve API key owner: {}", e)))?;

        Ok(row.map(|row| {
            let company_id: Uuid = row.get("company_id");
            let api_client_id: Uuid = row.get("api_client_id");

            KeyOwner {
                company_id: CompanyId::from_uuid(company_id),
                api_client_id: ApiClientId::from_uuid(api_client_id),
            }
        }))
    }

    async fn revoke_key(
        &self,
        id: &ApiKeyId,
        at: DateTime<Utc>,
    ) -> Result<Option<RevokeOutcome>, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE api_keys
            SET revoked = TRUE, revoked_at = $2
            WHERE id = $1 AND revoked = FALSE
            "#,
        )
        .bind(id.as_uuid())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to revoke API key: {}", e)))?;

        if result.rows_affected() > 0 {
            return Ok(Some(RevokeOutcome::Revoked));
        }

        // Nothing updated: the key is either gone or already revoked
        let row = sqlx::query("SELECT revoked FROM api_keys WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check API key: {}", e)))?;

        Ok(row.map(|_| RevokeOutcome::AlreadyRevoked))
    }
}

fn row_to_client(row: &sqlx::postgres::PgRow) -> ApiClient {
    let id: Uuid = row.get("id");
    let company_id: Uuid = row.get("company_id");
    let label: String = row.get("label");
    let created_at: DateTime<Utc> = row.get("created_at");

    ApiClient::from_parts(
        ApiClientId::from_uuid(id),
        CompanyId::from_uuid(company_id),
        label,
        created_at,
    )
}

fn row_to_company_key(row: &sqlx::postgres::PgRow) -> CompanyKey {
    let id: Uuid = row.get("id");
    let api_client_id: Uuid = row.get("api_client_id");
    let label: String = row.get("label");
    let key_prefix: String = row.get("key_prefix");
    let revoked: bool = row.get("revoked");
    let created_at: DateTime<Utc> = row.get("created_at");
    let revoked_at: Option<DateTime<Utc>> = row.get("revoked_at");

    CompanyKey {
        id: ApiKeyId::from_uuid(id),
        api_client_id: ApiClientId::from_uuid(api_client_id),
        label,
        key_prefix,
        revoked,
        created_at,
        revoked_at,
    }
}
