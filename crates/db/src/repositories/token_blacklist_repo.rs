//! Repository for the `token_blacklist` table.

use hopinn_core::types::Timestamp;
use sqlx::PgPool;

pub struct TokenBlacklistRepo;

impl TokenBlacklistRepo {
    /// Revoke a token id until `expires_at`. Revoking twice is a no-op.
    pub async fn insert(pool: &PgPool, jti: &str, expires_at: Timestamp) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO token_blacklist (jti, expires_at) VALUES ($1, $2)
             ON CONFLICT (jti) DO NOTHING",
        )
        .bind(jti)
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn is_blacklisted(pool: &PgPool, jti: &str) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM token_blacklist WHERE jti = $1)")
            .bind(jti)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Delete entries whose token would have expired anyway. Returns the
    /// number of rows removed.
    pub async fn purge_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM token_blacklist WHERE expires_at < NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
