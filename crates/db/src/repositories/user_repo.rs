//! Repository for the `users` table.

use hopinn_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, first_name, last_name, email, password_hash, socket_id, created_at, updated_at";

pub struct UserRepo;

impl UserRepo {
    /// Insert a new rider, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (first_name, last_name, email, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a rider by email (case-insensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE lower(email) = lower($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Record the live connection handle for a rider. Returns `false` if
    /// the rider does not exist.
    pub async fn attach_socket(pool: &PgPool, id: DbId, socket_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET socket_id = $2 WHERE id = $1")
            .bind(id)
            .bind(socket_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clear the connection handle, but only while it still belongs to
    /// `socket_id`. A newer connection for the same rider is left alone.
    pub async fn detach_socket(pool: &PgPool, id: DbId, socket_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET socket_id = NULL WHERE id = $1 AND socket_id = $2")
            .bind(id)
            .bind(socket_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
