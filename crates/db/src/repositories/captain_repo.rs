//! Repository for the `captains` table, including presence and the two
//! proximity lookups.

use hopinn_core::geo::Coordinates;
use hopinn_core::ride::CaptainStatus;
use hopinn_core::types::DbId;
use sqlx::PgPool;

use crate::models::captain::{Captain, CaptainWithDistance, CreateCaptain};

const COLUMNS: &str = "id, first_name, last_name, email, password_hash, socket_id, status_id, \
                       vehicle_color, vehicle_plate, vehicle_capacity, vehicle_type, \
                       position_lat, position_lng, legacy_ltd, legacy_lng, created_at, updated_at";

pub struct CaptainRepo;

impl CaptainRepo {
    /// Insert a new captain (initially inactive), returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCaptain) -> Result<Captain, sqlx::Error> {
        let query = format!(
            "INSERT INTO captains
                (first_name, last_name, email, password_hash,
                 vehicle_color, vehicle_plate, vehicle_capacity, vehicle_type, status_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Captain>(&query)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.vehicle_color)
            .bind(&input.vehicle_plate)
            .bind(input.vehicle_capacity)
            .bind(input.vehicle_type.as_str())
            .bind(CaptainStatus::Inactive.id())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Captain>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM captains WHERE id = $1");
        sqlx::query_as::<_, Captain>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a captain by email (case-insensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Captain>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM captains WHERE lower(email) = lower($1)");
        sqlx::query_as::<_, Captain>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    // -- presence --

    /// Bind a live connection to the captain and mark them active.
    pub async fn attach_socket(pool: &PgPool, id: DbId, socket_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE captains SET socket_id = $2, status_id = $3 WHERE id = $1")
            .bind(id)
            .bind(socket_id)
            .bind(CaptainStatus::Active.id())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clear the connection and mark the captain inactive, but only while
    /// the stored handle still equals `socket_id`.
    pub async fn detach_socket(pool: &PgPool, id: DbId, socket_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE captains SET socket_id = NULL, status_id = $3
             WHERE id = $1 AND socket_id = $2",
        )
        .bind(id)
        .bind(socket_id)
        .bind(CaptainStatus::Inactive.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Store a position in both the indexed columns and the legacy pair.
    pub async fn update_position(pool: &PgPool, id: DbId, at: Coordinates) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE captains SET
                position_lat = $2, position_lng = $3,
                legacy_ltd = $2, legacy_lng = $3
             WHERE id = $1",
        )
        .bind(id)
        .bind(at.latitude)
        .bind(at.longitude)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // -- lookups --

    /// Active captains holding a live connection.
    pub async fn list_connected_active(pool: &PgPool) -> Result<Vec<Captain>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM captains
             WHERE status_id = $1 AND socket_id IS NOT NULL
             ORDER BY id"
        );
        sqlx::query_as::<_, Captain>(&query)
            .bind(CaptainStatus::Active.id())
            .fetch_all(pool)
            .await
    }

    /// Active, connected captains within `radius_m` of `center`, nearest first.
    ///
    /// Requires the `earthdistance` extension; errors if it is missing.
    pub async fn list_within_radius(
        pool: &PgPool,
        center: Coordinates,
        radius_m: f64,
    ) -> Result<Vec<CaptainWithDistance>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS},
                    earth_distance(ll_to_earth($1, $2), ll_to_earth(position_lat, position_lng)) AS distance_m
             FROM captains
             WHERE status_id = $3
               AND socket_id IS NOT NULL
               AND position_lat IS NOT NULL AND position_lng IS NOT NULL
               AND earth_box(ll_to_earth($1, $2), $4) @> ll_to_earth(position_lat, position_lng)
               AND earth_distance(ll_to_earth($1, $2), ll_to_earth(position_lat, position_lng)) <= $4
             ORDER BY distance_m"
        );
        sqlx::query_as::<_, CaptainWithDistance>(&query)
            .bind(center.latitude)
            .bind(center.longitude)
            .bind(CaptainStatus::Active.id())
            .bind(radius_m)
            .fetch_all(pool)
            .await
    }

    /// Every active captain with a legacy position, regardless of distance.
    pub async fn list_active_with_legacy_position(pool: &PgPool) -> Result<Vec<Captain>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM captains
             WHERE status_id = $1 AND legacy_ltd IS NOT NULL AND legacy_lng IS NOT NULL
             ORDER BY id"
        );
        sqlx::query_as::<_, Captain>(&query)
            .bind(CaptainStatus::Active.id())
            .fetch_all(pool)
            .await
    }
}
