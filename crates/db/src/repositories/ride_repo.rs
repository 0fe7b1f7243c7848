//! Repository for the `rides` table.
//!
//! Every status transition is a single conditional `UPDATE` that names the
//! expected prior state in its `WHERE` clause. When the guard does not
//! match, no row is returned and the caller re-reads the ride to find out
//! why. Two concurrent confirmations of the same ride therefore cannot
//! both succeed.

use hopinn_core::ride::RideStatus;
use hopinn_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::ride::{CreateRide, Ride, RideWithOtp};

/// Column list for [`Ride`]. The OTP is deliberately absent.
const COLUMNS: &str = "id, rider_id, captain_id, pickup, destination, campus_pickup, campus_destination, \
                       fare, vehicle_type, status_id, distance_m, duration_s, created_at, updated_at";

pub struct RideRepo;

impl RideRepo {
    /// Insert a new pending ride, returning it with its OTP.
    pub async fn create(pool: &PgPool, input: &CreateRide) -> Result<RideWithOtp, sqlx::Error> {
        let (campus_pickup, campus_destination) = match input.campus_snapshots() {
            Some((p, d)) => (Some(Json(p)), Some(Json(d))),
            None => (None, None),
        };
        let query = format!(
            "INSERT INTO rides
                (rider_id, pickup, destination, campus_pickup, campus_destination,
                 fare, vehicle_type, status_id, distance_m, duration_s, otp)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}, otp"
        );
        sqlx::query_as::<_, RideWithOtp>(&query)
            .bind(input.rider_id)
            .bind(input.pickup.label())
            .bind(input.destination.label())
            .bind(campus_pickup)
            .bind(campus_destination)
            .bind(input.fare)
            .bind(input.vehicle_type.as_str())
            .bind(RideStatus::Pending.id())
            .bind(input.distance_m)
            .bind(input.duration_s)
            .bind(&input.otp)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Ride>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rides WHERE id = $1");
        sqlx::query_as::<_, Ride>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a ride including its OTP. For server-side checks only.
    pub async fn find_with_otp(pool: &PgPool, id: DbId) -> Result<Option<RideWithOtp>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS}, otp FROM rides WHERE id = $1");
        sqlx::query_as::<_, RideWithOtp>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A rider's rides, newest first.
    pub async fn list_for_rider(pool: &PgPool, rider_id: DbId) -> Result<Vec<Ride>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rides WHERE rider_id = $1 ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Ride>(&query)
            .bind(rider_id)
            .fetch_all(pool)
            .await
    }

    /// The most recent pending rides. Pending rides never expire.
    pub async fn list_pending(pool: &PgPool, limit: i64) -> Result<Vec<Ride>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rides
             WHERE status_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, Ride>(&query)
            .bind(RideStatus::Pending.id())
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    // -- transitions --

    /// Claim a pending, unassigned ride for `captain_id`.
    pub async fn accept(pool: &PgPool, id: DbId, captain_id: DbId) -> Result<Option<RideWithOtp>, sqlx::Error> {
        let query = format!(
            "UPDATE rides SET status_id = $3, captain_id = $2
             WHERE id = $1 AND status_id = $4 AND captain_id IS NULL
             RETURNING {COLUMNS}, otp"
        );
        sqlx::query_as::<_, RideWithOtp>(&query)
            .bind(id)
            .bind(captain_id)
            .bind(RideStatus::Accepted.id())
            .bind(RideStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Move an accepted ride owned by `captain_id` to ongoing when `otp`
    /// matches the stored code.
    pub async fn start(pool: &PgPool, id: DbId, captain_id: DbId, otp: &str) -> Result<Option<Ride>, sqlx::Error> {
        let query = format!(
            "UPDATE rides SET status_id = $4
             WHERE id = $1 AND captain_id = $2 AND otp = $3 AND status_id = $5
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ride>(&query)
            .bind(id)
            .bind(captain_id)
            .bind(otp)
            .bind(RideStatus::Ongoing.id())
            .bind(RideStatus::Accepted.id())
            .fetch_optional(pool)
            .await
    }

    /// Complete an ongoing ride owned by `captain_id`.
    pub async fn complete(pool: &PgPool, id: DbId, captain_id: DbId) -> Result<Option<Ride>, sqlx::Error> {
        let query = format!(
            "UPDATE rides SET status_id = $3
             WHERE id = $1 AND captain_id = $2 AND status_id = $4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ride>(&query)
            .bind(id)
            .bind(captain_id)
            .bind(RideStatus::Completed.id())
            .bind(RideStatus::Ongoing.id())
            .fetch_optional(pool)
            .await
    }

    /// Cancel a ride owned by `rider_id` that has not started yet.
    pub async fn cancel(pool: &PgPool, id: DbId, rider_id: DbId) -> Result<Option<Ride>, sqlx::Error> {
        let cancellable = [RideStatus::Pending.id(), RideStatus::Accepted.id()];
        let query = format!(
            "UPDATE rides SET status_id = $3
             WHERE id = $1 AND rider_id = $2 AND status_id = ANY($4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ride>(&query)
            .bind(id)
            .bind(rider_id)
            .bind(RideStatus::Cancelled.id())
            .bind(&cancellable[..])
            .fetch_optional(pool)
            .await
    }
}
