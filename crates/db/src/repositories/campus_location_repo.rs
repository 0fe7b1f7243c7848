//! Repository for the `campus_locations` reference table.

use hopinn_core::campus::LocationCategory;
use hopinn_core::types::DbId;
use sqlx::PgPool;

use crate::models::campus_location::CampusLocation;

const COLUMNS: &str = "id, name, category, latitude, longitude, description, aliases, \
                       building_code, is_active, created_at, updated_at";

pub struct CampusLocationRepo;

impl CampusLocationRepo {
    /// All active locations ordered by category then name.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<CampusLocation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campus_locations WHERE is_active ORDER BY category, name");
        sqlx::query_as::<_, CampusLocation>(&query).fetch_all(pool).await
    }

    pub async fn list_by_category(
        pool: &PgPool,
        category: LocationCategory,
    ) -> Result<Vec<CampusLocation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM campus_locations
             WHERE is_active AND category = $1
             ORDER BY name"
        );
        sqlx::query_as::<_, CampusLocation>(&query)
            .bind(category.as_str())
            .fetch_all(pool)
            .await
    }

    /// Find an active location by id.
    pub async fn find_active(pool: &PgPool, id: DbId) -> Result<Option<CampusLocation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campus_locations WHERE id = $1 AND is_active");
        sqlx::query_as::<_, CampusLocation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
