use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::villas::models::{name_key, Villa};
use crate::features::villas::store::VillaStore;

const VILLA_COLUMNS: &str = "id, name, details, rate, sqm, occupancy, image_url, amenity, created_at, updated_at";

/// `villas` table store. Id assignment happens under a table lock that
/// conflicts with itself, so concurrent creates are serialized while plain
/// reads keep going. Name uniqueness is checked against `name_key`, written
/// from [`name_key`] so it folds case exactly like the in-memory store.
#[derive(Clone)]
pub struct PgVillaStore {
    pool: PgPool,
}

impl std::fmt::Debug for PgVillaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgVillaStore")
            .field("pool", &"<PgPool>")
            .finish()
    }
}

impl PgVillaStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VillaStore for PgVillaStore {
    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Villa>> {
        let query = format!("SELECT {} FROM villas ORDER BY id", VILLA_COLUMNS);
        sqlx::query_as::<_, Villa>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list villas: {:?}", e);
                AppError::Database(e)
            })
    }

    #[tracing::instrument(skip(self))]
    async fn get_by_id(&self, id: i32) -> Result<Option<Villa>> {
        let query = format!("SELECT {} FROM villas WHERE id = $1", VILLA_COLUMNS);
        sqlx::query_as::<_, Villa>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    #[tracing::instrument(skip(self))]
    async fn next_id(&self) -> Result<i32> {
        let next: i32 = sqlx::query_scalar("SELECT COALESCE(MAX(id), 0) + 1 FROM villas")
            .fetch_one(&self.pool)
            .await?;
        Ok(next)
    }

    #[tracing::instrument(skip(self, villa), fields(id = villa.id))]
    async fn insert(&self, villa: Villa) -> Result<Villa> {
        let query = format!(
            r#"
            INSERT INTO villas (id, name, details, rate, sqm, occupancy, image_url, amenity, name_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            VILLA_COLUMNS
        );
        sqlx::query_as::<_, Villa>(&query)
            .bind(villa.id)
            .bind(&villa.name)
            .bind(&villa.details)
            .bind(villa.rate)
            .bind(villa.sqm)
            .bind(villa.occupancy)
            .bind(&villa.image_url)
            .bind(&villa.amenity)
            .bind(name_key(&villa.name))
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    #[tracing::instrument(skip(self, villa), fields(name = %villa.name))]
    async fn create(&self, villa: Villa) -> Result<Villa> {
        let mut tx = self.pool.begin().await?;

        // SHARE ROW EXCLUSIVE conflicts with itself but not with SELECTs
        sqlx::query("LOCK TABLE villas IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let existing: Option<i32> =
            sqlx::query_scalar("SELECT id FROM villas WHERE name_key = $1 LIMIT 1")
                .bind(name_key(&villa.name))
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_some() {
            tx.rollback().await?;
            return Err(AppError::DuplicateName(villa.name));
        }

        let id: i32 = sqlx::query_scalar("SELECT COALESCE(MAX(id), 0) + 1 FROM villas")
            .fetch_one(&mut *tx)
            .await?;

        let query = format!(
            r#"
            INSERT INTO villas (id, name, details, rate, sqm, occupancy, image_url, amenity, name_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            VILLA_COLUMNS
        );
        let created = sqlx::query_as::<_, Villa>(&query)
            .bind(id)
            .bind(&villa.name)
            .bind(&villa.details)
            .bind(villa.rate)
            .bind(villa.sqm)
            .bind(villa.occupancy)
            .bind(&villa.image_url)
            .bind(&villa.amenity)
            .bind(name_key(&villa.name))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(created)
    }

    #[tracing::instrument(skip(self, villa), fields(id = villa.id))]
    async fn update(&self, villa: &Villa) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE villas
            SET name = $2,
                details = $3,
                rate = $4,
                sqm = $5,
                occupancy = $6,
                image_url = $7,
                amenity = $8,
                name_key = $9,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(villa.id)
        .bind(&villa.name)
        .bind(&villa.details)
        .bind(villa.rate)
        .bind(villa.sqm)
        .bind(villa.occupancy)
        .bind(&villa.image_url)
        .bind(&villa.amenity)
        .bind(name_key(&villa.name))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM villas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
