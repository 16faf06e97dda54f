use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::error::{map_db_error, AppError, Result};
use crate::features::images::services::dropped_urls;
use crate::features::images::ImageService;
use crate::features::places::dtos::{PlaceInputDto, PlaceQueryParams, PlaceResponseDto};
use crate::features::places::models::Place;

const PLACE_COLUMNS: &str = "p.id, p.destination_id, p.name, p.description, p.address, \
     p.latitude, p.longitude, p.images, p.enabled, p.created_at, p.updated_at";

/// Service for place management
pub struct PlaceService {
    pool: PgPool,
    images: Arc<ImageService>,
}

impl PlaceService {
    pub fn new(pool: PgPool, images: Arc<ImageService>) -> Self {
        Self { pool, images }
    }

    pub async fn create(&self, dto: PlaceInputDto) -> Result<PlaceResponseDto> {
        let place = sqlx::query_as::<_, Place>(&format!(
            r#"
            INSERT INTO places AS p
                (destination_id, name, description, address, latitude, longitude, images, enabled)
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, TRUE))
            RETURNING {PLACE_COLUMNS}
            "#
        ))
        .bind(dto.destination_id)
        .bind(dto.name.trim())
        .bind(dto.description.trim())
        .bind(&dto.address)
        .bind(dto.location.lat)
        .bind(dto.location.lng)
        .bind(&dto.images)
        .bind(dto.enabled)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "A place with this name already exists"))?;

        info!(
            "Place created: id={}, destination_id={}",
            place.id, place.destination_id
        );
        Ok(place.into())
    }

    /// List places by name, with the unpaginated total
    pub async fn list(&self, params: &PlaceQueryParams) -> Result<(Vec<PlaceResponseDto>, i64)> {
        let search = params.search_pattern();

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM places p
            JOIN destinations d ON d.id = p.destination_id
            WHERE ($1::UUID IS NULL OR p.destination_id = $1)
              AND ($2::UUID IS NULL OR d.category_id = $2)
              AND ($3::BOOLEAN IS NULL OR p.enabled = $3)
              AND ($4::TEXT IS NULL OR p.name ILIKE $4 OR p.description ILIKE $4 OR p.address ILIKE $4)
            "#,
        )
        .bind(params.destination_id)
        .bind(params.category_id)
        .bind(params.enabled)
        .bind(&search)
        .fetch_one(&self.pool)
        .await?;

        let places = sqlx::query_as::<_, Place>(&format!(
            r#"
            SELECT {PLACE_COLUMNS} FROM places p
            JOIN destinations d ON d.id = p.destination_id
            WHERE ($1::UUID IS NULL OR p.destination_id = $1)
              AND ($2::UUID IS NULL OR d.category_id = $2)
              AND ($3::BOOLEAN IS NULL OR p.enabled = $3)
              AND ($4::TEXT IS NULL OR p.name ILIKE $4 OR p.description ILIKE $4 OR p.address ILIKE $4)
            ORDER BY p.name
            OFFSET $5 LIMIT $6
            "#
        ))
        .bind(params.destination_id)
        .bind(params.category_id)
        .bind(params.enabled)
        .bind(&search)
        .bind(params.offset())
        .bind(params.limit())
        .fetch_all(&self.pool)
        .await?;

        Ok((places.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<PlaceResponseDto> {
        self.find(id).await.map(Into::into)
    }

    /// Replace a place; images no longer referenced are removed from storage
    pub async fn update(&self, id: Uuid, dto: PlaceInputDto) -> Result<PlaceResponseDto> {
        let previous = self.find(id).await?;

        let place = sqlx::query_as::<_, Place>(&format!(
            r#"
            UPDATE places AS p
            SET destination_id = $2,
                name = $3,
                description = $4,
                address = $5,
                latitude = $6,
                longitude = $7,
                images = $8,
                enabled = COALESCE($9, p.enabled),
                updated_at = NOW()
            WHERE p.id = $1
            RETURNING {PLACE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(dto.destination_id)
        .bind(dto.name.trim())
        .bind(dto.description.trim())
        .bind(&dto.address)
        .bind(dto.location.lat)
        .bind(dto.location.lng)
        .bind(&dto.images)
        .bind(dto.enabled)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "A place with this name already exists"))?
        .ok_or_else(|| not_found(id))?;

        let dropped = dropped_urls(&previous.images, &place.images);
        if !dropped.is_empty() {
            self.images.delete_urls_best_effort(&dropped).await;
        }

        info!("Place updated: id={}", id);
        Ok(place.into())
    }

    /// Delete a place with its ads, then remove their images best-effort
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let image_urls: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT unnest(p.images) FROM places p WHERE p.id = $1
            UNION ALL
            SELECT unnest(a.images) FROM ads a WHERE a.place_id = $1
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM places WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        tx.commit().await?;

        let removed = self.images.delete_urls_best_effort(&image_urls).await;
        info!(
            "Place deleted: id={}, images_removed={}/{}",
            id,
            removed,
            image_urls.len()
        );
        Ok(())
    }

    /// Flip the enabled flag
    pub async fn toggle_enabled(&self, id: Uuid) -> Result<PlaceResponseDto> {
        let place = sqlx::query_as::<_, Place>(&format!(
            r#"
            UPDATE places AS p
            SET enabled = NOT p.enabled, updated_at = NOW()
            WHERE p.id = $1
            RETURNING {PLACE_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(id))?;

        info!("Place toggled: id={}, enabled={}", id, place.enabled);
        Ok(place.into())
    }

    async fn find(&self, id: Uuid) -> Result<Place> {
        sqlx::query_as::<_, Place>(&format!(
            "SELECT {PLACE_COLUMNS} FROM places p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(id))
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Place '{}' not found", id))
}
