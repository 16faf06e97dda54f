use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::error::{map_db_error, AppError, Result};
use crate::features::destinations::dtos::{
    DestinationInputDto, DestinationQueryParams, DestinationResponseDto,
};
use crate::features::destinations::models::Destination;
use crate::features::images::services::dropped_urls;
use crate::features::images::ImageService;

const DESTINATION_COLUMNS: &str = "id, category_id, title, description, rating, duration, \
     highlights, images, enabled, created_at, updated_at";

/// Service for destination management
pub struct DestinationService {
    pool: PgPool,
    images: Arc<ImageService>,
}

impl DestinationService {
    pub fn new(pool: PgPool, images: Arc<ImageService>) -> Self {
        Self { pool, images }
    }

    pub async fn create(&self, dto: DestinationInputDto) -> Result<DestinationResponseDto> {
        let destination = sqlx::query_as::<_, Destination>(&format!(
            r#"
            INSERT INTO destinations
                (category_id, title, description, rating, duration, highlights, images, enabled)
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, TRUE))
            RETURNING {DESTINATION_COLUMNS}
            "#
        ))
        .bind(dto.category_id)
        .bind(dto.title.trim())
        .bind(dto.description.trim())
        .bind(dto.rating.round_dp(1))
        .bind(dto.duration.trim())
        .bind(trimmed(&dto.highlights))
        .bind(&dto.images)
        .bind(dto.enabled)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "A destination with this title already exists"))?;

        info!(
            "Destination created: id={}, category_id={}",
            destination.id, destination.category_id
        );
        Ok(destination.into())
    }

    /// List destinations, best rated first, with the unpaginated total
    pub async fn list(
        &self,
        params: &DestinationQueryParams,
    ) -> Result<(Vec<DestinationResponseDto>, i64)> {
        let search = params.search_pattern();

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM destinations
            WHERE ($1::UUID IS NULL OR category_id = $1)
              AND ($2::BOOLEAN IS NULL OR enabled = $2)
              AND ($3::TEXT IS NULL OR title ILIKE $3 OR description ILIKE $3)
            "#,
        )
        .bind(params.category_id)
        .bind(params.enabled)
        .bind(&search)
        .fetch_one(&self.pool)
        .await?;

        let destinations = sqlx::query_as::<_, Destination>(&format!(
            r#"
            SELECT {DESTINATION_COLUMNS} FROM destinations
            WHERE ($1::UUID IS NULL OR category_id = $1)
              AND ($2::BOOLEAN IS NULL OR enabled = $2)
              AND ($3::TEXT IS NULL OR title ILIKE $3 OR description ILIKE $3)
            ORDER BY rating DESC, title
            OFFSET $4 LIMIT $5
            "#
        ))
        .bind(params.category_id)
        .bind(params.enabled)
        .bind(&search)
        .bind(params.offset())
        .bind(params.limit())
        .fetch_all(&self.pool)
        .await?;

        Ok((destinations.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<DestinationResponseDto> {
        self.find(id).await.map(Into::into)
    }

    /// Replace a destination; images no longer referenced are removed from storage
    pub async fn update(
        &self,
        id: Uuid,
        dto: DestinationInputDto,
    ) -> Result<DestinationResponseDto> {
        let previous = self.find(id).await?;

        let destination = sqlx::query_as::<_, Destination>(&format!(
            r#"
            UPDATE destinations
            SET category_id = $2,
                title = $3,
                description = $4,
                rating = $5,
                duration = $6,
                highlights = $7,
                images = $8,
                enabled = COALESCE($9, enabled),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {DESTINATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(dto.category_id)
        .bind(dto.title.trim())
        .bind(dto.description.trim())
        .bind(dto.rating.round_dp(1))
        .bind(dto.duration.trim())
        .bind(trimmed(&dto.highlights))
        .bind(&dto.images)
        .bind(dto.enabled)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "A destination with this title already exists"))?
        .ok_or_else(|| not_found(id))?;

        let dropped = dropped_urls(&previous.images, &destination.images);
        if !dropped.is_empty() {
            self.images.delete_urls_best_effort(&dropped).await;
        }

        info!("Destination updated: id={}", id);
        Ok(destination.into())
    }

    /// Delete a destination with its places and ads.
    ///
    /// The rows go first; images they referenced are then removed best-effort,
    /// so a storage failure never keeps the destination alive.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let image_urls: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT unnest(d.images) FROM destinations d WHERE d.id = $1
            UNION ALL
            SELECT unnest(p.images) FROM places p WHERE p.destination_id = $1
            UNION ALL
            SELECT unnest(a.images) FROM ads a
            JOIN places p ON p.id = a.place_id
            WHERE p.destination_id = $1
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM destinations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        tx.commit().await?;

        let removed = self.images.delete_urls_best_effort(&image_urls).await;
        info!(
            "Destination deleted: id={}, images_removed={}/{}",
            id,
            removed,
            image_urls.len()
        );
        Ok(())
    }

    /// Flip the enabled flag
    pub async fn toggle_enabled(&self, id: Uuid) -> Result<DestinationResponseDto> {
        let destination = sqlx::query_as::<_, Destination>(&format!(
            r#"
            UPDATE destinations
            SET enabled = NOT enabled, updated_at = NOW()
            WHERE id = $1
            RETURNING {DESTINATION_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(id))?;

        info!(
            "Destination toggled: id={}, enabled={}",
            id, destination.enabled
        );
        Ok(destination.into())
    }

    async fn find(&self, id: Uuid) -> Result<Destination> {
        sqlx::query_as::<_, Destination>(&format!(
            "SELECT {DESTINATION_COLUMNS} FROM destinations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(id))
    }
}

fn trimmed(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.trim().to_string()).collect()
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Destination '{}' not found", id))
}
