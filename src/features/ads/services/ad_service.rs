use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::error::{map_db_error, AppError, Result};
use crate::features::ads::dtos::{AdInputDto, AdQueryParams, AdResponseDto};
use crate::features::ads::models::Ad;
use crate::features::images::services::dropped_urls;
use crate::features::images::ImageService;

const AD_COLUMNS: &str = "id, place_id, title, description, contact_name, phone, email, \
     website, whatsapp, images, enabled, created_at, updated_at";

/// Service for sponsored ads
pub struct AdService {
    pool: PgPool,
    images: Arc<ImageService>,
}

impl AdService {
    pub fn new(pool: PgPool, images: Arc<ImageService>) -> Self {
        Self { pool, images }
    }

    pub async fn create(&self, dto: AdInputDto) -> Result<AdResponseDto> {
        let ad = sqlx::query_as::<_, Ad>(&format!(
            r#"
            INSERT INTO ads
                (place_id, title, description, contact_name, phone, email, website, whatsapp, images, enabled)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, TRUE))
            RETURNING {AD_COLUMNS}
            "#
        ))
        .bind(dto.place_id)
        .bind(dto.title.trim())
        .bind(dto.description.trim())
        .bind(&dto.contact_name)
        .bind(&dto.phone)
        .bind(&dto.email)
        .bind(&dto.website)
        .bind(&dto.whatsapp)
        .bind(&dto.images)
        .bind(dto.enabled)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "An ad with this title already exists"))?;

        info!("Ad created: id={}, place_id={}", ad.id, ad.place_id);
        Ok(ad.into())
    }

    /// List ads, newest first, with the unpaginated total
    pub async fn list(&self, params: &AdQueryParams) -> Result<(Vec<AdResponseDto>, i64)> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM ads
            WHERE ($1::UUID IS NULL OR place_id = $1)
              AND ($2::BOOLEAN IS NULL OR enabled = $2)
            "#,
        )
        .bind(params.place_id)
        .bind(params.enabled)
        .fetch_one(&self.pool)
        .await?;

        let ads = sqlx::query_as::<_, Ad>(&format!(
            r#"
            SELECT {AD_COLUMNS} FROM ads
            WHERE ($1::UUID IS NULL OR place_id = $1)
              AND ($2::BOOLEAN IS NULL OR enabled = $2)
            ORDER BY created_at DESC
            OFFSET $3 LIMIT $4
            "#
        ))
        .bind(params.place_id)
        .bind(params.enabled)
        .bind(params.offset())
        .bind(params.limit())
        .fetch_all(&self.pool)
        .await?;

        Ok((ads.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<AdResponseDto> {
        self.find(id).await.map(Into::into)
    }

    /// Replace an ad; images no longer referenced are removed from storage
    pub async fn update(&self, id: Uuid, dto: AdInputDto) -> Result<AdResponseDto> {
        let previous = self.find(id).await?;

        let ad = sqlx::query_as::<_, Ad>(&format!(
            r#"
            UPDATE ads
            SET place_id = $2,
                title = $3,
                description = $4,
                contact_name = $5,
                phone = $6,
                email = $7,
                website = $8,
                whatsapp = $9,
                images = $10,
                enabled = COALESCE($11, enabled),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {AD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(dto.place_id)
        .bind(dto.title.trim())
        .bind(dto.description.trim())
        .bind(&dto.contact_name)
        .bind(&dto.phone)
        .bind(&dto.email)
        .bind(&dto.website)
        .bind(&dto.whatsapp)
        .bind(&dto.images)
        .bind(dto.enabled)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "An ad with this title already exists"))?
        .ok_or_else(|| not_found(id))?;

        let dropped = dropped_urls(&previous.images, &ad.images);
        if !dropped.is_empty() {
            self.images.delete_urls_best_effort(&dropped).await;
        }

        info!("Ad updated: id={}", id);
        Ok(ad.into())
    }

    /// Delete an ad, then remove its images best-effort
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let images: Option<Vec<String>> =
            sqlx::query_scalar("DELETE FROM ads WHERE id = $1 RETURNING images")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        let images = images.ok_or_else(|| not_found(id))?;

        let removed = self.images.delete_urls_best_effort(&images).await;
        info!(
            "Ad deleted: id={}, images_removed={}/{}",
            id,
            removed,
            images.len()
        );
        Ok(())
    }

    /// Flip the enabled flag
    pub async fn toggle_enabled(&self, id: Uuid) -> Result<AdResponseDto> {
        let ad = sqlx::query_as::<_, Ad>(&format!(
            r#"
            UPDATE ads
            SET enabled = NOT enabled, updated_at = NOW()
            WHERE id = $1
            RETURNING {AD_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(id))?;

        info!("Ad toggled: id={}, enabled={}", id, ad.enabled);
        Ok(ad.into())
    }

    async fn find(&self, id: Uuid) -> Result<Ad> {
        sqlx::query_as::<_, Ad>(&format!("SELECT {AD_COLUMNS} FROM ads WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Ad '{}' not found", id))
}
