use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::error::{map_db_error, AppError, Result};
use crate::features::categories::dtos::{
    CategoryInputDto, CategoryQueryParams, CategoryResponseDto,
};
use crate::features::categories::models::Category;
use crate::features::images::ImageService;

const CATEGORY_COLUMNS: &str =
    "id, title, description, image, icon, color, display_order, enabled, created_at, updated_at";

/// Service for category management
pub struct CategoryService {
    pool: PgPool,
    images: Arc<ImageService>,
}

impl CategoryService {
    pub fn new(pool: PgPool, images: Arc<ImageService>) -> Self {
        Self { pool, images }
    }

    pub async fn create(&self, dto: CategoryInputDto) -> Result<CategoryResponseDto> {
        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            INSERT INTO categories (title, description, image, icon, color, display_order, enabled)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, TRUE))
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(dto.title.trim())
        .bind(dto.description.trim())
        .bind(&dto.image)
        .bind(&dto.icon)
        .bind(&dto.color)
        .bind(dto.display_order)
        .bind(dto.enabled)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "A category with this title already exists"))?;

        info!("Category created: id={}, title={}", category.id, category.title);
        Ok(category.into())
    }

    /// List categories ordered by display order, with the unpaginated total
    pub async fn list(&self, params: &CategoryQueryParams) -> Result<(Vec<CategoryResponseDto>, i64)> {
        let search = params.search_pattern();

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM categories
            WHERE ($1::BOOLEAN IS NULL OR enabled = $1)
              AND ($2::TEXT IS NULL OR title ILIKE $2 OR description ILIKE $2)
            "#,
        )
        .bind(params.enabled)
        .bind(&search)
        .fetch_one(&self.pool)
        .await?;

        let categories = sqlx::query_as::<_, Category>(&format!(
            r#"
            SELECT {CATEGORY_COLUMNS} FROM categories
            WHERE ($1::BOOLEAN IS NULL OR enabled = $1)
              AND ($2::TEXT IS NULL OR title ILIKE $2 OR description ILIKE $2)
            ORDER BY display_order, title
            OFFSET $3 LIMIT $4
            "#
        ))
        .bind(params.enabled)
        .bind(&search)
        .bind(params.offset())
        .bind(params.limit())
        .fetch_all(&self.pool)
        .await?;

        Ok((categories.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<CategoryResponseDto> {
        self.find(id).await.map(Into::into)
    }

    /// Replace a category; a replaced cover image is removed from storage
    pub async fn update(&self, id: Uuid, dto: CategoryInputDto) -> Result<CategoryResponseDto> {
        let previous = self.find(id).await?;

        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            UPDATE categories
            SET title = $2,
                description = $3,
                image = $4,
                icon = $5,
                color = $6,
                display_order = $7,
                enabled = COALESCE($8, enabled),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(dto.title.trim())
        .bind(dto.description.trim())
        .bind(&dto.image)
        .bind(&dto.icon)
        .bind(&dto.color)
        .bind(dto.display_order)
        .bind(dto.enabled)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "A category with this title already exists"))?
        .ok_or_else(|| not_found(id))?;

        if previous.image != category.image {
            self.images.delete_urls_best_effort(&[previous.image]).await;
        }

        info!("Category updated: id={}", id);
        Ok(category.into())
    }

    /// Delete a category together with its destinations, places and ads.
    ///
    /// The rows go first; images they referenced are then removed best-effort.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let image_urls: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT c.image FROM categories c WHERE c.id = $1
            UNION ALL
            SELECT unnest(d.images) FROM destinations d WHERE d.category_id = $1
            UNION ALL
            SELECT unnest(p.images) FROM places p
            JOIN destinations d ON d.id = p.destination_id
            WHERE d.category_id = $1
            UNION ALL
            SELECT unnest(a.images) FROM ads a
            JOIN places p ON p.id = a.place_id
            JOIN destinations d ON d.id = p.destination_id
            WHERE d.category_id = $1
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        tx.commit().await?;

        let removed = self.images.delete_urls_best_effort(&image_urls).await;
        info!(
            "Category deleted: id={}, images_removed={}/{}",
            id,
            removed,
            image_urls.len()
        );
        Ok(())
    }

    /// Flip the enabled flag
    pub async fn toggle_enabled(&self, id: Uuid) -> Result<CategoryResponseDto> {
        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            UPDATE categories
            SET enabled = NOT enabled, updated_at = NOW()
            WHERE id = $1
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(id))?;

        info!("Category toggled: id={}, enabled={}", id, category.enabled);
        Ok(category.into())
    }

    async fn find(&self, id: Uuid) -> Result<Category> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(id))
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Category '{}' not found", id))
}
