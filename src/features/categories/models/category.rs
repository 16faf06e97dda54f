use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for category
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image: String,
    pub icon: String,
    pub color: String,
    pub display_order: i32,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
