use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for destination
#[derive(Debug, Clone, FromRow)]
pub struct Destination {
    pub id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub description: String,
    /// NUMERIC(2,1), 0.0 to 5.0
    pub rating: Decimal,
    pub duration: String,
    pub highlights: Vec<String>,
    pub images: Vec<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
