use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a sponsored ad shown on a place
#[derive(Debug, Clone, FromRow)]
pub struct Ad {
    pub id: Uuid,
    pub place_id: Uuid,
    pub title: String,
    pub description: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub whatsapp: Option<String>,
    pub images: Vec<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
