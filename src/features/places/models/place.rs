use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for place
#[derive(Debug, Clone, FromRow)]
pub struct Place {
    pub id: Uuid,
    pub destination_id: Uuid,
    pub name: String,
    pub description: String,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub images: Vec<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
