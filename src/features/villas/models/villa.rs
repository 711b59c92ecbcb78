use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for a villa
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Villa {
    pub id: i32,
    pub name: String,
    pub details: Option<String>,
    pub rate: f64,
    pub sqm: i32,
    pub occupancy: i32,
    pub image_url: Option<String>,
    pub amenity: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unicode case folding for name uniqueness. Both stores compare through
/// this, Postgres via the `name_key` column.
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

impl Villa {
    /// Case-insensitive name comparison used for the uniqueness rule on create
    pub fn has_name(&self, name: &str) -> bool {
        name_key(&self.name) == name_key(name)
    }
}

impl Default for Villa {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: String::new(),
            details: None,
            rate: 0.0,
            sqm: 0,
            occupancy: 0,
            image_url: None,
            amenity: None,
            created_at: now,
            updated_at: now,
        }
    }
}
