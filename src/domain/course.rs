use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CourseRecord {
    pub id: Uuid,
    pub professor_id: Uuid,
    pub title: String,
    pub price_cents: Option<i64>,
    pub currency: String,
    pub is_published: bool,
    pub enrollment_count: i64,
    pub created_at: DateTime<Utc>,
}

impl CourseRecord {
    pub fn is_free(&self) -> bool {
        self.price_cents.map_or(true, |p| p <= 0)
    }
}
