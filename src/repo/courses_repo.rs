use crate::domain::course::CourseRecord;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct CoursesRepo {
    pub pool: PgPool,
}

impl CoursesRepo {
    pub async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<CourseRecord>> {
        let row = sqlx::query(
            "SELECT id, professor_id, title, price_cents, currency, is_published, enrollment_count, created_at FROM courses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| CourseRecord {
            id: r.get("id"),
            professor_id: r.get("professor_id"),
            title: r.get("title"),
            price_cents: r.get("price_cents"),
            currency: r.get("currency"),
            is_published: r.get("is_published"),
            enrollment_count: r.get("enrollment_count"),
            created_at: r.get("created_at"),
        }))
    }
}
