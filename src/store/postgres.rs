use crate::domain::enrollment::EnrollmentRecord;
use crate::domain::payment::{NewPayment, PaymentRecord, PaymentStatus};
use crate::store::{PaymentStore, TransitionChange, WebhookEventRecord};
use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct PgPaymentStore {
    pub pool: PgPool,
}

const PAYMENT_COLUMNS: &str = "id, user_id, course_id, amount_cents, currency, status, payment_method, gateway_order_id, gateway_transaction_id, failure_reason, completed_at, closed_at, created_at, updated_at";

fn payment_from_row(row: PgRow) -> Result<PaymentRecord> {
    let status: String = row.get("status");
    Ok(PaymentRecord {
        id: row.get("id"),
        user_id: row.get("user_id"),
        course_id: row.get("course_id"),
        amount_cents: row.get("amount_cents"),
        currency: row.get("currency"),
        status: PaymentStatus::parse(&status)?,
        payment_method: row.get("payment_method"),
        gateway_order_id: row.get("gateway_order_id"),
        gateway_transaction_id: row.get("gateway_transaction_id"),
        failure_reason: row.get("failure_reason"),
        completed_at: row.get("completed_at"),
        closed_at: row.get("closed_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn enrollment_from_row(row: PgRow) -> EnrollmentRecord {
    EnrollmentRecord {
        id: row.get("id"),
        user_id: row.get("user_id"),
        course_id: row.get("course_id"),
        payment_id: row.get("payment_id"),
        enrolled_at: row.get("enrolled_at"),
    }
}

#[async_trait::async_trait]
impl PaymentStore for PgPaymentStore {
    async fn insert_payment(&self, new: NewPayment) -> Result<PaymentRecord> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO payments (id, user_id, course_id, amount_cents, currency, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PAYMENT_COLUMNS}
            "#,
        ))
        .bind(new.id)
        .bind(new.user_id)
        .bind(new.course_id)
        .bind(new.amount_cents)
        .bind(new.currency)
        .bind(PaymentStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await?;

        payment_from_row(row)
    }

    async fn find_payment(&self, id: Uuid) -> Result<Option<PaymentRecord>> {
        let row = sqlx::query(&format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(payment_from_row).transpose()
    }

    async fn attach_gateway_order(&self, id: Uuid, gateway_order_id: &str) -> Result<()> {
        sqlx::query("UPDATE payments SET gateway_order_id = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(gateway_order_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn transition_payment(
        &self,
        id: Uuid,
        from: &[PaymentStatus],
        change: TransitionChange,
    ) -> Result<bool> {
        let from: Vec<String> = from.iter().map(|s| s.as_str().to_string()).collect();
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET status = $2,
                payment_method = COALESCE($3, payment_method),
                gateway_transaction_id = CASE WHEN $8 THEN NULL ELSE COALESCE($4, gateway_transaction_id) END,
                gateway_order_id = CASE WHEN $8 THEN NULL ELSE gateway_order_id END,
                failure_reason = CASE WHEN $8 THEN NULL ELSE COALESCE($5, failure_reason) END,
                completed_at = COALESCE($6, completed_at),
                closed_at = COALESCE($7, closed_at),
                updated_at = now()
            WHERE id = $1 AND status = ANY($9)
            "#,
        )
        .bind(id)
        .bind(change.to.as_str())
        .bind(change.payment_method)
        .bind(change.gateway_transaction_id)
        .bind(change.failure_reason)
        .bind(change.completed_at)
        .bind(change.closed_at)
        .bind(change.clear_gateway_refs)
        .bind(&from)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<EnrollmentRecord>> {
        let row = sqlx::query(
            "SELECT id, user_id, course_id, payment_id, enrolled_at FROM enrollments WHERE user_id = $1 AND course_id = $2",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(enrollment_from_row))
    }

    async fn create_enrollment_if_absent(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        payment_id: Option<Uuid>,
    ) -> Result<Option<EnrollmentRecord>> {
        let row = sqlx::query(
            r#"
            INSERT INTO enrollments (id, user_id, course_id, payment_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, course_id) DO NOTHING
            RETURNING id, user_id, course_id, payment_id, enrolled_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(course_id)
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(enrollment_from_row))
    }

    async fn increment_enrollment_count(&self, course_id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE courses SET enrollment_count = enrollment_count + 1, updated_at = now() WHERE id = $1",
        )
        .bind(course_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn record_webhook_event(
        &self,
        payment_id: Option<Uuid>,
        payload: &serde_json::Value,
    ) -> Result<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO webhook_events (id, payment_id, payload) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(payment_id)
            .bind(payload)
            .execute(&self.pool)
            .await?;

        Ok(id)
    }

    async fn find_webhook_event(&self, id: Uuid) -> Result<Option<WebhookEventRecord>> {
        let row = sqlx::query(
            "SELECT id, payment_id, payload, received_at, processed_at, processing_attempts, last_error FROM webhook_events WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| WebhookEventRecord {
            id: row.get("id"),
            payment_id: row.get("payment_id"),
            payload: row.get("payload"),
            received_at: row.get("received_at"),
            processed_at: row.get("processed_at"),
            processing_attempts: row.get("processing_attempts"),
            last_error: row.get("last_error"),
        }))
    }

    async fn mark_webhook_processed(&self, id: Uuid, error: Option<&str>) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE webhook_events
            SET processed_at = now(),
                processing_attempts = processing_attempts + 1,
                last_error = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_webhook_failed(&self, id: Uuid, error: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE webhook_events
            SET processing_attempts = processing_attempts + 1,
                last_error = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
