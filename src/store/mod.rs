use crate::domain::enrollment::EnrollmentRecord;
use crate::domain::payment::{NewPayment, PaymentRecord, PaymentStatus};
use anyhow::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod postgres;

/// One status transition. `None` fields leave the stored value alone;
/// `clear_gateway_refs` wipes the gateway order/transaction references and
/// the failure reason (the retry path, which issues a fresh order).
#[derive(Debug, Clone)]
pub struct TransitionChange {
    pub to: PaymentStatus,
    pub payment_method: Option<String>,
    pub gateway_transaction_id: Option<i64>,
    pub failure_reason: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub clear_gateway_refs: bool,
}

impl TransitionChange {
    pub fn to(status: PaymentStatus) -> Self {
        Self {
            to: status,
            payment_method: None,
            gateway_transaction_id: None,
            failure_reason: None,
            completed_at: None,
            closed_at: None,
            clear_gateway_refs: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebhookEventRecord {
    pub id: Uuid,
    pub payment_id: Option<Uuid>,
    pub payload: serde_json::Value,
    pub received_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processing_attempts: i32,
    pub last_error: Option<String>,
}

/// Persistence operations consumed by the reconciliation core. The
/// production implementation is `postgres::PgPaymentStore`; tests run the
/// engine against an in-memory implementation.
#[async_trait::async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert_payment(&self, new: NewPayment) -> Result<PaymentRecord>;

    async fn find_payment(&self, id: Uuid) -> Result<Option<PaymentRecord>>;

    async fn attach_gateway_order(&self, id: Uuid, gateway_order_id: &str) -> Result<()>;

    /// Atomic conditional update: applies `change` only while the stored
    /// status is one of `from`. Returns false when the guard missed.
    async fn transition_payment(
        &self,
        id: Uuid,
        from: &[PaymentStatus],
        change: TransitionChange,
    ) -> Result<bool>;

    async fn find_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<EnrollmentRecord>>;

    /// Insert under the (user_id, course_id) unique key. Returns `None`
    /// when the row already exists, including a lost insert race.
    async fn create_enrollment_if_absent(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        payment_id: Option<Uuid>,
    ) -> Result<Option<EnrollmentRecord>>;

    async fn increment_enrollment_count(&self, course_id: Uuid) -> Result<()>;

    async fn record_webhook_event(
        &self,
        payment_id: Option<Uuid>,
        payload: &serde_json::Value,
    ) -> Result<Uuid>;

    async fn find_webhook_event(&self, id: Uuid) -> Result<Option<WebhookEventRecord>>;

    /// Stamps `processed_at`, bumps the attempt counter and records the
    /// outcome annotation, if any.
    async fn mark_webhook_processed(&self, id: Uuid, error: Option<&str>) -> Result<()>;

    /// Failed attempt: bumps the counter and records the error but leaves
    /// `processed_at` null so gateway redelivery can try again.
    async fn mark_webhook_failed(&self, id: Uuid, error: &str) -> Result<()>;
}
