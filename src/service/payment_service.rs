use crate::access::resolver::resolve_access;
use crate::domain::access::{AccessReason, AccessResult, Principal, Role};
use crate::domain::enrollment::EnrollmentRecord;
use crate::domain::error::PaymentError;
use crate::domain::payment::{
    CancelledPayment, NewPayment, PaymentRecord, PaymentStatus, PaymentStatusView, PurchaseStarted,
};
use crate::gateway::{CheckoutRequest, PaymentProvider};
use crate::reconcile::engine::{CancelActor, ReconcileEngine};
use crate::repo::courses_repo::CoursesRepo;
use crate::store::postgres::PgPaymentStore;
use crate::store::{PaymentStore, TransitionChange};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct PaymentService {
    pub store: PgPaymentStore,
    pub courses_repo: CoursesRepo,
    pub engine: ReconcileEngine<PgPaymentStore>,
    pub provider: Arc<dyn PaymentProvider>,
}

impl PaymentService {
    /// Creates a PENDING payment for a published paid course and opens a
    /// gateway checkout. A gateway failure is recorded as FAILED so the
    /// user keeps a retry path.
    pub async fn initiate_purchase(
        &self,
        principal: &Principal,
        course_id: Uuid,
    ) -> Result<PurchaseStarted, PaymentError> {
        let course = self
            .courses_repo
            .find_by_id(course_id)
            .await?
            .ok_or(PaymentError::CourseNotFound(course_id))?;
        if !course.is_published {
            return Err(PaymentError::CourseNotFound(course_id));
        }
        if self
            .store
            .find_enrollment(principal.user_id, course_id)
            .await?
            .is_some()
        {
            return Err(PaymentError::AlreadyEnrolled);
        }
        if course.is_free() {
            return Err(PaymentError::FreeCourse);
        }
        let amount_cents = course.price_cents.unwrap_or(0);

        let payment = self
            .store
            .insert_payment(NewPayment {
                id: Uuid::new_v4(),
                user_id: principal.user_id,
                course_id,
                amount_cents,
                currency: course.currency.clone(),
            })
            .await?;

        let request = CheckoutRequest {
            merchant_order_id: payment.id,
            amount_cents,
            currency: course.currency.clone(),
        };
        match self.provider.create_checkout(request).await {
            Ok(session) => {
                self.store
                    .attach_gateway_order(payment.id, &session.gateway_order_id)
                    .await?;
                tracing::info!(
                    payment_id = %payment.id,
                    course_id = %course_id,
                    amount_cents,
                    gateway = self.provider.name(),
                    "checkout created"
                );
                Ok(PurchaseStarted {
                    payment_id: payment.id,
                    amount_cents,
                    currency: course.currency,
                    redirect_url: session.redirect_url,
                })
            }
            Err(e) => {
                let mut change = TransitionChange::to(PaymentStatus::Failed);
                change.failure_reason = Some("gateway error during checkout".to_string());
                self.store
                    .transition_payment(payment.id, &[PaymentStatus::Pending], change)
                    .await?;
                tracing::error!(payment_id = %payment.id, error = %e, "gateway checkout failed");
                Err(PaymentError::Gateway(e.to_string()))
            }
        }
    }

    pub async fn payment_status(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<PaymentStatusView, PaymentError> {
        let payment = self.owned_payment(principal, id).await?;
        Ok(PaymentStatusView {
            payment_id: payment.id,
            status: payment.status,
            amount_cents: payment.amount_cents,
            currency: payment.currency,
            failure_reason: payment.failure_reason,
            completed_at: payment.completed_at,
        })
    }

    pub async fn retry_payment(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<PurchaseStarted, PaymentError> {
        self.owned_payment(principal, id).await?;
        let (payment, session) = self.engine.retry_payment(id).await?;
        Ok(PurchaseStarted {
            payment_id: payment.id,
            amount_cents: payment.amount_cents,
            currency: payment.currency,
            redirect_url: session.redirect_url,
        })
    }

    pub async fn cancel_payment(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<CancelledPayment, PaymentError> {
        self.owned_payment(principal, id).await?;
        let actor = if principal.role == Role::Admin {
            CancelActor::Admin
        } else {
            CancelActor::User
        };
        let payment = self.engine.cancel_payment(id, actor).await?;
        Ok(CancelledPayment {
            payment_id: payment.id,
            status: payment.status,
            closed_at: payment.closed_at,
        })
    }

    pub async fn resolve_course_access(
        &self,
        principal: Option<&Principal>,
        course_id: Uuid,
    ) -> Result<AccessResult, PaymentError> {
        let course = self
            .courses_repo
            .find_by_id(course_id)
            .await?
            .ok_or(PaymentError::CourseNotFound(course_id))?;
        let enrolled = match principal {
            Some(p) => self
                .store
                .find_enrollment(p.user_id, course_id)
                .await?
                .is_some(),
            None => false,
        };
        Ok(resolve_access(principal, &course, enrolled))
    }

    /// Direct enrollment for free courses; idempotent for users who are
    /// already enrolled.
    pub async fn enroll_free(
        &self,
        principal: &Principal,
        course_id: Uuid,
    ) -> Result<EnrollmentRecord, PaymentError> {
        let access = self.resolve_course_access(Some(principal), course_id).await?;
        match access.reason {
            AccessReason::Enrolled => {
                let existing = self
                    .store
                    .find_enrollment(principal.user_id, course_id)
                    .await?
                    .ok_or_else(|| {
                        PaymentError::Storage(anyhow::anyhow!("enrollment disappeared"))
                    })?;
                Ok(existing)
            }
            AccessReason::FreeCourse => {
                let materialized = self
                    .engine
                    .materializer
                    .ensure_enrollment(principal.user_id, course_id, None)
                    .await?;
                Ok(materialized.enrollment)
            }
            AccessReason::PaymentRequired => Err(PaymentError::PaymentRequired),
            AccessReason::NotPublished => Err(PaymentError::CourseNotFound(course_id)),
            _ => Err(PaymentError::Forbidden),
        }
    }

    async fn owned_payment(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<PaymentRecord, PaymentError> {
        let payment = self
            .store
            .find_payment(id)
            .await?
            .ok_or(PaymentError::PaymentNotFound(id))?;
        if payment.user_id != principal.user_id && principal.role != Role::Admin {
            return Err(PaymentError::Forbidden);
        }
        Ok(payment)
    }
}
