use crate::domain::error::PaymentError;
use crate::domain::notification::TransactionNotification;
use crate::domain::payment::{PaymentRecord, PaymentStatus};
use crate::enrollment::materializer::EnrollmentMaterializer;
use crate::gateway::{CheckoutRequest, CheckoutSession, PaymentProvider};
use crate::reconcile::transition::{
    can_cancel, can_retry, check_transition, resolve_target, TransitionCheck,
};
use crate::store::{PaymentStore, TransitionChange};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelActor {
    User,
    Admin,
}

impl CancelActor {
    fn reason(&self) -> &'static str {
        match self {
            CancelActor::User => "cancelled by user",
            CancelActor::Admin => "cancelled by admin",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum IgnoreReason {
    PaymentNotFound {
        merchant_order_id: String,
    },
    AmountMismatch {
        expected_cents: i64,
        expected_currency: String,
        got_cents: i64,
        got_currency: String,
    },
    StaleTransition {
        from: PaymentStatus,
        attempted: PaymentStatus,
    },
    DuplicateDelivery {
        status: PaymentStatus,
    },
}

impl IgnoreReason {
    /// Annotation stored on the webhook event. `None` for plain duplicate
    /// deliveries, which are a fully successful no-op.
    fn annotation(&self) -> Option<String> {
        match self {
            IgnoreReason::PaymentNotFound { merchant_order_id } => {
                Some(format!("no payment for merchant order {merchant_order_id}"))
            }
            IgnoreReason::AmountMismatch {
                expected_cents,
                expected_currency,
                got_cents,
                got_currency,
            } => Some(format!(
                "amount mismatch: stored {expected_cents} {expected_currency}, notification carried {got_cents} {got_currency}"
            )),
            IgnoreReason::StaleTransition { from, attempted } => Some(format!(
                "stale notification: {} -> {} not allowed",
                from.as_str(),
                attempted.as_str()
            )),
            IgnoreReason::DuplicateDelivery { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WebhookOutcome {
    Applied {
        payment_id: Uuid,
        status: PaymentStatus,
        enrollment_created: bool,
    },
    AlreadyProcessed,
    Ignored {
        payment_id: Option<Uuid>,
        #[serde(flatten)]
        reason: IgnoreReason,
    },
}

/// The single authoritative payment state machine. Every mutation of a
/// payment's status flows through here: verified webhooks, operator
/// webhook retries, user retry/cancel and manual completion.
#[derive(Clone)]
pub struct ReconcileEngine<S: PaymentStore + Clone> {
    pub store: S,
    pub materializer: EnrollmentMaterializer<S>,
    pub provider: Arc<dyn PaymentProvider>,
}

impl<S: PaymentStore + Clone> ReconcileEngine<S> {
    pub fn new(store: S, provider: Arc<dyn PaymentProvider>) -> Self {
        Self {
            materializer: EnrollmentMaterializer::new(store.clone()),
            store,
            provider,
        }
    }

    /// Normal webhook path: honors the processed-at guard before applying.
    pub async fn apply_webhook(
        &self,
        event_id: Uuid,
        notification: &TransactionNotification,
    ) -> Result<WebhookOutcome, PaymentError> {
        let event = self
            .store
            .find_webhook_event(event_id)
            .await?
            .ok_or(PaymentError::WebhookEventNotFound(event_id))?;
        if event.processed_at.is_some() {
            return Ok(WebhookOutcome::AlreadyProcessed);
        }

        self.apply_notification(event_id, notification).await
    }

    /// Applies a notification without the processed-at guard. Only the
    /// operator retry endpoint calls this directly.
    pub async fn apply_notification(
        &self,
        event_id: Uuid,
        notification: &TransactionNotification,
    ) -> Result<WebhookOutcome, PaymentError> {
        let payment = match Uuid::parse_str(&notification.merchant_order_id) {
            Ok(id) => self.store.find_payment(id).await?,
            Err(_) => None,
        };
        let Some(payment) = payment else {
            return self
                .ignore(
                    event_id,
                    None,
                    IgnoreReason::PaymentNotFound {
                        merchant_order_id: notification.merchant_order_id.clone(),
                    },
                )
                .await;
        };

        if payment.amount_cents != notification.amount_cents
            || payment.currency != notification.currency
        {
            return self
                .ignore(
                    event_id,
                    Some(payment.id),
                    IgnoreReason::AmountMismatch {
                        expected_cents: payment.amount_cents,
                        expected_currency: payment.currency.clone(),
                        got_cents: notification.amount_cents,
                        got_currency: notification.currency.clone(),
                    },
                )
                .await;
        }

        let (target, failure_reason) = resolve_target(notification);

        // Compare-and-swap on status; a lost race re-reads once and
        // re-evaluates against the fresh state.
        let mut current = payment;
        for _ in 0..2 {
            match check_transition(current.status, target) {
                TransitionCheck::Duplicate => {
                    if current.status == PaymentStatus::Completed {
                        // heals a delivery that transitioned but died before
                        // the enrollment insert; idempotent either way
                        self.materializer
                            .ensure_enrollment(current.user_id, current.course_id, Some(current.id))
                            .await?;
                    }
                    return self
                        .ignore(
                            event_id,
                            Some(current.id),
                            IgnoreReason::DuplicateDelivery {
                                status: current.status,
                            },
                        )
                        .await;
                }
                TransitionCheck::Rejected => {
                    return self
                        .ignore(
                            event_id,
                            Some(current.id),
                            IgnoreReason::StaleTransition {
                                from: current.status,
                                attempted: target,
                            },
                        )
                        .await;
                }
                TransitionCheck::Apply => {}
            }

            let change = TransitionChange {
                to: target,
                payment_method: notification.payment_method.clone(),
                gateway_transaction_id: Some(notification.transaction_id),
                failure_reason: failure_reason.clone(),
                completed_at: (target == PaymentStatus::Completed).then(chrono::Utc::now),
                closed_at: None,
                clear_gateway_refs: false,
            };
            let won = self
                .store
                .transition_payment(current.id, &[current.status], change)
                .await?;
            if !won {
                current = self
                    .store
                    .find_payment(current.id)
                    .await?
                    .ok_or(PaymentError::PaymentNotFound(current.id))?;
                continue;
            }

            let enrollment_created = if target == PaymentStatus::Completed {
                self.materializer
                    .ensure_enrollment(current.user_id, current.course_id, Some(current.id))
                    .await?
                    .created
            } else {
                false
            };

            self.store.mark_webhook_processed(event_id, None).await?;
            tracing::info!(
                payment_id = %current.id,
                from_status = current.status.as_str(),
                to_status = target.as_str(),
                gateway_transaction_id = notification.transaction_id,
                "payment transition applied"
            );
            return Ok(WebhookOutcome::Applied {
                payment_id: current.id,
                status: target,
                enrollment_created,
            });
        }

        Err(PaymentError::Storage(anyhow::anyhow!(
            "payment {} status contention, giving up after re-read",
            current.id
        )))
    }

    /// Resets a FAILED or CANCELLED payment and opens a fresh gateway
    /// order. A gateway failure lands the payment back in FAILED so it is
    /// never left PENDING with no live order behind it.
    pub async fn retry_payment(
        &self,
        id: Uuid,
    ) -> Result<(PaymentRecord, CheckoutSession), PaymentError> {
        let payment = self
            .store
            .find_payment(id)
            .await?
            .ok_or(PaymentError::PaymentNotFound(id))?;
        if !can_retry(payment.status) {
            return Err(PaymentError::InvalidTransition {
                from: payment.status,
                attempted: PaymentStatus::Pending,
            });
        }

        let mut change = TransitionChange::to(PaymentStatus::Pending);
        change.clear_gateway_refs = true;
        let won = self
            .store
            .transition_payment(id, &[payment.status], change)
            .await?;
        if !won {
            let fresh = self
                .store
                .find_payment(id)
                .await?
                .ok_or(PaymentError::PaymentNotFound(id))?;
            return Err(PaymentError::InvalidTransition {
                from: fresh.status,
                attempted: PaymentStatus::Pending,
            });
        }

        let request = CheckoutRequest {
            merchant_order_id: id,
            amount_cents: payment.amount_cents,
            currency: payment.currency.clone(),
        };
        match self.provider.create_checkout(request).await {
            Ok(session) => {
                self.store
                    .attach_gateway_order(id, &session.gateway_order_id)
                    .await?;
                let fresh = self
                    .store
                    .find_payment(id)
                    .await?
                    .ok_or(PaymentError::PaymentNotFound(id))?;
                Ok((fresh, session))
            }
            Err(e) => {
                let mut change = TransitionChange::to(PaymentStatus::Failed);
                change.failure_reason = Some("gateway error during retry".to_string());
                self.store
                    .transition_payment(id, &[PaymentStatus::Pending], change)
                    .await?;
                tracing::error!(payment_id = %id, error = %e, "gateway order creation failed during retry");
                Err(PaymentError::Gateway(e.to_string()))
            }
        }
    }

    /// Cancels a PENDING payment, stamping `closed_at` as the terminal
    /// timestamp.
    pub async fn cancel_payment(
        &self,
        id: Uuid,
        actor: CancelActor,
    ) -> Result<PaymentRecord, PaymentError> {
        let payment = self
            .store
            .find_payment(id)
            .await?
            .ok_or(PaymentError::PaymentNotFound(id))?;
        if !can_cancel(payment.status) {
            return Err(PaymentError::InvalidTransition {
                from: payment.status,
                attempted: PaymentStatus::Cancelled,
            });
        }

        let mut change = TransitionChange::to(PaymentStatus::Cancelled);
        change.failure_reason = Some(actor.reason().to_string());
        change.closed_at = Some(chrono::Utc::now());
        let won = self
            .store
            .transition_payment(id, &[PaymentStatus::Pending], change)
            .await?;
        if !won {
            let fresh = self
                .store
                .find_payment(id)
                .await?
                .ok_or(PaymentError::PaymentNotFound(id))?;
            return Err(PaymentError::InvalidTransition {
                from: fresh.status,
                attempted: PaymentStatus::Cancelled,
            });
        }

        self.store
            .find_payment(id)
            .await?
            .ok_or(PaymentError::PaymentNotFound(id))
    }

    /// Support/recovery path: forces COMPLETED regardless of prior state
    /// and materializes the enrollment. Callers are responsible for admin
    /// authorization; the action is audit-logged here.
    pub async fn manual_complete(&self, id: Uuid) -> Result<PaymentRecord, PaymentError> {
        let payment = self
            .store
            .find_payment(id)
            .await?
            .ok_or(PaymentError::PaymentNotFound(id))?;

        if payment.status != PaymentStatus::Completed {
            let mut change = TransitionChange::to(PaymentStatus::Completed);
            change.completed_at = Some(chrono::Utc::now());
            self.store
                .transition_payment(id, &PaymentStatus::ALL, change)
                .await?;
        }

        let materialized = self
            .materializer
            .ensure_enrollment(payment.user_id, payment.course_id, Some(payment.id))
            .await?;
        tracing::warn!(
            payment_id = %id,
            previous_status = payment.status.as_str(),
            enrollment_created = materialized.created,
            "manual completion applied by operator"
        );

        self.store
            .find_payment(id)
            .await?
            .ok_or(PaymentError::PaymentNotFound(id))
    }

    async fn ignore(
        &self,
        event_id: Uuid,
        payment_id: Option<Uuid>,
        reason: IgnoreReason,
    ) -> Result<WebhookOutcome, PaymentError> {
        let annotation = reason.annotation();
        if let Some(note) = &annotation {
            tracing::warn!(event_id = %event_id, payment_id = ?payment_id, note = %note, "webhook not applied");
        }
        self.store
            .mark_webhook_processed(event_id, annotation.as_deref())
            .await?;
        Ok(WebhookOutcome::Ignored { payment_id, reason })
    }
}
