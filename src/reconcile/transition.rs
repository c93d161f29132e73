use crate::domain::notification::TransactionNotification;
use crate::domain::payment::PaymentStatus;

/// Resolves the target state for a verified gateway notification.
/// First match wins: refunded, then definitive success, then pending,
/// otherwise a decline.
pub fn resolve_target(n: &TransactionNotification) -> (PaymentStatus, Option<String>) {
    if n.refunded {
        (PaymentStatus::Refunded, None)
    } else if n.success && !n.pending {
        (PaymentStatus::Completed, None)
    } else if n.pending {
        (PaymentStatus::Processing, None)
    } else {
        (
            PaymentStatus::Failed,
            Some(format!("gateway declined transaction {}", n.transaction_id)),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCheck {
    /// Legal transition, apply it.
    Apply,
    /// Target equals the current state; redelivered notification, no-op.
    Duplicate,
    /// Stale or out-of-order notification; never applied.
    Rejected,
}

/// Validity of a webhook-driven transition. Retry and cancel go through
/// `can_retry` / `can_cancel` instead, and manual completion bypasses
/// this check entirely.
pub fn check_transition(from: PaymentStatus, to: PaymentStatus) -> TransitionCheck {
    use PaymentStatus::*;

    if from == to {
        return TransitionCheck::Duplicate;
    }
    match (from, to) {
        (Pending, Processing) | (Pending, Completed) | (Pending, Failed) => TransitionCheck::Apply,
        (Processing, Completed) | (Processing, Failed) => TransitionCheck::Apply,
        (Completed, Refunded) => TransitionCheck::Apply,
        _ => TransitionCheck::Rejected,
    }
}

pub fn can_retry(status: PaymentStatus) -> bool {
    matches!(status, PaymentStatus::Failed | PaymentStatus::Cancelled)
}

pub fn can_cancel(status: PaymentStatus) -> bool {
    status == PaymentStatus::Pending
}
