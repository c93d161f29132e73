use course_payments::domain::notification::TransactionNotification;
use course_payments::domain::payment::PaymentStatus;
use course_payments::reconcile::transition::{
    can_cancel, can_retry, check_transition, resolve_target, TransitionCheck,
};

#[test]
fn refunded_flag_wins_over_success() {
    let n = notification(true, false, true);
    let (target, reason) = resolve_target(&n);
    assert_eq!(target, PaymentStatus::Refunded);
    assert!(reason.is_none());
}

#[test]
fn definitive_success_targets_completed() {
    let n = notification(true, false, false);
    let (target, _) = resolve_target(&n);
    assert_eq!(target, PaymentStatus::Completed);
}

#[test]
fn pending_flag_targets_processing_even_with_success() {
    let n = notification(true, true, false);
    let (target, _) = resolve_target(&n);
    assert_eq!(target, PaymentStatus::Processing);
}

#[test]
fn decline_targets_failed_with_reason() {
    let n = notification(false, false, false);
    let (target, reason) = resolve_target(&n);
    assert_eq!(target, PaymentStatus::Failed);
    assert!(reason.unwrap().contains("9912345"));
}

#[test]
fn forward_transitions_apply() {
    use PaymentStatus::*;
    for (from, to) in [
        (Pending, Processing),
        (Pending, Completed),
        (Pending, Failed),
        (Processing, Completed),
        (Processing, Failed),
        (Completed, Refunded),
    ] {
        assert_eq!(check_transition(from, to), TransitionCheck::Apply, "{from:?} -> {to:?}");
    }
}

#[test]
fn same_state_is_duplicate() {
    for status in PaymentStatus::ALL {
        assert_eq!(check_transition(status, status), TransitionCheck::Duplicate);
    }
}

#[test]
fn nothing_leaves_refunded() {
    use PaymentStatus::*;
    for to in [Pending, Processing, Completed, Failed, Cancelled] {
        assert_eq!(check_transition(Refunded, to), TransitionCheck::Rejected);
    }
}

#[test]
fn completed_only_moves_to_refunded() {
    use PaymentStatus::*;
    for to in [Pending, Processing, Failed, Cancelled] {
        assert_eq!(check_transition(Completed, to), TransitionCheck::Rejected);
    }
    assert_eq!(check_transition(Completed, Refunded), TransitionCheck::Apply);
}

#[test]
fn cancelled_payment_rejects_late_gateway_outcomes() {
    use PaymentStatus::*;
    for to in [Processing, Completed, Failed, Refunded] {
        assert_eq!(check_transition(Cancelled, to), TransitionCheck::Rejected);
    }
}

#[test]
fn retry_only_from_failed_or_cancelled() {
    assert!(can_retry(PaymentStatus::Failed));
    assert!(can_retry(PaymentStatus::Cancelled));
    assert!(!can_retry(PaymentStatus::Pending));
    assert!(!can_retry(PaymentStatus::Processing));
    assert!(!can_retry(PaymentStatus::Completed));
    assert!(!can_retry(PaymentStatus::Refunded));
}

#[test]
fn cancel_only_from_pending() {
    assert!(can_cancel(PaymentStatus::Pending));
    assert!(!can_cancel(PaymentStatus::Processing));
    assert!(!can_cancel(PaymentStatus::Completed));
    assert!(!can_cancel(PaymentStatus::Failed));
    assert!(!can_cancel(PaymentStatus::Cancelled));
    assert!(!can_cancel(PaymentStatus::Refunded));
}

fn notification(success: bool, pending: bool, refunded: bool) -> TransactionNotification {
    TransactionNotification {
        transaction_id: 9912345,
        merchant_order_id: "order".to_string(),
        amount_cents: 50000,
        currency: "EGP".to_string(),
        success,
        pending,
        refunded,
        payment_method: None,
    }
}
