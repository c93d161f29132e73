use crate::domain::error::PaymentError;
use crate::http::handlers::payments::reply_error;
use crate::store::PaymentStore;
use crate::webhook::payload;
use crate::AppState;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct WebhookQuery {
    pub hmac: Option<String>,
}

/// Inbound gateway callback. Signature verification runs first and fails
/// closed; only then is the payload parsed and handed to the engine. The
/// event row is recorded before processing so redeliveries and failures
/// leave an audit trail.
pub async fn receive_gateway_webhook(
    State(state): State<AppState>,
    Query(query): Query<WebhookQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let provided = query.hmac.or_else(|| {
        headers
            .get("X-Gateway-Hmac")
            .and_then(|h| h.to_str().ok())
            .map(str::to_string)
    });
    let Some(provided) = provided else {
        return reply_error(PaymentError::SignatureInvalid);
    };

    if let Err(e) = state.verifier.require(&body, &provided) {
        if matches!(e, PaymentError::WebhookSecretMissing) {
            tracing::error!("webhook rejected: signing secret not configured");
        }
        return reply_error(e);
    }

    let notification = match payload::parse(&body) {
        Ok(n) => n,
        Err(e) => return reply_error(e),
    };

    let raw: serde_json::Value =
        serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    let payment_hint = Uuid::parse_str(&notification.merchant_order_id).ok();
    let store = &state.payment_service.store;
    let event_id = match store.record_webhook_event(payment_hint, &raw).await {
        Ok(id) => id,
        Err(e) => return reply_error(PaymentError::Storage(e)),
    };

    match state
        .payment_service
        .engine
        .apply_webhook(event_id, &notification)
        .await
    {
        Ok(outcome) => (axum::http::StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => {
            if let Err(mark_err) = store.mark_webhook_failed(event_id, &e.to_string()).await {
                tracing::error!(event_id = %event_id, error = %mark_err, "failed to record webhook failure");
            }
            reply_error(e)
        }
    }
}

/// Operator-triggered reprocessing of a stored event. Bypasses both the
/// signature check and the processed-at guard; reachable only through the
/// admin-key router and audit-logged.
pub async fn retry_webhook_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> impl IntoResponse {
    let store = &state.payment_service.store;
    let event = match store.find_webhook_event(event_id).await {
        Ok(Some(event)) => event,
        Ok(None) => return reply_error(PaymentError::WebhookEventNotFound(event_id)),
        Err(e) => return reply_error(PaymentError::Storage(e)),
    };

    let notification = match payload::parse_value(&event.payload) {
        Ok(n) => n,
        Err(e) => return reply_error(e),
    };

    tracing::warn!(
        event_id = %event_id,
        previously_processed = event.processed_at.is_some(),
        "operator webhook retry, signature check bypassed"
    );

    match state
        .payment_service
        .engine
        .apply_notification(event_id, &notification)
        .await
    {
        Ok(outcome) => {
            let attempts = match store.find_webhook_event(event_id).await {
                Ok(Some(event)) => event.processing_attempts,
                _ => event.processing_attempts + 1,
            };
            (
                axum::http::StatusCode::OK,
                Json(serde_json::json!({
                    "event_id": event_id,
                    "processing_attempts": attempts,
                    "result": outcome,
                })),
            )
                .into_response()
        }
        Err(e) => {
            if let Err(mark_err) = store.mark_webhook_failed(event_id, &e.to_string()).await {
                tracing::error!(event_id = %event_id, error = %mark_err, "failed to record webhook failure");
            }
            reply_error(e)
        }
    }
}
