use crate::domain::error::PaymentError;
use crate::domain::payment::InitiatePurchaseRequest;
use crate::http::extract::AuthedUser;
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

pub async fn create_payment(
    State(state): State<AppState>,
    AuthedUser(principal): AuthedUser,
    Json(req): Json<InitiatePurchaseRequest>,
) -> impl IntoResponse {
    match state
        .payment_service
        .initiate_purchase(&principal, req.course_id)
        .await
    {
        Ok(resp) => (axum::http::StatusCode::CREATED, Json(resp)).into_response(),
        Err(e) => reply_error(e),
    }
}

pub async fn get_status(
    State(state): State<AppState>,
    AuthedUser(principal): AuthedUser,
    Path(payment_id): Path<Uuid>,
) -> impl IntoResponse {
    match state
        .payment_service
        .payment_status(&principal, payment_id)
        .await
    {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)).into_response(),
        Err(e) => reply_error(e),
    }
}

pub async fn retry_payment(
    State(state): State<AppState>,
    AuthedUser(principal): AuthedUser,
    Path(payment_id): Path<Uuid>,
) -> impl IntoResponse {
    match state
        .payment_service
        .retry_payment(&principal, payment_id)
        .await
    {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)).into_response(),
        Err(e) => reply_error(e),
    }
}

pub async fn cancel_payment(
    State(state): State<AppState>,
    AuthedUser(principal): AuthedUser,
    Path(payment_id): Path<Uuid>,
) -> impl IntoResponse {
    match state
        .payment_service
        .cancel_payment(&principal, payment_id)
        .await
    {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)).into_response(),
        Err(e) => reply_error(e),
    }
}

/// Operator recovery endpoint, reachable only through the admin-key
/// router.
pub async fn manual_complete(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.payment_service.engine.manual_complete(payment_id).await {
        Ok(payment) => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({
                "payment_id": payment.id,
                "status": payment.status,
                "completed_at": payment.completed_at,
            })),
        )
            .into_response(),
        Err(e) => reply_error(e),
    }
}

pub async fn health() -> impl IntoResponse {
    (axum::http::StatusCode::OK, "ok")
}

pub(crate) fn reply_error(e: PaymentError) -> Response {
    if let PaymentError::Storage(inner) = &e {
        tracing::error!(error = %inner, "request failed on storage layer");
    }
    (e.status(), Json(e.envelope())).into_response()
}
