use crate::http::extract::{AuthedUser, MaybeUser};
use crate::http::handlers::payments::reply_error;
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

pub async fn get_access(
    State(state): State<AppState>,
    MaybeUser(principal): MaybeUser,
    Path(course_id): Path<Uuid>,
) -> impl IntoResponse {
    match state
        .payment_service
        .resolve_course_access(principal.as_ref(), course_id)
        .await
    {
        Ok(result) => (axum::http::StatusCode::OK, Json(result)).into_response(),
        Err(e) => reply_error(e),
    }
}

pub async fn enroll_free(
    State(state): State<AppState>,
    AuthedUser(principal): AuthedUser,
    Path(course_id): Path<Uuid>,
) -> impl IntoResponse {
    match state
        .payment_service
        .enroll_free(&principal, course_id)
        .await
    {
        Ok(enrollment) => (axum::http::StatusCode::OK, Json(enrollment)).into_response(),
        Err(e) => reply_error(e),
    }
}
