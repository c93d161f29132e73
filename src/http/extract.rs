use crate::domain::access::{Principal, Role};
use crate::domain::payment::{ErrorEnvelope, ErrorPayload};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

/// Principal injected by the upstream auth proxy via `X-User-Id` and
/// `X-User-Role`. Authentication itself is out of scope here; absent or
/// unparseable headers mean "unauthenticated".
fn principal_from_parts(parts: &Parts) -> Option<Principal> {
    let user_id = parts
        .headers
        .get("X-User-Id")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())?;
    let role = parts
        .headers
        .get("X-User-Role")
        .and_then(|h| h.to_str().ok())
        .and_then(Role::parse)?;
    Some(Principal { user_id, role })
}

pub struct AuthedUser(pub Principal);

#[async_trait::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthedUser {
    type Rejection = (StatusCode, Json<ErrorEnvelope>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        principal_from_parts(parts).map(AuthedUser).ok_or((
            StatusCode::UNAUTHORIZED,
            Json(ErrorEnvelope {
                error: ErrorPayload {
                    code: "NOT_AUTHENTICATED".to_string(),
                    message: "authentication required".to_string(),
                    details: None,
                },
            }),
        ))
    }
}

pub struct MaybeUser(pub Option<Principal>);

#[async_trait::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(principal_from_parts(parts)))
    }
}
