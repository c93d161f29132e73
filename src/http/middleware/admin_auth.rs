use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;

/// Guards the operator surface (webhook retry, manual completion). The
/// key comparison is constant-time; accepted requests are audit-logged
/// with the path they hit.
pub async fn require_admin_key(
    State(expected): State<String>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get("X-Admin-Api-Key")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    let ok = provided.len() == expected.len()
        && bool::from(provided.as_bytes().ct_eq(expected.as_bytes()));

    if !ok {
        tracing::warn!(path = %request.uri().path(), "admin request rejected");
        return Response::builder()
            .status(StatusCode::UNAUTHORIZED)
            .body(Body::from("unauthorized"))
            .unwrap_or_else(|_| Response::new(Body::from("unauthorized")));
    }

    tracing::info!(path = %request.uri().path(), "admin request authorized");
    next.run(request).await
}
