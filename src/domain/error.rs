use crate::domain::payment::{ErrorEnvelope, ErrorPayload, PaymentStatus};
use axum::http::StatusCode;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("webhook signing secret is not configured")]
    WebhookSecretMissing,

    #[error("webhook signature verification failed")]
    SignatureInvalid,

    #[error("webhook payload malformed: {0}")]
    PayloadMalformed(String),

    #[error("payment {0} not found")]
    PaymentNotFound(Uuid),

    #[error("course {0} not found")]
    CourseNotFound(Uuid),

    #[error("webhook event {0} not found")]
    WebhookEventNotFound(Uuid),

    #[error("user is already enrolled in this course")]
    AlreadyEnrolled,

    #[error("course is free, use the enroll endpoint")]
    FreeCourse,

    #[error("course requires payment")]
    PaymentRequired,

    #[error("invalid transition from {from:?} to {attempted:?}")]
    InvalidTransition {
        from: PaymentStatus,
        attempted: PaymentStatus,
    },

    #[error("caller is not allowed to act on this resource")]
    Forbidden,

    #[error("payment gateway error: {0}")]
    Gateway(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl PaymentError {
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::WebhookSecretMissing => "WEBHOOK_SECRET_MISSING",
            PaymentError::SignatureInvalid => "SIGNATURE_INVALID",
            PaymentError::PayloadMalformed(_) => "PAYLOAD_MALFORMED",
            PaymentError::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
            PaymentError::CourseNotFound(_) => "COURSE_NOT_FOUND",
            PaymentError::WebhookEventNotFound(_) => "WEBHOOK_EVENT_NOT_FOUND",
            PaymentError::AlreadyEnrolled => "ALREADY_ENROLLED",
            PaymentError::FreeCourse => "FREE_COURSE",
            PaymentError::PaymentRequired => "PAYMENT_REQUIRED",
            PaymentError::InvalidTransition { .. } => "INVALID_TRANSITION",
            PaymentError::Forbidden => "FORBIDDEN",
            PaymentError::Gateway(_) => "GATEWAY_ERROR",
            PaymentError::Storage(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            PaymentError::WebhookSecretMissing => StatusCode::SERVICE_UNAVAILABLE,
            PaymentError::SignatureInvalid => StatusCode::UNAUTHORIZED,
            PaymentError::PayloadMalformed(_) => StatusCode::BAD_REQUEST,
            PaymentError::PaymentNotFound(_)
            | PaymentError::CourseNotFound(_)
            | PaymentError::WebhookEventNotFound(_) => StatusCode::NOT_FOUND,
            PaymentError::AlreadyEnrolled => StatusCode::CONFLICT,
            PaymentError::FreeCourse => StatusCode::BAD_REQUEST,
            PaymentError::PaymentRequired => StatusCode::PAYMENT_REQUIRED,
            PaymentError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
            PaymentError::Forbidden => StatusCode::FORBIDDEN,
            PaymentError::Gateway(_) => StatusCode::BAD_GATEWAY,
            PaymentError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing envelope. Internal failures get a generic message;
    /// the underlying cause is only logged.
    pub fn envelope(&self) -> ErrorEnvelope {
        let message = match self {
            PaymentError::Storage(_) => "internal error".to_string(),
            other => other.to_string(),
        };
        ErrorEnvelope {
            error: ErrorPayload {
                code: self.code().to_string(),
                message,
                details: None,
            },
        }
    }
}
